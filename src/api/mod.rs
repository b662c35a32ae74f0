//! HTTP client for the inventory REST API.
//!
//! Talks to the backend with the synchronous `ureq` client. Provides:
//!
//! - **Equipment pages**: `GET {base}/equipments/?<filters>&page=&page_size=`
//! - **Grouped counts**: `GET {base}/equipments/?group_by=<field>&<filters>`
//! - **Status distribution**: `GET {base}/analytics/status-distribution/`
//! - **Health check**: a one-row equipment request with a short timeout
//!
//! The client only fetches and decodes. Normalization and aggregation
//! happen in [`crate::metrics`].

pub mod filters;
pub mod records;

use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use crate::config::schema::ApiConfig;

pub use filters::Filters;
pub use records::{EquipmentPage, EquipmentRecord, GroupedCount, StatusDistribution};

/// Field the backend can group equipments by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupField {
    Status,
    CreationDate,
    Location,
}

impl GroupField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::CreationDate => "creation_date",
            Self::Location => "location",
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Synchronous inventory API client.
///
/// Created from an [`ApiConfig`] and reused for one CLI invocation.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    equipments_path: String,
    status_distribution_path: String,
    timeout: Duration,
}

impl ApiClient {
    /// Build a client from the resolved config.
    pub fn from_config(config: &ApiConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            equipments_path: config.equipments_path.trim_matches('/').to_string(),
            status_distribution_path: config.status_distribution_path.trim_matches('/').to_string(),
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    /// Base URL requests are made against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        // Django routes end with a slash; keep it or the backend redirects
        format!("{}/{}/", self.base_url, path)
    }

    /// Whether the API answers an equipment request within 5 s.
    pub fn is_healthy(&self) -> bool {
        let url = self.endpoint(&self.equipments_path);
        let result = ureq::get(&url)
            .timeout(Duration::from_secs(5))
            .query("page_size", "1")
            .call();

        match result {
            Ok(_) => true,
            Err(e) => {
                log::debug!("health check failed: {e}");
                false
            }
        }
    }

    /// Fetch one page of equipments.
    pub fn fetch_equipments(
        &self,
        filters: &Filters,
        page: u32,
        page_size: u32,
    ) -> Result<EquipmentPage> {
        let url = self.endpoint(&self.equipments_path);
        let page = page.to_string();
        let page_size = page_size.to_string();

        let mut params = filters.query_pairs();
        params.push(("page", page.as_str()));
        params.push(("page_size", page_size.as_str()));

        self.get_json(&url, &params)
            .context("failed to fetch equipment list")
    }

    /// Fetch equipment counts grouped by a field.
    pub fn fetch_grouped(&self, field: GroupField, filters: &Filters) -> Result<Vec<GroupedCount>> {
        let url = self.endpoint(&self.equipments_path);

        let mut params = vec![("group_by", field.as_str())];
        params.extend(filters.query_pairs());

        self.get_json(&url, &params)
            .with_context(|| format!("failed to fetch equipments grouped by {}", field.as_str()))
    }

    /// Fetch the server-side status distribution (labels, counts, values).
    pub fn fetch_status_distribution(&self) -> Result<StatusDistribution> {
        let url = self.endpoint(&self.status_distribution_path);

        let resp: records::StatusDistributionResponse = self
            .get_json(&url, &[])
            .context("failed to fetch status distribution")?;

        if !resp.success {
            anyhow::bail!(
                "status distribution request failed: {}",
                resp.error.as_deref().unwrap_or("empty response")
            );
        }

        Ok(resp.data.unwrap_or_default())
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str, params: &[(&str, &str)]) -> Result<T> {
        let mut request = ureq::get(url).timeout(self.timeout);
        for (name, value) in params {
            request = request.query(name, value);
        }

        log::debug!("GET {}", request.url());

        let resp = request
            .call()
            .with_context(|| format!("GET {url} failed"))?;

        resp.into_json()
            .with_context(|| format!("failed to decode JSON from {url}"))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> ApiConfig {
        ApiConfig {
            base_url: base_url.to_string(),
            ..ApiConfig::default()
        }
    }

    #[test]
    fn endpoint_joins_with_single_slashes() {
        let client = ApiClient::from_config(&config("http://localhost:8000/api/"));
        assert_eq!(client.base_url(), "http://localhost:8000/api");
        assert_eq!(
            client.endpoint(&client.equipments_path),
            "http://localhost:8000/api/equipments/"
        );
        assert_eq!(
            client.endpoint(&client.status_distribution_path),
            "http://localhost:8000/api/analytics/status-distribution/"
        );
    }

    #[test]
    fn group_field_names_match_backend() {
        assert_eq!(GroupField::Status.as_str(), "status");
        assert_eq!(GroupField::CreationDate.as_str(), "creation_date");
        assert_eq!(GroupField::Location.as_str(), "location");
    }

    #[test]
    fn unreachable_api_is_unhealthy() {
        // Port 9 (discard) is not expected to run an HTTP server
        let client = ApiClient::from_config(&config("http://127.0.0.1:9/api"));
        assert!(!client.is_healthy());
    }
}

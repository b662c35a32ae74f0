//! Equipment list filters and their query-string form.

use serde::{Deserialize, Serialize};

/// Filters accepted by the equipment endpoints. Empty values are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Filters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Lower creation-date bound, `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    /// Upper creation-date bound, `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
}

impl Filters {
    /// Non-empty filters as `(name, value)` pairs, in a fixed order.
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("status", &self.status),
            ("location", &self.location),
            ("model", &self.model),
            ("date_from", &self.date_from),
            ("date_to", &self.date_to),
        ]
        .into_iter()
        .filter_map(|(name, value)| {
            let value = value.as_deref()?.trim();
            (!value.is_empty()).then_some((name, value))
        })
        .collect()
    }

    /// Whether no filter is set.
    pub fn is_empty(&self) -> bool {
        self.query_pairs().is_empty()
    }

    /// Overlay `other` on top of `self`: set values in `other` win.
    pub fn merged_with(&self, other: &Filters) -> Filters {
        fn pick(over: &Option<String>, base: &Option<String>) -> Option<String> {
            over.clone().or_else(|| base.clone())
        }

        Filters {
            status: pick(&other.status, &self.status),
            location: pick(&other.location, &self.location),
            model: pick(&other.model, &self.model),
            date_from: pick(&other.date_from, &self.date_from),
            date_to: pick(&other.date_to, &self.date_to),
        }
    }

    /// Percent-encoded query string (`status=En%20service&location=...`).
    pub fn query_string(&self) -> String {
        self.query_pairs()
            .into_iter()
            .map(|(name, value)| format!("{name}={}", urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_values_are_omitted() {
        let filters = Filters {
            status: Some("En service".to_string()),
            location: Some("".to_string()),
            model: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(filters.query_pairs(), vec![("status", "En service")]);
        assert!(!filters.is_empty());
        assert!(Filters::default().is_empty());
    }

    #[test]
    fn query_string_is_encoded() {
        let filters = Filters {
            status: Some("En service".to_string()),
            location: Some("Bâtiment A&B".to_string()),
            date_from: Some("2024-01-01".to_string()),
            ..Default::default()
        };
        assert_eq!(
            filters.query_string(),
            "status=En%20service&location=B%C3%A2timent%20A%26B&date_from=2024-01-01"
        );
    }

    #[test]
    fn merge_prefers_overlay() {
        let base = Filters {
            status: Some("HS".to_string()),
            location: Some("Rabat".to_string()),
            ..Default::default()
        };
        let overlay = Filters {
            status: Some("En stock".to_string()),
            ..Default::default()
        };
        let merged = base.merged_with(&overlay);
        assert_eq!(merged.status.as_deref(), Some("En stock"));
        assert_eq!(merged.location.as_deref(), Some("Rabat"));
    }
}

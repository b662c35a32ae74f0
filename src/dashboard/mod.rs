//! One refresh cycle of the dashboard: fetch, aggregate, report.
//!
//! Each section (status counts, monthly timeline) is fetched on its own. A
//! failing section is recorded as a [`SectionError`] and contributes no
//! observations; the other sections still render.
//!
//! Without filters the status section comes from the status-distribution
//! endpoint, which also carries purchase values. With filters it falls back
//! to `group_by=status`, which only has counts.

use serde::Serialize;

use crate::api::{ApiClient, Filters, GroupField};
use crate::metrics::{self, AggregatedMetrics, Locale, MonthObservation, StatusObservation};
use crate::status::{self, CanonicalStatus};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Where the status observations of a snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusSource {
    Distribution,
    Grouped,
    Unavailable,
}

/// A dashboard section that could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionError {
    pub section: &'static str,
    pub message: String,
}

/// Aggregated metrics plus what went wrong while fetching them.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub metrics: AggregatedMetrics,
    pub status_source: StatusSource,
    pub errors: Vec<SectionError>,
}

/// Values offered by the status and location filters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FilterOptions {
    pub statuses: Vec<CanonicalStatus>,
    pub locations: Vec<String>,
    pub errors: Vec<SectionError>,
}

// ---------------------------------------------------------------------------
// Refresh
// ---------------------------------------------------------------------------

/// Fetch every section and aggregate them into a snapshot.
pub fn collect(client: &ApiClient, filters: &Filters, locale: Locale) -> Snapshot {
    let mut errors = Vec::new();

    let (status_observations, status_source) =
        fetch_status_observations(client, filters, &mut errors);
    let month_observations = fetch_month_observations(client, filters, &mut errors);

    let metrics = metrics::aggregate_with_locale(&status_observations, &month_observations, locale);

    Snapshot {
        metrics,
        status_source,
        errors,
    }
}

fn fetch_status_observations(
    client: &ApiClient,
    filters: &Filters,
    errors: &mut Vec<SectionError>,
) -> (Vec<StatusObservation>, StatusSource) {
    if filters.is_empty() {
        match client.fetch_status_distribution() {
            Ok(dist) => return (dist.observations(), StatusSource::Distribution),
            Err(e) => {
                log::warn!("status distribution unavailable, falling back to grouping: {e:#}");
                errors.push(SectionError {
                    section: "status distribution",
                    message: format!("{e:#}"),
                });
            }
        }
    }

    match client.fetch_grouped(GroupField::Status, filters) {
        Ok(rows) => (
            rows.iter().map(|row| row.to_status_observation()).collect(),
            StatusSource::Grouped,
        ),
        Err(e) => {
            errors.push(SectionError {
                section: "status",
                message: format!("{e:#}"),
            });
            (Vec::new(), StatusSource::Unavailable)
        }
    }
}

fn fetch_month_observations(
    client: &ApiClient,
    filters: &Filters,
    errors: &mut Vec<SectionError>,
) -> Vec<MonthObservation> {
    match client.fetch_grouped(GroupField::CreationDate, filters) {
        Ok(rows) => rows.iter().map(|row| row.to_month_observation()).collect(),
        Err(e) => {
            errors.push(SectionError {
                section: "timeline",
                message: format!("{e:#}"),
            });
            Vec::new()
        }
    }
}

// ---------------------------------------------------------------------------
// Filter options
// ---------------------------------------------------------------------------

/// Distinct normalized statuses and locations known to the backend.
pub fn filter_options(client: &ApiClient) -> FilterOptions {
    let mut options = FilterOptions::default();
    let unfiltered = Filters::default();

    match client.fetch_grouped(GroupField::Status, &unfiltered) {
        Ok(rows) => {
            options.statuses = status::unique_normalized(rows.iter().map(|r| r.key.as_deref()));
        }
        Err(e) => options.errors.push(SectionError {
            section: "status options",
            message: format!("{e:#}"),
        }),
    }

    match client.fetch_grouped(GroupField::Location, &unfiltered) {
        Ok(rows) => options.locations = distinct_locations(rows.iter().map(|r| r.key.as_deref())),
        Err(e) => options.errors.push(SectionError {
            section: "location options",
            message: format!("{e:#}"),
        }),
    }

    options
}

/// Trimmed, non-empty, deduplicated and sorted.
fn distinct_locations<'a>(keys: impl Iterator<Item = Option<&'a str>>) -> Vec<String> {
    let mut locations: Vec<String> = keys
        .flatten()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();
    locations.sort();
    locations.dedup();
    locations
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Metrics aggregation for the inventory dashboard.
//!
//! Turns raw status observations and date-grouped counts into:
//! - **Per-status totals**: exact grouping on the normalized status
//! - **KPI buckets**: fuzzy substring bucketing on the original label
//! - **Total value**: fail-soft sum of purchase values
//! - **Monthly series**: counts per `YYYY-MM`, ascending
//!
//! Aggregation is a pure function of its inputs: no I/O, no retained state,
//! and no error path. Bad values degrade to zero and bad dates are skipped.

pub mod amount;
pub mod kpi;
pub mod timeline;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::status::{self, CanonicalStatus};

pub use amount::Amount;
pub use kpi::KpiBuckets;
pub use timeline::{Locale, MonthObservation, MonthlyEntry};

// ---------------------------------------------------------------------------
// Input observations
// ---------------------------------------------------------------------------

/// A status label with the number of equipments carrying it and their
/// combined value. One per equipment record or per pre-aggregated group.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusObservation {
    pub label: Option<String>,
    pub count: u64,
    pub value: Option<Amount>,
}

impl StatusObservation {
    pub fn new(label: impl Into<String>, count: u64) -> Self {
        Self {
            label: Some(label.into()),
            count,
            value: None,
        }
    }

    /// Attach a monetary value.
    pub fn with_value(mut self, value: impl Into<Amount>) -> Self {
        self.value = Some(value.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Aggregated output
// ---------------------------------------------------------------------------

/// Everything the rendering layer needs for one refresh cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregatedMetrics {
    /// Count per canonical status, in display order.
    pub per_status_totals: BTreeMap<CanonicalStatus, u64>,
    pub kpi: KpiBuckets,
    /// Sum of all observation counts.
    pub total_count: u64,
    /// Sum of observation values in hundredths of a currency unit.
    pub total_value_minor: u64,
    pub monthly_series: Vec<MonthlyEntry>,
    /// Month observations dropped for a missing or unusable date key.
    pub skipped_month_observations: usize,
}

impl AggregatedMetrics {
    /// Total value in currency units.
    pub fn total_value(&self) -> f64 {
        self.total_value_minor as f64 / 100.0
    }

    /// Count for one canonical status, zero if absent.
    pub fn status_count(&self, status: &CanonicalStatus) -> u64 {
        self.per_status_totals.get(status).copied().unwrap_or(0)
    }

    /// Share of the total for a status, in percent (0.0 when empty).
    pub fn status_pct(&self, status: &CanonicalStatus) -> f64 {
        if self.total_count == 0 {
            0.0
        } else {
            (self.status_count(status) as f64 / self.total_count as f64) * 100.0
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Aggregate observations with French month labels.
pub fn aggregate(
    status_observations: &[StatusObservation],
    month_observations: &[MonthObservation],
) -> AggregatedMetrics {
    aggregate_with_locale(status_observations, month_observations, Locale::default())
}

/// Aggregate observations, labelling months in the given locale.
pub fn aggregate_with_locale(
    status_observations: &[StatusObservation],
    month_observations: &[MonthObservation],
    locale: Locale,
) -> AggregatedMetrics {
    let mut metrics = AggregatedMetrics::default();

    for obs in status_observations {
        let label = obs.label.as_deref();
        let canonical = status::normalize(label);

        let total = metrics.per_status_totals.entry(canonical).or_default();
        *total = total.saturating_add(obs.count);
        metrics.kpi.record(label, obs.count);
        metrics.total_count = metrics.total_count.saturating_add(obs.count);
        metrics.total_value_minor = metrics
            .total_value_minor
            .saturating_add(amount::amount_minor_units(obs.value.as_ref()));
    }

    let series = timeline::build_monthly_series(month_observations, locale);
    metrics.monthly_series = series.entries;
    metrics.skipped_month_observations = series.skipped;

    log::debug!(
        "aggregated {} status observations into {} statuses, {} months ({} skipped)",
        status_observations.len(),
        metrics.per_status_totals.len(),
        metrics.monthly_series.len(),
        metrics.skipped_month_observations
    );

    metrics
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_observations() -> Vec<StatusObservation> {
        vec![
            StatusObservation::new("En Service", 10).with_value(1000.0),
            StatusObservation::new("EN SERVICE", 5).with_value("250.50"),
            StatusObservation::new("Hors Service", 2),
            StatusObservation::new("en instance", 3).with_value("n/a"),
        ]
    }

    #[test]
    fn per_status_totals_group_variants() {
        let metrics = aggregate(&sample_observations(), &[]);

        assert_eq!(metrics.status_count(&CanonicalStatus::EnService), 15);
        assert_eq!(metrics.status_count(&CanonicalStatus::HorsService), 2);
        assert_eq!(metrics.status_count(&CanonicalStatus::EnInstance), 3);
        assert_eq!(metrics.per_status_totals.len(), 3);
    }

    #[test]
    fn kpi_buckets_follow_rules() {
        let metrics = aggregate(&sample_observations(), &[]);

        assert_eq!(metrics.kpi.in_service, 15);
        assert_eq!(metrics.kpi.in_stock, 3);
        assert_eq!(metrics.kpi.in_maintenance_or_out, 5);
    }

    #[test]
    fn total_value_is_fail_soft() {
        let metrics = aggregate(&sample_observations(), &[]);
        assert_eq!(metrics.total_value_minor, 125_050);
        assert_eq!(metrics.total_value(), 1250.5);
    }

    #[test]
    fn total_value_ignores_input_order() {
        let forward = vec![
            StatusObservation::new("En service", 1).with_value(0.1),
            StatusObservation::new("En service", 1).with_value(0.2),
            StatusObservation::new("En service", 1).with_value(0.3),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();

        let a = aggregate(&forward, &[]);
        let b = aggregate(&reversed, &[]);
        assert_eq!(a.total_value_minor, 60);
        assert_eq!(a.total_value_minor, b.total_value_minor);
        assert_eq!(a.total_value().to_bits(), b.total_value().to_bits());
    }

    #[test]
    fn huge_counts_saturate_instead_of_overflowing() {
        let observations = vec![
            StatusObservation::new("En service", u64::MAX).with_value(1e30),
            StatusObservation::new("en service", u64::MAX).with_value(1e30),
            StatusObservation::new("en instance", u64::MAX),
        ];
        let months = vec![
            MonthObservation::new("2024-01-05", u64::MAX),
            MonthObservation::new("2024-01-20", u64::MAX),
        ];
        let metrics = aggregate(&observations, &months);

        assert_eq!(metrics.status_count(&CanonicalStatus::EnService), u64::MAX);
        assert_eq!(metrics.total_count, u64::MAX);
        assert_eq!(metrics.total_value_minor, u64::MAX);
        assert_eq!(metrics.kpi.in_service, u64::MAX);
        assert_eq!(metrics.kpi.in_maintenance_or_out, u64::MAX);
        assert_eq!(metrics.monthly_series[0].count, u64::MAX);
    }

    #[test]
    fn missing_label_is_inconnu() {
        let observations = vec![StatusObservation {
            label: None,
            count: 4,
            value: None,
        }];
        let metrics = aggregate(&observations, &[]);
        assert_eq!(metrics.status_count(&CanonicalStatus::Inconnu), 4);
        assert_eq!(metrics.kpi, KpiBuckets::default());
    }

    #[test]
    fn empty_input_gives_zeroed_metrics() {
        let metrics = aggregate(&[], &[]);
        assert_eq!(metrics, AggregatedMetrics::default());
        assert_eq!(metrics.status_pct(&CanonicalStatus::EnService), 0.0);
    }

    #[test]
    fn status_pct_uses_total_count() {
        let metrics = aggregate(&sample_observations(), &[]);
        assert_eq!(metrics.total_count, 20);
        assert!((metrics.status_pct(&CanonicalStatus::EnService) - 75.0).abs() < 1e-9);
    }

    #[test]
    fn serializes_status_codes_as_keys() {
        let metrics = aggregate(&sample_observations(), &[]);
        let json = serde_json::to_value(&metrics).unwrap();
        assert_eq!(json["per_status_totals"]["EN_SERVICE"], 15);
        assert_eq!(json["kpi"]["in_stock"], 3);
    }
}

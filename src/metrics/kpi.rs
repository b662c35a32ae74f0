//! Coarse KPI buckets for the dashboard tiles.
//!
//! Unlike the per-status breakdown, bucketing works on the original label
//! text with case-insensitive substring matching, so loosely phrased labels
//! (`"En service (site B)"`, `"panne écran"`) still land in a tile.

use serde::Serialize;

/// Counters behind the three summary tiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KpiBuckets {
    pub in_service: u64,
    pub in_maintenance_or_out: u64,
    pub in_stock: u64,
}

/// Which buckets a single label contributes to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KpiAttribution {
    pub in_service: bool,
    pub in_stock: bool,
    pub in_maintenance_or_out: bool,
}

impl KpiAttribution {
    /// True when the label feeds no bucket at all.
    pub fn is_none(&self) -> bool {
        !(self.in_service || self.in_stock || self.in_maintenance_or_out)
    }
}

/// Classify a raw label into KPI buckets. First matching rule wins:
///
/// 1. `service` without `hors` → in service
/// 2. `stock` or `instance` → in stock, and also maintenance for `instance`
/// 3. `hors`, `panne`, or exactly `hs` → maintenance / out of service
/// 4. `maintenance` → maintenance / out of service
pub fn classify(label: Option<&str>) -> KpiAttribution {
    let lower = label.unwrap_or("").to_lowercase();
    let mut attribution = KpiAttribution::default();

    if lower.contains("service") && !lower.contains("hors") {
        attribution.in_service = true;
    } else if lower.contains("stock") || lower.contains("instance") {
        attribution.in_stock = true;
        // "en instance" is waiting on an intervention: it also counts as maintenance
        attribution.in_maintenance_or_out = lower.contains("instance");
    } else if lower.contains("hors") || lower.contains("panne") || lower == "hs" {
        attribution.in_maintenance_or_out = true;
    } else if lower.contains("maintenance") {
        attribution.in_maintenance_or_out = true;
    }

    attribution
}

impl KpiBuckets {
    /// Add `count` to every bucket the label is attributed to.
    pub fn record(&mut self, label: Option<&str>, count: u64) {
        let attribution = classify(label);
        if attribution.in_service {
            self.in_service = self.in_service.saturating_add(count);
        }
        if attribution.in_stock {
            self.in_stock = self.in_stock.saturating_add(count);
        }
        if attribution.in_maintenance_or_out {
            self.in_maintenance_or_out = self.in_maintenance_or_out.saturating_add(count);
        }
    }
}

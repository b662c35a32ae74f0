//! Status normalization.
//!
//! Upstream equipment records carry free-text status labels typed by hand
//! (`"En service"`, `"EN SERVICE"`, `" hs "`, ...). [`normalize`] collapses
//! every label onto exactly one [`CanonicalStatus`] so that per-status counts
//! can be grouped reliably.
//!
//! Labels that match nothing in [`STATUS_SYNONYMS`] are kept as an opaque
//! passthrough value holding the cleaned text, so statuses introduced
//! upstream later still show up with their own name.

use std::collections::HashMap;
use std::fmt;

use anyhow::Result;
use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Canonical status
// ---------------------------------------------------------------------------

/// Canonical operational state of a piece of equipment.
///
/// Variant order is the display order used by the dashboard (status chart,
/// filter options): known statuses first, then [`Self::Inconnu`], then
/// passthrough values sorted alphabetically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CanonicalStatus {
    EnService,
    EnStock,
    EnInstance,
    EnPanne,
    HorsService,
    /// Missing or empty label.
    Inconnu,
    /// Cleaned (trimmed, uppercased) label that matched no synonym.
    Other(String),
}

impl CanonicalStatus {
    /// Stable code of the status (`EN_SERVICE`, ..., or the passthrough text).
    pub fn code(&self) -> &str {
        match self {
            Self::EnService => "EN_SERVICE",
            Self::EnStock => "EN_STOCK",
            Self::EnInstance => "EN_INSTANCE",
            Self::EnPanne => "EN_PANNE",
            Self::HorsService => "HORS_SERVICE",
            Self::Inconnu => "INCONNU",
            Self::Other(text) => text,
        }
    }

    /// Human-readable label shown in tables and chart legends.
    pub fn label(&self) -> &str {
        match self {
            Self::EnService => "EN SERVICE",
            Self::EnStock => "EN STOCK",
            Self::EnInstance => "EN INSTANCE",
            Self::EnPanne => "EN PANNE",
            Self::HorsService => "HORS SERVICE",
            Self::Inconnu => "INCONNU",
            Self::Other(text) => text,
        }
    }

    /// Whether the status came from the synonym table (or is `INCONNU`).
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for CanonicalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for CanonicalStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

// ---------------------------------------------------------------------------
// Synonym table
// ---------------------------------------------------------------------------

/// Cleaned label → canonical status.
///
/// Keys must already be trimmed and uppercased; [`validate_synonym_table`]
/// enforces this along with key uniqueness. The canonical codes map to
/// themselves so normalizing an already-normalized code is a no-op.
pub const STATUS_SYNONYMS: &[(&str, CanonicalStatus)] = &[
    // En service
    ("EN SERVICE", CanonicalStatus::EnService),
    ("EN SERVICE.", CanonicalStatus::EnService),
    ("EN_SERVICE", CanonicalStatus::EnService),
    // En stock
    ("EN STOCK", CanonicalStatus::EnStock),
    ("EN_STOCK", CanonicalStatus::EnStock),
    // En instance
    ("EN INSTANCE", CanonicalStatus::EnInstance),
    ("EN_INSTANCE", CanonicalStatus::EnInstance),
    // En panne
    ("EN PANNE", CanonicalStatus::EnPanne),
    ("EN_PANNE", CanonicalStatus::EnPanne),
    // Hors service
    ("HS", CanonicalStatus::HorsService),
    ("HORS SERVICE", CanonicalStatus::HorsService),
    ("HORS_SERVICE", CanonicalStatus::HorsService),
    // Inconnu
    ("INCONNU", CanonicalStatus::Inconnu),
];

/// Check [`STATUS_SYNONYMS`] for duplicate, conflicting or malformed keys.
pub fn validate_synonym_table() -> Result<()> {
    validate_table(STATUS_SYNONYMS)
}

fn validate_table(table: &[(&str, CanonicalStatus)]) -> Result<()> {
    let mut seen: HashMap<&str, &CanonicalStatus> = HashMap::new();

    for (key, status) in table {
        if clean_label(key) != *key {
            anyhow::bail!("synonym key {key:?} is not in cleaned form");
        }
        if !status.is_known() {
            anyhow::bail!("synonym key {key:?} maps to a passthrough status");
        }
        if let Some(previous) = seen.insert(*key, status) {
            if previous == status {
                anyhow::bail!("duplicate synonym key {key:?}");
            }
            anyhow::bail!(
                "conflicting synonym key {key:?}: {} vs {}",
                previous.code(),
                status.code()
            );
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Map a raw status label onto its canonical status.
///
/// Absent, empty and whitespace-only labels give [`CanonicalStatus::Inconnu`].
/// Otherwise the label is trimmed and uppercased and looked up in
/// [`STATUS_SYNONYMS`]; a miss returns the cleaned text as
/// [`CanonicalStatus::Other`].
pub fn normalize(label: Option<&str>) -> CanonicalStatus {
    let Some(label) = label else {
        return CanonicalStatus::Inconnu;
    };

    let cleaned = clean_label(label);
    if cleaned.is_empty() {
        return CanonicalStatus::Inconnu;
    }

    STATUS_SYNONYMS
        .iter()
        .find(|(key, _)| *key == cleaned)
        .map(|(_, status)| status.clone())
        .unwrap_or(CanonicalStatus::Other(cleaned))
}

fn clean_label(label: &str) -> String {
    label.trim().to_uppercase()
}

/// Normalize and deduplicate a list of raw labels for filter options.
///
/// Absent and empty labels are dropped. The result is in display order.
pub fn unique_normalized<'a, I>(labels: I) -> Vec<CanonicalStatus>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut statuses: Vec<CanonicalStatus> = labels
        .into_iter()
        .filter(|label| label.is_some_and(|l| !l.trim().is_empty()))
        .map(normalize)
        .collect();

    sort_for_display(&mut statuses);
    statuses.dedup();
    statuses
}

/// Sort statuses in display order: known statuses in enumeration order,
/// then passthrough statuses alphabetically.
pub fn sort_for_display(statuses: &mut [CanonicalStatus]) {
    statuses.sort();
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

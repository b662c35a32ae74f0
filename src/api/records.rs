//! Wire records returned by the inventory REST API.
//!
//! Upstream data is hand-entered and loosely typed, so every field is
//! optional and deserialized leniently: a value of the wrong JSON type reads
//! as absent instead of failing the whole response.

use chrono::DateTime;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::metrics::{Amount, MonthObservation, StatusObservation};

// ---------------------------------------------------------------------------
// Equipment records
// ---------------------------------------------------------------------------

/// One equipment as listed by `GET /equipments/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EquipmentRecord {
    #[serde(rename = "_id", deserialize_with = "lenient_key")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub model: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub serial: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub barcode: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub status: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub location: Option<String>,
    #[serde(deserialize_with = "lenient_amount")]
    pub price: Option<Amount>,
    #[serde(deserialize_with = "lenient_amount")]
    pub purchase_value: Option<Amount>,
    /// Older records carry the amount under `value`.
    #[serde(deserialize_with = "lenient_amount")]
    pub value: Option<Amount>,
    #[serde(deserialize_with = "lenient_text")]
    pub currency: Option<String>,
    #[serde(deserialize_with = "lenient_key")]
    pub creation_date: Option<String>,
}

impl EquipmentRecord {
    /// A single equipment counts once; its value is the purchase value,
    /// falling back to `value` and then the list price.
    pub fn to_status_observation(&self) -> StatusObservation {
        let value = self
            .purchase_value
            .as_ref()
            .or(self.value.as_ref())
            .or(self.price.as_ref())
            .cloned();

        StatusObservation {
            label: self.status.clone(),
            count: 1,
            value,
        }
    }

    pub fn to_month_observation(&self) -> MonthObservation {
        MonthObservation {
            date_key: self.creation_date.clone(),
            count: 1,
        }
    }
}

/// A page of `GET /equipments/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EquipmentPage {
    #[serde(deserialize_with = "lenient_count")]
    pub total: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub page: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub page_size: u64,
    pub results: Vec<EquipmentRecord>,
}

// ---------------------------------------------------------------------------
// Grouped counts
// ---------------------------------------------------------------------------

/// One `{ _id, count }` row of `GET /equipments/?group_by=<field>`.
///
/// `_id` is the grouped value: a status label, a location, or a creation
/// date depending on the field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupedCount {
    #[serde(rename = "_id", deserialize_with = "lenient_key")]
    pub key: Option<String>,
    #[serde(deserialize_with = "lenient_count")]
    pub count: u64,
}

impl GroupedCount {
    pub fn to_status_observation(&self) -> StatusObservation {
        StatusObservation {
            label: self.key.clone(),
            count: self.count,
            value: None,
        }
    }

    pub fn to_month_observation(&self) -> MonthObservation {
        MonthObservation {
            date_key: self.key.clone(),
            count: self.count,
        }
    }
}

// ---------------------------------------------------------------------------
// Status distribution
// ---------------------------------------------------------------------------

/// Envelope of `GET /analytics/status-distribution/`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatusDistributionResponse {
    pub success: bool,
    pub data: Option<StatusDistribution>,
    pub error: Option<String>,
}

/// Parallel arrays of labels, counts and values, one index per status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusDistribution {
    pub labels: Vec<Value>,
    pub counts: Vec<Value>,
    pub values: Vec<Value>,
}

impl StatusDistribution {
    /// Zip the arrays into observations. Missing counts and values read as
    /// zero / absent.
    pub fn observations(&self) -> Vec<StatusObservation> {
        self.labels
            .iter()
            .enumerate()
            .map(|(i, label)| StatusObservation {
                label: key_text(label),
                count: self.counts.get(i).map(count_value).unwrap_or(0),
                value: self.values.get(i).and_then(amount_from_value),
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Lenient value conversion
// ---------------------------------------------------------------------------

/// Text form of a grouping key: strings as is, numbers printed, Mongo
/// extended JSON (`{"$date": ...}`, `{"$oid": ...}`) unwrapped.
pub fn key_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => {
            if let Some(date) = map.get("$date") {
                return date_text(date);
            }
            map.get("$oid").and_then(key_text)
        }
        _ => None,
    }
}

/// `{"$date": "..."}` or `{"$date": {"$numberLong": "<millis>"}}` / millis.
fn date_text(value: &Value) -> Option<String> {
    let millis = match value {
        Value::String(s) => return Some(s.clone()),
        Value::Number(n) => n.as_i64()?,
        Value::Object(map) => map.get("$numberLong")?.as_str()?.parse().ok()?,
        _ => return None,
    };
    DateTime::from_timestamp_millis(millis).map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
}

fn count_value(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn amount_from_value(value: &Value) -> Option<Amount> {
    match value {
        Value::Number(n) => n.as_f64().map(Amount::Number),
        Value::String(s) => Some(Amount::Text(s.clone())),
        _ => None,
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_key<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(key_text(&value))
}

fn lenient_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Amount>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(amount_from_value(&value))
}

fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(count_value(&value))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equipment_record_tolerates_missing_and_mistyped_fields() {
        let json = r#"{"_id": "65a1", "status": 3, "price": true, "creation_date": null}"#;
        let record: EquipmentRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id.as_deref(), Some("65a1"));
        assert_eq!(record.status.as_deref(), Some("3"));
        assert!(record.price.is_none());
        assert!(record.creation_date.is_none());
        assert!(record.model.is_none());
    }

    #[test]
    fn equipment_value_prefers_purchase_value() {
        let json = r#"{"status": "En service", "price": "900", "purchase_value": 1200}"#;
        let record: EquipmentRecord = serde_json::from_str(json).unwrap();
        let obs = record.to_status_observation();
        assert_eq!(obs.count, 1);
        assert_eq!(obs.value, Some(Amount::Number(1200.0)));

        let json = r#"{"status": "En service", "price": "900"}"#;
        let record: EquipmentRecord = serde_json::from_str(json).unwrap();
        assert_eq!(
            record.to_status_observation().value,
            Some(Amount::Text("900".to_string()))
        );

        let json = r#"{"status": "HS", "price": 900, "value": "750,5"}"#;
        let record: EquipmentRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.to_status_observation().value.map(|v| v.value()), Some(750.5));
    }

    #[test]
    fn grouped_count_unwraps_mongo_dates() {
        let json = r#"[
            {"_id": "2024-01-05T00:00:00", "count": 4},
            {"_id": {"$date": "2024-02-01T00:00:00Z"}, "count": 2},
            {"_id": {"$date": {"$numberLong": "1704067200000"}}, "count": 1},
            {"_id": null, "count": 7}
        ]"#;
        let rows: Vec<GroupedCount> = serde_json::from_str(json).unwrap();
        assert_eq!(rows[0].key.as_deref(), Some("2024-01-05T00:00:00"));
        assert_eq!(rows[1].key.as_deref(), Some("2024-02-01T00:00:00Z"));
        assert_eq!(rows[2].key.as_deref(), Some("2024-01-01T00:00:00Z"));
        assert_eq!(rows[3].key, None);
        assert_eq!(rows[3].to_month_observation().count, 7);
    }

    #[test]
    fn grouped_count_defaults_missing_count() {
        let row: GroupedCount = serde_json::from_str(r#"{"_id": "HS"}"#).unwrap();
        assert_eq!(row.count, 0);
        assert_eq!(row.to_status_observation().label.as_deref(), Some("HS"));
    }

    #[test]
    fn distribution_zips_ragged_arrays() {
        let json = r#"{
            "labels": ["En service", null, "HS"],
            "counts": [10, 2],
            "values": [1500.5, "abc"]
        }"#;
        let dist: StatusDistribution = serde_json::from_str(json).unwrap();
        let obs = dist.observations();

        assert_eq!(obs.len(), 3);
        assert_eq!(obs[0].count, 10);
        assert_eq!(obs[0].value, Some(Amount::Number(1500.5)));
        assert_eq!(obs[1].label, None);
        assert_eq!(obs[1].value.as_ref().map(Amount::value), Some(0.0));
        assert_eq!(obs[2].count, 0);
        assert_eq!(obs[2].value, None);
    }

    #[test]
    fn distribution_envelope_reports_failure() {
        let json = r#"{"success": false, "error": "mongo down"}"#;
        let resp: StatusDistributionResponse = serde_json::from_str(json).unwrap();
        assert!(!resp.success);
        assert_eq!(resp.error.as_deref(), Some("mongo down"));
        assert!(resp.data.is_none());
    }
}

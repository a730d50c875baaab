//! Shared type definitions for STORECAST.
//!
//! These are the domain types exchanged between the transport client and the
//! dashboard. Wire-format quirks of the forecasting service (integer store
//! ids, `date`/`sales` field names, optional fields) are absorbed here so the
//! rest of the code never branches on "is this field missing".

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Placeholder label for the projected period when the service omits one.
pub const DEFAULT_NEXT_PERIOD_LABEL: &str = "Next";

/// Identifier of a store known to the forecasting service.
///
/// The service uses integer ids on the wire but STORECAST treats them as
/// opaque. Deserializes from a JSON number or string; serializes back as a
/// number when the id is numeric so request bodies match what the service
/// expects.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreId(String);

impl StoreId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StoreId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<i64> for StoreId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl Serialize for StoreId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Only emit a number when the textual form is canonical, so ids the
        // service issued as strings (e.g. "042") survive round trips.
        match self.0.parse::<i64>() {
            Ok(n) if n.to_string() == self.0 => serializer.serialize_i64(n),
            _ => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for StoreId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StoreIdVisitor;

        impl Visitor<'_> for StoreIdVisitor {
            type Value = StoreId;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a store id as a number or string")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<StoreId, E> {
                Ok(StoreId(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<StoreId, E> {
                Ok(StoreId(v.to_string()))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<StoreId, E> {
                Ok(StoreId(v.to_string()))
            }
        }

        deserializer.deserialize_any(StoreIdVisitor)
    }
}

/// A store available for forecasting.
///
/// Wire shape: `{ "value": 2327, "label": "Store 2327 - Milwaukee" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    #[serde(rename = "value")]
    pub id: StoreId,
    pub label: String,
}

/// One observed period of sales history.
///
/// Wire shape: `{ "date": "2024-07-01", "sales": 100.0 }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    #[serde(rename = "date")]
    pub period: String,
    #[serde(rename = "sales")]
    pub actual_value: f64,
}

/// Everything the forecast endpoint returns for one store, with optional
/// fields already normalized: absent history is an empty vec, absent stats is
/// `None`, absent label is [`DEFAULT_NEXT_PERIOD_LABEL`].
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastBundle {
    /// Projected value for the period following the history
    pub prediction: f64,
    /// Chronological sales history for the store
    pub history: Vec<HistoryPoint>,
    /// Auxiliary summary statistics, opaque to the dashboard
    pub stats: Option<serde_json::Value>,
    /// Label for the projected period
    pub next_period_label: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_store_id_from_number() {
        let store: Store = serde_json::from_value(json!({
            "value": 2327,
            "label": "Store 2327 - Milwaukee"
        }))
        .unwrap();
        assert_eq!(store.id, StoreId::from(2327));
        assert_eq!(store.id.as_str(), "2327");
    }

    #[test]
    fn test_store_id_from_string() {
        let id: StoreId = serde_json::from_value(json!("north-42")).unwrap();
        assert_eq!(id.as_str(), "north-42");
    }

    #[test]
    fn test_numeric_store_id_serializes_as_number() {
        let id = StoreId::from(17);
        assert_eq!(serde_json::to_value(&id).unwrap(), json!(17));
    }

    #[test]
    fn test_non_numeric_store_id_serializes_as_string() {
        let id = StoreId::from("north-42");
        assert_eq!(serde_json::to_value(&id).unwrap(), json!("north-42"));
    }

    #[test]
    fn test_zero_padded_store_id_round_trips_as_string() {
        // "042" is numeric but not canonical; rewriting it to 42 would lose
        // the id the service issued
        let id: StoreId = serde_json::from_value(json!("042")).unwrap();
        assert_eq!(serde_json::to_value(&id).unwrap(), json!("042"));
    }

    #[test]
    fn test_history_point_wire_names() {
        let point: HistoryPoint =
            serde_json::from_value(json!({ "date": "2024-07-01", "sales": 100.0 })).unwrap();
        assert_eq!(point.period, "2024-07-01");
        assert_eq!(point.actual_value, 100.0);
    }
}

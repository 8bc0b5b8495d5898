//! Canonical keyed series records returned by grouped reads.

use crate::{MeasureId, MemberId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One entry of a grouped series: a member key (or the aggregate sentinel)
/// and its aggregated value(s).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub key: MemberId,
    pub value: RecordValue,
}

/// Aggregated value of a record.
///
/// Single-measure reads yield `Scalar`; multi-measure reads yield
/// `PerMeasure` with exactly the requested measures. Only the key-to-value
/// association of the per-measure mapping is guaranteed, not its iteration
/// order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordValue {
    Scalar(f64),
    PerMeasure(BTreeMap<MeasureId, f64>),
}

impl RecordValue {
    /// The scalar value of a single-measure record.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            RecordValue::Scalar(v) => Some(*v),
            RecordValue::PerMeasure(_) => None,
        }
    }

    /// The value of one measure, regardless of record shape.
    ///
    /// For `Scalar` records the measure id is not recorded, so any id
    /// returns the scalar.
    pub fn measure(&self, measure: &str) -> Option<f64> {
        match self {
            RecordValue::Scalar(v) => Some(*v),
            RecordValue::PerMeasure(map) => map.get(measure).copied(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_accessors() {
        let value = RecordValue::Scalar(42.0);
        assert_eq!(value.as_scalar(), Some(42.0));
        assert_eq!(value.measure("anything"), Some(42.0));
    }

    #[test]
    fn test_per_measure_accessors() {
        let mut map = BTreeMap::new();
        map.insert("revenue".to_string(), 10.5);
        map.insert("count".to_string(), 3.0);
        let value = RecordValue::PerMeasure(map);

        assert_eq!(value.as_scalar(), None);
        assert_eq!(value.measure("revenue"), Some(10.5));
        assert_eq!(value.measure("count"), Some(3.0));
        assert_eq!(value.measure("missing"), None);
    }

    #[test]
    fn test_record_serializes_scalar_untagged() {
        let record = Record {
            key: "east".to_string(),
            value: RecordValue::Scalar(7.0),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["key"], "east");
        assert_eq!(json["value"], 7.0);
    }
}

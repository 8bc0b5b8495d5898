//! Result normalizer: shapes raw engine rows into the canonical keyed
//! series callers consume.

use cubefilter_core::{CubeResult, EngineError, MeasureId, Record, RecordValue, ALL_KEY};
use cubefilter_olap::Row;
use std::collections::BTreeMap;

/// Normalize raw rows for a read of `focus` with the requested measures.
///
/// The key of each record is taken from the row field named after the focus
/// dimension, or the `"_all"` sentinel field for aggregate reads. A single
/// requested measure yields scalar values; several yield a per-measure
/// mapping containing exactly the requested measures.
///
/// Records are sorted ascending by key (stable, so duplicate keys keep
/// their original row order; no deduplication is performed). Keys of
/// numeric type are compared through their string representation; the
/// upstream contract does not define a stronger ordering.
pub fn normalize(
    rows: Vec<Row>,
    focus: Option<&str>,
    measures: &[MeasureId],
) -> CubeResult<Vec<Record>> {
    let key_field = focus.unwrap_or(ALL_KEY);

    let mut records = Vec::with_capacity(rows.len());
    for row in &rows {
        let key = row
            .get(key_field)
            .map(key_string)
            .ok_or_else(|| EngineError::MalformedRow {
                field: key_field.to_string(),
            })?;

        let value = match measures {
            [measure] => RecordValue::Scalar(measure_value(row, measure)?),
            _ => {
                let mut map = BTreeMap::new();
                for measure in measures {
                    map.insert(measure.clone(), measure_value(row, measure)?);
                }
                RecordValue::PerMeasure(map)
            }
        };

        records.push(Record { key, value });
    }

    records.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(records)
}

fn key_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn measure_value(row: &Row, measure: &str) -> Result<f64, EngineError> {
    row.get(measure)
        .and_then(serde_json::Value::as_f64)
        .ok_or_else(|| EngineError::MalformedRow {
            field: measure.to_string(),
        })
}

// ============================================================================
// TESTS
// ============================================================================

//! Result cache: memoizes normalized series per (focus, measure set).
//!
//! Entries are derived data, fully determined by (metadata, filter state,
//! focus, measure set); consistency with the current filter state is
//! enforced by clearing the whole cache on any filter mutation, never by
//! partial invalidation.

use cubefilter_core::{MeasureId, Record};
use std::collections::HashMap;
use std::sync::Arc;

/// Canonical cache sub-key for a measure set: ids sorted lexically and
/// comma-joined, so `["a","b"]` and `["b","a"]` hit the same entry.
/// Duplicates are kept; pre-deduplication is the caller's business.
pub fn measure_set_key(measures: &[MeasureId]) -> String {
    let mut ids: Vec<&str> = measures.iter().map(String::as_str).collect();
    ids.sort_unstable();
    ids.join(",")
}

/// Two-level memo: focus key (dimension id or `"_all"`) to measure-set key
/// to the cached series.
///
/// Series are shared as `Arc`s: a hit hands back the same allocation, and
/// the read-only caller contract is structural rather than documented.
#[derive(Debug, Default)]
pub struct ResultCache {
    series: HashMap<String, HashMap<String, Arc<Vec<Record>>>>,
    generation: u64,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, focus_key: &str, measure_key: &str) -> Option<Arc<Vec<Record>>> {
        self.series.get(focus_key)?.get(measure_key).cloned()
    }

    pub fn insert(&mut self, focus_key: &str, measure_key: &str, records: Arc<Vec<Record>>) {
        self.series
            .entry(focus_key.to_string())
            .or_default()
            .insert(measure_key.to_string(), records);
    }

    /// Drop every cached entry for every focus and measure set.
    ///
    /// Bumps the generation so an in-flight read started before the
    /// invalidation can detect that its snapshot went stale and must not be
    /// stored.
    pub fn invalidate_all(&mut self) {
        self.series.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_empty(&self) -> bool {
        self.series.values().all(HashMap::is_empty)
    }
}

// ============================================================================
// TESTS
// ============================================================================

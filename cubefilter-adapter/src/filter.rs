//! Per-dimension filter state and slice resolution.
//!
//! The filter store maps each dimension to its currently active member set;
//! an absent entry means "unfiltered, use the full declared universe". It
//! performs no membership validation against the declared members; that is
//! a caller responsibility.
//!
//! Every mutating call obliges the owning adapter to invalidate the whole
//! result cache before the mutation returns: every cached series was
//! computed under the full joint filter state, so partial invalidation is
//! never sound.

use cubefilter_core::{DimensionId, DimensionSpec, MemberId};
use std::collections::HashMap;

/// Active filters, keyed by dimension id.
#[derive(Debug, Default)]
pub struct FilterStore {
    active: HashMap<DimensionId, Vec<MemberId>>,
}

impl FilterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the active filter for a dimension. An empty member list is
    /// treated as "no restriction" and clears the filter instead.
    pub fn set(&mut self, dimension: &str, members: Vec<MemberId>) {
        if members.is_empty() {
            self.clear(dimension);
        } else {
            self.active.insert(dimension.to_string(), members);
        }
    }

    /// Remove any restriction, reverting to the full declared universe.
    pub fn clear(&mut self, dimension: &str) {
        self.active.remove(dimension);
    }

    pub fn is_filtered(&self, dimension: &str) -> bool {
        self.active.contains_key(dimension)
    }

    /// The member set currently restricting a dimension: its active filter,
    /// or the full declared member list when unfiltered.
    pub fn slice<'a>(&'a self, dimension: &str, spec: &'a DimensionSpec) -> &'a [MemberId] {
        match self.active.get(dimension) {
            Some(members) => members,
            None => &spec.members,
        }
    }
}

/// Member set restricting `dimension` in a query focused on `focus`.
///
/// The focus dimension always gets its full declared member list so it can
/// see its own unfiltered distribution; every other dimension stays
/// restricted by its filter. Applied once per declared dimension per query.
pub fn resolve_slice<'a>(
    filters: &'a FilterStore,
    focus: Option<&str>,
    dimension: &str,
    spec: &'a DimensionSpec,
) -> &'a [MemberId] {
    if focus == Some(dimension) {
        &spec.members
    } else {
        filters.slice(dimension, spec)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn make_spec() -> DimensionSpec {
        DimensionSpec {
            hierarchy: "[Geo].[Region]".to_string(),
            level: 1,
            members: vec!["east".to_string(), "north".to_string(), "west".to_string()],
        }
    }

    #[test]
    fn test_unfiltered_slice_is_full_universe() {
        let filters = FilterStore::new();
        let spec = make_spec();
        assert_eq!(filters.slice("region", &spec), spec.members.as_slice());
        assert!(!filters.is_filtered("region"));
    }

    #[test]
    fn test_set_replaces_filter() {
        let mut filters = FilterStore::new();
        let spec = make_spec();

        filters.set("region", vec!["east".to_string()]);
        assert_eq!(filters.slice("region", &spec), ["east".to_string()]);

        filters.set("region", vec!["west".to_string()]);
        assert_eq!(filters.slice("region", &spec), ["west".to_string()]);
    }

    #[test]
    fn test_set_empty_clears() {
        let mut filters = FilterStore::new();
        filters.set("region", vec!["east".to_string()]);
        filters.set("region", Vec::new());
        assert!(!filters.is_filtered("region"));
    }

    #[test]
    fn test_clear_reverts_to_universe() {
        let mut filters = FilterStore::new();
        let spec = make_spec();
        filters.set("region", vec!["east".to_string()]);
        filters.clear("region");
        assert_eq!(filters.slice("region", &spec), spec.members.as_slice());
    }

    #[test]
    fn test_focus_dimension_is_never_self_filtered() {
        let mut filters = FilterStore::new();
        let spec = make_spec();
        filters.set("region", vec!["east".to_string()]);

        // Focused on itself: full universe despite the active filter.
        assert_eq!(
            resolve_slice(&filters, Some("region"), "region", &spec),
            spec.members.as_slice()
        );
        // Focused elsewhere: the filter applies.
        assert_eq!(
            resolve_slice(&filters, Some("product"), "region", &spec),
            ["east".to_string()]
        );
        // No focus at all: the filter applies too.
        assert_eq!(
            resolve_slice(&filters, None, "region", &spec),
            ["east".to_string()]
        );
    }
}

//! Per-dimension facade consumed by visualization code.
//!
//! A handle is a cheap clone over the shared adapter internals. Filter
//! mutations are synchronous: they mutate the filter store and invalidate
//! the whole result cache before returning, so no later read can observe a
//! stale series. Group reads go through the adapter's serialized query
//! pipeline.

use crate::AdapterShared;
use cubefilter_core::{CubeResult, DimensionId, MeasureId, MemberId, Record};
use std::sync::Arc;

/// Handle scoped to one declared dimension.
#[derive(Clone)]
pub struct DimensionHandle {
    shared: Arc<AdapterShared>,
    dimension: DimensionId,
}

impl std::fmt::Debug for DimensionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DimensionHandle")
            .field("dimension", &self.dimension)
            .finish_non_exhaustive()
    }
}

impl DimensionHandle {
    pub(crate) fn new(shared: Arc<AdapterShared>, dimension: DimensionId) -> Self {
        Self { shared, dimension }
    }

    /// The dimension id this handle is scoped to.
    pub fn id(&self) -> &str {
        &self.dimension
    }

    /// The declared member universe of this dimension.
    pub fn members(&self) -> &[MemberId] {
        self.shared
            .metadata
            .dimension(&self.dimension)
            .map(|spec| spec.members.as_slice())
            .unwrap_or(&[])
    }

    /// Whether a filter is currently active on this dimension.
    pub fn is_filtered(&self) -> CubeResult<bool> {
        self.shared.is_filtered(&self.dimension)
    }

    /// Replace this dimension's filter with the given member set.
    ///
    /// An empty set means "no restriction" and clears the filter. Members
    /// are not validated against the declared universe.
    pub fn filter_members(&self, members: Vec<MemberId>) -> CubeResult<()> {
        self.shared.set_filter(&self.dimension, members)
    }

    /// Restrict this dimension to a single member.
    pub fn filter_exact(&self, member: impl Into<MemberId>) -> CubeResult<()> {
        self.filter_members(vec![member.into()])
    }

    /// Restrict this dimension to the declared members falling in the
    /// half-open lexical range `[from, to)`.
    ///
    /// A range matching no declared member clears the filter, since an
    /// empty member set means "no restriction".
    pub fn filter_range(&self, from: &str, to: &str) -> CubeResult<()> {
        let members = self
            .members()
            .iter()
            .filter(|member| from <= member.as_str() && member.as_str() < to)
            .cloned()
            .collect();
        self.filter_members(members)
    }

    /// Clear any filter on this dimension.
    pub fn filter_all(&self) -> CubeResult<()> {
        self.shared.clear_filter(&self.dimension)
    }

    /// Grouped read: this dimension's series for the requested measures,
    /// diced along its hierarchy, honoring every other dimension's filter.
    pub async fn group(&self, measures: &[MeasureId]) -> CubeResult<Arc<Vec<Record>>> {
        self.shared.read(Some(&self.dimension), true, measures).await
    }

    /// Grouped read using the default (first declared) measure.
    pub async fn group_default(&self) -> CubeResult<Arc<Vec<Record>>> {
        self.group(&[]).await
    }
}

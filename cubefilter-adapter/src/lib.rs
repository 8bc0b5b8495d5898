//! CUBEFILTER Adapter - Query Translation and Result Caching
//!
//! Lets visualization code written against an in-memory multi-dimensional
//! filtering API transparently drive a remote OLAP cube. Callers slice and
//! filter by dimension member and read back aggregated (key, value) series;
//! the adapter translates each read into a clear/select/restrict/group/
//! execute pipeline against the remote engine and memoizes the normalized
//! series per (dimension, measure set), invalidating every memo whenever
//! any filter changes.
//!
//! ```ignore
//! let api: Arc<dyn OlapApi> = Arc::new(my_engine);
//! let adapter = CubeAdapter::new(metadata, api)?;
//!
//! let region = adapter.dimension("region")?;
//! let product = adapter.dimension("product")?;
//!
//! product.filter_exact("a")?;                       // invalidates all memos
//! let series = region.group_default().await?;       // one engine round-trip
//! let again = region.group_default().await?;        // cache hit, no round-trip
//! ```

mod cache;
mod dimension;
mod filter;
mod normalize;
mod query;

pub use dimension::DimensionHandle;
pub use query::QueryPlan;

use crate::cache::{measure_set_key, ResultCache};
use crate::filter::FilterStore;
use crate::normalize::normalize;
use cubefilter_core::{
    CubeMetadata, CubeResult, EngineError, MeasureId, MemberId, QueryError, Record, RecordValue,
    ALL_KEY,
};
use cubefilter_olap::OlapApi;
use std::sync::{Arc, Mutex};
use tracing::debug;

// ============================================================================
// CAPABILITIES
// ============================================================================

/// How values are aggregated.
///
/// The remote engine's aggregation function is fixed by contract and not
/// parameterizable through this adapter; custom reduction functions are
/// unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    EngineFixed,
}

// ============================================================================
// SHARED STATE
// ============================================================================

/// Mutable state owned by one adapter instance: the filter store and the
/// result cache, always mutated together under one lock.
#[derive(Debug, Default)]
struct AdapterState {
    filters: FilterStore,
    cache: ResultCache,
}

/// Internals shared between the adapter and its dimension handles.
pub(crate) struct AdapterShared {
    metadata: CubeMetadata,
    api: Arc<dyn OlapApi>,
    state: Mutex<AdapterState>,
    /// Serializes whole reset-to-execute pipelines: the engine accumulates
    /// query state between `clear()` and `execute()`, so two interleaved
    /// builds would corrupt each other's query.
    query_lock: tokio::sync::Mutex<()>,
}

impl AdapterShared {
    fn check_dimension(&self, dimension: &str) -> Result<(), QueryError> {
        if self.metadata.dimension(dimension).is_none() {
            return Err(QueryError::UnknownDimension {
                dimension: dimension.to_string(),
            });
        }
        Ok(())
    }

    pub(crate) fn is_filtered(&self, dimension: &str) -> CubeResult<bool> {
        let state = self.state.lock().map_err(|_| QueryError::LockPoisoned)?;
        Ok(state.filters.is_filtered(dimension))
    }

    /// Mutate one dimension's filter and invalidate every cached series
    /// before returning.
    pub(crate) fn set_filter(&self, dimension: &str, members: Vec<MemberId>) -> CubeResult<()> {
        self.check_dimension(dimension)?;
        let mut state = self.state.lock().map_err(|_| QueryError::LockPoisoned)?;
        state.filters.set(dimension, members);
        state.cache.invalidate_all();
        debug!(dimension, "filter changed, result cache invalidated");
        Ok(())
    }

    pub(crate) fn clear_filter(&self, dimension: &str) -> CubeResult<()> {
        self.check_dimension(dimension)?;
        let mut state = self.state.lock().map_err(|_| QueryError::LockPoisoned)?;
        state.filters.clear(dimension);
        state.cache.invalidate_all();
        debug!(dimension, "filter cleared, result cache invalidated");
        Ok(())
    }

    /// The cache-or-compute read path.
    pub(crate) async fn read(
        &self,
        focus: Option<&str>,
        dice: bool,
        measures: &[MeasureId],
    ) -> CubeResult<Arc<Vec<Record>>> {
        if let Some(dimension) = focus {
            self.check_dimension(dimension)?;
        }

        // No measures requested means the default (first declared) one;
        // metadata validation guarantees it exists.
        let measures: Vec<MeasureId> = if measures.is_empty() {
            self.metadata.measures.iter().take(1).cloned().collect()
        } else {
            measures.to_vec()
        };

        let focus_key = focus.unwrap_or(ALL_KEY);
        let measure_key = measure_set_key(&measures);

        // One pipeline at a time per adapter instance.
        let _pipeline = self.query_lock.lock().await;

        let (plan, generation) = {
            let state = self.state.lock().map_err(|_| QueryError::LockPoisoned)?;
            if let Some(series) = state.cache.get(focus_key, &measure_key) {
                debug!(focus = focus_key, measures = %measure_key, "result cache hit");
                return Ok(series);
            }
            (
                QueryPlan::build(&self.metadata, &state.filters, focus, dice, &measures)?,
                state.cache.generation(),
            )
        };

        debug!(focus = focus_key, measures = %measure_key, "result cache miss, querying engine");
        let rows = plan.run(self.api.as_ref()).await?;
        let records = Arc::new(normalize(rows, focus, &measures)?);

        let mut state = self.state.lock().map_err(|_| QueryError::LockPoisoned)?;
        if state.cache.generation() == generation {
            state
                .cache
                .insert(focus_key, &measure_key, Arc::clone(&records));
        } else {
            // A filter mutated while the query was in flight. The series
            // still answers the read as issued, but caching it would break
            // cache-filter consistency.
            debug!(focus = focus_key, "filters changed mid-query, series not cached");
        }
        Ok(records)
    }
}

// ============================================================================
// ADAPTER
// ============================================================================

/// Adapter presenting a remote OLAP cube behind a crossfilter-style
/// filtering API.
///
/// All mutable state (filter store, result cache) is owned by the instance;
/// nothing is shared globally across adapters.
pub struct CubeAdapter {
    shared: Arc<AdapterShared>,
}

impl std::fmt::Debug for CubeAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CubeAdapter").finish_non_exhaustive()
    }
}

impl CubeAdapter {
    /// Construct an adapter for a validated metadata document and a remote
    /// engine handle.
    ///
    /// Malformed metadata fails construction immediately; no partial
    /// instance is observable.
    pub fn new(metadata: CubeMetadata, api: Arc<dyn OlapApi>) -> CubeResult<Self> {
        metadata.validate()?;
        Ok(Self {
            shared: Arc::new(AdapterShared {
                metadata,
                api,
                state: Mutex::new(AdapterState::default()),
                query_lock: tokio::sync::Mutex::new(()),
            }),
        })
    }

    pub fn metadata(&self) -> &CubeMetadata {
        &self.shared.metadata
    }

    /// Theoretical unfiltered record count: the product of every declared
    /// member-list length. Independent of current filters.
    pub fn size(&self) -> u64 {
        self.shared.metadata.cardinality()
    }

    /// The aggregation capability of this adapter: fixed by the remote
    /// engine, never configurable per read.
    pub fn aggregation(&self) -> Aggregation {
        Aggregation::EngineFixed
    }

    /// Obtain the facade for one declared dimension.
    pub fn dimension(&self, id: &str) -> CubeResult<DimensionHandle> {
        self.shared.check_dimension(id)?;
        Ok(DimensionHandle::new(
            Arc::clone(&self.shared),
            id.to_string(),
        ))
    }

    /// Raw read: the cached (or freshly computed) series for a focus
    /// dimension and measure set. `focus = None` aggregates everything into
    /// a single record keyed by the `"_all"` sentinel.
    ///
    /// The cache is keyed by (focus, measure set) only; `dice` is not part
    /// of the key, so two reads for the same pair share one entry even if
    /// their `dice` flags differ. The dimension facade always dices its
    /// focused reads, so the flags never actually mix there.
    pub async fn read(
        &self,
        focus: Option<&str>,
        dice: bool,
        measures: &[MeasureId],
    ) -> CubeResult<Arc<Vec<Record>>> {
        self.shared.read(focus, dice, measures).await
    }

    /// Single aggregate value over the whole cube, honoring every current
    /// filter. Empty `measures` uses the default measure.
    pub async fn group_all(&self, measures: &[MeasureId]) -> CubeResult<RecordValue> {
        let records = self.shared.read(None, false, measures).await?;
        records
            .first()
            .map(|record| record.value.clone())
            .ok_or_else(|| EngineError::EmptyResult.into())
    }
}

// ============================================================================
// TESTS
// ============================================================================

//! CUBEFILTER OLAP - Remote Query Engine Contract
//!
//! Defines the primitive-operation interface a remote OLAP query engine
//! must implement for the adapter to drive it, plus an in-memory mock
//! engine used throughout the workspace's tests.
//!
//! A query is built engine-side by accumulating primitives between
//! `clear()` and `execute()`: select the cube, select each measure,
//! restrict every dimension along its hierarchy, optionally group by one
//! hierarchy. The engine's aggregation function is fixed and not
//! parameterizable through this contract.

mod memory;

pub use memory::{Cell, MemoryOlapApi};

use async_trait::async_trait;
use cubefilter_core::{CubeResult, MemberId};

// ============================================================================
// WIRE TYPES
// ============================================================================

/// One raw result row.
///
/// Contains, for the grouped dimension (or the `"_all"` sentinel when the
/// query aggregates everything), the member identifier as a field, plus one
/// numeric field per selected measure.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// A primitive query-building operation, in wire order.
///
/// Keeping the plan as data lets the adapter build and inspect a full
/// operation sequence before anything reaches the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineOp {
    /// Reset any pending query state.
    Clear,
    /// Select the cube to query.
    SelectCube(String),
    /// Select one measure; additive across calls.
    SelectMeasure(String),
    /// Restrict one hierarchy to a member set.
    RestrictDimension {
        hierarchy: String,
        members: Vec<MemberId>,
    },
    /// Break out results along the given hierarchies.
    GroupBy(Vec<String>),
}

impl EngineOp {
    /// Apply this primitive to an engine.
    pub async fn apply(&self, api: &dyn OlapApi) -> CubeResult<()> {
        match self {
            EngineOp::Clear => api.clear().await,
            EngineOp::SelectCube(cube) => api.select_cube(cube).await,
            EngineOp::SelectMeasure(measure) => api.select_measure(measure).await,
            EngineOp::RestrictDimension { hierarchy, members } => {
                api.restrict_dimension(hierarchy, members).await
            }
            EngineOp::GroupBy(hierarchies) => api.group_by(hierarchies).await,
        }
    }
}

// ============================================================================
// ENGINE TRAIT
// ============================================================================

/// Remote OLAP query engine contract.
///
/// Implementations own their transport (HTTP, in-process, ...) and their
/// timeout/cancellation policy. The engine holds mutable query state
/// between `clear()` and `execute()`, so callers must not interleave two
/// query builds; the adapter serializes whole pipelines per instance.
#[async_trait]
pub trait OlapApi: Send + Sync {
    /// Reset any pending query state.
    async fn clear(&self) -> CubeResult<()>;

    /// Select the cube to query.
    async fn select_cube(&self, cube: &str) -> CubeResult<()>;

    /// Select a measure. Called once per requested measure, additive.
    async fn select_measure(&self, measure: &str) -> CubeResult<()>;

    /// Restrict one hierarchy to the given member set. Called once per
    /// declared dimension per query.
    async fn restrict_dimension(&self, hierarchy: &str, members: &[MemberId]) -> CubeResult<()>;

    /// Break out results along the given hierarchies. Only called when
    /// dicing; the list then contains exactly the focus dimension's
    /// hierarchy.
    async fn group_by(&self, hierarchies: &[String]) -> CubeResult<()>;

    /// Run the accumulated query and return its rows.
    async fn execute(&self) -> CubeResult<Vec<Row>>;
}

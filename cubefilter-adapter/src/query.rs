//! Query builder: translates a read request into an ordered sequence of
//! engine primitives.
//!
//! The plan is built entirely before anything reaches the engine, so a
//! precondition failure (unknown focus dimension) costs no engine calls and
//! the exact wire sequence can be inspected in tests.

use crate::filter::{resolve_slice, FilterStore};
use cubefilter_core::{CubeMetadata, CubeResult, MeasureId, QueryError};
use cubefilter_olap::{EngineOp, OlapApi, Row};

/// An ordered primitive-operation sequence, ending in an implicit execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    steps: Vec<EngineOp>,
}

impl QueryPlan {
    /// Build the plan for one read.
    ///
    /// Sequence: clear, select the configured cube, select each requested
    /// measure in the order supplied (duplicates are not deduplicated),
    /// restrict every declared dimension along its hierarchy to the slice
    /// resolved for the current focus, then group by the focus dimension's
    /// hierarchy when dicing.
    ///
    /// A non-null focus absent from the declared dimensions is a caller
    /// error and fails with `UnknownDimension` before any engine call.
    pub fn build(
        metadata: &CubeMetadata,
        filters: &FilterStore,
        focus: Option<&str>,
        dice: bool,
        measures: &[MeasureId],
    ) -> Result<Self, QueryError> {
        let focus_spec = match focus {
            Some(dimension) => Some(metadata.dimension(dimension).ok_or_else(|| {
                QueryError::UnknownDimension {
                    dimension: dimension.to_string(),
                }
            })?),
            None => None,
        };

        let mut steps = Vec::with_capacity(3 + measures.len() + metadata.dimensions.len());
        steps.push(EngineOp::Clear);
        steps.push(EngineOp::SelectCube(metadata.cube.clone()));
        for measure in measures {
            steps.push(EngineOp::SelectMeasure(measure.clone()));
        }

        // BTreeMap iteration keeps the restriction order deterministic.
        for (dimension, spec) in &metadata.dimensions {
            steps.push(EngineOp::RestrictDimension {
                hierarchy: spec.hierarchy.clone(),
                members: resolve_slice(filters, focus, dimension, spec).to_vec(),
            });
        }

        if let Some(spec) = focus_spec {
            if dice {
                steps.push(EngineOp::GroupBy(vec![spec.hierarchy.clone()]));
            }
        }

        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[EngineOp] {
        &self.steps
    }

    /// Apply every primitive in order, then execute.
    ///
    /// Engine errors are propagated unmodified; the caller decides whether
    /// to retry, the plan does not.
    pub async fn run(&self, api: &dyn OlapApi) -> CubeResult<Vec<Row>> {
        for step in &self.steps {
            step.apply(api).await?;
        }
        api.execute().await
    }
}

// ============================================================================
// TESTS
// ============================================================================

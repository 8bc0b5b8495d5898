//! In-memory OLAP engine for tests.
//!
//! Holds a small dataset of cells and answers the primitive-op protocol the
//! way a real engine would: query state accumulates between `clear()` and
//! `execute()`, and `execute()` sums measure values over matching cells,
//! per group when grouping is requested.
//!
//! The engine also records every primitive call and counts executions so
//! tests can assert on the exact wire sequence, and supports one-shot
//! failure injection for error-path tests.

use crate::{EngineOp, OlapApi, Row};
use async_trait::async_trait;
use cubefilter_core::{CubeResult, EngineError, MeasureId, MemberId, ALL_KEY};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

/// One cell of the backing dataset: a coordinate per row field plus the
/// measure values stored at that coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub coordinates: HashMap<String, MemberId>,
    pub values: HashMap<MeasureId, f64>,
}

impl Cell {
    pub fn new(
        coordinates: &[(&str, &str)],
        values: &[(&str, f64)],
    ) -> Self {
        Self {
            coordinates: coordinates
                .iter()
                .map(|(field, member)| (field.to_string(), member.to_string()))
                .collect(),
            values: values
                .iter()
                .map(|(measure, value)| (measure.to_string(), *value))
                .collect(),
        }
    }
}

/// Pending query state, reset by `clear()`.
#[derive(Debug, Default)]
struct PendingQuery {
    cube: Option<String>,
    measures: Vec<MeasureId>,
    /// Restrictions keyed by row field, already translated from hierarchy.
    restrictions: HashMap<String, HashSet<MemberId>>,
    group_field: Option<String>,
}

#[derive(Debug, Default)]
struct Inner {
    pending: PendingQuery,
    ops: Vec<EngineOp>,
    execute_calls: usize,
    fail_next_execute: Option<String>,
}

/// In-memory mock engine.
///
/// Dimensions are registered as (hierarchy id, row field) pairs because
/// primitives address dimensions by hierarchy while result rows echo the
/// member under the row field; real deployments keep the row field equal to
/// the adapter's dimension id.
#[derive(Debug)]
pub struct MemoryOlapApi {
    cube: String,
    /// hierarchy id -> row field
    fields: HashMap<String, String>,
    cells: Vec<Cell>,
    inner: Mutex<Inner>,
}

impl MemoryOlapApi {
    pub fn new(cube: impl Into<String>) -> Self {
        Self {
            cube: cube.into(),
            fields: HashMap::new(),
            cells: Vec::new(),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Register a dimension: queries restrict/group it by `hierarchy`, and
    /// result rows echo its member under `field`.
    pub fn with_dimension(
        mut self,
        hierarchy: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        self.fields.insert(hierarchy.into(), field.into());
        self
    }

    /// Add one dataset cell.
    pub fn with_cell(mut self, cell: Cell) -> Self {
        self.cells.push(cell);
        self
    }

    /// Snapshot of every primitive call made so far, in order.
    pub fn ops(&self) -> Vec<EngineOp> {
        self.inner.lock().unwrap().ops.clone()
    }

    /// Number of `execute()` calls made so far.
    pub fn execute_calls(&self) -> usize {
        self.inner.lock().unwrap().execute_calls
    }

    /// Make the next `execute()` fail with the given message.
    pub fn fail_next_execute(&self, message: impl Into<String>) {
        self.inner.lock().unwrap().fail_next_execute = Some(message.into());
    }

    fn field_for(&self, hierarchy: &str) -> Result<&str, EngineError> {
        self.fields
            .get(hierarchy)
            .map(String::as_str)
            .ok_or_else(|| EngineError::RequestFailed {
                op: "restrict-dimension".to_string(),
                message: format!("unknown hierarchy: {}", hierarchy),
            })
    }

    fn cell_matches(cell: &Cell, restrictions: &HashMap<String, HashSet<MemberId>>) -> bool {
        restrictions.iter().all(|(field, allowed)| {
            cell.coordinates
                .get(field)
                .is_some_and(|member| allowed.contains(member))
        })
    }

    fn sum_rows(&self, pending: &PendingQuery) -> Vec<Row> {
        let matching: Vec<&Cell> = self
            .cells
            .iter()
            .filter(|cell| Self::cell_matches(cell, &pending.restrictions))
            .collect();

        // BTreeMap keeps grouped output deterministic across runs.
        let mut groups: BTreeMap<String, Vec<&Cell>> = BTreeMap::new();
        match &pending.group_field {
            Some(field) => {
                for cell in matching {
                    if let Some(member) = cell.coordinates.get(field) {
                        groups.entry(member.clone()).or_default().push(cell);
                    }
                }
            }
            None => {
                groups.insert(ALL_KEY.to_string(), matching);
            }
        }

        let key_field = pending.group_field.as_deref().unwrap_or(ALL_KEY);
        groups
            .into_iter()
            .map(|(member, cells)| {
                let mut row = Row::new();
                row.insert(key_field.to_string(), serde_json::Value::from(member));
                for measure in &pending.measures {
                    let sum: f64 = cells
                        .iter()
                        .map(|cell| cell.values.get(measure).copied().unwrap_or(0.0))
                        .sum();
                    row.insert(measure.clone(), serde_json::Value::from(sum));
                }
                row
            })
            .collect()
    }
}

#[async_trait]
impl OlapApi for MemoryOlapApi {
    async fn clear(&self) -> CubeResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.pending = PendingQuery::default();
        inner.ops.push(EngineOp::Clear);
        Ok(())
    }

    async fn select_cube(&self, cube: &str) -> CubeResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.pending.cube = Some(cube.to_string());
        inner.ops.push(EngineOp::SelectCube(cube.to_string()));
        Ok(())
    }

    async fn select_measure(&self, measure: &str) -> CubeResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.pending.measures.push(measure.to_string());
        inner.ops.push(EngineOp::SelectMeasure(measure.to_string()));
        Ok(())
    }

    async fn restrict_dimension(&self, hierarchy: &str, members: &[MemberId]) -> CubeResult<()> {
        let field = self.field_for(hierarchy)?;
        let mut inner = self.inner.lock().unwrap();
        inner
            .pending
            .restrictions
            .insert(field.to_string(), members.iter().cloned().collect());
        inner.ops.push(EngineOp::RestrictDimension {
            hierarchy: hierarchy.to_string(),
            members: members.to_vec(),
        });
        Ok(())
    }

    async fn group_by(&self, hierarchies: &[String]) -> CubeResult<()> {
        let [hierarchy] = hierarchies else {
            return Err(EngineError::RequestFailed {
                op: "group-by".to_string(),
                message: format!("expected exactly one hierarchy, got {}", hierarchies.len()),
            }
            .into());
        };
        let field = self.field_for(hierarchy).map_err(|_| EngineError::RequestFailed {
            op: "group-by".to_string(),
            message: format!("unknown hierarchy: {}", hierarchy),
        })?;
        let mut inner = self.inner.lock().unwrap();
        inner.pending.group_field = Some(field.to_string());
        inner.ops.push(EngineOp::GroupBy(hierarchies.to_vec()));
        Ok(())
    }

    async fn execute(&self) -> CubeResult<Vec<Row>> {
        let mut inner = self.inner.lock().unwrap();
        inner.execute_calls += 1;

        if let Some(message) = inner.fail_next_execute.take() {
            return Err(EngineError::RequestFailed {
                op: "execute".to_string(),
                message,
            }
            .into());
        }

        match &inner.pending.cube {
            Some(cube) if *cube == self.cube => {}
            Some(cube) => {
                return Err(EngineError::RequestFailed {
                    op: "execute".to_string(),
                    message: format!("unknown cube: {}", cube),
                }
                .into());
            }
            None => {
                return Err(EngineError::RequestFailed {
                    op: "execute".to_string(),
                    message: "no cube selected".to_string(),
                }
                .into());
            }
        }

        Ok(self.sum_rows(&inner.pending))
    }
}

// ============================================================================
// TESTS
// ============================================================================

//! CUBEFILTER Core - Data Types
//!
//! Pure data structures with no behavior beyond construction-time
//! validation. The adapter and engine crates both depend on this.

mod error;
mod metadata;
mod record;

pub use error::{CubeError, CubeResult, EngineError, MetadataError, QueryError};
pub use metadata::{CubeMetadata, DimensionSpec};
pub use record::{Record, RecordValue};

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Identifier of a dimension, as declared in the metadata document.
///
/// The wire contract couples this identifier to the field name the remote
/// engine echoes back per result row, so it is both a configuration key and
/// a row-field name.
pub type DimensionId = String;

/// Identifier of a measure (a named numeric quantity aggregated per query).
pub type MeasureId = String;

/// Identifier of a dimension member.
pub type MemberId = String;

/// Synthetic key used when no dimension is focused: the engine returns a
/// single aggregate row carrying this field instead of a dimension field.
pub const ALL_KEY: &str = "_all";

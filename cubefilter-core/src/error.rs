//! Error types for cubefilter operations

use thiserror::Error;

/// Metadata validation errors, raised at adapter construction.
///
/// A failed validation is fatal: no adapter instance is produced and no
/// partial construction is observable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MetadataError {
    #[error("Metadata field is missing or empty: {field}")]
    EmptyField { field: &'static str },

    #[error("Metadata declares no dimensions")]
    NoDimensions,

    #[error("Metadata declares no measures")]
    NoMeasures,

    #[error("Dimension {dimension} declares no members")]
    NoMembers { dimension: String },

    #[error("Dimension {dimension} has an empty hierarchy id")]
    EmptyHierarchy { dimension: String },
}

/// Query-time errors raised before any engine call is made.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Unknown dimension: {dimension}")]
    UnknownDimension { dimension: String },

    #[error("Adapter state lock poisoned")]
    LockPoisoned,
}

/// Remote query engine errors.
///
/// Engine failures are propagated unmodified to the caller of the read
/// operation: no retry, no partial caching.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("Engine call {op} failed: {message}")]
    RequestFailed { op: String, message: String },

    #[error("Engine row is missing field {field}")]
    MalformedRow { field: String },

    #[error("Engine returned no rows for an aggregate read")]
    EmptyResult,
}

/// Master error type for all cubefilter operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CubeError {
    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Result type alias for cubefilter operations.
pub type CubeResult<T> = Result<T, CubeError>;

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_error_display_empty_field() {
        let err = MetadataError::EmptyField { field: "cube" };
        let msg = format!("{}", err);
        assert!(msg.contains("missing or empty"));
        assert!(msg.contains("cube"));
    }

    #[test]
    fn test_metadata_error_display_no_members() {
        let err = MetadataError::NoMembers {
            dimension: "region".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("region"));
        assert!(msg.contains("no members"));
    }

    #[test]
    fn test_query_error_display_unknown_dimension() {
        let err = QueryError::UnknownDimension {
            dimension: "country".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Unknown dimension"));
        assert!(msg.contains("country"));
    }

    #[test]
    fn test_query_error_display_lock_poisoned() {
        let err = QueryError::LockPoisoned;
        let msg = format!("{}", err);
        assert!(msg.contains("lock poisoned"));
    }

    #[test]
    fn test_engine_error_display_request_failed() {
        let err = EngineError::RequestFailed {
            op: "execute".to_string(),
            message: "connection reset".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("execute"));
        assert!(msg.contains("connection reset"));
    }

    #[test]
    fn test_engine_error_display_malformed_row() {
        let err = EngineError::MalformedRow {
            field: "revenue".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("missing field"));
        assert!(msg.contains("revenue"));
    }

    #[test]
    fn test_cube_error_from_variants() {
        let metadata = CubeError::from(MetadataError::NoDimensions);
        assert!(matches!(metadata, CubeError::Metadata(_)));

        let query = CubeError::from(QueryError::UnknownDimension {
            dimension: "x".to_string(),
        });
        assert!(matches!(query, CubeError::Query(_)));

        let engine = CubeError::from(EngineError::EmptyResult);
        assert!(matches!(engine, CubeError::Engine(_)));
    }
}

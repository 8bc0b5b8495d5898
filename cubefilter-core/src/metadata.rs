//! Cube metadata document and construction-time validation.
//!
//! Metadata describes the remote cube to query: schema and cube identity,
//! the declared measures, and each dimension's hierarchy, level, and full
//! member universe. It is immutable after adapter construction.

use crate::error::MetadataError;
use crate::{DimensionId, MeasureId, MemberId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Declaration of a single dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionSpec {
    /// Hierarchy id used when restricting or grouping this dimension.
    pub hierarchy: String,
    /// Level within the hierarchy.
    pub level: u32,
    /// All distinct member identifiers: the unfiltered universe.
    pub members: Vec<MemberId>,
}

/// Metadata document describing the cube we will query.
///
/// The remote engine handle is deliberately NOT part of this document; a
/// collaborator is not serializable state and is passed to the adapter
/// constructor separately.
///
/// Dimensions are kept in a `BTreeMap` so that every query restricts them
/// in the same deterministic order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CubeMetadata {
    pub schema: String,
    pub cube: String,
    /// Declared measures, in order; the first one is the default.
    pub measures: Vec<MeasureId>,
    pub dimensions: BTreeMap<DimensionId, DimensionSpec>,
}

impl CubeMetadata {
    /// Validate the document shape.
    ///
    /// Returns the specific missing or invalid field rather than a generic
    /// failure, so construction errors are actionable.
    pub fn validate(&self) -> Result<(), MetadataError> {
        if self.schema.is_empty() {
            return Err(MetadataError::EmptyField { field: "schema" });
        }
        if self.cube.is_empty() {
            return Err(MetadataError::EmptyField { field: "cube" });
        }
        if self.measures.is_empty() {
            return Err(MetadataError::NoMeasures);
        }
        if self.dimensions.is_empty() {
            return Err(MetadataError::NoDimensions);
        }
        for (id, spec) in &self.dimensions {
            if spec.hierarchy.is_empty() {
                return Err(MetadataError::EmptyHierarchy {
                    dimension: id.clone(),
                });
            }
            if spec.members.is_empty() {
                return Err(MetadataError::NoMembers {
                    dimension: id.clone(),
                });
            }
        }
        Ok(())
    }

    /// The default measure: first in declaration order.
    ///
    /// Callers must only invoke this on validated metadata.
    pub fn default_measure(&self) -> Option<&MeasureId> {
        self.measures.first()
    }

    /// Look up a declared dimension.
    pub fn dimension(&self, id: &str) -> Option<&DimensionSpec> {
        self.dimensions.get(id)
    }

    /// Theoretical unfiltered record count: the product of every declared
    /// member-list length. Independent of any active filters.
    pub fn cardinality(&self) -> u64 {
        self.dimensions
            .values()
            .fold(1u64, |acc, spec| acc.saturating_mul(spec.members.len() as u64))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn make_metadata() -> CubeMetadata {
        let mut dimensions = BTreeMap::new();
        dimensions.insert(
            "region".to_string(),
            DimensionSpec {
                hierarchy: "[Geo].[Region]".to_string(),
                level: 1,
                members: vec!["east".to_string(), "west".to_string()],
            },
        );
        dimensions.insert(
            "product".to_string(),
            DimensionSpec {
                hierarchy: "[Product].[Line]".to_string(),
                level: 2,
                members: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            },
        );
        CubeMetadata {
            schema: "sales".to_string(),
            cube: "orders".to_string(),
            measures: vec!["revenue".to_string(), "count".to_string()],
            dimensions,
        }
    }

    #[test]
    fn test_validate_accepts_well_formed_metadata() {
        assert!(make_metadata().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_schema() {
        let mut metadata = make_metadata();
        metadata.schema.clear();
        assert_eq!(
            metadata.validate(),
            Err(MetadataError::EmptyField { field: "schema" })
        );
    }

    #[test]
    fn test_validate_rejects_empty_cube() {
        let mut metadata = make_metadata();
        metadata.cube.clear();
        assert_eq!(
            metadata.validate(),
            Err(MetadataError::EmptyField { field: "cube" })
        );
    }

    #[test]
    fn test_validate_rejects_no_measures() {
        let mut metadata = make_metadata();
        metadata.measures.clear();
        assert_eq!(metadata.validate(), Err(MetadataError::NoMeasures));
    }

    #[test]
    fn test_validate_rejects_no_dimensions() {
        let mut metadata = make_metadata();
        metadata.dimensions.clear();
        assert_eq!(metadata.validate(), Err(MetadataError::NoDimensions));
    }

    #[test]
    fn test_validate_rejects_memberless_dimension() {
        let mut metadata = make_metadata();
        metadata
            .dimensions
            .get_mut("product")
            .unwrap()
            .members
            .clear();
        assert_eq!(
            metadata.validate(),
            Err(MetadataError::NoMembers {
                dimension: "product".to_string()
            })
        );
    }

    #[test]
    fn test_validate_rejects_empty_hierarchy() {
        let mut metadata = make_metadata();
        metadata
            .dimensions
            .get_mut("region")
            .unwrap()
            .hierarchy
            .clear();
        assert_eq!(
            metadata.validate(),
            Err(MetadataError::EmptyHierarchy {
                dimension: "region".to_string()
            })
        );
    }

    #[test]
    fn test_cardinality_is_member_count_product() {
        // 2 regions x 3 products
        assert_eq!(make_metadata().cardinality(), 6);
    }

    #[test]
    fn test_default_measure_is_first_declared() {
        assert_eq!(
            make_metadata().default_measure(),
            Some(&"revenue".to_string())
        );
    }

    #[test]
    fn test_metadata_json_round_trip() {
        let metadata = make_metadata();
        let json = serde_json::to_string(&metadata).unwrap();
        let back: CubeMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back, metadata);
    }

    fn arb_members() -> impl Strategy<Value = Vec<MemberId>> {
        prop::collection::vec("[a-z]{1,6}", 1..8)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// For any metadata with at least one dimension and one measure,
        /// validation succeeds and cardinality equals the product of the
        /// declared member-list lengths.
        #[test]
        fn prop_cardinality_matches_member_product(
            member_lists in prop::collection::vec(arb_members(), 1..5),
        ) {
            let mut dimensions = BTreeMap::new();
            let mut expected = 1u64;
            for (i, members) in member_lists.into_iter().enumerate() {
                expected = expected.saturating_mul(members.len() as u64);
                dimensions.insert(
                    format!("dim{}", i),
                    DimensionSpec {
                        hierarchy: format!("[H{}]", i),
                        level: 1,
                        members,
                    },
                );
            }
            let metadata = CubeMetadata {
                schema: "s".to_string(),
                cube: "c".to_string(),
                measures: vec!["m".to_string()],
                dimensions,
            };

            prop_assert!(metadata.validate().is_ok());
            prop_assert_eq!(metadata.cardinality(), expected);
        }
    }
}

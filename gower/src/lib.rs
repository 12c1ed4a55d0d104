//! Gower dissimilarity core for records with mixed numeric and categorical
//! attributes. Covers attribute schemas, range normalization, the distance
//! itself, the all-pairs distance table and mean/mode imputation.

pub mod distance;
pub mod error;
pub mod impute;
pub mod normalize;
pub mod schema;
pub mod table;

#[cfg(test)]
pub(crate) mod testutil;

pub use distance::{MissingPolicy, gower_distance};
pub use error::Error;
pub use impute::{ImputeSummary, impute_missing};
pub use normalize::{FeatureRanges, compute_ranges};
pub use schema::{Attribute, FeatureSchema, SchemaConfig};
pub use table::{DistanceKey, DistanceTable, build_distance_table};

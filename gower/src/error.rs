//! Error taxonomy for schema construction, argument validation and distance
//! lookups.

use thiserror::Error as ThisError;

/// Failure modes of the distance and clustering pipeline.
///
/// Schema and argument problems surface before any computation starts. A
/// missing distance lookup means the table was built over a different record
/// set than the one being clustered; it is an internal invariant violation
/// and never gets a default value.
#[derive(Debug, ThisError)]
pub enum Error {
    /// The configured identity attribute is not declared on the record type.
    #[error("identity attribute `{0}` is not declared on the record type")]
    IdentityNotFound(String),

    /// A control attribute (cluster label or center flag) is absent or has
    /// the wrong kind.
    #[error("control attribute `{0}` is missing or has the wrong kind")]
    ControlAttribute(String),

    /// An explicitly named categorical feature is not declared at all.
    #[error("categorical feature `{0}` is not declared on the record type")]
    UnknownCategorical(String),

    /// An explicitly named categorical feature is not integer-valued.
    #[error("attribute `{0}` cannot be categorical: it is not integer-valued")]
    CategoricalKind(String),

    /// Nothing is left to compare once control attributes are excluded.
    #[error("no usable features remain after excluding control attributes")]
    NoFeatures,

    /// The dataset holds no records.
    #[error("dataset contains no records")]
    EmptyDataset,

    /// The requested cluster count is outside `1..=n`.
    #[error("cluster count {k} is invalid for {n} records")]
    InvalidClusterCount { k: usize, n: usize },

    /// The iteration cap must be at least one.
    #[error("max_iterations must be positive")]
    InvalidIterations,

    /// Two records share one identity; the pair table would silently
    /// overwrite entries.
    #[error("duplicate record identity `{0}`")]
    DuplicateIdentity(String),

    /// A distance lookup for a pair outside the build set.
    #[error("no stored distance for pair ({a}, {b})")]
    MissingDistance { a: String, b: String },
}

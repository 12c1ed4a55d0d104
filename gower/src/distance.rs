//! The Gower dissimilarity between two records of one schema.

use crate::normalize::FeatureRanges;
use crate::schema::FeatureSchema;

/// How categorical comparison treats missing values.
///
/// The sentinel variant reproduces datasets where an absent value defaults
/// to a fixed code before comparison, which makes a missing value equal to a
/// present sentinel-valued one. One policy applies to a whole run; the pair
/// table and the direct distance must be given the same one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MissingPolicy {
    /// A missing value reads as the given code before comparison.
    Sentinel(i64),
    /// Two missing values compare equal; missing never equals present.
    Equal,
    /// A missing value matches nothing, not even another missing value.
    Mismatch,
}

impl Default for MissingPolicy {
    fn default() -> Self {
        MissingPolicy::Equal
    }
}

impl MissingPolicy {
    /// Categorical contribution for one feature pair: 0.0 on match, 1.0 on
    /// mismatch.
    pub fn mismatch(self, a: Option<i64>, b: Option<i64>) -> f64 {
        let same = match self {
            MissingPolicy::Sentinel(code) => a.unwrap_or(code) == b.unwrap_or(code),
            MissingPolicy::Equal => a == b,
            MissingPolicy::Mismatch => matches!((a, b), (Some(x), Some(y)) if x == y),
        };
        if same { 0.0 } else { 1.0 }
    }
}

/// Gower distance between two records: range-normalized absolute differences
/// over the numeric features plus equality mismatches over the categorical
/// features, averaged over the total feature count. Stays in [0, 1] for
/// values inside the scanned ranges. A missing numeric value reads as raw
/// 0.0.
///
/// Pure and safe to call from worker threads; every input is read-only.
pub fn gower_distance<T>(
    a: &T,
    b: &T,
    schema: &FeatureSchema<T>,
    ranges: &FeatureRanges,
    policy: MissingPolicy,
) -> f64 {
    let mut sum = 0.0;
    for (feature_idx, feature) in schema.numeric().iter().enumerate() {
        let va = feature.value(a).unwrap_or(0.0);
        let vb = feature.value(b).unwrap_or(0.0);
        sum += (va - vb).abs() / ranges.get(feature_idx).span;
    }
    for feature in schema.categorical() {
        sum += policy.mismatch(feature.value(a), feature.value(b));
    }
    sum / schema.dimension() as f64
}

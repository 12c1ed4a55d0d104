//! Per-feature min/max scanning and range derivation for the numeric part
//! of the distance.

use crate::schema::FeatureSchema;

/// Spans at or below this are treated as degenerate (constant feature).
pub const RANGE_EPSILON: f64 = 1e-8;

/// Observed bounds and divisor for one numeric feature.
#[derive(Clone, Copy, Debug)]
pub struct FeatureRange {
    pub min: f64,
    pub max: f64,
    /// `max - min`, floored to 1.0 when the feature is constant so the
    /// normalized difference never divides by zero.
    pub span: f64,
}

/// Ranges for every numeric feature of a schema, in feature order.
#[derive(Clone, Debug)]
pub struct FeatureRanges(Vec<FeatureRange>);

impl FeatureRanges {
    pub fn get(&self, feature: usize) -> FeatureRange {
        self.0[feature]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Scans the dataset once per numeric feature, tracking min and max.
/// Missing values are excluded from the scan, not read as zero.
///
/// Stateless per call: rerun it after any pass that rewrites feature values
/// (imputation injects means, centroid synthesis writes aggregates) so the
/// spans reflect the data actually being compared.
pub fn compute_ranges<T>(records: &[T], schema: &FeatureSchema<T>) -> FeatureRanges {
    let spans = schema
        .numeric()
        .iter()
        .map(|feature| {
            let mut min = f64::MAX;
            let mut max = f64::MIN;
            for record in records {
                if let Some(v) = feature.value(record) {
                    if v < min {
                        min = v;
                    }
                    if v > max {
                        max = v;
                    }
                }
            }
            if min > max {
                // no present value at all
                return FeatureRange {
                    min: 0.0,
                    max: 0.0,
                    span: 1.0,
                };
            }
            let raw = max - min;
            FeatureRange {
                min,
                max,
                span: if raw <= RANGE_EPSILON { 1.0 } else { raw },
            }
        })
        .collect();
    FeatureRanges(spans)
}

//! In-place mean/mode filling of missing feature values.

use std::collections::HashMap;

use tracing::debug;

use crate::schema::FeatureSchema;

/// Counts of values written by one [`impute_missing`] pass. A second pass
/// over the same dataset fills nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImputeSummary {
    pub numeric_filled: usize,
    pub categorical_filled: usize,
}

impl ImputeSummary {
    pub fn total(&self) -> usize {
        self.numeric_filled + self.categorical_filled
    }
}

/// Fills missing numeric features with the per-feature mean of present
/// values and missing categorical features with the per-feature mode.
///
/// Ties between equally frequent categorical values break toward the value
/// first encountered in record order. A feature with no present value at all
/// is left untouched rather than fabricated. Mutates records in place; run
/// it before range derivation and table building so both see the filled
/// data.
pub fn impute_missing<T>(records: &mut [T], schema: &FeatureSchema<T>) -> ImputeSummary {
    let mut summary = ImputeSummary::default();

    for feature in schema.numeric() {
        let mut sum = 0.0;
        let mut count = 0usize;
        for record in records.iter() {
            if let Some(v) = feature.value(record) {
                sum += v;
                count += 1;
            }
        }
        if count == 0 {
            continue;
        }
        let mean = sum / count as f64;
        for record in records.iter_mut() {
            if feature.value(record).is_none() {
                feature.assign(record, mean);
                summary.numeric_filled += 1;
            }
        }
    }

    for feature in schema.categorical() {
        // occurrence count plus first-seen rank for the tie-break
        let mut counts: HashMap<i64, (usize, usize)> = HashMap::new();
        for record in records.iter() {
            if let Some(v) = feature.value(record) {
                let rank = counts.len();
                let entry = counts.entry(v).or_insert((0, rank));
                entry.0 += 1;
            }
        }
        let mode = counts
            .into_iter()
            .min_by(|(_, (count_a, seen_a)), (_, (count_b, seen_b))| {
                count_b.cmp(count_a).then(seen_a.cmp(seen_b))
            })
            .map(|(value, _)| value);
        let Some(mode) = mode else {
            continue;
        };
        for record in records.iter_mut() {
            if feature.value(record).is_none() {
                feature.assign(record, mode);
                summary.categorical_filled += 1;
            }
        }
    }

    debug!(
        numeric = summary.numeric_filled,
        categorical = summary.categorical_filled,
        "imputation pass finished"
    );
    summary
}

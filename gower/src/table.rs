//! All-pairs Gower distance table keyed by canonicalized identity pairs.
//!
//! Feature columns are extracted and normalized once up front so the n²/2
//! pair loop runs over flat arrays with no accessor calls, then the upper
//! triangle is computed in parallel with per-worker buffers merged once.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use tracing::info;

use crate::distance::MissingPolicy;
use crate::error::Error;
use crate::normalize::compute_ranges;
use crate::schema::FeatureSchema;

/// Marker for a missing categorical value inside the encoded columns.
const ABSENT: u32 = u32::MAX;

/// Unordered identity pair, canonicalized lexicographically so (a, b) and
/// (b, a) address the same entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DistanceKey(String, String);

impl DistanceKey {
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self(a.to_string(), b.to_string())
        } else {
            Self(b.to_string(), a.to_string())
        }
    }
}

/// Symmetric pairwise distance map. Built once per run, read-only
/// afterwards, and scoped to the record set it was built over.
///
/// Self-pairs are never stored: the distance of a record to itself is 0 by
/// definition and short-circuits before any lookup. Entry count is
/// n·(n−1)/2, the dominant memory cost of a run.
#[derive(Debug)]
pub struct DistanceTable {
    entries: HashMap<DistanceKey, f64>,
}

impl DistanceTable {
    /// Distance between two identities.
    ///
    /// A pair outside the build set is an internal invariant violation and
    /// surfaces as a hard error, never a default value.
    pub fn distance(&self, a: &str, b: &str) -> Result<f64, Error> {
        if a == b {
            return Ok(0.0);
        }
        self.entries
            .get(&DistanceKey::new(a, b))
            .copied()
            .ok_or_else(|| Error::MissingDistance {
                a: a.to_string(),
                b: b.to_string(),
            })
    }

    /// Number of stored pairs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Per-record columns extracted once so the pair loop does no accessor or
/// normalization work: identities, numeric rows scaled into [0, 1] and
/// dictionary-encoded categorical rows.
struct Columns {
    ids: Vec<String>,
    numeric: Vec<Vec<f32>>,
    categorical: Vec<Vec<u32>>,
}

fn extract_columns<T>(
    records: &[T],
    schema: &FeatureSchema<T>,
    policy: MissingPolicy,
) -> Result<Columns, Error> {
    let ids: Vec<String> = records.iter().map(|r| schema.identity(r)).collect();
    let mut seen = HashSet::new();
    for id in &ids {
        if !seen.insert(id.as_str()) {
            return Err(Error::DuplicateIdentity(id.clone()));
        }
    }

    let ranges = compute_ranges(records, schema);
    let mut numeric = Vec::with_capacity(records.len());
    for record in records {
        let mut row = Vec::with_capacity(schema.numeric().len());
        for (feature_idx, feature) in schema.numeric().iter().enumerate() {
            let range = ranges.get(feature_idx);
            let v = feature.value(record).unwrap_or(0.0);
            row.push(((v - range.min) / range.span) as f32);
        }
        numeric.push(row);
    }

    // per-feature code dictionaries, codes assigned in first-encounter order
    let mut codes: Vec<HashMap<i64, u32>> = (0..schema.categorical().len())
        .map(|_| HashMap::new())
        .collect();
    let mut categorical = Vec::with_capacity(records.len());
    for record in records {
        let mut row = Vec::with_capacity(schema.categorical().len());
        for (feature_idx, feature) in schema.categorical().iter().enumerate() {
            let value = match feature.value(record) {
                Some(v) => Some(v),
                None => match policy {
                    MissingPolicy::Sentinel(code) => Some(code),
                    MissingPolicy::Equal | MissingPolicy::Mismatch => None,
                },
            };
            let code = match value {
                Some(v) => {
                    let table = &mut codes[feature_idx];
                    let next = table.len() as u32;
                    *table.entry(v).or_insert(next)
                }
                None => ABSENT,
            };
            row.push(code);
        }
        categorical.push(row);
    }

    Ok(Columns {
        ids,
        numeric,
        categorical,
    })
}

fn categorical_mismatch(policy: MissingPolicy, a: u32, b: u32) -> f32 {
    match policy {
        MissingPolicy::Mismatch if a == ABSENT || b == ABSENT => 1.0,
        _ => {
            if a == b {
                0.0
            } else {
                1.0
            }
        }
    }
}

/// Builds the full upper-triangle distance table for a record set.
///
/// Each worker folds its pairs into a private buffer; the buffers are
/// concatenated and merged into the map once, so the result is identical
/// regardless of thread count or scheduling order. Duplicate identities in
/// the build set are rejected up front.
pub fn build_distance_table<T>(
    records: &[T],
    schema: &FeatureSchema<T>,
    policy: MissingPolicy,
) -> Result<DistanceTable, Error> {
    let columns = extract_columns(records, schema, policy)?;
    let n = columns.ids.len();
    let dimension = schema.dimension() as f64;

    let entries: Vec<(DistanceKey, f64)> = (0..n)
        .into_par_iter()
        .fold(
            || Vec::new(),
            |mut buffer, i| {
                let row_numeric = &columns.numeric[i];
                let row_categorical = &columns.categorical[i];
                for j in (i + 1)..n {
                    let other_numeric = &columns.numeric[j];
                    let other_categorical = &columns.categorical[j];
                    let mut sum = 0f32;
                    for k in 0..row_numeric.len() {
                        sum += (row_numeric[k] - other_numeric[k]).abs();
                    }
                    for k in 0..row_categorical.len() {
                        sum +=
                            categorical_mismatch(policy, row_categorical[k], other_categorical[k]);
                    }
                    buffer.push((
                        DistanceKey::new(&columns.ids[i], &columns.ids[j]),
                        sum as f64 / dimension,
                    ));
                }
                buffer
            },
        )
        .reduce(
            || Vec::new(),
            |mut left, mut right| {
                left.append(&mut right);
                left
            },
        );

    info!(records = n, pairs = entries.len(), "distance table built");
    Ok(DistanceTable {
        entries: entries.into_iter().collect(),
    })
}

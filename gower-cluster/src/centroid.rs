//! Synthetic-centroid clustering: centers are constructed records whose
//! numeric features are per-cluster means and whose categorical features
//! are per-cluster modes. Distances are computed directly against the
//! synthetic centers, so no pair table is needed.

use std::collections::HashMap;

use gower::distance::gower_distance;
use gower::error::Error;
use gower::normalize::FeatureRanges;
use gower::schema::FeatureSchema;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::context::ClusterContext;

/// Inertia must move less than this between iterations to count as
/// converged.
pub const INERTIA_EPSILON: f64 = 1e-6;

/// Result of a synthetic-centroid run. Centers are constructed records, not
/// dataset members; their identity fields carry no meaning.
#[derive(Clone, Debug)]
pub struct CentroidFit<T> {
    pub centers: Vec<T>,
    pub clusters: HashMap<usize, Vec<usize>>,
    pub inertia: f64,
    /// Inertia recorded after each assign step, in iteration order.
    pub inertia_history: Vec<f64>,
    pub converged: bool,
    pub iterations: usize,
    /// Per-cluster features that had no present value during synthesis and
    /// fell back to a default. Non-fatal, also logged.
    pub quality_warnings: usize,
}

/// Runs the assign/update loop until the inertia settles or the iteration
/// cap is reached.
///
/// `factory` must return a blank record; the engine writes every feature of
/// a synthetic center through the schema mutators and never touches the
/// identity. Final labels are written into the records; the center flag is
/// not, since no real record is a center in this mode.
pub fn fit_centroids<T, F>(
    records: &mut [T],
    schema: &FeatureSchema<T>,
    ranges: &FeatureRanges,
    context: &ClusterContext,
    factory: F,
) -> Result<CentroidFit<T>, Error>
where
    T: Send + Sync,
    F: Fn() -> T,
{
    context.validate(records.len())?;
    let n = records.len();

    // Seeded selection happens before any parallel region.
    let mut rng = ChaCha20Rng::seed_from_u64(context.seed);
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut rng);
    let mut centers: Vec<T> = indices
        .into_iter()
        .take(context.k)
        .map(|idx| copy_features(&records[idx], schema, &factory))
        .collect();

    let mut labels: Vec<usize> = vec![0; n];
    let mut inertia_history: Vec<f64> = Vec::new();
    let mut previous = f64::MAX;
    let mut converged = false;
    let mut iterations = 0;
    let mut quality_warnings = 0usize;

    while iterations < context.max_iterations {
        iterations += 1;

        let assigned = assign_points(records, &centers, schema, ranges, context);
        labels = assigned.iter().map(|(label, _)| *label).collect();
        let current: f64 = assigned.iter().map(|(_, distance)| distance).sum();
        inertia_history.push(current);
        debug!(
            iteration = iterations,
            inertia = current,
            "centroid iteration"
        );

        if (current - previous).abs() < INERTIA_EPSILON {
            converged = true;
            break;
        }
        previous = current;

        quality_warnings += resynthesize(records, &labels, &mut centers, schema, context.k, &factory);
    }

    for (idx, record) in records.iter_mut().enumerate() {
        schema.set_label(record, labels[idx]);
    }

    let mut clusters: HashMap<usize, Vec<usize>> =
        (0..context.k).map(|cluster| (cluster, Vec::new())).collect();
    for (idx, label) in labels.iter().enumerate() {
        clusters.entry(*label).or_default().push(idx);
    }

    Ok(CentroidFit {
        centers,
        clusters,
        inertia: inertia_history.last().copied().unwrap_or(0.0),
        inertia_history,
        converged,
        iterations,
        quality_warnings,
    })
}

/// Nearest-center assignment plus the winning distance, ties to the lowest
/// center index.
fn assign_points<T: Send + Sync>(
    records: &[T],
    centers: &[T],
    schema: &FeatureSchema<T>,
    ranges: &FeatureRanges,
    context: &ClusterContext,
) -> Vec<(usize, f64)> {
    records
        .par_iter()
        .map(|record| {
            let mut best = 0usize;
            let mut best_distance = f64::MAX;
            for (center_idx, center) in centers.iter().enumerate() {
                let d = gower_distance(record, center, schema, ranges, context.missing_policy);
                if d < best_distance {
                    best_distance = d;
                    best = center_idx;
                }
            }
            (best, best_distance)
        })
        .collect()
}

/// Copies feature values (never identity or control attributes) from a
/// dataset record into a factory-built blank.
fn copy_features<T, F: Fn() -> T>(source: &T, schema: &FeatureSchema<T>, factory: &F) -> T {
    let mut blank = factory();
    for feature in schema.numeric() {
        if let Some(v) = feature.value(source) {
            feature.assign(&mut blank, v);
        }
    }
    for feature in schema.categorical() {
        if let Some(v) = feature.value(source) {
            feature.assign(&mut blank, v);
        }
    }
    blank
}

/// Builds a fresh centroid per cluster. Empty clusters keep their previous
/// center; a feature with no present member value falls back (numeric to
/// 0.0, categorical to the blank default) and is counted as a data-quality
/// event. Returns the event count.
fn resynthesize<T, F: Fn() -> T>(
    records: &[T],
    labels: &[usize],
    centers: &mut [T],
    schema: &FeatureSchema<T>,
    k: usize,
    factory: &F,
) -> usize {
    let mut warnings = 0usize;
    for cluster in 0..k {
        let members: Vec<&T> = labels
            .iter()
            .enumerate()
            .filter_map(|(idx, label)| (*label == cluster).then(|| &records[idx]))
            .collect();
        if members.is_empty() {
            debug!(cluster, "empty cluster, keeping previous centroid");
            continue;
        }

        let mut centroid = factory();
        for feature in schema.numeric() {
            let mut sum = 0.0;
            let mut count = 0usize;
            for member in &members {
                if let Some(v) = feature.value(member) {
                    sum += v;
                    count += 1;
                }
            }
            if count == 0 {
                warn!(
                    cluster,
                    feature = feature.name,
                    "numeric feature missing across the whole cluster, using 0.0"
                );
                warnings += 1;
                feature.assign(&mut centroid, 0.0);
            } else {
                feature.assign(&mut centroid, sum / count as f64);
            }
        }
        for feature in schema.categorical() {
            // mode over present member values, first-encountered tie-break
            let mut counts: HashMap<i64, (usize, usize)> = HashMap::new();
            for member in &members {
                if let Some(v) = feature.value(member) {
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
            match mode {
                Some(value) => feature.assign(&mut centroid, value),
                None => {
                    warn!(
                        cluster,
                        feature = feature.name,
                        "categorical feature missing across the whole cluster, keeping blank default"
                    );
                    warnings += 1;
                }
            }
        }
        centers[cluster] = centroid;
    }
    warnings
}

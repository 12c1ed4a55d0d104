//! Medoid-mode clustering over a precomputed distance table.
//!
//! Centers are always real dataset members; each update step picks, per
//! cluster, the member minimizing its summed distance to the rest of the
//! cluster. All distances come from table lookups, so the table must have
//! been built over exactly the records being clustered.

use std::collections::HashMap;

use gower::error::Error;
use gower::schema::FeatureSchema;
use gower::table::DistanceTable;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;
use rayon::prelude::*;
use tracing::debug;

use crate::context::ClusterContext;

/// Result of a medoid-mode run. Centers and cluster members are indices
/// into the record slice handed to [`fit_medoids`].
#[derive(Clone, Debug)]
pub struct MedoidFit {
    pub centers: Vec<usize>,
    pub clusters: HashMap<usize, Vec<usize>>,
    pub inertia: f64,
    /// Inertia recorded after each assign step, in iteration order.
    pub inertia_history: Vec<f64>,
    pub converged: bool,
    pub iterations: usize,
}

/// Runs the assign/update loop until the center set stops changing or the
/// iteration cap is reached.
///
/// Writes the final label into every record and raises the center flag on
/// the chosen medoids (clearing it everywhere else).
pub fn fit_medoids<T: Send + Sync>(
    records: &mut [T],
    schema: &FeatureSchema<T>,
    table: &DistanceTable,
    context: &ClusterContext,
) -> Result<MedoidFit, Error> {
    context.validate(records.len())?;
    let n = records.len();
    let ids: Vec<String> = records.iter().map(|r| schema.identity(r)).collect();

    // Seeded selection happens before any parallel region.
    let mut rng = ChaCha20Rng::seed_from_u64(context.seed);
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut rng);
    let mut centers: Vec<usize> = indices.into_iter().take(context.k).collect();

    let mut labels: Vec<usize> = vec![0; n];
    let mut inertia_history = Vec::new();
    let mut converged = false;
    let mut iterations = 0;

    while iterations < context.max_iterations {
        iterations += 1;

        labels = assign_points(&ids, &centers, table)?;
        let current = inertia(&ids, &labels, &centers, table)?;
        inertia_history.push(current);
        debug!(iteration = iterations, inertia = current, "medoid iteration");

        let new_centers = reselect_medoids(&ids, &labels, &centers, table, context.k)?;
        if new_centers == centers {
            converged = true;
            break;
        }
        centers = new_centers;
    }

    for (idx, record) in records.iter_mut().enumerate() {
        schema.set_label(record, labels[idx]);
        schema.set_center(record, centers.contains(&idx));
    }

    let mut clusters: HashMap<usize, Vec<usize>> =
        (0..context.k).map(|cluster| (cluster, Vec::new())).collect();
    for (idx, label) in labels.iter().enumerate() {
        clusters.entry(*label).or_default().push(idx);
    }

    Ok(MedoidFit {
        centers,
        clusters,
        inertia: inertia_history.last().copied().unwrap_or(0.0),
        inertia_history,
        converged,
        iterations,
    })
}

/// Nearest-center assignment for every record, ties to the lowest center
/// index. Independent per record, so this is the parallel hot loop.
fn assign_points(
    ids: &[String],
    centers: &[usize],
    table: &DistanceTable,
) -> Result<Vec<usize>, Error> {
    ids.par_iter()
        .map(|id| {
            let mut best = 0usize;
            let mut best_distance = f64::MAX;
            for (center_idx, center) in centers.iter().enumerate() {
                let d = table.distance(id, &ids[*center])?;
                if d < best_distance {
                    best_distance = d;
                    best = center_idx;
                }
            }
            Ok(best)
        })
        .collect()
}

/// Per cluster, the member with the smallest summed distance to the other
/// members becomes the new center. Empty clusters keep their previous
/// center for this iteration.
fn reselect_medoids(
    ids: &[String],
    labels: &[usize],
    centers: &[usize],
    table: &DistanceTable,
    k: usize,
) -> Result<Vec<usize>, Error> {
    let mut new_centers = Vec::with_capacity(k);
    for cluster in 0..k {
        let members: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter_map(|(idx, label)| (*label == cluster).then_some(idx))
            .collect();
        if members.is_empty() {
            debug!(cluster, "empty cluster, keeping previous medoid");
            new_centers.push(centers[cluster]);
            continue;
        }

        // O(members²) scan, table lookups only
        let scored: Result<Vec<(usize, f64)>, Error> = members
            .par_iter()
            .map(|candidate| {
                let mut total = 0.0;
                for other in &members {
                    if other == candidate {
                        continue;
                    }
                    total += table.distance(&ids[*candidate], &ids[*other])?;
                }
                Ok((*candidate, total))
            })
            .collect();
        match scored?
            .into_iter()
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(idx, _)| idx)
        {
            Some(best) => new_centers.push(best),
            None => new_centers.push(centers[cluster]),
        }
    }
    Ok(new_centers)
}

fn inertia(
    ids: &[String],
    labels: &[usize],
    centers: &[usize],
    table: &DistanceTable,
) -> Result<f64, Error> {
    let mut total = 0.0;
    for (idx, label) in labels.iter().enumerate() {
        total += table.distance(&ids[idx], &ids[centers[*label]])?;
    }
    Ok(total)
}

//! Per-k inertia sweep, the raw material of an elbow curve.

use std::ops::RangeInclusive;

use gower::error::Error;
use gower::normalize::FeatureRanges;
use gower::schema::FeatureSchema;
use tracing::debug;

use crate::centroid::fit_centroids;
use crate::context::ClusterContext;

/// Runs a synthetic-centroid fit for every k in the range and collects the
/// final inertia per k. Rendering the curve is the caller's concern.
///
/// Every run reuses the base context's seed, so the whole sweep is
/// reproducible end to end.
pub fn inertia_sweep<T, F>(
    records: &mut [T],
    schema: &FeatureSchema<T>,
    ranges: &FeatureRanges,
    k_range: RangeInclusive<usize>,
    base: &ClusterContext,
    factory: F,
) -> Result<Vec<(usize, f64)>, Error>
where
    T: Send + Sync,
    F: Fn() -> T,
{
    let mut curve = Vec::new();
    for k in k_range {
        let context = ClusterContext { k, ..base.clone() };
        let fit = fit_centroids(records, schema, ranges, &context, &factory)?;
        debug!(k, inertia = fit.inertia, converged = fit.converged, "sweep point");
        curve.push((k, fit.inertia));
    }
    Ok(curve)
}

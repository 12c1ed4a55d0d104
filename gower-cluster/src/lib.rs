//! Iterative clustering engines over the Gower distance: medoid mode (table
//! lookups, centers are real dataset members) and synthetic-centroid mode
//! (constructed mean/mode centers), plus a per-k inertia sweep.

pub mod centroid;
pub mod context;
pub mod elbow;
pub mod medoid;

pub use centroid::{CentroidFit, INERTIA_EPSILON, fit_centroids};
pub use context::ClusterContext;
pub use elbow::inertia_sweep;
pub use medoid::{MedoidFit, fit_medoids};

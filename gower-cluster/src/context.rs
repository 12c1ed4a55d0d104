//! Run configuration shared by both clustering engines.

use gower::distance::MissingPolicy;
use gower::error::Error;

/// Parameters of one clustering run.
#[derive(Clone, Debug)]
pub struct ClusterContext {
    pub k: usize,
    pub max_iterations: usize,
    /// Seed for center initialization; equal seeds over equal inputs give
    /// identical runs.
    pub seed: u64,
    pub missing_policy: MissingPolicy,
}

impl ClusterContext {
    pub fn new(k: usize, max_iterations: usize, seed: u64) -> Self {
        Self {
            k,
            max_iterations,
            seed,
            missing_policy: MissingPolicy::default(),
        }
    }

    /// Checks the run parameters against the dataset before any work
    /// starts.
    pub fn validate(&self, records: usize) -> Result<(), Error> {
        if records == 0 {
            return Err(Error::EmptyDataset);
        }
        if self.k < 1 || self.k > records {
            return Err(Error::InvalidClusterCount {
                k: self.k,
                n: records,
            });
        }
        if self.max_iterations < 1 {
            return Err(Error::InvalidIterations);
        }
        Ok(())
    }
}

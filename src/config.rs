use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use crate::error::Error;




#[derive(Clone, Debug, Serialize, Deserialize)]


/**
 * Run-time parameters of an advection run
 */
pub struct Configuration {
    /// Simulation time at which the run stops.
    pub final_time: f64,

    /// Courant number; the time step is `cfl * dx / |a|`.
    pub cfl: f64,

    /// Number of completed steps between checkpoints.
    pub checkpoint_interval: u64,

    /// Number of cells on the I and J axes.
    pub grid_size: (i64, i64),

    /// Number of blocks the grid is partitioned into.
    pub num_workers: usize,

    /// Threads used to evaluate blocks. One means serial execution.
    pub num_threads: usize,

    /// Directory that receives the snapshot files.
    pub output_directory: PathBuf,
}




// ============================================================================
impl Default for Configuration {
    fn default() -> Self {
        Self {
            final_time: 10.0,
            cfl: 0.4,
            checkpoint_interval: 100,
            grid_size: (50, 50),
            num_workers: 1,
            num_threads: 1,
            output_directory: PathBuf::from("."),
        }
    }
}




// ============================================================================
impl Configuration {

    /**
     * Check the parameters which can be judged without building the domain
     * partition. The grid-against-layout checks are made by the partition
     * itself.
     */
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.final_time.is_finite() && self.final_time > 0.0) {
            return Err(Error::InvalidFinalTime(self.final_time))
        }
        if !(self.cfl.is_finite() && self.cfl > 0.0) {
            return Err(Error::InvalidCfl(self.cfl))
        }
        if self.checkpoint_interval == 0 {
            return Err(Error::InvalidCheckpointInterval)
        }
        if self.grid_size.0 < 1 || self.grid_size.1 < 1 {
            return Err(Error::InvalidGridSize(self.grid_size.0, self.grid_size.1))
        }
        if self.num_workers == 0 {
            return Err(Error::InvalidWorkerCount(self.num_workers))
        }
        if self.num_threads == 0 {
            return Err(Error::ThreadPool("at least one thread is required".to_string()))
        }
        Ok(())
    }
}

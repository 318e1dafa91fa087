//! Batch execution of one estimator over many curves
//!
//! Curves are independent, so the only parallelism is across curves. Each
//! curve gets its own `Result`; a failing curve never aborts the batch.

use thermocurve_core::{Curve, Result};

/// How a batch is scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessingMode {
    /// Single-threaded processing
    Sequential,
    /// Parallel processing on the global rayon pool
    #[default]
    Parallel,
    /// Parallel on a dedicated pool with the given number of threads
    ParallelWith(usize),
}

/// Run `f` over every curve
///
/// The outer `Result` only fails when a dedicated thread pool cannot be
/// built. Without the `parallel` feature every mode runs sequentially.
pub fn derive_batch<F>(curves: &[Curve], mode: ProcessingMode, f: F) -> Result<Vec<Result<Curve>>>
where
    F: Fn(&Curve) -> Result<Curve> + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        use thermocurve_core::Error;

        match mode {
            ProcessingMode::Sequential => Ok(curves.iter().map(&f).collect()),
            ProcessingMode::Parallel => Ok(curves.par_iter().map(&f).collect()),
            ProcessingMode::ParallelWith(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| Error::Other(format!("failed to build thread pool: {}", e)))?;
                Ok(pool.install(|| curves.par_iter().map(&f).collect()))
            }
        }
    }

    #[cfg(not(feature = "parallel"))]
    {
        let _ = mode;
        Ok(curves.iter().map(&f).collect())
    }
}

/// Number of worker threads a batch in `mode` runs on
pub fn num_threads(mode: ProcessingMode) -> usize {
    #[cfg(feature = "parallel")]
    {
        match mode {
            ProcessingMode::Sequential => 1,
            // rayon treats an explicit 0 as "use the default"
            ProcessingMode::Parallel | ProcessingMode::ParallelWith(0) => rayon::current_num_threads(),
            ProcessingMode::ParallelWith(threads) => threads,
        }
    }
    #[cfg(not(feature = "parallel"))]
    {
        let _ = mode;
        1
    }
}

use warpscan_dtw::DtwError;
use warpscan_io::IoError;

/// Errors from batch configuration and execution.
///
/// Per-pair alignment failures are not errors at this level; they are
/// recorded as [`SkippedPair`](crate::SkippedPair)s and the batch continues.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// Returned when partition boundaries do not tile `[0, n)` exactly.
    #[error("invalid partition for {n} sequences: {reason}")]
    InvalidPartition {
        /// Number of sequences in the dataset (0 when checked before a run).
        n: usize,
        /// What is wrong with the boundaries.
        reason: String,
    },

    /// Returned when an even split into zero workers is requested.
    #[error("worker count must be at least 1")]
    ZeroWorkers,

    /// Wraps an invalid window configuration.
    #[error("invalid window: {0}")]
    Window(#[source] DtwError),

    /// Returned when the worker pool cannot be started.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Wraps the first sink failure reported by any worker.
    #[error("result sink failed: {0}")]
    Sink(#[from] IoError),
}

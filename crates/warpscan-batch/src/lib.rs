//! Partitioned parallel pairwise DTW over a dataset of named sequences.
//!
//! Splits the outer pair index across a fixed rayon pool, aligns each pair
//! with full or windowed DTW, and appends one fingerprinted row per pair to
//! a shared [`RowSink`](warpscan_io::RowSink).

mod cancel;
mod config;
mod error;
mod result;
mod runner;

pub use cancel::CancelFlag;
pub use config::{BatchConfig, Partitioning};
pub use error::BatchError;
pub use result::{BatchSummary, SkippedPair, WorkerReport};
pub use runner::BatchRunner;

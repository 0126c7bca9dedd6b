//! Dataset loading, pair fingerprints, and result row sinks for warpscan.

mod domain;
mod error;
mod fingerprint;
mod reader;
mod row;
mod writer;

pub use domain::{Dataset, SequenceKey};
pub use error::IoError;
pub use fingerprint::PairFingerprint;
pub use reader::{DatasetFormat, DatasetReader};
pub use row::{HEADER, ResultRow, RowRange};
pub use writer::{CsvResultSink, MemorySink, RowSink};

//! I/O error types for warpscan-io.

use std::path::PathBuf;

use warpscan_dtw::DtwError;

/// Errors from dataset loading and result row output.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when the input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the input format cannot be inferred from the file extension.
    #[error("unsupported dataset format for {path}: expected a .json or .csv file")]
    UnsupportedFormat {
        /// Path that was attempted.
        path: PathBuf,
    },

    /// Returned when a JSON dataset is not an array of slots.
    #[error("JSON parse error in {path}")]
    JsonParse {
        /// Path to the JSON file.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path} at byte offset {offset}")]
    CsvParse {
        /// Path to the CSV file.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when a JSON slot is neither a single-entry `{key: points}`
    /// object nor an explicit `{key, points, labels}` object.
    #[error("malformed slot {slot} in {path}: {reason}")]
    MalformedSlot {
        /// Path to the dataset file.
        path: PathBuf,
        /// Zero-based slot index.
        slot: usize,
        /// What was wrong with the slot.
        reason: String,
    },

    /// Returned when a sequence key is the empty string.
    #[error("empty sequence key in {path} at slot {slot}")]
    EmptyKey {
        /// Path to the dataset file.
        path: PathBuf,
        /// Zero-based slot index.
        slot: usize,
    },

    /// Returned when the same sequence key names two slots.
    #[error("duplicate sequence key \"{key}\" in {path}: first at slot {first_slot}, again at slot {second_slot}")]
    DuplicateKey {
        /// Path to the dataset file.
        path: PathBuf,
        /// The duplicated key.
        key: String,
        /// Slot index of the first occurrence.
        first_slot: usize,
        /// Slot index of the second occurrence.
        second_slot: usize,
    },

    /// Returned when a coordinate is NaN or infinite.
    #[error("non-finite coordinate in {path}: sequence \"{key}\", point {index}")]
    NonFiniteValue {
        /// Path to the dataset file.
        path: PathBuf,
        /// Key of the offending sequence.
        key: String,
        /// Zero-based point index within the sequence.
        index: usize,
    },

    /// Returned when the file contains no sequences.
    #[error("empty dataset (no sequences) in {path}")]
    EmptyDataset {
        /// Path to the dataset file.
        path: PathBuf,
    },

    /// Returned when a sequence cannot be built from its points and labels.
    #[error("invalid sequence \"{key}\" in {path}")]
    Sequence {
        /// Path to the dataset file.
        path: PathBuf,
        /// Key of the offending sequence.
        key: String,
        /// Underlying sequence error.
        source: DtwError,
    },

    /// Returned when the output file or its directory cannot be created.
    #[error("cannot create output file {path}")]
    CreateOutput {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a row cannot be appended to the output after all retries.
    #[error("cannot append row to {path} after {attempts} attempt(s)")]
    AppendRow {
        /// Output path.
        path: PathBuf,
        /// Number of write attempts made.
        attempts: usize,
        /// Error from the last attempt.
        source: std::io::Error,
    },

    /// Returned when a writer panicked while holding the sink lock.
    #[error("result sink for {path} is poisoned by a panicked writer")]
    SinkPoisoned {
        /// Output path.
        path: PathBuf,
    },
}

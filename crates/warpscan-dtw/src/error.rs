//! Error types for DTW alignment and windowed matching.

use std::fmt;

/// Which input of a pairwise operation an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The first (row) sequence.
    First,
    /// The second (column) sequence.
    Second,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => f.write_str("first"),
            Self::Second => f.write_str("second"),
        }
    }
}

/// Errors from DTW alignment, windowed matching, and sequence construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DtwError {
    /// Returned when an empty sequence is passed to an alignment.
    #[error("{side} sequence must be non-empty")]
    EmptySequence {
        /// The offending input.
        side: Side,
    },

    /// Returned when a point has a NaN or infinite coordinate.
    #[error("{side} sequence contains non-finite point at index {index}")]
    NonFinitePoint {
        /// The offending input.
        side: Side,
        /// Position of the first non-finite point found.
        index: usize,
    },

    /// Returned when the window is longer than one or both sequences.
    #[error("window size {window} exceeds sequence length (first: {len1}, second: {len2})")]
    WindowTooLarge {
        /// Requested window size.
        window: usize,
        /// Length of the first sequence.
        len1: usize,
        /// Length of the second sequence.
        len2: usize,
    },

    /// Returned when a windowed matcher is configured with a zero-length window.
    #[error("window size must be at least 1")]
    ZeroWindow,

    /// Returned when a sequence is given a different number of labels than points.
    #[error("sequence has {points} points but {labels} labels")]
    LabelCountMismatch {
        /// Number of points supplied.
        points: usize,
        /// Number of labels supplied.
        labels: usize,
    },
}

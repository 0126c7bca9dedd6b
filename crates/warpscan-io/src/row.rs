//! Result rows: the unit appended to the output table.

use std::fmt;

use warpscan_dtw::{DtwCost, LabelRange, WindowMatch};

use crate::domain::SequenceKey;
use crate::fingerprint::PairFingerprint;

/// Output column names, in write order.
pub const HEADER: [&str; 6] = ["fingerprint", "Project1", "Project2", "DTW", "range1", "range2"];

/// Portion of a sequence a row's cost was computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRange {
    /// The whole sequence (full DTW).
    All,
    /// The labelled window chosen by the windowed matcher.
    Labels(LabelRange),
}

impl fmt::Display for RowRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("All"),
            Self::Labels(range) => range.fmt(f),
        }
    }
}

/// One pairwise result.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    /// Fingerprint of `(key1, key2)`.
    pub fingerprint: PairFingerprint,
    /// Key of the first sequence (lower slot index).
    pub key1: SequenceKey,
    /// Key of the second sequence (higher slot index).
    pub key2: SequenceKey,
    /// Full or windowed DTW cost.
    pub cost: DtwCost,
    /// Range of the first sequence the cost covers.
    pub range1: RowRange,
    /// Range of the second sequence the cost covers.
    pub range2: RowRange,
}

impl ResultRow {
    /// Build the row for a full-sequence alignment.
    #[must_use]
    pub fn full(key1: SequenceKey, key2: SequenceKey, cost: DtwCost) -> Self {
        Self {
            fingerprint: PairFingerprint::of(&key1, &key2),
            key1,
            key2,
            cost,
            range1: RowRange::All,
            range2: RowRange::All,
        }
    }

    /// Build the row for a windowed match.
    #[must_use]
    pub fn windowed(key1: SequenceKey, key2: SequenceKey, found: &WindowMatch) -> Self {
        Self {
            fingerprint: PairFingerprint::of(&key1, &key2),
            key1,
            key2,
            cost: found.cost,
            range1: RowRange::Labels(found.range1),
            range2: RowRange::Labels(found.range2),
        }
    }

    /// Render the row as CSV fields in [`HEADER`] order.
    ///
    /// The cost uses the shortest representation that round-trips to the
    /// same `f64`.
    pub(crate) fn to_record(&self) -> [String; 6] {
        [
            self.fingerprint.to_string(),
            self.key1.to_string(),
            self.key2.to_string(),
            self.cost.to_string(),
            self.range1.to_string(),
            self.range2.to_string(),
        ]
    }
}

//! Result types for a batch run.

use std::ops::Range;

use warpscan_dtw::DtwError;
use warpscan_io::SequenceKey;

/// A pair whose alignment failed and produced no row.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedPair {
    /// Slot index of the first sequence.
    pub i: usize,
    /// Slot index of the second sequence.
    pub j: usize,
    /// Key of the first sequence.
    pub key1: SequenceKey,
    /// Key of the second sequence.
    pub key2: SequenceKey,
    /// Why the alignment was rejected.
    pub reason: DtwError,
}

/// What one worker did with its outer-index range.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerReport {
    /// Worker index, in partition order.
    pub worker: usize,
    /// Outer indices `i` owned by this worker.
    pub range: Range<usize>,
    /// Rows appended to the sink.
    pub rows_written: usize,
    /// Pairs skipped because alignment failed.
    pub skipped: usize,
    /// Whether the worker stopped early on cancellation.
    pub cancelled: bool,
}

/// Outcome of a completed or cancelled batch run.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    /// Number of pairs `i < j` in the dataset.
    pub pairs_total: usize,
    /// Rows appended to the sink across all workers.
    pub rows_written: usize,
    /// Every skipped pair, ordered by worker then enumeration order.
    pub skipped: Vec<SkippedPair>,
    /// Whether any worker observed cancellation.
    pub cancelled: bool,
    /// Per-worker reports, in partition order.
    pub workers: Vec<WorkerReport>,
}

impl BatchSummary {
    /// Return true if every pair produced a row.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.rows_written == self.pairs_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(rows_written: usize, cancelled: bool) -> BatchSummary {
        BatchSummary {
            pairs_total: 6,
            rows_written,
            skipped: Vec::new(),
            cancelled,
            workers: Vec::new(),
        }
    }

    #[test]
    fn complete_only_when_all_rows_written() {
        assert!(summary(6, false).is_complete());
        assert!(!summary(5, false).is_complete());
        assert!(!summary(6, true).is_complete());
    }
}

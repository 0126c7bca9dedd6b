//! Partitioned parallel evaluation of every pair in a dataset.

use std::ops::Range;

use tracing::{debug, info, instrument, warn};

use warpscan_dtw::{Dtw, DtwError, PointMetric, Sequence, WindowedMatcher};
use warpscan_io::{Dataset, IoError, ResultRow, RowSink, SequenceKey};

use crate::cancel::CancelFlag;
use crate::config::BatchConfig;
use crate::error::BatchError;
use crate::result::{BatchSummary, SkippedPair, WorkerReport};

/// How each pair is aligned.
#[derive(Clone, Copy)]
enum PairMode<M> {
    Full(Dtw<M>),
    Windowed(WindowedMatcher<M>),
}

impl<M: PointMetric> PairMode<M> {
    fn row(
        &self,
        (key1, seq1): (&SequenceKey, &Sequence),
        (key2, seq2): (&SequenceKey, &Sequence),
    ) -> Result<ResultRow, DtwError> {
        match self {
            Self::Full(dtw) => {
                let cost = dtw.cost(seq1.points(), seq2.points())?;
                Ok(ResultRow::full(key1.clone(), key2.clone(), cost))
            }
            Self::Windowed(matcher) => {
                let found = matcher.best_match(seq1, seq2)?;
                Ok(ResultRow::windowed(key1.clone(), key2.clone(), &found))
            }
        }
    }
}

/// What a worker hands back when it stops.
struct WorkerOutcome {
    report: WorkerReport,
    skipped: Vec<SkippedPair>,
    sink_error: Option<IoError>,
}

/// Runs DTW over every unordered pair of a [`Dataset`] on a fixed worker pool.
///
/// The outer index `i` is split into contiguous ranges and the pool gets one
/// thread per range; thread `k` (named `warpscan-worker-k`) evaluates every
/// `(i, j)` with `i` in range `k` and `j > i`. Each pair is therefore
/// evaluated exactly once across the pool. Rows reach the sink in no
/// particular order across workers, but in enumeration order within one.
#[derive(Debug, Clone)]
pub struct BatchRunner<M = warpscan_dtw::Euclidean> {
    config: BatchConfig<M>,
}

impl<M: PointMetric> BatchRunner<M> {
    /// Create a runner from a validated configuration.
    #[must_use]
    pub fn new(config: BatchConfig<M>) -> Self {
        Self { config }
    }

    /// Return the runner's configuration.
    #[must_use]
    pub fn config(&self) -> &BatchConfig<M> {
        &self.config
    }

    /// Evaluate every pair and append one row per successful alignment.
    ///
    /// Pairs whose alignment fails (empty sequence, window larger than a
    /// sequence) are logged and listed in [`BatchSummary::skipped`]. A
    /// cancelled run returns `Ok` with `cancelled` set and the rows written
    /// so far left in the sink.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`BatchError::InvalidPartition`] | Explicit ranges do not tile `[0, n)` |
    /// | [`BatchError::ZeroWorkers`] | `Even(0)` partitioning |
    /// | [`BatchError::Window`] | The configured window is invalid |
    /// | [`BatchError::ThreadPool`] | The worker pool cannot be built |
    /// | [`BatchError::Sink`] | A worker's append failed; other workers still finish their ranges and the lowest-indexed worker's error is returned |
    #[instrument(skip(self, dataset, sink, cancel), fields(n = dataset.len(), window = ?self.config.window))]
    pub fn run(
        &self,
        dataset: &Dataset,
        sink: &impl RowSink,
        cancel: &CancelFlag,
    ) -> Result<BatchSummary, BatchError> {
        let n = dataset.len();
        let ranges = self.config.partitioning.resolve(n)?;
        let mode = match self.config.window {
            Some(window) => PairMode::Windowed(
                WindowedMatcher::new(window, self.config.dtw).map_err(BatchError::Window)?,
            ),
            None => PairMode::Full(self.config.dtw),
        };

        info!(
            n_sequences = n,
            n_pairs = dataset.pair_count(),
            n_workers = ranges.len(),
            "batch started"
        );

        let slots: Vec<(&SequenceKey, &Sequence)> = dataset.iter().collect();
        let outcomes: Vec<WorkerOutcome> = if ranges.is_empty() {
            Vec::new()
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(ranges.len())
                .thread_name(|idx| format!("warpscan-worker-{idx}"))
                .build()?;
            // Broadcast runs the closure once on each pool thread, so thread k
            // owns partition k for the whole run.
            pool.broadcast(|ctx| {
                let worker = ctx.index();
                run_worker(worker, ranges[worker].clone(), &slots, &mode, sink, cancel)
            })
        };

        let mut summary = BatchSummary {
            pairs_total: dataset.pair_count(),
            rows_written: 0,
            skipped: Vec::new(),
            cancelled: false,
            workers: Vec::with_capacity(outcomes.len()),
        };
        let mut first_error = None;
        for outcome in outcomes {
            summary.rows_written += outcome.report.rows_written;
            summary.cancelled |= outcome.report.cancelled;
            summary.skipped.extend(outcome.skipped);
            summary.workers.push(outcome.report);
            if first_error.is_none() {
                first_error = outcome.sink_error;
            }
        }

        if let Some(e) = first_error {
            return Err(BatchError::Sink(e));
        }

        info!(
            rows_written = summary.rows_written,
            skipped = summary.skipped.len(),
            cancelled = summary.cancelled,
            "batch finished"
        );
        Ok(summary)
    }
}

/// Evaluate `(i, j)` for every `i` in `range` and `j > i`.
fn run_worker<M: PointMetric>(
    worker: usize,
    range: Range<usize>,
    slots: &[(&SequenceKey, &Sequence)],
    mode: &PairMode<M>,
    sink: &impl RowSink,
    cancel: &CancelFlag,
) -> WorkerOutcome {
    debug!(worker, start = range.start, end = range.end, "worker started");
    let mut outcome = WorkerOutcome {
        report: WorkerReport {
            worker,
            range: range.clone(),
            rows_written: 0,
            skipped: 0,
            cancelled: false,
        },
        skipped: Vec::new(),
        sink_error: None,
    };

    for i in range {
        for j in (i + 1)..slots.len() {
            if cancel.is_cancelled() {
                debug!(worker, i, j, "cancelled");
                outcome.report.cancelled = true;
                return outcome;
            }

            let (first, second) = (slots[i], slots[j]);
            match mode.row(first, second) {
                Ok(row) => {
                    debug!(worker, i, j, cost = %row.cost, "pair aligned");
                    if let Err(e) = sink.append(&row) {
                        warn!(worker, i, j, error = %e, "sink append failed, stopping worker");
                        outcome.sink_error = Some(e);
                        return outcome;
                    }
                    outcome.report.rows_written += 1;
                }
                Err(reason) => {
                    warn!(worker, key1 = %first.0, key2 = %second.0, error = %reason, "pair skipped");
                    outcome.report.skipped += 1;
                    outcome.skipped.push(SkippedPair {
                        i,
                        j,
                        key1: first.0.clone(),
                        key2: second.0.clone(),
                        reason,
                    });
                }
            }
        }
    }

    debug!(
        worker,
        rows_written = outcome.report.rows_written,
        skipped = outcome.report.skipped,
        "worker finished"
    );
    outcome
}

//! Batch configuration: worker partitioning, window size, and point metric.

use std::ops::Range;

use warpscan_dtw::{Dtw, DtwError, Euclidean, PointMetric};

use crate::error::BatchError;

/// How the outer index range `[0, n)` is split across workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Partitioning {
    /// `k` contiguous ranges of near-equal size. Empty ranges are dropped,
    /// so fewer than `k` workers run when `n < k`.
    Even(usize),
    /// Caller-supplied ranges. They must be non-empty, start at 0, be
    /// contiguous, and end exactly at `n`.
    Explicit(Vec<Range<usize>>),
}

impl Default for Partitioning {
    fn default() -> Self {
        Self::Even(4)
    }
}

impl Partitioning {
    /// Check everything that does not depend on the dataset size.
    fn check_shape(&self) -> Result<(), BatchError> {
        match self {
            Self::Even(0) => Err(BatchError::ZeroWorkers),
            Self::Even(_) => Ok(()),
            Self::Explicit(ranges) => {
                let mut expected = 0;
                for (idx, range) in ranges.iter().enumerate() {
                    if range.start >= range.end {
                        return Err(invalid(0, format!("range {idx} ({range:?}) is empty")));
                    }
                    if range.start != expected {
                        return Err(invalid(
                            0,
                            format!("range {idx} ({range:?}) should start at {expected}"),
                        ));
                    }
                    expected = range.end;
                }
                Ok(())
            }
        }
    }

    /// Resolve to concrete worker ranges for a dataset of `n` sequences.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`BatchError::ZeroWorkers`] | `Even(0)` |
    /// | [`BatchError::InvalidPartition`] | Explicit ranges do not tile `[0, n)` |
    pub fn resolve(&self, n: usize) -> Result<Vec<Range<usize>>, BatchError> {
        self.check_shape()?;
        match self {
            Self::Even(k) => {
                let base = n / k;
                let extra = n % k;
                let mut start = 0;
                // Workers beyond n would only get empty ranges.
                let ranges = (0..(*k).min(n))
                    .map(|w| {
                        let len = base + usize::from(w < extra);
                        let range = start..start + len;
                        start += len;
                        range
                    })
                    .filter(|r| !r.is_empty())
                    .collect();
                Ok(ranges)
            }
            Self::Explicit(ranges) => {
                let covered = ranges.last().map_or(0, |r| r.end);
                if covered != n {
                    return Err(invalid(
                        n,
                        format!("ranges cover [0, {covered}) but the dataset has {n} sequences"),
                    ));
                }
                Ok(ranges.clone())
            }
        }
    }
}

fn invalid(n: usize, reason: String) -> BatchError {
    BatchError::InvalidPartition { n, reason }
}

/// Configuration for a batch run.
///
/// Construct via [`BatchConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter      | Default                |
/// |----------------|------------------------|
/// | `partitioning` | `Partitioning::Even(4)` |
/// | `window`       | `None` (full DTW)      |
/// | metric         | [`Euclidean`]          |
#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig<M = Euclidean> {
    pub(crate) partitioning: Partitioning,
    pub(crate) window: Option<usize>,
    pub(crate) dtw: Dtw<M>,
}

impl BatchConfig<Euclidean> {
    /// Create a full-DTW, Euclidean, four-worker configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            partitioning: Partitioning::default(),
            window: None,
            dtw: Dtw::euclidean(),
        }
    }
}

impl Default for BatchConfig<Euclidean> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: PointMetric> BatchConfig<M> {
    /// Switch to windowed matching with windows of `window` points.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`BatchError::Window`] | `window` is zero |
    pub fn with_window(mut self, window: usize) -> Result<Self, BatchError> {
        if window == 0 {
            return Err(BatchError::Window(DtwError::ZeroWindow));
        }
        self.window = Some(window);
        Ok(self)
    }

    /// Set the worker partitioning.
    ///
    /// Dataset-independent checks run here; coverage of `[0, n)` is checked
    /// when the batch runs.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`BatchError::ZeroWorkers`] | `Even(0)` |
    /// | [`BatchError::InvalidPartition`] | An explicit range is empty, overlaps, or leaves a gap |
    pub fn with_partitioning(mut self, partitioning: Partitioning) -> Result<Self, BatchError> {
        partitioning.check_shape()?;
        self.partitioning = partitioning;
        Ok(self)
    }

    /// Replace the point metric.
    #[must_use]
    pub fn with_metric<N: PointMetric>(self, metric: N) -> BatchConfig<N> {
        BatchConfig {
            partitioning: self.partitioning,
            window: self.window,
            dtw: Dtw::with_metric(metric),
        }
    }

    /// Return the worker partitioning.
    #[must_use]
    pub fn partitioning(&self) -> &Partitioning {
        &self.partitioning
    }

    /// Return the window size, or `None` for full DTW.
    #[must_use]
    pub fn window(&self) -> Option<usize> {
        self.window
    }

    /// Return the aligner used for each pair.
    #[must_use]
    pub fn dtw(&self) -> Dtw<M> {
        self.dtw
    }
}

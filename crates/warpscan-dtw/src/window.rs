//! Fixed-size windowed partial matching.

use std::fmt;

use tracing::{debug, instrument};

use crate::cost::DtwCost;
use crate::dtw::{Dtw, validate};
use crate::error::{DtwError, Side};
use crate::point::{Euclidean, PointMetric};
use crate::sequence::Sequence;

/// Inclusive range of positional labels covered by a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LabelRange {
    /// Label of the first point in the window.
    pub start: i64,
    /// Label of the last point in the window.
    pub end: i64,
}

impl fmt::Display for LabelRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Best-aligning window pair found by [`WindowedMatcher::best_match`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowMatch {
    /// DTW cost of the two windows.
    pub cost: DtwCost,
    /// Labels spanned by the window in the first sequence.
    pub range1: LabelRange,
    /// Labels spanned by the window in the second sequence.
    pub range2: LabelRange,
    /// Start position of the window in the first sequence.
    pub start1: usize,
    /// Start position of the window in the second sequence.
    pub start2: usize,
}

/// Exhaustive search for the lowest-cost pair of equal-length windows.
///
/// Every placement of a `window`-point slice in the first sequence is
/// aligned against every placement in the second, so a search over lengths
/// `n` and `m` runs `(n-w+1)·(m-w+1)` DTW alignments of size `w × w`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowedMatcher<M = Euclidean> {
    window: usize,
    dtw: Dtw<M>,
}

impl<M: PointMetric> WindowedMatcher<M> {
    /// Create a matcher for windows of `window` points.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::ZeroWindow`] | `window` is zero |
    pub fn new(window: usize, dtw: Dtw<M>) -> Result<Self, DtwError> {
        if window == 0 {
            return Err(DtwError::ZeroWindow);
        }
        Ok(Self { window, dtw })
    }

    /// Return the window length.
    #[must_use]
    pub fn window(&self) -> usize {
        self.window
    }

    /// Return the DTW calculator applied to each window pair.
    #[must_use]
    pub fn dtw(&self) -> Dtw<M> {
        self.dtw
    }

    /// Number of window-start combinations evaluated for sequences of these
    /// lengths. Zero when the window does not fit.
    #[must_use]
    pub fn placements(&self, len1: usize, len2: usize) -> usize {
        if self.window > len1 || self.window > len2 {
            return 0;
        }
        (len1 - self.window + 1) * (len2 - self.window + 1)
    }

    /// Find the window pair with minimal DTW cost.
    ///
    /// Placements are scanned by first-sequence start, then second-sequence
    /// start. On equal cost the earliest placement is kept.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::WindowTooLarge`] | `window` exceeds either sequence length |
    /// | [`DtwError::NonFinitePoint`] | A coordinate is NaN or infinite |
    #[instrument(level = "debug", skip_all, fields(window = self.window, n = seq1.len(), m = seq2.len()))]
    pub fn best_match(&self, seq1: &Sequence, seq2: &Sequence) -> Result<WindowMatch, DtwError> {
        let w = self.window;
        let (len1, len2) = (seq1.len(), seq2.len());
        if w > len1 || w > len2 {
            return Err(DtwError::WindowTooLarge {
                window: w,
                len1,
                len2,
            });
        }
        validate(Side::First, seq1.points())?;
        validate(Side::Second, seq2.points())?;

        let (p1, p2) = (seq1.points(), seq2.points());
        let mut best: Option<(DtwCost, usize, usize)> = None;

        for start1 in 0..=len1 - w {
            let win1 = &p1[start1..start1 + w];
            for start2 in 0..=len2 - w {
                let cost = self.dtw.cost_unchecked(win1, &p2[start2..start2 + w]);
                // Strict: the earliest placement keeps a tie.
                if best.is_none_or(|(lowest, _, _)| cost < lowest) {
                    best = Some((cost, start1, start2));
                }
            }
        }

        // At least one placement exists once the window fits both sequences.
        let Some((cost, start1, start2)) = best else {
            return Err(DtwError::WindowTooLarge {
                window: w,
                len1,
                len2,
            });
        };
        debug!(
            placements = self.placements(len1, len2),
            %cost, start1, start2, "best window pair found"
        );

        Ok(WindowMatch {
            cost,
            range1: seq1.label_range(start1, w),
            range2: seq2.label_range(start2, w),
            start1,
            start2,
        })
    }
}

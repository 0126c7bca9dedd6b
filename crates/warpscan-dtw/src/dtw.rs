//! DTW alignment computation.

use tracing::instrument;

use crate::cost::DtwCost;
use crate::error::{DtwError, Side};
use crate::matrix::CostMatrix;
use crate::path::{WarpingPath, WarpingStep};
use crate::point::{Euclidean, Point, PointMetric};

/// Optimal alignment of two sequences: total cost and the realised path.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    /// Cumulative cost at the final cell `(n-1, m-1)`.
    pub cost: DtwCost,
    /// Warping path in end-to-start order.
    pub path: WarpingPath,
}

/// Cell from which a cumulative cost was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Predecessor {
    Start,
    Up,
    Left,
    Diagonal,
}

/// Pick the cheapest of the three predecessor costs.
///
/// Up and left must be strictly cheaper than the diagonal to beat it, and up
/// must be strictly cheaper than left to beat left. Path choice depends on
/// this order; the cost does not.
#[inline]
fn cheapest(up: f64, left: f64, diag: f64) -> (f64, Predecessor) {
    if up < left {
        if up < diag {
            (up, Predecessor::Up)
        } else {
            (diag, Predecessor::Diagonal)
        }
    } else if left < diag {
        (left, Predecessor::Left)
    } else {
        (diag, Predecessor::Diagonal)
    }
}

pub(crate) fn validate(side: Side, points: &[Point]) -> Result<(), DtwError> {
    if points.is_empty() {
        return Err(DtwError::EmptySequence { side });
    }
    if let Some(index) = points.iter().position(|p| !p.is_finite()) {
        return Err(DtwError::NonFinitePoint { side, index });
    }
    Ok(())
}

/// Immutable DTW configuration. Thread-safe and copyable.
///
/// The type parameter selects the pointwise metric; [`Euclidean`] by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dtw<M = Euclidean> {
    metric: M,
}

impl Dtw<Euclidean> {
    /// Create a DTW calculator using Euclidean point distance.
    #[must_use]
    pub fn euclidean() -> Self {
        Self { metric: Euclidean }
    }
}

impl<M: PointMetric> Dtw<M> {
    /// Create a DTW calculator with a custom pointwise metric.
    #[must_use]
    pub fn with_metric(metric: M) -> Self {
        Self { metric }
    }

    /// Return the pointwise metric.
    #[must_use]
    pub fn metric(&self) -> M {
        self.metric
    }

    /// Compute the optimal alignment of `x` against `y`.
    ///
    /// Fills the full `n × m` cost and backpointer grids, then walks the
    /// backpointers from `(n-1, m-1)` to `(0, 0)`. Runs in O(n·m) time and
    /// space.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::EmptySequence`] | `x` or `y` is empty |
    /// | [`DtwError::NonFinitePoint`] | A coordinate is NaN or infinite |
    #[instrument(level = "trace", skip_all, fields(n = x.len(), m = y.len()))]
    pub fn align(&self, x: &[Point], y: &[Point]) -> Result<Alignment, DtwError> {
        self.align_with_matrix(x, y).map(|(alignment, _)| alignment)
    }

    /// Compute the optimal alignment and also return the cumulative cost grid.
    ///
    /// # Errors
    ///
    /// Same as [`align`](Dtw::align).
    #[instrument(level = "trace", skip_all, fields(n = x.len(), m = y.len()))]
    pub fn align_with_matrix(
        &self,
        x: &[Point],
        y: &[Point],
    ) -> Result<(Alignment, CostMatrix), DtwError> {
        validate(Side::First, x)?;
        validate(Side::Second, y)?;

        let (n, m) = (x.len(), y.len());
        let (cost, back) = self.fill(x, y);
        let path = traceback(&back, n, m);
        let alignment = Alignment {
            cost: DtwCost::new(cost[n * m - 1]),
            path,
        };
        Ok((alignment, CostMatrix::from_raw(n, m, cost)))
    }

    /// Compute only the DTW cost of `x` against `y`.
    ///
    /// Uses a rolling two-row buffer: O(n·m) time, O(m) space. Performs the
    /// same additions in the same order as [`align`](Dtw::align), so the
    /// result is bit-identical to `align(x, y)?.cost`.
    ///
    /// # Errors
    ///
    /// Same as [`align`](Dtw::align).
    pub fn cost(&self, x: &[Point], y: &[Point]) -> Result<DtwCost, DtwError> {
        validate(Side::First, x)?;
        validate(Side::Second, y)?;
        Ok(self.cost_unchecked(x, y))
    }

    /// Rolling-buffer cost for inputs already known to be non-empty and finite.
    pub(crate) fn cost_unchecked(&self, x: &[Point], y: &[Point]) -> DtwCost {
        let m = y.len();
        let d = |a: Point, b: Point| self.metric.distance(a, b);

        let mut prev = vec![0.0; m];
        let mut curr = vec![0.0; m];

        prev[0] = d(x[0], y[0]);
        for j in 1..m {
            prev[j] = prev[j - 1] + d(x[0], y[j]);
        }

        for &xi in &x[1..] {
            curr[0] = prev[0] + d(xi, y[0]);
            for j in 1..m {
                let (best, _) = cheapest(prev[j], curr[j - 1], prev[j - 1]);
                curr[j] = d(xi, y[j]) + best;
            }
            std::mem::swap(&mut prev, &mut curr);
        }

        DtwCost::new(prev[m - 1])
    }

    /// Fill the row-major cumulative cost and backpointer grids.
    fn fill(&self, x: &[Point], y: &[Point]) -> (Vec<f64>, Vec<Predecessor>) {
        let (n, m) = (x.len(), y.len());
        let d = |a: Point, b: Point| self.metric.distance(a, b);

        let mut cost = vec![0.0; n * m];
        let mut back = vec![Predecessor::Start; n * m];

        cost[0] = d(x[0], y[0]);

        // First column: straight up from the origin.
        for i in 1..n {
            cost[i * m] = cost[(i - 1) * m] + d(x[i], y[0]);
            back[i * m] = Predecessor::Up;
        }

        // First row: straight along from the origin.
        for j in 1..m {
            cost[j] = cost[j - 1] + d(x[0], y[j]);
            back[j] = Predecessor::Left;
        }

        for i in 1..n {
            for j in 1..m {
                let (best, from) = cheapest(
                    cost[(i - 1) * m + j],
                    cost[i * m + j - 1],
                    cost[(i - 1) * m + j - 1],
                );
                cost[i * m + j] = d(x[i], y[j]) + best;
                back[i * m + j] = from;
            }
        }

        (cost, back)
    }
}

/// Walk backpointers from `(n-1, m-1)` to `(0, 0)`, recording every cell.
fn traceback(back: &[Predecessor], n: usize, m: usize) -> WarpingPath {
    let mut steps = Vec::with_capacity(n + m - 1);
    let (mut i, mut j) = (n - 1, m - 1);

    loop {
        steps.push(WarpingStep { a: i, b: j });
        match back[i * m + j] {
            Predecessor::Start => break,
            Predecessor::Up => i -= 1,
            Predecessor::Left => j -= 1,
            Predecessor::Diagonal => {
                i -= 1;
                j -= 1;
            }
        }
    }

    WarpingPath::new(steps)
}

//! Dense cumulative cost matrix produced by a full DTW alignment.

use std::ops::Index;

/// Row-major `rows × cols` grid of cumulative DTW costs.
///
/// Cell `(i, j)` holds the minimal cost of aligning the first `i + 1` points
/// of the first sequence with the first `j + 1` points of the second.
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl CostMatrix {
    pub(crate) fn from_raw(rows: usize, cols: usize, data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), rows * cols);
        Self { rows, cols, data }
    }

    /// Return the number of rows (length of the first sequence).
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Return the number of columns (length of the second sequence).
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Return the cumulative cost at `(i, j)`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= rows` or `j >= cols`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self[(i, j)]
    }

    /// Return row `i` as a slice.
    ///
    /// # Panics
    ///
    /// Panics if `i >= rows`.
    #[must_use]
    pub fn row(&self, i: usize) -> &[f64] {
        assert!(i < self.rows, "row index {i} out of bounds for {} rows", self.rows);
        &self.data[i * self.cols..(i + 1) * self.cols]
    }
}

impl Index<(usize, usize)> for CostMatrix {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        assert!(i < self.rows, "row index {i} out of bounds for {} rows", self.rows);
        assert!(j < self.cols, "column index {j} out of bounds for {} columns", self.cols);
        &self.data[i * self.cols + j]
    }
}

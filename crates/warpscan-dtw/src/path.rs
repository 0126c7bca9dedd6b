//! Warping path types for DTW alignment.

/// A single step in a DTW warping path, mapping index `a` in the first
/// sequence to index `b` in the second sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WarpingStep {
    /// Index in the first sequence.
    pub a: usize,
    /// Index in the second sequence.
    pub b: usize,
}

/// The optimal warping path, stored end-to-start.
///
/// The first step is `(n-1, m-1)` and the last is `(0, 0)`, the order in which
/// traceback visits cells. Use [`forward`](WarpingPath::forward) for the
/// start-to-end order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarpingPath(Vec<WarpingStep>);

impl WarpingPath {
    pub(crate) fn new(steps: Vec<WarpingStep>) -> Self {
        Self(steps)
    }

    /// Return the steps in end-to-start order.
    #[must_use]
    pub fn steps(&self) -> &[WarpingStep] {
        &self.0
    }

    /// Iterate the steps from `(0, 0)` to `(n-1, m-1)`.
    pub fn forward(&self) -> impl DoubleEndedIterator<Item = &WarpingStep> + '_ {
        self.0.iter().rev()
    }

    /// Return the number of steps in the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if the path contains no steps.
    ///
    /// A path produced by [`Dtw::align`](crate::Dtw::align) always has at
    /// least one step.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a WarpingPath {
    type Item = &'a WarpingStep;
    type IntoIter = std::slice::Iter<'a, WarpingStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

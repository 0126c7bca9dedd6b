//! Labelled point sequences.

use crate::error::DtwError;
use crate::point::Point;
use crate::window::LabelRange;

/// An ordered sequence of points with one positional label per point.
///
/// Labels are the source-domain positions of each sample (for example a
/// move index into the recording the trace was extracted from). Windowed
/// matches report their ranges in label space so they can be located in the
/// un-windowed source. Without explicit labels, point `i` is labelled `i`.
///
/// A sequence may be empty; alignment rejects it with
/// [`DtwError::EmptySequence`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sequence {
    points: Vec<Point>,
    labels: Vec<i64>,
}

impl Sequence {
    /// Create a sequence labelled `0..len`.
    #[must_use]
    pub fn new(points: Vec<Point>) -> Self {
        let labels = (0..points.len() as i64).collect();
        Self { points, labels }
    }

    /// Create a sequence with explicit positional labels.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::LabelCountMismatch`] | `labels.len() != points.len()` |
    pub fn with_labels(points: Vec<Point>, labels: Vec<i64>) -> Result<Self, DtwError> {
        if points.len() != labels.len() {
            return Err(DtwError::LabelCountMismatch {
                points: points.len(),
                labels: labels.len(),
            });
        }
        Ok(Self { points, labels })
    }

    /// Return the points in order.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Return the positional labels, one per point.
    #[must_use]
    pub fn labels(&self) -> &[i64] {
        &self.labels
    }

    /// Return the number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Return true if the sequence has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Label range covered by the window of `width` points starting at `start`.
    pub(crate) fn label_range(&self, start: usize, width: usize) -> LabelRange {
        LabelRange {
            start: self.labels[start],
            end: self.labels[start + width - 1],
        }
    }
}

impl FromIterator<Point> for Sequence {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

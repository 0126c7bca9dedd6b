//! Cumulative alignment cost.

use std::fmt;

/// Sum of pointwise distances along an optimal warping path.
///
/// Not normalised by path length, so costs are only comparable between
/// alignments of sequences with the same lengths. Displays as the shortest
/// decimal that parses back to the same `f64` (`5`, `4.242640687119285`),
/// which is the form written to result tables and log fields.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct DtwCost(f64);

impl DtwCost {
    pub(crate) fn new(value: f64) -> Self {
        Self(value)
    }

    /// Return the raw cost.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for DtwCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

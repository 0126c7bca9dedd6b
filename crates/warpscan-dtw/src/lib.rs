//! Dynamic Time Warping over 2D point sequences.
//!
//! Pure math library with zero I/O. Provides full-matrix DTW alignment with
//! warping path traceback, a rolling-buffer cost-only variant, and an
//! exhaustive fixed-size windowed matcher for partial alignment.

mod cost;
mod dtw;
mod error;
mod matrix;
mod path;
mod point;
mod sequence;
mod window;

pub use cost::DtwCost;
pub use dtw::{Alignment, Dtw};
pub use error::{DtwError, Side};
pub use matrix::CostMatrix;
pub use path::{WarpingPath, WarpingStep};
pub use point::{Euclidean, Manhattan, Point, PointMetric};
pub use sequence::Sequence;
pub use window::{LabelRange, WindowMatch, WindowedMatcher};

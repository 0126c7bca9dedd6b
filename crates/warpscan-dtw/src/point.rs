//! 2D sample points and the pointwise distance metrics DTW accumulates.

/// One sampled `(x, y)` coordinate of a motion trace.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Create a point from its coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Return true if both coordinates are finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

/// Pointwise distance used as the local cost of a DTW cell.
///
/// Implementations must be non-negative, symmetric, and zero exactly when
/// both points are equal.
pub trait PointMetric: Copy + Send + Sync {
    /// Return the distance between `a` and `b`.
    fn distance(&self, a: Point, b: Point) -> f64;
}

/// Straight-line distance, `sqrt(dx² + dy²)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Euclidean;

impl PointMetric for Euclidean {
    #[inline]
    fn distance(&self, a: Point, b: Point) -> f64 {
        (a.x - b.x).hypot(a.y - b.y)
    }
}

/// City-block distance, `|dx| + |dy|`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Manhattan;

impl PointMetric for Manhattan {
    #[inline]
    fn distance(&self, a: Point, b: Point) -> f64 {
        (a.x - b.x).abs() + (a.y - b.y).abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn euclidean_three_four_five() {
        let d = Euclidean.distance(Point::new(0.0, 0.0), Point::new(3.0, 4.0));
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn euclidean_symmetric_and_zero_on_equal() {
        let a = Point::new(1.5, -2.0);
        let b = Point::new(-0.5, 7.25);
        assert_eq!(Euclidean.distance(a, b), Euclidean.distance(b, a));
        assert_eq!(Euclidean.distance(a, a), 0.0);
    }

    #[test]
    fn manhattan_sums_axes() {
        let d = Manhattan.distance(Point::new(1.0, 1.0), Point::new(-2.0, 3.0));
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn non_finite_detected() {
        assert!(Point::new(1.0, 2.0).is_finite());
        assert!(!Point::new(f64::NAN, 2.0).is_finite());
        assert!(!Point::new(1.0, f64::NEG_INFINITY).is_finite());
    }

    #[test]
    fn conversions() {
        assert_eq!(Point::from((1.0, 2.0)), Point::new(1.0, 2.0));
        assert_eq!(Point::from([3.0, 4.0]), Point::new(3.0, 4.0));
    }
}

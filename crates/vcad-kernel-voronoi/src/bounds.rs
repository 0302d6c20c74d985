//! Axis-aligned bounding rectangle.

use serde::{Deserialize, Serialize};
use vcad_kernel_math::{Point2, Tolerance};

use crate::error::{Result, VoronoiError};

/// Axis-aligned rectangle that every diagram edge is clipped to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Lower-left corner.
    pub min: Point2,
    /// Upper-right corner.
    pub max: Point2,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            min: Point2::origin(),
            max: Point2::origin(),
        }
    }
}

impl BoundingBox {
    /// Create a box from its corners.
    pub fn new(min: Point2, max: Point2) -> Self {
        Self { min, max }
    }

    /// Create a box from `(min_x, min_y, max_x, max_y)`.
    pub fn from_extents(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self::new(Point2::new(min_x, min_y), Point2::new(max_x, max_y))
    }

    /// Tight box around `points`, or `None` when empty.
    pub fn from_points(points: &[Point2]) -> Option<Self> {
        let first = points.first()?;
        let mut bb = Self::new(*first, *first);
        for p in &points[1..] {
            bb.min.x = bb.min.x.min(p.x);
            bb.min.y = bb.min.y.min(p.y);
            bb.max.x = bb.max.x.max(p.x);
            bb.max.y = bb.max.y.max(p.y);
        }
        Some(bb)
    }

    /// Box grown on every side by `fraction` of its extent.
    ///
    /// A flat extent borrows the other axis' extent so collinear inputs
    /// still get a box with area; a point-sized box grows by `fraction`.
    pub fn expanded(&self, fraction: f64) -> Self {
        let (w, h) = (self.width(), self.height());
        let base = w.max(h).max(1.0);
        let dx = if w > 0.0 { w * fraction } else { base * fraction };
        let dy = if h > 0.0 { h * fraction } else { base * fraction };
        Self::from_extents(self.min.x - dx, self.min.y - dy, self.max.x + dx, self.max.y + dy)
    }

    /// Width along X.
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Height along Y.
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Area of the box.
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Corners in counter-clockwise order starting at `min`.
    pub fn corners(&self) -> [Point2; 4] {
        [
            self.min,
            Point2::new(self.max.x, self.min.y),
            self.max,
            Point2::new(self.min.x, self.max.y),
        ]
    }

    /// Check if `p` lies within or on the box, allowing `tol` slack.
    pub fn contains(&self, p: &Point2, tol: &Tolerance) -> bool {
        p.x >= self.min.x - tol.linear
            && p.x <= self.max.x + tol.linear
            && p.y >= self.min.y - tol.linear
            && p.y <= self.max.y + tol.linear
    }

    /// Check if `p` lies on the box outline within `tol`.
    pub fn on_border(&self, p: &Point2, tol: &Tolerance) -> bool {
        self.contains(p, tol)
            && (tol.scalars_equal(p.x, self.min.x)
                || tol.scalars_equal(p.x, self.max.x)
                || tol.scalars_equal(p.y, self.min.y)
                || tol.scalars_equal(p.y, self.max.y))
    }

    /// Snap `p` onto the box so rounding never leaves it a hair outside.
    pub fn clamp(&self, p: &Point2) -> Point2 {
        Point2::new(p.x.clamp(self.min.x, self.max.x), p.y.clamp(self.min.y, self.max.y))
    }

    /// Largest absolute coordinate of the box.
    pub fn magnitude(&self) -> f64 {
        self.min
            .x
            .abs()
            .max(self.min.y.abs())
            .max(self.max.x.abs())
            .max(self.max.y.abs())
    }

    /// Reject non-finite or empty boxes.
    pub fn validate(&self) -> Result<()> {
        let finite = [self.min.x, self.min.y, self.max.x, self.max.y]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(VoronoiError::InvalidParameter(
                "bounding box coordinates must be finite".into(),
            ));
        }
        if self.width() <= 0.0 || self.height() <= 0.0 {
            return Err(VoronoiError::InvalidParameter(
                "bounding box must have positive width and height".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        let bb = BoundingBox::from_points(&[
            Point2::new(1.0, 5.0),
            Point2::new(-2.0, 3.0),
            Point2::new(4.0, -1.0),
        ])
        .unwrap();
        assert_eq!(bb.min, Point2::new(-2.0, -1.0));
        assert_eq!(bb.max, Point2::new(4.0, 5.0));
        assert!(BoundingBox::from_points(&[]).is_none());
    }

    #[test]
    fn test_expanded_ten_percent() {
        let bb = BoundingBox::from_extents(0.0, 0.0, 10.0, 20.0).expanded(0.1);
        assert!((bb.min.x + 1.0).abs() < 1e-12);
        assert!((bb.max.y - 22.0).abs() < 1e-12);
    }

    #[test]
    fn test_expanded_flat_box_gets_area() {
        let bb = BoundingBox::from_extents(0.0, 5.0, 10.0, 5.0).expanded(0.1);
        assert!(bb.height() > 0.0);
        assert!(bb.validate().is_ok());
    }

    #[test]
    fn test_on_border() {
        let tol = Tolerance::DEFAULT;
        let bb = BoundingBox::from_extents(0.0, 0.0, 10.0, 10.0);
        assert!(bb.on_border(&Point2::new(0.0, 3.0), &tol));
        assert!(!bb.on_border(&Point2::new(5.0, 5.0), &tol));
        assert!(!bb.on_border(&Point2::new(12.0, 10.0), &tol));
    }

    #[test]
    fn test_validate() {
        assert!(BoundingBox::from_extents(0.0, 0.0, 0.0, 1.0).validate().is_err());
        assert!(BoundingBox::from_extents(0.0, 0.0, f64::NAN, 1.0).validate().is_err());
        assert!(BoundingBox::from_extents(-5.0, -5.0, 15.0, 15.0).validate().is_ok());
    }
}

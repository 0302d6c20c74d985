#![warn(missing_docs)]

//! Planar math types for the vcad Voronoi kernel.
//!
//! Thin wrappers around nalgebra providing the 2D point and vector types
//! used by the diagram builders, plus the one tolerance shared by every
//! geometric predicate in the kernel.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// A point in the plane.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in the plane.
pub type Vec2 = Vector2<f64>;

/// Shared linear tolerance (mm) for all predicates in the kernel.
pub const EPSILON: f64 = 1e-9;

/// Tolerance for geometric comparisons.
///
/// Comparisons are made against `linear` scaled by the magnitude of the
/// coordinates involved, so the same constant works for micron-scale and
/// metre-scale inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    /// Linear distance tolerance in mm.
    pub linear: f64,
}

impl Tolerance {
    /// Default kernel tolerance ([`EPSILON`]).
    pub const DEFAULT: Self = Self { linear: EPSILON };

    /// Tolerance with an explicit linear value.
    pub const fn new(linear: f64) -> Self {
        Self { linear }
    }

    /// Tolerance scaled to inputs whose coordinates reach `magnitude`.
    pub fn scaled(&self, magnitude: f64) -> Self {
        Self {
            linear: self.linear * magnitude.abs().max(1.0),
        }
    }

    /// Check if two points are coincident within tolerance.
    pub fn points_equal(&self, a: &Point2, b: &Point2) -> bool {
        (a - b).norm() < self.linear
    }

    /// Check if a scalar distance is effectively zero.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.linear
    }

    /// Check if two scalars are equal within tolerance.
    pub fn scalars_equal(&self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.linear
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Turn direction of an ordered point triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Left turn.
    CounterClockwise,
    /// Right turn.
    Clockwise,
    /// Straight within tolerance.
    Collinear,
}

/// 2D cross product (z component of `a × b`).
#[inline]
pub fn cross(a: &Vec2, b: &Vec2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Vector rotated a quarter turn counter-clockwise.
#[inline]
pub fn rot_ccw(v: &Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// Orientation of the triple `(a, b, c)`.
///
/// The signed area is compared against the tolerance scaled by the longer of
/// the two legs, so nearly straight triples report [`Orientation::Collinear`].
pub fn orient(a: &Point2, b: &Point2, c: &Point2, tol: &Tolerance) -> Orientation {
    let ab = b - a;
    let ac = c - a;
    let area = cross(&ab, &ac);
    let scale = ab.norm().max(ac.norm());
    if area.abs() <= tol.linear * scale.max(1.0) {
        Orientation::Collinear
    } else if area > 0.0 {
        Orientation::CounterClockwise
    } else {
        Orientation::Clockwise
    }
}

/// Point at parameter `t` between `a` and `b`.
#[inline]
pub fn lerp(a: &Point2, b: &Point2, t: f64) -> Point2 {
    a + (b - a) * t
}

/// Midpoint of `a` and `b`.
#[inline]
pub fn midpoint(a: &Point2, b: &Point2) -> Point2 {
    lerp(a, b, 0.5)
}

//! Boundary clipping of diagram edges.
//!
//! Builders emit every edge as a piece of a bisector line, `origin + t·dir`,
//! with optional finite ends. Clipping intersects the parameter interval
//! with the box slabs (Liang–Barsky) and drops edges that miss the box.

use vcad_kernel_math::{rot_ccw, Point2, Tolerance, Vec2};

use crate::bounds::BoundingBox;

/// A bisector piece between two sites (dense indices), before clipping.
///
/// `start` and `end` are the finite ends, ordered along `dir`; `None` means
/// the edge runs to infinity on that side.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EdgeLine {
    pub sites: (usize, usize),
    pub origin: Point2,
    pub dir: Vec2,
    pub start: Option<Point2>,
    pub end: Option<Point2>,
}

impl EdgeLine {
    /// Unbounded bisector of `a` and `b` through `origin`, oriented so that
    /// `a` lies on its left.
    pub(crate) fn bisector(sites: (usize, usize), a: &Point2, b: &Point2, origin: Point2) -> Self {
        Self {
            sites,
            origin,
            dir: rot_ccw(&(b - a)),
            start: None,
            end: None,
        }
    }

    /// Finite edge between two known points.
    pub(crate) fn segment(sites: (usize, usize), start: Point2, end: Point2) -> Self {
        Self {
            sites,
            origin: start,
            dir: end - start,
            start: Some(start),
            end: Some(end),
        }
    }
}

/// Clip the parameter interval `[t0, t1]` of `origin + t·dir` to the box.
///
/// Either bound may be infinite. Returns `None` when the line misses the
/// box or only touches it in a point.
pub(crate) fn clip_parametric(
    origin: &Point2,
    dir: &Vec2,
    mut t0: f64,
    mut t1: f64,
    bounds: &BoundingBox,
    tol: &Tolerance,
) -> Option<(f64, f64)> {
    let slabs = [
        (-dir.x, origin.x - bounds.min.x),
        (dir.x, bounds.max.x - origin.x),
        (-dir.y, origin.y - bounds.min.y),
        (dir.y, bounds.max.y - origin.y),
    ];
    for (p, q) in slabs {
        if p == 0.0 {
            if q < -tol.linear {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
    }
    if !t0.is_finite() || !t1.is_finite() {
        return None;
    }
    let len = dir.norm();
    if (t1 - t0) * len <= tol.linear {
        return None;
    }
    Some((t0, t1))
}

/// Clip an edge to the box, returning its finite endpoints.
pub(crate) fn clip_edge(line: &EdgeLine, bounds: &BoundingBox, tol: &Tolerance) -> Option<(Point2, Point2)> {
    let (origin, dir, t0, t1) = match (line.start, line.end) {
        (Some(a), Some(b)) => (a, b - a, 0.0, 1.0),
        (Some(a), None) => (a, line.dir, 0.0, f64::INFINITY),
        (None, Some(b)) => (b, -line.dir, 0.0, f64::INFINITY),
        (None, None) => (line.origin, line.dir, f64::NEG_INFINITY, f64::INFINITY),
    };
    if dir.norm_squared() == 0.0 {
        return None;
    }
    let (s0, s1) = clip_parametric(&origin, &dir, t0, t1, bounds, tol)?;
    let a = bounds.clamp(&(origin + dir * s0));
    let b = bounds.clamp(&(origin + dir * s1));
    if line.start.is_none() && line.end.is_some() {
        // Walked backwards from the end; restore start→end order.
        Some((b, a))
    } else {
        Some((a, b))
    }
}

//! Geometric primitives and predicates.
//!
//! Every predicate takes the kernel [`Tolerance`] so near-ties resolve the
//! same way everywhere: points on a polygon boundary count as inside, and
//! nearly straight triples count as collinear.

use vcad_kernel_math::{cross, orient, Orientation, Point2, Tolerance, Vec2};

/// Euclidean distance between two points.
#[inline]
pub fn distance(a: &Point2, b: &Point2) -> f64 {
    (b - a).norm()
}

/// Squared Euclidean distance between two points.
#[inline]
pub fn distance_sq(a: &Point2, b: &Point2) -> f64 {
    (b - a).norm_squared()
}

/// Intersection of the lines `p + s·d` and `q + t·e`.
///
/// Returns `None` for parallel lines.
pub fn line_intersection(p: &Point2, d: &Vec2, q: &Point2, e: &Vec2, tol: &Tolerance) -> Option<Point2> {
    let denom = cross(d, e);
    if denom.abs() <= tol.linear * d.norm() * e.norm() {
        return None;
    }
    let s = cross(&(q - p), e) / denom;
    Some(p + d * s)
}

/// Intersection point of segments `ab` and `cd`, endpoints included.
pub fn segment_intersection(a: &Point2, b: &Point2, c: &Point2, d: &Point2, tol: &Tolerance) -> Option<Point2> {
    let r = b - a;
    let s = d - c;
    let denom = cross(&r, &s);
    if denom.abs() <= tol.linear * r.norm() * s.norm() {
        return None;
    }
    let t = cross(&(c - a), &s) / denom;
    let u = cross(&(c - a), &r) / denom;
    let slack = tol.linear;
    if (-slack..=1.0 + slack).contains(&t) && (-slack..=1.0 + slack).contains(&u) {
        Some(a + r * t)
    } else {
        None
    }
}

/// Circle through three points as `(center, radius)`.
///
/// Collinear triples have an infinite radius and return `None`.
pub fn circumcircle(a: &Point2, b: &Point2, c: &Point2, tol: &Tolerance) -> Option<(Point2, f64)> {
    if orient(a, b, c, tol) == Orientation::Collinear {
        return None;
    }
    let ab = b - a;
    let ac = c - a;
    let d = 2.0 * cross(&ab, &ac);
    let ab2 = ab.norm_squared();
    let ac2 = ac.norm_squared();
    let ux = (ac.y * ab2 - ab.y * ac2) / d;
    let uy = (ab.x * ac2 - ac.x * ab2) / d;
    let offset = Vec2::new(ux, uy);
    let radius = offset.norm();
    if !radius.is_finite() {
        return None;
    }
    Some((a + offset, radius))
}

/// Distance from `p` to the segment `ab`.
pub fn point_segment_distance(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq == 0.0 {
        return distance(p, a);
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    distance(p, &(a + ab * t))
}

/// Distance from `p` to the closest edge of a closed polygon.
pub fn distance_to_boundary(p: &Point2, polygon: &[Point2]) -> f64 {
    polygon_edges(polygon)
        .map(|(a, b)| point_segment_distance(p, a, b))
        .fold(f64::INFINITY, f64::min)
}

/// Iterate the edges of a closed polygon as `(start, end)` pairs.
pub fn polygon_edges(polygon: &[Point2]) -> impl Iterator<Item = (&Point2, &Point2)> + '_ {
    let n = polygon.len();
    (0..n).map(move |i| (&polygon[i], &polygon[(i + 1) % n]))
}

/// Check if a point is inside a closed polygon (ray casting).
///
/// Points within tolerance of the boundary count as inside.
pub fn point_in_polygon(point: &Point2, polygon: &[Point2], tol: &Tolerance) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    if distance_to_boundary(point, polygon) <= tol.linear {
        return true;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = &polygon[i];
        let pj = &polygon[j];
        if ((pi.y > point.y) != (pj.y > point.y))
            && (point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Signed area of a closed polygon; positive for counter-clockwise winding.
pub fn polygon_signed_area(polygon: &[Point2]) -> f64 {
    if polygon.len() < 3 {
        return 0.0;
    }
    polygon_edges(polygon)
        .map(|(a, b)| a.x * b.y - b.x * a.y)
        .sum::<f64>()
        / 2.0
}

/// Perimeter of a closed polygon.
pub fn polygon_perimeter(polygon: &[Point2]) -> f64 {
    if polygon.len() < 2 {
        return 0.0;
    }
    polygon_edges(polygon).map(|(a, b)| distance(a, b)).sum()
}

/// Largest absolute coordinate among `points`, used to scale tolerances.
pub fn magnitude(points: &[Point2]) -> f64 {
    points
        .iter()
        .map(|p| p.x.abs().max(p.y.abs()))
        .fold(0.0, f64::max)
}

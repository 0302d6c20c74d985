//! Quadratic half-plane construction for small inputs.
//!
//! Each cell starts as the bounding box and is cut by the bisector of its
//! site and every other site. Sides produced by a cut remember which
//! neighbour made them, so shared edges can be emitted once per pair.

use vcad_kernel_math::{midpoint, rot_ccw, Point2, Tolerance};

use crate::bounds::BoundingBox;
use crate::clip::EdgeLine;
use crate::error::{Result, VoronoiError};
use crate::geometry::line_intersection;

/// Largest input the quadratic builder accepts.
pub const NAIVE_MAX_SITES: usize = 256;

/// Polygon vertex plus the label of the side that starts at it.
type LabelledVertex = (Point2, Option<usize>);

pub(crate) fn build(sites: &[Point2], bounds: &BoundingBox, tol: &Tolerance) -> Result<Vec<EdgeLine>> {
    if sites.len() > NAIVE_MAX_SITES {
        return Err(VoronoiError::InvalidParameter(format!(
            "naive builder is limited to {NAIVE_MAX_SITES} sites, got {}",
            sites.len()
        )));
    }

    let mut edges = Vec::new();
    for (i, site) in sites.iter().enumerate() {
        let cell = cell_polygon(i, sites, bounds, tol);
        let n = cell.len();
        for k in 0..n {
            let (a, label) = cell[k];
            let (b, _) = cell[(k + 1) % n];
            if let Some(j) = label {
                if i < j && !tol.points_equal(&a, &b) {
                    edges.push(EdgeLine::segment((i, j), a, b));
                }
            }
        }
        log::trace!("naive cell {i} at ({}, {}) has {n} sides", site.x, site.y);
    }
    log::debug!("naive: {} sites, {} edges", sites.len(), edges.len());
    Ok(edges)
}

fn cell_polygon(i: usize, sites: &[Point2], bounds: &BoundingBox, tol: &Tolerance) -> Vec<LabelledVertex> {
    let mut poly: Vec<LabelledVertex> = bounds.corners().into_iter().map(|c| (c, None)).collect();
    let p = sites[i];
    for (j, q) in sites.iter().enumerate() {
        if j == i || poly.is_empty() {
            continue;
        }
        poly = clip_half_plane(&poly, &p, q, j, tol);
    }
    poly
}

/// Keep the part of `poly` at least as close to `p` as to `q`.
fn clip_half_plane(poly: &[LabelledVertex], p: &Point2, q: &Point2, label: usize, tol: &Tolerance) -> Vec<LabelledVertex> {
    let m = midpoint(p, q);
    let d = q - p;
    let along = rot_ccw(&d);
    let slack = tol.linear * d.norm();
    let side = |x: &Point2| (x - m).dot(&d);
    // Where the polygon side from `a` to `b` crosses the bisector.
    let crossing = |a: &Point2, b: &Point2, sa: f64, sb: f64| {
        line_intersection(a, &(b - a), &m, &along, tol).unwrap_or_else(|| a + (b - a) * (sa / (sa - sb)))
    };

    let n = poly.len();
    let mut out = Vec::with_capacity(n + 1);
    for k in 0..n {
        let (cur, cur_label) = poly[k];
        let (nxt, _) = poly[(k + 1) % n];
        let (sc, sn) = (side(&cur), side(&nxt));
        let cur_in = sc <= slack;
        let nxt_in = sn <= slack;

        match (cur_in, nxt_in) {
            (true, true) => out.push((cur, cur_label)),
            (true, false) => {
                out.push((cur, cur_label));
                out.push((crossing(&cur, &nxt, sc, sn), Some(label)));
            }
            (false, true) => {
                out.push((crossing(&cur, &nxt, sc, sn), cur_label));
            }
            (false, false) => {}
        }
    }
    out
}

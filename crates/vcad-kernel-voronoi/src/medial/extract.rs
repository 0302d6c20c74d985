//! Skeleton extraction from the Voronoi diagram of boundary samples.

use vcad_kernel_math::{midpoint, orient, Orientation, Point2, Tolerance};

use super::graph::SkeletonGraph;
use super::MedialAxis;
use crate::api::{diagram_from_points, Algorithm, VoronoiSettings};
use crate::bounds::BoundingBox;
use crate::discretize::discretize;
use crate::error::{Result, VoronoiError};
use crate::geometry::{magnitude, point_in_polygon, polygon_perimeter, polygon_signed_area};

/// Upper bound on boundary samples; coarser steps are forced beyond it.
pub(crate) const MAX_BOUNDARY_SAMPLES: usize = 100_000;

/// Fraction of the shorter bounding-box side used as the default step.
const DEFAULT_STEP_DIVISOR: f64 = 50.0;

/// Clean up a caller polygon: drop repeated and closing vertices and wind
/// it counter-clockwise.
pub(crate) fn prepare_polygon(polygon: &[Point2], tol: &Tolerance) -> Result<Vec<Point2>> {
    if polygon.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return Err(VoronoiError::InvalidParameter(
            "polygon coordinates must be finite".into(),
        ));
    }

    let mut points: Vec<Point2> = Vec::with_capacity(polygon.len());
    for p in polygon {
        if points.last().map_or(true, |last| !tol.points_equal(last, p)) {
            points.push(*p);
        }
    }
    while points.len() > 1 && tol.points_equal(&points[0], &points[points.len() - 1]) {
        points.pop();
    }
    if points.len() < 3 {
        return Err(VoronoiError::InsufficientInput {
            required: 3,
            found: points.len(),
        });
    }

    let area = polygon_signed_area(&points);
    let perimeter = polygon_perimeter(&points);
    if area.abs() <= tol.linear * perimeter.max(1.0) {
        return Err(VoronoiError::DegenerateGeometry(
            "polygon has zero area".into(),
        ));
    }
    if area < 0.0 {
        points.reverse();
    }
    Ok(points)
}

/// Sampling step: the caller's, or a fiftieth of the shorter side of the
/// polygon's bounding box, coarsened if the outline would need too many
/// samples.
pub(crate) fn resolve_step(polygon: &[Point2], requested: Option<f64>) -> f64 {
    let step = requested.unwrap_or_else(|| {
        BoundingBox::from_points(polygon)
            .map(|b| b.width().min(b.height()) / DEFAULT_STEP_DIVISOR)
            .unwrap_or(1.0)
    });
    let floor = polygon_perimeter(polygon) / MAX_BOUNDARY_SAMPLES as f64;
    if step < floor {
        log::debug!("step {step} would exceed {MAX_BOUNDARY_SAMPLES} samples; using {floor}");
        floor
    } else {
        step
    }
}

fn convex_corners(polygon: &[Point2], tol: &Tolerance) -> Vec<Point2> {
    let n = polygon.len();
    (0..n)
        .filter(|&i| {
            let prev = &polygon[(i + n - 1) % n];
            let next = &polygon[(i + 1) % n];
            orient(prev, &polygon[i], next, tol) == Orientation::CounterClockwise
        })
        .map(|i| polygon[i])
        .collect()
}

/// Build the pruned skeleton of a prepared (counter-clockwise) polygon.
pub(crate) fn extract(polygon: &[Point2], step: f64, prune_threshold: f64, tol: &Tolerance) -> Result<MedialAxis> {
    let samples = discretize(polygon, step);
    let n = samples.len();
    let positions: Vec<Point2> = samples.iter().map(|s| s.position).collect();

    let settings = VoronoiSettings::default()
        .with_tolerance(*tol)
        .with_algorithm(Algorithm::Sweep);
    let diagram = diagram_from_points(&positions, None, &settings)?;

    // Bisectors of neighbouring samples are spokes pointing at the
    // boundary, not part of the skeleton.
    let adjacent = |i: usize, j: usize| i.abs_diff(j) == 1 || i.abs_diff(j) == n - 1;

    let mut graph = SkeletonGraph::new(tol.linear);
    let mut kept = 0usize;
    for edge in &diagram.edges {
        if adjacent(edge.sites.0, edge.sites.1) {
            continue;
        }
        let a = diagram.vertices[edge.start].position;
        let b = diagram.vertices[edge.end].position;
        let inside = [a, b, midpoint(&a, &b)]
            .iter()
            .all(|p| point_in_polygon(p, polygon, tol));
        if inside {
            graph.add_edge(a, b);
            kept += 1;
        }
    }

    let corners = convex_corners(polygon, tol);
    let extended = graph.extend_to_corners(&corners, 2.0 * step);
    let pruned = graph.prune(prune_threshold);
    let dropped = graph.drop_short_components(prune_threshold);
    log::debug!(
        "medial axis: {n} samples, {} diagram edges, {kept} interior, {extended} corner extensions, {pruned} spurs pruned, {dropped} fragments dropped, {} skeleton edges left",
        diagram.edges.len(),
        graph.edge_count()
    );

    let axis = graph.into_medial_axis(polygon, step, prune_threshold);
    if axis.is_empty() {
        // Every bisector ran to the boundary: the input collapsed.
        return Err(VoronoiError::InsufficientInput { required: 2, found: 0 });
    }
    Ok(axis)
}

/// Tolerance for a polygon centred on the origin, scaled to its extent.
pub(crate) fn polygon_tolerance(polygon: &[Point2], base: &Tolerance) -> Tolerance {
    base.scaled(magnitude(polygon))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(side: f64) -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(side, 0.0),
            Point2::new(side, side),
            Point2::new(0.0, side),
        ]
    }

    #[test]
    fn test_prepare_drops_duplicates_and_reorients() {
        let tol = Tolerance::DEFAULT;
        let mut poly = square(1.0);
        poly.reverse();
        poly.insert(1, poly[0]);
        poly.push(poly[0]);
        let prepared = prepare_polygon(&poly, &tol).unwrap();
        assert_eq!(prepared.len(), 4);
        assert!(polygon_signed_area(&prepared) > 0.0);
    }

    #[test]
    fn test_prepare_rejects_degenerate() {
        let tol = Tolerance::DEFAULT;
        let line = [Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(2.0, 0.0)];
        assert!(matches!(
            prepare_polygon(&line, &tol),
            Err(VoronoiError::DegenerateGeometry(_))
        ));
        let two = [Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 0.0)];
        assert!(matches!(
            prepare_polygon(&two, &tol),
            Err(VoronoiError::InsufficientInput { required: 3, found: 2 })
        ));
        let nan = [Point2::new(f64::NAN, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)];
        assert!(matches!(
            prepare_polygon(&nan, &tol),
            Err(VoronoiError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_default_step() {
        let rect = vec![
            Point2::new(0.0, 0.0),
            Point2::new(100.0, 0.0),
            Point2::new(100.0, 10.0),
            Point2::new(0.0, 10.0),
        ];
        assert!((resolve_step(&rect, None) - 0.2).abs() < 1e-12);
        assert!((resolve_step(&rect, Some(1.5)) - 1.5).abs() < 1e-12);
        // Too fine for the sample cap.
        let floor = 220.0 / MAX_BOUNDARY_SAMPLES as f64;
        assert!((resolve_step(&rect, Some(1e-6)) - floor).abs() < 1e-12);
    }

    #[test]
    fn test_convex_corners_skip_reflex() {
        let tol = Tolerance::DEFAULT;
        // L-shape, counter-clockwise; (1,1) is the reflex corner.
        let l = vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        let corners = convex_corners(&l, &tol);
        assert_eq!(corners.len(), 5);
        assert!(!corners.contains(&Point2::new(1.0, 1.0)));
    }

    #[test]
    fn test_square_skeleton() {
        let poly = square(10.0);
        let tol = polygon_tolerance(&poly, &Tolerance::DEFAULT);
        let step = resolve_step(&poly, None);
        let axis = extract(&poly, step, 2.0 * step, &tol).unwrap();

        let junctions = axis.junctions();
        assert_eq!(junctions.len(), 1);
        let centre = &axis.vertices[junctions[0]];
        assert!((centre.position - Point2::new(5.0, 5.0)).norm() < 1e-6);
        assert!((centre.radius - 5.0).abs() < 1e-6);

        let leaves = axis.leaves();
        assert_eq!(leaves.len(), 4);
        for &leaf in &leaves {
            assert!(axis.vertices[leaf].radius < 1e-9);
        }
        assert_eq!(axis.branches.len(), 4);
        let diagonal = 50f64.sqrt();
        for branch in &axis.branches {
            assert!((branch.length - diagonal).abs() < 1e-6);
        }
    }
}

//! Cross-module properties of diagrams and skeletons.

use std::collections::HashSet;

use approx::assert_abs_diff_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vcad_kernel_math::{Point2, Tolerance};
use vcad_kernel_voronoi::geometry::{distance_to_boundary, point_in_polygon, polygon_signed_area};
use vcad_kernel_voronoi::{
    compute_medial_axis, compute_voronoi, compute_voronoi_with, Algorithm, BoundingBox, Diagram, MedialAxisSettings,
    VertexKind, VoronoiBuilder, VoronoiSettings,
};

fn random_sites(seed: u64, n: usize, extent: f64) -> Vec<Point2> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| Point2::new(rng.gen_range(0.0..extent), rng.gen_range(0.0..extent)))
        .collect()
}

fn rect(w: f64, h: f64) -> Vec<Point2> {
    vec![
        Point2::new(0.0, 0.0),
        Point2::new(w, 0.0),
        Point2::new(w, h),
        Point2::new(0.0, h),
    ]
}

fn assert_pairs_unique(d: &Diagram) {
    let mut pairs = HashSet::new();
    for e in &d.edges {
        assert_ne!(e.sites.0, e.sites.1);
        let key = (e.sites.0.min(e.sites.1), e.sites.0.max(e.sites.1));
        assert!(pairs.insert(key), "pair {key:?} has more than one edge");
    }
}

#[test]
fn test_one_cell_per_site_and_one_edge_per_pair() {
    for seed in 0..5 {
        let sites = random_sites(seed, 60, 100.0);
        let d = compute_voronoi(&sites, None);
        assert!(d.failure.is_none());
        assert_eq!(d.cells.len(), sites.len());
        assert_pairs_unique(&d);
        for (id, e) in d.edges.iter().enumerate() {
            assert!(d.cell(e.sites.0).unwrap().edges.contains(&id));
            assert!(d.cell(e.sites.1).unwrap().edges.contains(&id));
        }
    }
}

#[test]
fn test_cell_interiors_belong_to_their_site() {
    let sites = random_sites(7, 40, 50.0);
    let d = compute_voronoi(&sites, None);
    for cell in &d.cells {
        let poly = d.cell_polygon(cell);
        assert!(poly.len() >= 3);
        let n = poly.len() as f64;
        let centroid = Point2::new(
            poly.iter().map(|p| p.x).sum::<f64>() / n,
            poly.iter().map(|p| p.y).sum::<f64>() / n,
        );
        assert_eq!(d.nearest_site(&centroid), Some(cell.site));
    }
}

#[test]
fn test_cells_tile_bounding_box() {
    let sites = random_sites(11, 80, 20.0);
    let d = compute_voronoi(&sites, None);
    let total: f64 = d
        .cells
        .iter()
        .map(|c| polygon_signed_area(&d.cell_polygon(c)))
        .sum();
    assert_abs_diff_eq!(total, d.bounds.area(), epsilon = 1e-6 * d.bounds.area());
}

#[test]
fn test_internal_vertices_have_degree_three() {
    let sites = random_sites(3, 100, 10.0);
    let d = compute_voronoi(&sites, None);
    for (i, v) in d.vertices.iter().enumerate() {
        if v.kind == VertexKind::Internal {
            assert!(d.vertex_degree(i) >= 3);
        }
    }
}

#[test]
fn test_clipping_law() {
    let sites = random_sites(5, 50, 100.0);
    // Box narrower than the sites: some cells are cut off entirely.
    let bounds = BoundingBox::from_extents(20.0, 30.0, 70.0, 60.0);
    let d = compute_voronoi(&sites, Some(bounds));
    assert!(!d.edges.is_empty());
    for v in &d.vertices {
        assert!(bounds.min.x <= v.position.x && v.position.x <= bounds.max.x);
        assert!(bounds.min.y <= v.position.y && v.position.y <= bounds.max.y);
    }
}

#[test]
fn test_idempotent() {
    let sites = random_sites(9, 70, 30.0);
    let a = compute_voronoi(&sites, None);
    let b = compute_voronoi(&sites, None);
    assert_eq!(a, b);
}

#[test]
fn test_triangle_scenario() {
    let sites = [Point2::new(0.0, 0.0), Point2::new(10.0, 0.0), Point2::new(5.0, 10.0)];
    let bounds = BoundingBox::from_extents(-5.0, -5.0, 15.0, 15.0);
    let d = compute_voronoi(&sites, Some(bounds));

    assert_eq!(d.cells.len(), 3);
    assert_eq!(d.edges.len(), 3);
    assert_eq!(d.internal_vertex_count(), 1);
    let (i, centre) = d
        .vertices
        .iter()
        .enumerate()
        .find(|(_, v)| v.kind == VertexKind::Internal)
        .unwrap();
    assert_abs_diff_eq!(centre.position.x, 5.0, epsilon = 1e-9);
    assert_abs_diff_eq!(centre.position.y, 3.75, epsilon = 1e-9);
    assert_eq!(d.vertex_degree(i), 3);

    let boundary: Vec<_> = d.vertices.iter().filter(|v| v.kind == VertexKind::Boundary).collect();
    assert_eq!(boundary.len(), 3);
    assert!(boundary.iter().any(|v| (v.position.y + 5.0).abs() < 1e-9));
}

#[test]
fn test_collinear_sites() {
    let sites: Vec<Point2> = (0..5).map(|i| Point2::new(i as f64 * 2.0, i as f64)).collect();
    let d = compute_voronoi(&sites, None);
    assert_eq!(d.cells.len(), 5);
    assert_eq!(d.edges.len(), 4);
    assert_eq!(d.internal_vertex_count(), 0);
}

#[test]
fn test_cocircular_grid() {
    let sites: Vec<Point2> = (0..25).map(|i| Point2::new((i % 5) as f64, (i / 5) as f64)).collect();
    let d = compute_voronoi(&sites, None);
    assert_eq!(d.cells.len(), 25);
    assert_eq!(d.internal_vertex_count(), 16);
    assert_eq!(d.edges.len(), 40);
    for (i, v) in d.vertices.iter().enumerate() {
        if v.kind == VertexKind::Internal {
            assert_eq!(d.vertex_degree(i), 4);
        }
    }
    assert_pairs_unique(&d);
}

#[test]
fn test_sweep_and_naive_agree() {
    for seed in 20..25 {
        let sites = random_sites(seed, 40, 10.0);
        let bounds = BoundingBox::from_extents(-1.0, -1.0, 11.0, 11.0);
        let sweep = VoronoiBuilder::new(&sites).bounds(bounds).build().unwrap();
        let naive = VoronoiBuilder::new(&sites)
            .bounds(bounds)
            .settings(VoronoiSettings::default().with_algorithm(Algorithm::Naive))
            .build()
            .unwrap();

        assert_eq!(sweep.vertices.len(), naive.vertices.len());
        assert_eq!(sweep.edges.len(), naive.edges.len());
        for v in &sweep.vertices {
            assert!(naive
                .vertices
                .iter()
                .any(|w| (w.position - v.position).norm() < 1e-6));
        }
    }
}

#[test]
fn test_sweep_and_naive_agree_on_near_equal_heights() {
    // Two lowest sites differ in y by far less than the tolerance.
    let sites = [Point2::new(10.0, 0.0), Point2::new(0.0, 1e-12), Point2::new(3.0, 10.0)];
    let sweep = compute_voronoi_with(&sites, None, &VoronoiSettings::default().with_algorithm(Algorithm::Sweep));
    let naive = compute_voronoi_with(&sites, None, &VoronoiSettings::default().with_algorithm(Algorithm::Naive));

    for d in [&sweep, &naive] {
        assert!(d.failure.is_none());
        assert_eq!(d.edges.len(), 3);
        assert_eq!(d.internal_vertex_count(), 1);
        let centre = d.vertices.iter().find(|v| v.kind == VertexKind::Internal).unwrap();
        assert_abs_diff_eq!(centre.position.x, 5.0, epsilon = 1e-6);
        assert_abs_diff_eq!(centre.position.y, 3.95, epsilon = 1e-6);
    }
}

#[test]
fn test_tiny_tolerance_with_far_sites() {
    let sites = [Point2::new(1e10, 0.0), Point2::new(0.0, 1e10), Point2::new(5.0, 7.0)];
    let settings = VoronoiSettings::default().with_tolerance(Tolerance::new(1e-300));
    let d = compute_voronoi_with(&sites, None, &settings);
    assert!(d.failure.is_none());
    assert_eq!(d.cells.len(), 3);
    assert!(d.merged.is_empty());
}

#[test]
fn test_diagram_far_from_origin() {
    let offset = 1e6;
    let sites = [
        Point2::new(offset, offset),
        Point2::new(offset + 10.0, offset),
        Point2::new(offset + 5.0, offset + 10.0),
    ];
    let bounds = BoundingBox::from_extents(offset - 5.0, offset - 5.0, offset + 15.0, offset + 15.0);
    let d = compute_voronoi(&sites, Some(bounds));

    assert_eq!(d.edges.len(), 3);
    assert_eq!(d.internal_vertex_count(), 1);
    let centre = d.vertices.iter().find(|v| v.kind == VertexKind::Internal).unwrap();
    assert_abs_diff_eq!(centre.position.x, offset + 5.0, epsilon = 1e-6);
    assert_abs_diff_eq!(centre.position.y, offset + 3.75, epsilon = 1e-6);
    assert_eq!(d.sites[1].position, sites[1]);
    for v in &d.vertices {
        assert!(bounds.contains(&v.position, &Tolerance::DEFAULT.scaled(offset)));
    }
}

#[test]
fn test_auto_matches_sweep_on_small_input() {
    let sites = random_sites(42, 6, 10.0);
    let auto = compute_voronoi_with(&sites, None, &VoronoiSettings::default().with_algorithm(Algorithm::Auto));
    let sweep = compute_voronoi(&sites, None);
    assert_eq!(auto.cells.len(), sweep.cells.len());
    assert_eq!(auto.internal_vertex_count(), sweep.internal_vertex_count());
}

#[test]
fn test_square_medial_axis() {
    let axis = compute_medial_axis(&rect(10.0, 10.0), &MedialAxisSettings::default());
    assert!(axis.failure.is_none());

    let junctions = axis.junctions();
    assert_eq!(junctions.len(), 1);
    let centre = &axis.vertices[junctions[0]];
    assert_abs_diff_eq!(centre.position.x, 5.0, epsilon = 1e-6);
    assert_abs_diff_eq!(centre.position.y, 5.0, epsilon = 1e-6);
    assert_abs_diff_eq!(centre.radius, 5.0, epsilon = 1e-6);

    assert_eq!(axis.leaves().len(), 4);
    assert_eq!(axis.branches.len(), 4);
    for branch in &axis.branches {
        assert_abs_diff_eq!(branch.length, 50f64.sqrt(), epsilon = 1e-6);
    }
}

#[test]
fn test_rectangle_prunes_to_single_axis() {
    let poly = rect(100.0, 10.0);
    let settings = MedialAxisSettings::default().with_prune_threshold(8.0);
    let axis = compute_medial_axis(&poly, &settings);
    assert!(axis.failure.is_none());

    assert_eq!(axis.branches.len(), 1);
    assert_eq!(axis.leaves().len(), 2);
    assert!(axis.junctions().is_empty());
    assert_abs_diff_eq!(axis.total_length(), 90.0, epsilon = 1e-6);
    for v in &axis.vertices {
        assert_abs_diff_eq!(v.position.y, 5.0, epsilon = 1e-6);
        assert_abs_diff_eq!(v.radius, 5.0, epsilon = 1e-6);
    }
}

#[test]
fn test_rectangle_keeps_corners_below_threshold() {
    let axis = compute_medial_axis(&rect(100.0, 10.0), &MedialAxisSettings::default());
    assert_eq!(axis.junctions().len(), 2);
    assert_eq!(axis.leaves().len(), 4);
    assert_eq!(axis.branches.len(), 5);
}

#[test]
fn test_skeleton_inside_polygon() {
    // L-shaped pocket with a reflex corner.
    let poly = vec![
        Point2::new(0.0, 0.0),
        Point2::new(20.0, 0.0),
        Point2::new(20.0, 8.0),
        Point2::new(8.0, 8.0),
        Point2::new(8.0, 20.0),
        Point2::new(0.0, 20.0),
    ];
    let axis = compute_medial_axis(&poly, &MedialAxisSettings::default());
    assert!(axis.failure.is_none());
    assert!(!axis.branches.is_empty());
    // The widest disk touches both outer edges of the corner block and the
    // reflex vertex: r = 8 / (1 + 1/sqrt(2)).
    let widest = 8.0 / (1.0 + 0.5f64.sqrt());
    let tol = Tolerance::DEFAULT.scaled(20.0);
    for v in &axis.vertices {
        assert!(point_in_polygon(&v.position, &poly, &tol));
        assert_abs_diff_eq!(v.radius, distance_to_boundary(&v.position, &poly), epsilon = 1e-12);
        assert!(v.radius <= widest + 1e-6);
    }
    assert!(axis.max_radius() > 4.0);
}

#[test]
fn test_clockwise_polygon_matches_counter_clockwise() {
    let ccw = rect(10.0, 10.0);
    let mut cw = ccw.clone();
    cw.reverse();
    let settings = MedialAxisSettings::default();
    let a = compute_medial_axis(&ccw, &settings);
    let b = compute_medial_axis(&cw, &settings);
    assert_eq!(a.junctions().len(), b.junctions().len());
    assert_abs_diff_eq!(a.total_length(), b.total_length(), epsilon = 1e-6);
}

#[test]
fn test_translated_polygon_keeps_skeleton() {
    let settings = MedialAxisSettings::default();
    let base = compute_medial_axis(&rect(10.0, 10.0), &settings);
    for offset in [1e3, 1e4, 1e5] {
        let moved: Vec<Point2> = rect(10.0, 10.0)
            .iter()
            .map(|p| Point2::new(p.x + offset, p.y + offset))
            .collect();
        let axis = compute_medial_axis(&moved, &settings);
        assert!(axis.failure.is_none());
        assert_eq!(axis.junctions().len(), 1);
        assert_eq!(axis.branches.len(), base.branches.len());
        assert_abs_diff_eq!(axis.total_length(), base.total_length(), epsilon = 1e-6);

        let centre = &axis.vertices[axis.junctions()[0]];
        assert_abs_diff_eq!(centre.position.x, offset + 5.0, epsilon = 1e-6);
        assert_abs_diff_eq!(centre.position.y, offset + 5.0, epsilon = 1e-6);
        assert_abs_diff_eq!(centre.radius, 5.0, epsilon = 1e-6);
    }
}

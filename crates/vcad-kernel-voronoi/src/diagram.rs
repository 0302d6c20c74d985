//! Voronoi diagram value types and queries.

use serde::{Deserialize, Serialize};
use vcad_kernel_math::{Point2, Tolerance};

use crate::bounds::BoundingBox;
use crate::error::{Failure, VoronoiError};
use crate::geometry::distance_sq;
use crate::merge::PointIndex;

/// Identifier of an input site: its index in the caller's point list.
pub type SiteId = usize;
/// Index into [`Diagram::vertices`].
pub type VertexId = usize;
/// Index into [`Diagram::edges`].
pub type EdgeId = usize;

/// An input point seeding one cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Site {
    /// Stable identifier (index in the input list).
    pub id: SiteId,
    /// Location.
    pub position: Point2,
}

/// Where a diagram vertex came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VertexKind {
    /// Equidistant from three or more sites.
    Internal,
    /// Created where an edge meets the bounding box.
    Boundary,
}

/// A diagram vertex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    /// Location.
    pub position: Point2,
    /// Origin of the vertex.
    pub kind: VertexKind,
}

/// A diagram edge: a piece of the bisector between two sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// First endpoint.
    pub start: VertexId,
    /// Second endpoint.
    pub end: VertexId,
    /// The two sites this edge separates.
    pub sites: (SiteId, SiteId),
}

impl Edge {
    /// Check if this edge separates the cells of `a` and `b`.
    pub fn separates(&self, a: SiteId, b: SiteId) -> bool {
        self.sites == (a, b) || self.sites == (b, a)
    }

    /// The site across this edge from `site`.
    pub fn other_site(&self, site: SiteId) -> Option<SiteId> {
        if self.sites.0 == site {
            Some(self.sites.1)
        } else if self.sites.1 == site {
            Some(self.sites.0)
        } else {
            None
        }
    }
}

/// The region closer to one site than to any other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Owning site.
    pub site: SiteId,
    /// Boundary edges, counter-clockwise around the site.
    pub edges: Vec<EdgeId>,
}

/// A Voronoi diagram clipped to a bounding box.
///
/// Built fresh per call and owned by the caller. When the input could not be
/// diagrammed the geometry is empty and [`Diagram::failure`] says why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    /// Distinct sites, in input order.
    pub sites: Vec<Site>,
    /// Box every edge was clipped to.
    pub bounds: BoundingBox,
    /// Vertices.
    pub vertices: Vec<Vertex>,
    /// Edges.
    pub edges: Vec<Edge>,
    /// One cell per entry of `sites`, in the same order.
    pub cells: Vec<Cell>,
    /// Near-duplicate inputs folded away as `(dropped, kept)` pairs.
    pub merged: Vec<(SiteId, SiteId)>,
    /// Empty-result marker.
    pub failure: Option<Failure>,
}

impl Diagram {
    /// Empty diagram carrying the reason it could not be built.
    pub fn failed(err: VoronoiError) -> Self {
        Self {
            sites: Vec::new(),
            bounds: BoundingBox::default(),
            vertices: Vec::new(),
            edges: Vec::new(),
            cells: Vec::new(),
            merged: Vec::new(),
            failure: Some(err.into()),
        }
    }

    /// Check if the diagram has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn dense_index(&self, id: SiteId) -> Option<usize> {
        self.sites.binary_search_by_key(&id, |s| s.id).ok()
    }

    /// Look up a site by id.
    pub fn site(&self, id: SiteId) -> Option<&Site> {
        self.dense_index(id).map(|i| &self.sites[i])
    }

    /// Cell of a site.
    pub fn cell(&self, id: SiteId) -> Option<&Cell> {
        self.dense_index(id).map(|i| &self.cells[i])
    }

    /// Endpoints of an edge.
    pub fn edge_segment(&self, edge: EdgeId) -> (Point2, Point2) {
        let e = &self.edges[edge];
        (self.vertices[e.start].position, self.vertices[e.end].position)
    }

    /// Number of edges incident to a vertex.
    pub fn vertex_degree(&self, vertex: VertexId) -> usize {
        self.edges
            .iter()
            .filter(|e| e.start == vertex || e.end == vertex)
            .count()
    }

    /// Number of vertices equidistant from three or more sites.
    pub fn internal_vertex_count(&self) -> usize {
        self.vertices
            .iter()
            .filter(|v| v.kind == VertexKind::Internal)
            .count()
    }

    /// Sites whose cells share an edge with the cell of `id`.
    pub fn neighbors(&self, id: SiteId) -> Vec<SiteId> {
        let Some(cell) = self.cell(id) else {
            return Vec::new();
        };
        cell.edges
            .iter()
            .filter_map(|&e| self.edges[e].other_site(id))
            .collect()
    }

    /// Site closest to `p` (lowest id on ties).
    pub fn nearest_site(&self, p: &Point2) -> Option<SiteId> {
        self.sites
            .iter()
            .map(|s| (s.id, distance_sq(&s.position, p)))
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
            .map(|(id, _)| id)
    }

    /// Closed outline of a cell within the bounding box, counter-clockwise.
    ///
    /// Made of the cell's edge endpoints plus every box corner that lies in
    /// the cell.
    pub fn cell_polygon(&self, cell: &Cell) -> Vec<Point2> {
        let Some(site) = self.site(cell.site) else {
            return Vec::new();
        };
        let tol = Tolerance::DEFAULT.scaled(self.bounds.magnitude());
        let mut index = PointIndex::new(tol.linear);
        let mut points = Vec::new();

        let mut push = |p: Point2, points: &mut Vec<Point2>| {
            if index.insert(p).1 {
                points.push(p);
            }
        };

        for &e in &cell.edges {
            let (a, b) = self.edge_segment(e);
            push(a, &mut points);
            push(b, &mut points);
        }

        for corner in self.bounds.corners() {
            let d = distance_sq(&site.position, &corner).sqrt();
            let nearest = self
                .sites
                .iter()
                .map(|s| distance_sq(&s.position, &corner).sqrt())
                .fold(f64::INFINITY, f64::min);
            if d <= nearest + tol.linear {
                push(corner, &mut points);
            }
        }

        if points.len() < 3 {
            return points;
        }

        let n = points.len() as f64;
        let center = Point2::new(
            points.iter().map(|p| p.x).sum::<f64>() / n,
            points.iter().map(|p| p.y).sum::<f64>() / n,
        );
        points.sort_by(|a, b| {
            let ta = (a.y - center.y).atan2(a.x - center.x);
            let tb = (b.y - center.y).atan2(b.x - center.x);
            ta.total_cmp(&tb)
        });
        points
    }
}

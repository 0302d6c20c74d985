//! Medial axis (skeleton) of simple polygons.
//!
//! The outline is sampled densely, the Voronoi diagram of the samples is
//! built, and the interior bisectors between non-adjacent samples are kept.
//! What remains approximates the locus of centres of maximal inscribed
//! disks. Short spurs caused by sampling are pruned before the graph is
//! returned.

mod extract;
mod graph;

pub(crate) use extract::{extract, polygon_tolerance, prepare_polygon, resolve_step};

use serde::{Deserialize, Serialize};
use vcad_kernel_math::{Point2, Vec2};

use crate::error::{Failure, VoronoiError};

/// A vertex of the skeleton graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedialVertex {
    /// Location.
    pub position: Point2,
    /// Distance to the nearest polygon edge (local feature size).
    pub radius: f64,
    /// Adjacent vertices, ascending.
    pub neighbors: Vec<usize>,
}

impl MedialVertex {
    /// Number of incident skeleton edges.
    pub fn degree(&self) -> usize {
        self.neighbors.len()
    }
}

/// A maximal chain of degree-2 vertices between two vertices of other
/// degree (or around a cycle, where `start == end`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    /// First vertex.
    pub start: usize,
    /// Last vertex.
    pub end: usize,
    /// Every vertex along the chain, `start` and `end` included.
    pub path: Vec<usize>,
    /// Polyline length.
    pub length: f64,
}

/// Pruned skeleton of a polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedialAxis {
    /// Skeleton vertices.
    pub vertices: Vec<MedialVertex>,
    /// Branches covering every skeleton edge exactly once.
    pub branches: Vec<Branch>,
    /// Boundary sampling distance that was used.
    pub step: f64,
    /// Leaf-branch length below which spurs were removed.
    pub prune_threshold: f64,
    /// Empty-result marker.
    pub failure: Option<Failure>,
}

impl MedialAxis {
    /// Empty skeleton carrying the reason it could not be built.
    pub fn failed(err: VoronoiError) -> Self {
        Self {
            vertices: Vec::new(),
            branches: Vec::new(),
            step: 0.0,
            prune_threshold: 0.0,
            failure: Some(err.into()),
        }
    }

    /// Check if the skeleton has no vertices.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Sum of all branch lengths.
    pub fn total_length(&self) -> f64 {
        self.branches.iter().map(|b| b.length).sum()
    }

    /// Vertices where three or more branches meet.
    pub fn junctions(&self) -> Vec<usize> {
        self.vertices_where(|v| v.degree() >= 3)
    }

    /// Branch tips.
    pub fn leaves(&self) -> Vec<usize> {
        self.vertices_where(|v| v.degree() == 1)
    }

    fn vertices_where(&self, pred: impl Fn(&MedialVertex) -> bool) -> Vec<usize> {
        self.vertices
            .iter()
            .enumerate()
            .filter(|(_, v)| pred(v))
            .map(|(i, _)| i)
            .collect()
    }

    /// Positions along a branch.
    pub fn polyline(&self, branch: &Branch) -> Vec<Point2> {
        branch.path.iter().map(|&v| self.vertices[v].position).collect()
    }

    /// Largest inscribed-disk radius over the skeleton.
    pub fn max_radius(&self) -> f64 {
        self.vertices.iter().map(|v| v.radius).fold(0.0, f64::max)
    }

    /// The same skeleton moved by `offset`. Radii are unchanged.
    pub(crate) fn translated(mut self, offset: Vec2) -> Self {
        for v in &mut self.vertices {
            v.position += offset;
        }
        self
    }
}

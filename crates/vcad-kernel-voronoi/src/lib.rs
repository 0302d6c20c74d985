#![warn(missing_docs)]

//! Planar Voronoi diagrams and polygon medial axes for vcad.
//!
//! Diagrams are built with Fortune's sweep (or, for tiny inputs, a capped
//! quadratic half-plane construction), clipped to a bounding box and
//! returned as plain data owned by the caller. The medial axis of a simple
//! polygon is extracted from the diagram of densely sampled boundary
//! points, then pruned of sampling spurs.
//!
//! # Example
//!
//! ```
//! use vcad_kernel_math::Point2;
//! use vcad_kernel_voronoi::{compute_medial_axis, compute_voronoi, BoundingBox, MedialAxisSettings};
//!
//! let sites = [Point2::new(0.0, 0.0), Point2::new(10.0, 0.0), Point2::new(5.0, 10.0)];
//! let diagram = compute_voronoi(&sites, Some(BoundingBox::from_extents(-5.0, -5.0, 15.0, 15.0)));
//! assert_eq!(diagram.cells.len(), 3);
//! assert_eq!(diagram.internal_vertex_count(), 1);
//!
//! let square = [
//!     Point2::new(0.0, 0.0),
//!     Point2::new(10.0, 0.0),
//!     Point2::new(10.0, 10.0),
//!     Point2::new(0.0, 10.0),
//! ];
//! let axis = compute_medial_axis(&square, &MedialAxisSettings::default());
//! assert_eq!(axis.junctions().len(), 1);
//! assert_eq!(axis.leaves().len(), 4);
//! ```

pub mod api;
mod assemble;
mod beachline;
pub mod bounds;
mod clip;
pub mod diagram;
pub mod discretize;
pub mod error;
mod events;
pub mod geometry;
pub mod medial;
mod merge;
mod naive;
mod sweep;

pub use api::{
    compute_medial_axis, compute_voronoi, compute_voronoi_with, Algorithm, MedialAxisBuilder, MedialAxisSettings,
    VoronoiBuilder, VoronoiSettings, AUTO_NAIVE_THRESHOLD,
};
pub use bounds::BoundingBox;
pub use diagram::{Cell, Diagram, Edge, EdgeId, Site, SiteId, Vertex, VertexId, VertexKind};
pub use discretize::{discretize, BoundarySample};
pub use error::{Failure, ReasonCode, Result, VoronoiError};
pub use medial::{Branch, MedialAxis, MedialVertex};
pub use naive::NAIVE_MAX_SITES;

//! Turns builder output into a [`Diagram`].
//!
//! Both builders hand over raw bisector pieces indexed by dense site
//! position. Assembly clips them to the box, snaps coincident endpoints to
//! shared vertices, drops zero-length and duplicate edges, and orders each
//! cell's edges counter-clockwise around its site.

use std::collections::HashSet;

use vcad_kernel_math::{midpoint, Tolerance};

use crate::bounds::BoundingBox;
use crate::clip::{clip_edge, EdgeLine};
use crate::diagram::{Cell, Diagram, Edge, Site, SiteId, Vertex, VertexKind};
use crate::merge::PointIndex;

pub(crate) fn assemble(
    sites: Vec<Site>,
    merged: Vec<(SiteId, SiteId)>,
    lines: &[EdgeLine],
    bounds: BoundingBox,
    tol: &Tolerance,
) -> Diagram {
    let mut index = PointIndex::new(tol.linear);
    let mut edges = Vec::with_capacity(lines.len());
    let mut seen = HashSet::new();
    let mut dropped = 0usize;

    for line in lines {
        let Some((a, b)) = clip_edge(line, &bounds, tol) else {
            dropped += 1;
            continue;
        };
        let (start, _) = index.insert(a);
        let (end, _) = index.insert(b);
        if start == end || !seen.insert((start.min(end), start.max(end))) {
            dropped += 1;
            continue;
        }
        edges.push(Edge {
            start,
            end,
            sites: (sites[line.sites.0].id, sites[line.sites.1].id),
        });
    }

    let vertices: Vec<Vertex> = (0..index.len())
        .map(|i| {
            let position = index.point(i);
            let kind = if bounds.on_border(&position, tol) {
                VertexKind::Boundary
            } else {
                VertexKind::Internal
            };
            Vertex { position, kind }
        })
        .collect();

    let mut cells: Vec<Cell> = sites
        .iter()
        .map(|s| Cell {
            site: s.id,
            edges: Vec::new(),
        })
        .collect();
    for (id, edge) in edges.iter().enumerate() {
        for site in [edge.sites.0, edge.sites.1] {
            if let Ok(i) = sites.binary_search_by_key(&site, |s| s.id) {
                cells[i].edges.push(id);
            }
        }
    }
    for (cell, site) in cells.iter_mut().zip(&sites) {
        let angle = |e: usize| {
            let m = midpoint(&vertices[edges[e].start].position, &vertices[edges[e].end].position);
            (m.y - site.position.y).atan2(m.x - site.position.x)
        };
        cell.edges.sort_by(|&a, &b| angle(a).total_cmp(&angle(b)));
    }

    log::debug!(
        "assembled {} vertices, {} edges, {} cells ({} pieces dropped)",
        vertices.len(),
        edges.len(),
        cells.len(),
        dropped
    );

    Diagram {
        sites,
        bounds,
        vertices,
        edges,
        cells,
        merged,
        failure: None,
    }
}

//! Boundary sampling of polygons.

use serde::{Deserialize, Serialize};
use vcad_kernel_math::{lerp, Point2};

use crate::geometry::{distance, polygon_edges};

/// A point on the polygon outline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundarySample {
    /// Location on the outline.
    pub position: Point2,
    /// Index of the polygon edge the sample lies on (edge `i` runs from
    /// vertex `i` to vertex `i + 1`).
    pub edge: usize,
}

/// Sample a closed polygon at spacing no larger than `step`.
///
/// Each edge contributes its start vertex followed by evenly spaced
/// interior points, so polygon corners are always samples. Zero-length
/// edges contribute nothing.
pub fn discretize(polygon: &[Point2], step: f64) -> Vec<BoundarySample> {
    if polygon.len() < 2 || step.is_nan() || step <= 0.0 {
        return Vec::new();
    }
    let mut samples = Vec::new();
    for (edge, (a, b)) in polygon_edges(polygon).enumerate() {
        let len = distance(a, b);
        if len == 0.0 {
            continue;
        }
        let segments = ((len / step) - 1e-9).ceil().max(1.0) as usize;
        for k in 0..segments {
            let t = k as f64 / segments as f64;
            samples.push(BoundarySample {
                position: lerp(a, b, t),
                edge,
            });
        }
    }
    samples
}

//! Snapping of coincident points.
//!
//! A uniform hash grid with cell size equal to the merge radius; a query
//! only inspects the 3×3 block of cells around the point.

use std::collections::HashMap;

use vcad_kernel_math::Point2;

/// Index that maps points closer than `radius` onto one representative.
#[derive(Debug)]
pub(crate) struct PointIndex {
    radius: f64,
    cells: HashMap<(i64, i64), Vec<usize>>,
    points: Vec<Point2>,
}

impl PointIndex {
    pub(crate) fn new(radius: f64) -> Self {
        Self {
            radius: radius.max(f64::MIN_POSITIVE),
            cells: HashMap::new(),
            points: Vec::new(),
        }
    }

    // Casts saturate, so far-off points share the outermost cells.
    fn key(&self, p: &Point2) -> (i64, i64) {
        (
            (p.x / self.radius).floor() as i64,
            (p.y / self.radius).floor() as i64,
        )
    }

    /// Representative within `radius` of `p`, if any.
    pub(crate) fn find(&self, p: &Point2) -> Option<usize> {
        let (kx, ky) = self.key(p);
        let mut best: Option<(usize, f64)> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(bucket) = self.cells.get(&(kx.saturating_add(dx), ky.saturating_add(dy))) else {
                    continue;
                };
                for &idx in bucket {
                    let d = (self.points[idx] - p).norm();
                    if d <= self.radius && best.map_or(true, |(_, bd)| d < bd) {
                        best = Some((idx, d));
                    }
                }
            }
        }
        best.map(|(idx, _)| idx)
    }

    /// Return the representative for `p`, inserting `p` if it has none.
    ///
    /// The flag is `true` when `p` was inserted as a new representative.
    pub(crate) fn insert(&mut self, p: Point2) -> (usize, bool) {
        if let Some(idx) = self.find(&p) {
            return (idx, false);
        }
        let idx = self.points.len();
        self.points.push(p);
        let key = self.key(&p);
        self.cells.entry(key).or_default().push(idx);
        (idx, true)
    }

    pub(crate) fn len(&self) -> usize {
        self.points.len()
    }

    pub(crate) fn point(&self, idx: usize) -> Point2 {
        self.points[idx]
    }
}

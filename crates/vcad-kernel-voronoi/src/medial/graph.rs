//! Mutable skeleton graph used while cleaning up the raw bisectors.

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

use vcad_kernel_math::Point2;

use super::{Branch, MedialAxis, MedialVertex};
use crate::geometry::{distance, distance_to_boundary};
use crate::merge::PointIndex;

#[derive(Debug)]
pub(crate) struct SkeletonGraph {
    index: PointIndex,
    adj: Vec<BTreeSet<usize>>,
}

/// A leaf chain: the path from a tip to where it stops, and its length.
type Walk = (Vec<usize>, f64);

impl SkeletonGraph {
    /// Vertices closer than `merge_radius` are treated as one.
    pub(crate) fn new(merge_radius: f64) -> Self {
        Self {
            index: PointIndex::new(merge_radius),
            adj: Vec::new(),
        }
    }

    fn vertex(&mut self, p: Point2) -> usize {
        let (v, fresh) = self.index.insert(p);
        if fresh {
            self.adj.push(BTreeSet::new());
        }
        v
    }

    fn point(&self, v: usize) -> Point2 {
        self.index.point(v)
    }

    pub(crate) fn degree(&self, v: usize) -> usize {
        self.adj[v].len()
    }

    pub(crate) fn edge_count(&self) -> usize {
        self.adj.iter().map(BTreeSet::len).sum::<usize>() / 2
    }

    /// Add the segment `a`–`b`, snapping both ends onto existing vertices.
    pub(crate) fn add_edge(&mut self, a: Point2, b: Point2) {
        let (u, v) = (self.vertex(a), self.vertex(b));
        self.link(u, v);
    }

    fn link(&mut self, u: usize, v: usize) {
        if u != v {
            self.adj[u].insert(v);
            self.adj[v].insert(u);
        }
    }

    fn unlink(&mut self, u: usize, v: usize) {
        self.adj[u].remove(&v);
        self.adj[v].remove(&u);
    }

    fn leaves(&self) -> Vec<usize> {
        (0..self.adj.len()).filter(|&v| self.degree(v) == 1).collect()
    }

    /// Follow degree-2 vertices from `start` through `first` until a vertex
    /// of another degree is reached (or the walk closes on itself).
    fn walk(&self, start: usize, first: usize) -> Walk {
        let mut path = vec![start];
        let mut length = 0.0;
        let (mut prev, mut cur) = (start, first);
        loop {
            length += distance(&self.point(prev), &self.point(cur));
            path.push(cur);
            if cur == start || self.degree(cur) != 2 {
                break;
            }
            match self.adj[cur].iter().copied().find(|&n| n != prev) {
                Some(next) => (prev, cur) = (cur, next),
                None => break,
            }
        }
        (path, length)
    }

    /// Connect tips that stop short of a convex polygon corner to the
    /// corner itself. Returns the number of extensions made.
    pub(crate) fn extend_to_corners(&mut self, corners: &[Point2], reach: f64) -> usize {
        let mut extended = 0;
        for leaf in self.leaves() {
            let p = self.point(leaf);
            let nearest = corners
                .iter()
                .map(|c| (*c, distance(&p, c)))
                .filter(|&(_, d)| d <= reach)
                .min_by(|a, b| a.1.total_cmp(&b.1));
            let Some((corner, _)) = nearest else {
                continue;
            };
            let v = self.vertex(corner);
            if v != leaf && !self.adj[leaf].contains(&v) {
                self.link(leaf, v);
                extended += 1;
            }
        }
        extended
    }

    /// Remove leaf branches shorter than `threshold`.
    ///
    /// All qualifying branches of a round go at once, then the graph is
    /// re-examined, so a junction that loses its spurs merges its remaining
    /// two chains before the next round. Chains joining two tips are left
    /// alone, and a junction is never stripped of every branch: the longest
    /// one survives. Returns the number of branches removed.
    pub(crate) fn prune(&mut self, threshold: f64) -> usize {
        let mut removed = 0;
        loop {
            let mut spurs: BTreeMap<usize, Vec<Walk>> = BTreeMap::new();
            for leaf in self.leaves() {
                let Some(&first) = self.adj[leaf].iter().next() else {
                    continue;
                };
                let (path, length) = self.walk(leaf, first);
                let Some(&end) = path.last() else {
                    continue;
                };
                if self.degree(end) >= 3 && length < threshold {
                    spurs.entry(end).or_default().push((path, length));
                }
            }
            if spurs.is_empty() {
                break;
            }

            for (junction, mut walks) in spurs {
                if walks.len() >= self.degree(junction) {
                    walks.sort_by(|a, b| a.1.total_cmp(&b.1));
                    walks.pop();
                }
                for (path, _) in walks {
                    for pair in path.windows(2) {
                        self.unlink(pair[0], pair[1]);
                    }
                    removed += 1;
                }
            }
            log::trace!("prune round: {removed} spurs removed so far");
        }
        removed
    }

    /// Components as vertex lists, with their total edge length.
    fn components(&self) -> Vec<(Vec<usize>, f64)> {
        let mut seen = vec![false; self.adj.len()];
        let mut out = Vec::new();
        for root in 0..self.adj.len() {
            if seen[root] || self.degree(root) == 0 {
                continue;
            }
            seen[root] = true;
            let mut queue = VecDeque::from([root]);
            let mut members = Vec::new();
            let mut length = 0.0;
            while let Some(v) = queue.pop_front() {
                members.push(v);
                for &n in &self.adj[v] {
                    if v < n {
                        length += distance(&self.point(v), &self.point(n));
                    }
                    if !seen[n] {
                        seen[n] = true;
                        queue.push_back(n);
                    }
                }
            }
            out.push((members, length));
        }
        out
    }

    /// Drop isolated tip-to-tip chains shorter than `threshold`, except the
    /// longest component of the graph.
    pub(crate) fn drop_short_components(&mut self, threshold: f64) -> usize {
        let components = self.components();
        let longest = components
            .iter()
            .enumerate()
            .max_by(|a, b| a.1 .1.total_cmp(&b.1 .1))
            .map(|(i, _)| i);

        let mut dropped = 0;
        for (i, (members, length)) in components.iter().enumerate() {
            let is_chain = members.iter().all(|&v| self.degree(v) <= 2)
                && members.iter().any(|&v| self.degree(v) == 1);
            if Some(i) == longest || !is_chain || *length >= threshold {
                continue;
            }
            for &v in members {
                for n in std::mem::take(&mut self.adj[v]) {
                    self.adj[n].remove(&v);
                }
            }
            dropped += 1;
        }
        dropped
    }

    /// Compact the surviving vertices into a [`MedialAxis`].
    pub(crate) fn into_medial_axis(self, polygon: &[Point2], step: f64, prune_threshold: f64) -> MedialAxis {
        let mut remap = vec![usize::MAX; self.adj.len()];
        let mut vertices = Vec::new();
        for v in 0..self.adj.len() {
            if self.degree(v) > 0 {
                remap[v] = vertices.len();
                let position = self.point(v);
                vertices.push(MedialVertex {
                    position,
                    radius: distance_to_boundary(&position, polygon),
                    neighbors: Vec::new(),
                });
            }
        }
        for v in 0..self.adj.len() {
            if remap[v] == usize::MAX {
                continue;
            }
            // Ascending order is preserved: remap is monotonic.
            vertices[remap[v]].neighbors = self.adj[v].iter().map(|&n| remap[n]).collect();
        }

        let branches = collect_branches(&vertices);
        MedialAxis {
            vertices,
            branches,
            step,
            prune_threshold,
            failure: None,
        }
    }
}

fn edge_key(a: usize, b: usize) -> (usize, usize) {
    (a.min(b), a.max(b))
}

/// Split the graph into maximal degree-2 chains.
fn collect_branches(vertices: &[MedialVertex]) -> Vec<Branch> {
    let mut visited = HashSet::new();
    let mut branches = Vec::new();

    let trace = |start: usize, first: usize, visited: &mut HashSet<(usize, usize)>| {
        let mut path = vec![start];
        let mut length = 0.0;
        let (mut prev, mut cur) = (start, first);
        loop {
            visited.insert(edge_key(prev, cur));
            length += distance(&vertices[prev].position, &vertices[cur].position);
            path.push(cur);
            if cur == start || vertices[cur].degree() != 2 {
                break;
            }
            let next = vertices[cur]
                .neighbors
                .iter()
                .copied()
                .find(|&n| n != prev && !visited.contains(&edge_key(cur, n)));
            match next {
                Some(n) => (prev, cur) = (cur, n),
                None => break,
            }
        }
        Branch {
            start,
            end: cur,
            path,
            length,
        }
    };

    // Chains anchored at tips and junctions first, then pure cycles.
    let anchored = (0..vertices.len()).filter(|&v| vertices[v].degree() != 2);
    let cyclic = (0..vertices.len()).filter(|&v| vertices[v].degree() == 2);
    for v in anchored.chain(cyclic) {
        for &n in &vertices[v].neighbors {
            if !visited.contains(&edge_key(v, n)) {
                branches.push(trace(v, n, &mut visited));
            }
        }
    }
    branches
}

//! Beach line for the sweep.
//!
//! Arcs live in a slot map and are threaded two ways: a doubly linked list
//! in left-to-right order for O(1) neighbour access, and a treap whose
//! in-order traversal is the same order. The treap has no stored keys;
//! searches compare against breakpoint positions evaluated at the current
//! sweep coordinate, which keeps every lookup, insertion and removal at
//! O(log n) expected.

use slotmap::{new_key_type, SlotMap};
use vcad_kernel_math::{Point2, Tolerance};

use crate::events::EventId;

new_key_type! {
    /// Handle to an arc on the beach line.
    pub(crate) struct ArcKey;
}

/// One parabolic arc of the beach line.
#[derive(Debug, Clone)]
pub(crate) struct Arc {
    /// Index of the site whose parabola this arc is part of.
    pub site: usize,
    /// Left neighbour.
    pub prev: Option<ArcKey>,
    /// Right neighbour.
    pub next: Option<ArcKey>,
    /// Edge traced by the breakpoint between this arc and `next`.
    pub edge: Option<usize>,
    /// Pending circle event that would remove this arc.
    pub event: Option<EventId>,
    left: Option<ArcKey>,
    right: Option<ArcKey>,
    parent: Option<ArcKey>,
    priority: u64,
}

#[derive(Debug, Default)]
pub(crate) struct BeachLine {
    arcs: SlotMap<ArcKey, Arc>,
    root: Option<ArcKey>,
    counter: u64,
}

impl BeachLine {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.arcs.len()
    }

    pub(crate) fn get(&self, key: ArcKey) -> Option<&Arc> {
        self.arcs.get(key)
    }

    pub(crate) fn arc(&self, key: ArcKey) -> &Arc {
        &self.arcs[key]
    }

    pub(crate) fn arc_mut(&mut self, key: ArcKey) -> &mut Arc {
        &mut self.arcs[key]
    }

    /// Leftmost arc.
    pub(crate) fn first(&self) -> Option<ArcKey> {
        let mut node = self.root?;
        while let Some(left) = self.arcs[node].left {
            node = left;
        }
        Some(node)
    }

    /// Arcs in left-to-right order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = ArcKey> + '_ {
        std::iter::successors(self.first(), move |&k| self.arcs[k].next)
    }

    // splitmix64 over a counter: deterministic, so repeated builds on the
    // same input produce the same tree shape.
    fn next_priority(&mut self) -> u64 {
        self.counter = self.counter.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.counter;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn new_arc(&mut self, site: usize) -> ArcKey {
        let priority = self.next_priority();
        self.arcs.insert(Arc {
            site,
            prev: None,
            next: None,
            edge: None,
            event: None,
            left: None,
            right: None,
            parent: None,
            priority,
        })
    }

    /// Start the beach line with a single arc.
    pub(crate) fn insert_first(&mut self, site: usize) -> ArcKey {
        debug_assert!(self.root.is_none());
        let key = self.new_arc(site);
        self.root = Some(key);
        key
    }

    /// Insert a new arc for `site` immediately right of `at`.
    pub(crate) fn insert_after(&mut self, at: ArcKey, site: usize) -> ArcKey {
        let key = self.new_arc(site);

        // Tree position: right child of `at`, or the left child of the
        // leftmost node in `at`'s right subtree.
        match self.arcs[at].right {
            None => {
                self.arcs[at].right = Some(key);
                self.arcs[key].parent = Some(at);
            }
            Some(mut node) => {
                while let Some(left) = self.arcs[node].left {
                    node = left;
                }
                self.arcs[node].left = Some(key);
                self.arcs[key].parent = Some(node);
            }
        }

        // List position.
        let next = self.arcs[at].next;
        self.arcs[key].prev = Some(at);
        self.arcs[key].next = next;
        if let Some(next) = next {
            self.arcs[next].prev = Some(key);
        }
        self.arcs[at].next = Some(key);

        while let Some(parent) = self.arcs[key].parent {
            if self.arcs[parent].priority >= self.arcs[key].priority {
                break;
            }
            self.rotate_up(key);
        }
        key
    }

    /// Remove an arc, relinking its neighbours.
    pub(crate) fn remove(&mut self, key: ArcKey) -> Option<Arc> {
        if !self.arcs.contains_key(key) {
            return None;
        }

        // Rotate down until the node is a leaf.
        loop {
            let (left, right) = (self.arcs[key].left, self.arcs[key].right);
            let child = match (left, right) {
                (None, None) => break,
                (Some(c), None) | (None, Some(c)) => c,
                (Some(l), Some(r)) => {
                    if self.arcs[l].priority > self.arcs[r].priority {
                        l
                    } else {
                        r
                    }
                }
            };
            self.rotate_up(child);
        }

        match self.arcs[key].parent {
            None => self.root = None,
            Some(parent) => {
                if self.arcs[parent].left == Some(key) {
                    self.arcs[parent].left = None;
                } else {
                    self.arcs[parent].right = None;
                }
            }
        }

        let (prev, next) = (self.arcs[key].prev, self.arcs[key].next);
        if let Some(prev) = prev {
            self.arcs[prev].next = next;
        }
        if let Some(next) = next {
            self.arcs[next].prev = prev;
        }

        self.arcs.remove(key)
    }

    /// Rotate `x` above its parent, preserving in-order sequence.
    fn rotate_up(&mut self, x: ArcKey) {
        let Some(p) = self.arcs[x].parent else {
            return;
        };
        let g = self.arcs[p].parent;

        if self.arcs[p].left == Some(x) {
            let moved = self.arcs[x].right;
            self.arcs[p].left = moved;
            if let Some(m) = moved {
                self.arcs[m].parent = Some(p);
            }
            self.arcs[x].right = Some(p);
        } else {
            let moved = self.arcs[x].left;
            self.arcs[p].right = moved;
            if let Some(m) = moved {
                self.arcs[m].parent = Some(p);
            }
            self.arcs[x].left = Some(p);
        }
        self.arcs[p].parent = Some(x);
        self.arcs[x].parent = g;

        match g {
            None => self.root = Some(x),
            Some(g) => {
                if self.arcs[g].left == Some(p) {
                    self.arcs[g].left = Some(x);
                } else {
                    self.arcs[g].right = Some(x);
                }
            }
        }
    }

    /// Arc vertically above `x` when the sweep is at `sweep_y`.
    pub(crate) fn locate(&self, x: f64, sweep_y: f64, sites: &[Point2], tol: &Tolerance) -> Option<ArcKey> {
        let mut node = self.root?;
        loop {
            let arc = &self.arcs[node];
            let site = &sites[arc.site];

            if let Some(prev) = arc.prev {
                let left_x = breakpoint_x(&sites[self.arcs[prev].site], site, sweep_y, tol);
                if x < left_x {
                    match arc.left {
                        Some(left) => {
                            node = left;
                            continue;
                        }
                        None => return Some(node),
                    }
                }
            }
            if let Some(next) = arc.next {
                let right_x = breakpoint_x(site, &sites[self.arcs[next].site], sweep_y, tol);
                if x > right_x {
                    match arc.right {
                        Some(right) => {
                            node = right;
                            continue;
                        }
                        None => return Some(node),
                    }
                }
            }
            return Some(node);
        }
    }
}

/// Height of the parabola with focus `focus` and directrix `y = sweep_y`
/// at abscissa `x`. The focus must lie strictly below the directrix.
pub(crate) fn parabola_y(focus: &Point2, x: f64, sweep_y: f64) -> f64 {
    let dx = x - focus.x;
    (dx * dx + focus.y * focus.y - sweep_y * sweep_y) / (2.0 * (focus.y - sweep_y))
}

/// X position of the breakpoint between the arc of `left` and the arc of
/// `right` (in that order) when the sweep is at `sweep_y`.
pub(crate) fn breakpoint_x(left: &Point2, right: &Point2, sweep_y: f64, tol: &Tolerance) -> f64 {
    let left_on = tol.scalars_equal(left.y, sweep_y);
    let right_on = tol.scalars_equal(right.y, sweep_y);
    // A focus on the sweep line is a vertical ray; of two such foci the
    // higher one is the narrower arc.
    match (left_on, right_on) {
        (true, true) if left.y == right.y => return (left.x + right.x) / 2.0,
        (true, true) if left.y > right.y => return left.x,
        (true, true) => return right.x,
        (true, false) => return left.x,
        (false, true) => return right.x,
        (false, false) => {}
    }
    if left.y == right.y {
        return (left.x + right.x) / 2.0;
    }

    let dl = 2.0 * (left.y - sweep_y);
    let dr = 2.0 * (right.y - sweep_y);
    let a = 1.0 / dl - 1.0 / dr;
    if a == 0.0 {
        return (left.x + right.x) / 2.0;
    }
    let b = -2.0 * (left.x / dl - right.x / dr);
    let c = (left.x * left.x + left.y * left.y - sweep_y * sweep_y) / dl
        - (right.x * right.x + right.y * right.y - sweep_y * sweep_y) / dr;

    // Stable quadratic roots.
    let disc = (b * b - 4.0 * a * c).max(0.0).sqrt();
    let q = -0.5 * (b + b.signum() * disc);
    let (r1, r2) = if q == 0.0 {
        let r = -b / (2.0 * a);
        (r, r)
    } else {
        (q / a, c / q)
    };

    // The farther focus has the wider parabola: with it on the left, the
    // breakpoint is where the narrower right arc begins.
    if left.y < right.y {
        r1.min(r2)
    } else {
        r1.max(r2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sites() -> Vec<Point2> {
        (0..64).map(|i| Point2::new(i as f64, 0.0)).collect()
    }

    fn check_tree(beach: &BeachLine) {
        // In-order traversal of the treap must match the linked list, and
        // the heap property must hold.
        fn in_order(beach: &BeachLine, node: Option<ArcKey>, out: &mut Vec<ArcKey>) {
            if let Some(n) = node {
                let arc = &beach.arcs[n];
                if let Some(l) = arc.left {
                    assert_eq!(beach.arcs[l].parent, Some(n));
                    assert!(beach.arcs[l].priority <= arc.priority);
                }
                if let Some(r) = arc.right {
                    assert_eq!(beach.arcs[r].parent, Some(n));
                    assert!(beach.arcs[r].priority <= arc.priority);
                }
                in_order(beach, arc.left, out);
                out.push(n);
                in_order(beach, arc.right, out);
            }
        }
        let mut tree = Vec::new();
        in_order(beach, beach.root, &mut tree);
        let list: Vec<_> = beach.iter().collect();
        assert_eq!(tree, list);
        assert_eq!(list.len(), beach.len());
    }

    #[test]
    fn test_insert_keeps_order() {
        let mut beach = BeachLine::new();
        let first = beach.insert_first(0);
        let mut last = first;
        for site in 1..32 {
            last = beach.insert_after(last, site);
        }
        // Insert in the middle as well.
        beach.insert_after(first, 40);
        check_tree(&beach);

        let order: Vec<usize> = beach.iter().map(|k| beach.arc(k).site).collect();
        assert_eq!(order[0], 0);
        assert_eq!(order[1], 40);
        assert_eq!(order[2], 1);
        assert_eq!(order.len(), 33);
    }

    #[test]
    fn test_remove_relinks() {
        let mut beach = BeachLine::new();
        let a = beach.insert_first(0);
        let b = beach.insert_after(a, 1);
        let c = beach.insert_after(b, 2);
        let removed = beach.remove(b).unwrap();
        assert_eq!(removed.site, 1);
        assert!(beach.remove(b).is_none());
        assert_eq!(beach.arc(a).next, Some(c));
        assert_eq!(beach.arc(c).prev, Some(a));
        assert!(beach.get(b).is_none());
        check_tree(&beach);

        beach.remove(a);
        beach.remove(c);
        assert_eq!(beach.len(), 0);
        assert!(beach.first().is_none());
    }

    #[test]
    fn test_many_removals_keep_treap_valid() {
        let mut beach = BeachLine::new();
        let mut keys = vec![beach.insert_first(0)];
        for site in 1..64 {
            let at = keys[keys.len() / 2];
            keys.push(beach.insert_after(at, site));
        }
        for key in keys.iter().step_by(3) {
            beach.remove(*key);
        }
        check_tree(&beach);
    }

    #[test]
    fn test_locate_on_flat_row() {
        let tol = Tolerance::DEFAULT;
        let pts = sites();
        let mut beach = BeachLine::new();
        let mut last = beach.insert_first(0);
        for site in 1..10 {
            last = beach.insert_after(last, site);
        }
        // With every focus on the sweep line, breakpoints sit at midpoints.
        let key = beach.locate(3.2, 0.0, &pts, &tol).unwrap();
        assert_eq!(beach.arc(key).site, 3);
        let key = beach.locate(8.7, 0.0, &pts, &tol).unwrap();
        assert_eq!(beach.arc(key).site, 9);
    }

    #[test]
    fn test_breakpoint_equal_heights() {
        let tol = Tolerance::DEFAULT;
        let x = breakpoint_x(&Point2::new(0.0, 0.0), &Point2::new(10.0, 0.0), 5.0, &tol);
        assert!((x - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_breakpoint_near_equal_heights() {
        let tol = Tolerance::DEFAULT.scaled(10.0);
        let low = Point2::new(10.0, 0.0);
        let high = Point2::new(0.0, 1e-12);
        // The lower focus has the wider parabola; its left part ends far out.
        assert!(breakpoint_x(&low, &high, 10.0, &tol) < -1e10);
        assert!((breakpoint_x(&high, &low, 10.0, &tol) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_breakpoint_is_equidistant() {
        let tol = Tolerance::DEFAULT;
        let left = Point2::new(0.0, 0.0);
        let right = Point2::new(3.0, 4.0);
        let sweep = 6.0;
        for (l, r) in [(left, right), (right, left)] {
            let x = breakpoint_x(&l, &r, sweep, &tol);
            let y = parabola_y(&l, x, sweep);
            let p = Point2::new(x, y);
            let dl = (p - l).norm();
            let dr = (p - r).norm();
            assert!((dl - dr).abs() < 1e-9);
            assert!((dl - (sweep - y)).abs() < 1e-9);
        }
        // The two orders pick opposite intersections.
        let a = breakpoint_x(&left, &right, sweep, &tol);
        let b = breakpoint_x(&right, &left, sweep, &tol);
        assert!(a < b);
    }
}

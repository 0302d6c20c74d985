//! Fortune's sweep-line construction.
//!
//! The sweep moves in increasing `y`. Processed sites lie below it and the
//! beach line is the upper envelope of their parabolas. Every bisector is
//! recorded as an [`EdgeLine`] whose direction is `rot_ccw(right - left)`
//! for the site pair as it first appeared on the beach line. The
//! breakpoint with the same left/right order travels along `+dir` and
//! fixes `end`; the mirrored breakpoint travels along `-dir` and fixes
//! `start`. Ends still open when the queue drains are rays.

use vcad_kernel_math::{midpoint, orient, Orientation, Point2, Tolerance};

use crate::beachline::{parabola_y, ArcKey, BeachLine};
use crate::clip::EdgeLine;
use crate::events::EventQueue;
use crate::geometry::circumcircle;

#[derive(Debug, Clone, Copy)]
enum Event {
    Site(usize),
    Circle(ArcKey),
}

/// Counters reported at debug level after a sweep.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct SweepStats {
    pub site_events: usize,
    pub circle_events: usize,
    pub stale_events: usize,
    pub collinear_triples: usize,
}

struct Sweep<'a> {
    sites: &'a [Point2],
    tol: Tolerance,
    beach: BeachLine,
    queue: EventQueue<Event>,
    edges: Vec<EdgeLine>,
    stats: SweepStats,
}

/// Build the bisector pieces of the diagram of `sites`.
///
/// `sites` must be pairwise distinct within `tol`.
pub(crate) fn build(sites: &[Point2], tol: &Tolerance) -> Vec<EdgeLine> {
    let mut order: Vec<usize> = (0..sites.len()).collect();
    order.sort_by(|&a, &b| {
        sites[a]
            .y
            .total_cmp(&sites[b].y)
            .then(sites[a].x.total_cmp(&sites[b].x))
    });

    let mut sweep = Sweep {
        sites,
        tol: *tol,
        beach: BeachLine::new(),
        queue: EventQueue::with_capacity(sites.len() * 3),
        edges: Vec::with_capacity(sites.len() * 3),
        stats: SweepStats::default(),
    };
    for i in order {
        sweep.queue.push(sites[i], Event::Site(i));
    }

    // Sites on the lowest row have no parabola yet: chain them side by side
    // with vertical bisectors open below. Only an exactly equal `y` keeps
    // the queue's x order; near-equal sites go through the site event.
    if let Some((_, row, Event::Site(first))) = sweep.queue.pop() {
        sweep.stats.site_events += 1;
        sweep.beach.insert_first(first);
        while let Some((at, Event::Site(site))) = sweep.queue.peek().map(|(at, e)| (at, *e)) {
            if at.y != row.y {
                break;
            }
            sweep.queue.pop();
            sweep.append_first_row(site);
        }
    }

    while let Some((_, at, event)) = sweep.queue.pop() {
        match event {
            Event::Site(site) => sweep.site_event(site),
            Event::Circle(arc) => sweep.circle_event(arc, at),
        }
    }
    debug_assert_eq!(sweep.queue.len(), 0);

    log::debug!(
        "sweep: {} sites, {} arcs left, {} site events, {} circle events, {} stale, {} collinear triples skipped",
        sites.len(),
        sweep.beach.len(),
        sweep.stats.site_events,
        sweep.stats.circle_events,
        sweep.stats.stale_events,
        sweep.stats.collinear_triples
    );
    sweep.edges
}

impl Sweep<'_> {
    fn site_event(&mut self, site: usize) {
        self.stats.site_events += 1;
        let p = self.sites[site];

        let Some(above) = self.beach.locate(p.x, p.y, self.sites, &self.tol) else {
            self.beach.insert_first(site);
            return;
        };

        self.invalidate(above);
        let q_index = self.beach.arc(above).site;
        let q = self.sites[q_index];

        let right = self.beach.insert_after(above, q_index);
        let mid = self.beach.insert_after(above, site);

        // The breakpoints start on q's parabola above p, but any point of the
        // bisector serves as origin; the midpoint stays finite when q sits
        // almost on the sweep line.
        let origin = if p.y - q.y > self.tol.linear {
            Point2::new(p.x, parabola_y(&q, p.x, p.y))
        } else {
            midpoint(&q, &p)
        };
        let edge = self.new_edge(EdgeLine::bisector((q_index, site), &q, &p, origin));

        let inherited = self.beach.arc(above).edge;
        self.beach.arc_mut(right).edge = inherited;
        self.beach.arc_mut(above).edge = Some(edge);
        self.beach.arc_mut(mid).edge = Some(edge);

        self.check_circle(above, p.y);
        self.check_circle(right, p.y);
    }

    fn append_first_row(&mut self, site: usize) {
        self.stats.site_events += 1;
        // Sites are queued in (y, x) order, so the new one is rightmost.
        let Some(last) = self.beach.iter().last() else {
            return;
        };
        let q_index = self.beach.arc(last).site;
        let q = self.sites[q_index];
        let p = self.sites[site];

        let edge = self.new_edge(EdgeLine::bisector((q_index, site), &q, &p, midpoint(&q, &p)));
        let inherited = self.beach.arc(last).edge;
        let key = self.beach.insert_after(last, site);
        self.beach.arc_mut(key).edge = inherited;
        self.beach.arc_mut(last).edge = Some(edge);
    }

    fn circle_event(&mut self, arc: ArcKey, at: Point2) {
        let Some(b) = self.beach.get(arc) else {
            self.stats.stale_events += 1;
            return;
        };
        let (Some(left), Some(right)) = (b.prev, b.next) else {
            self.stats.stale_events += 1;
            return;
        };
        self.stats.circle_events += 1;

        let sweep_y = at.y;
        let a = self.beach.arc(left).site;
        let c = self.beach.arc(right).site;
        let Some((vertex, _)) = circumcircle(
            &self.sites[a],
            &self.sites[self.beach.arc(arc).site],
            &self.sites[c],
            &self.tol,
        ) else {
            self.stats.collinear_triples += 1;
            return;
        };

        self.terminate(left, vertex);
        self.terminate(arc, vertex);
        self.invalidate(left);
        self.invalidate(right);
        self.beach.arc_mut(arc).event = None;
        self.beach.remove(arc);

        let mut line = EdgeLine::bisector((a, c), &self.sites[a], &self.sites[c], vertex);
        line.start = Some(vertex);
        let edge = self.new_edge(line);
        self.beach.arc_mut(left).edge = Some(edge);

        self.check_circle(left, sweep_y);
        self.check_circle(right, sweep_y);
    }

    fn new_edge(&mut self, line: EdgeLine) -> usize {
        self.edges.push(line);
        self.edges.len() - 1
    }

    /// Fix the end of the edge traced by the breakpoint right of `arc`.
    fn terminate(&mut self, arc: ArcKey, vertex: Point2) {
        let node = self.beach.arc(arc);
        let (Some(edge), Some(next)) = (node.edge, node.next) else {
            return;
        };
        let pair = (node.site, self.beach.arc(next).site);
        let line = &mut self.edges[edge];
        if line.sites == pair {
            line.end = Some(vertex);
        } else {
            line.start = Some(vertex);
        }
    }

    fn invalidate(&mut self, arc: ArcKey) {
        if let Some(event) = self.beach.arc_mut(arc).event.take() {
            self.queue.invalidate(event);
        }
    }

    /// Schedule the disappearance of `arc` if its breakpoints converge.
    fn check_circle(&mut self, arc: ArcKey, sweep_y: f64) {
        let node = self.beach.arc(arc);
        let (Some(prev), Some(next)) = (node.prev, node.next) else {
            return;
        };
        let a = self.beach.arc(prev).site;
        let c = self.beach.arc(next).site;
        if a == c {
            return;
        }
        let (pa, pb, pc) = (&self.sites[a], &self.sites[node.site], &self.sites[c]);

        match orient(pa, pb, pc, &self.tol) {
            Orientation::CounterClockwise => {}
            Orientation::Collinear => {
                self.stats.collinear_triples += 1;
                log::trace!("collinear triple ({a}, {}, {c}) yields no circle event", node.site);
                return;
            }
            Orientation::Clockwise => return,
        }
        let Some((center, radius)) = circumcircle(pa, pb, pc, &self.tol) else {
            self.stats.collinear_triples += 1;
            return;
        };

        let y = center.y + radius;
        if y < sweep_y - self.tol.linear {
            log::trace!("circle event at y={y} already behind sweep y={sweep_y}");
            return;
        }
        let event = self.queue.push(Point2::new(center.x, y), Event::Circle(arc));
        self.beach.arc_mut(arc).event = Some(event);
    }
}

//! Priority-ordered event queue for the sweep.
//!
//! Events are ordered by sweep coordinate (`y`), ties broken by insertion
//! order. Circle events are invalidated rather than removed: the heap entry
//! stays behind and is skipped when it reaches the front.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use vcad_kernel_math::Point2;

/// Handle returned by [`EventQueue::push`], used to invalidate the event.
pub(crate) type EventId = usize;

#[derive(Debug, Clone, Copy)]
struct Entry {
    y: f64,
    seq: EventId,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // BinaryHeap is a max-heap; reverse so the lowest sweep coordinate and
    // then the earliest insertion come out first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .y
            .total_cmp(&self.y)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-queue of sweep events carrying payload `T`.
#[derive(Debug)]
pub(crate) struct EventQueue<T> {
    heap: BinaryHeap<Entry>,
    slots: Vec<Option<(Point2, T)>>,
    live: usize,
}

impl<T> EventQueue<T> {
    pub(crate) fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            slots: Vec::new(),
            live: 0,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
            slots: Vec::with_capacity(capacity),
            live: 0,
        }
    }

    /// Schedule `payload` at sweep position `at`.
    pub(crate) fn push(&mut self, at: Point2, payload: T) -> EventId {
        let seq = self.slots.len();
        self.slots.push(Some((at, payload)));
        self.heap.push(Entry { y: at.y, seq });
        self.live += 1;
        seq
    }

    /// Mark an event dead. Returns `false` if it was already popped or
    /// invalidated.
    pub(crate) fn invalidate(&mut self, id: EventId) -> bool {
        match self.slots.get_mut(id) {
            Some(slot) if slot.is_some() => {
                *slot = None;
                self.live -= 1;
                true
            }
            _ => false,
        }
    }

    /// Remove and return the earliest live event.
    pub(crate) fn pop(&mut self) -> Option<(EventId, Point2, T)> {
        while let Some(entry) = self.heap.pop() {
            if let Some((at, payload)) = self.slots[entry.seq].take() {
                self.live -= 1;
                return Some((entry.seq, at, payload));
            }
        }
        None
    }

    /// Earliest live event without removing it. Dead entries at the front
    /// are discarded on the way.
    pub(crate) fn peek(&mut self) -> Option<(Point2, &T)> {
        while let Some(&entry) = self.heap.peek() {
            if self.slots[entry.seq].is_some() {
                break;
            }
            self.heap.pop();
        }
        let &entry = self.heap.peek()?;
        self.slots[entry.seq].as_ref().map(|(at, payload)| (*at, payload))
    }

    /// Number of live events.
    pub(crate) fn len(&self) -> usize {
        self.live
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

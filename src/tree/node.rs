use qtty::Unit;

use crate::busytime::BusyTime;

/// A total-order key for `f64` using IEEE-754 total order (`total_cmp`).
///
/// Timespan construction rejects NaN, so the total order never has to break
/// ties between NaN payloads in practice; `total_cmp` keeps the comparison
/// well defined regardless.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct F64Key(pub(super) f64);

impl Eq for F64Key {}

impl Ord for F64Key {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl PartialOrd for F64Key {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Node ordering key: start time first, insertion sequence as tie-breaker.
///
/// Sequences are unique, so the full key is too, which makes tree shape and
/// traversal order deterministic even with equal start times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(super) struct EntryKey {
    pub(super) start: F64Key,
    pub(super) seq: u64,
}

/// Arena-allocated tree node.
///
/// Nodes never move once allocated: rotations relink the `left`/`right`
/// indices, so a slot index stays valid for the node's whole lifetime and the
/// id map can point straight at it.
#[derive(Debug, Clone)]
pub(super) struct Node<U: Unit> {
    pub(super) busy: BusyTime<U>,
    pub(super) seq: u64,
    pub(super) left: Option<usize>,
    pub(super) right: Option<usize>,
    pub(super) height: i32,
    /// Maximum end time in the subtree rooted here.
    pub(super) max_end: f64,
}

impl<U: Unit> Node<U> {
    pub(super) fn new(busy: BusyTime<U>, seq: u64) -> Self {
        let max_end = busy.end().value();
        Self {
            busy,
            seq,
            left: None,
            right: None,
            height: 1,
            max_end,
        }
    }

    pub(super) fn key(&self) -> EntryKey {
        EntryKey {
            start: F64Key(self.busy.start().value()),
            seq: self.seq,
        }
    }
}

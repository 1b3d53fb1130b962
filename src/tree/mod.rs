//! Augmented interval tree over busy times.
//!
//! An AVL tree keyed by `(start, insertion sequence)` where every node also
//! carries the maximum end time of its subtree. The augmentation lets overlap
//! queries prune whole subtrees, so a query touches O(log n + k) nodes for k
//! hits instead of scanning everything.

use std::collections::HashMap;

use qtty::Unit;

use crate::busytime::BusyTime;
use crate::timespan::Timespan;
use crate::Id;

mod error;
mod node;

#[cfg(test)]
mod tests;

pub use error::TreeError;

use node::{EntryKey, Node};

/// Interval tree indexing busy times by their spans, with O(1) id lookup.
///
/// # Internal Structure
/// - `slots`: arena of nodes; a node keeps its slot for its whole lifetime
///   (rotations relink indices, payloads never move)
/// - `free`: recycled slot indices
/// - `by_id`: `HashMap` from busy time id to slot index
///
/// # Complexity
/// - `add`: O(log n)
/// - `remove`: O(log n)
/// - `query`: O(log n + k) tree walk plus O(k log k) ordering of the hits
/// - `get`: O(1)
///
/// # Examples
///
/// ```
/// use overlane::busytime::BusyTime;
/// use overlane::timespan::Timespan;
/// use overlane::tree::IntervalTree;
/// use qtty::Second;
///
/// let mut tree = IntervalTree::<Second>::new();
/// tree.add(BusyTime::new("a", Timespan::from_f64(0.0, 10.0).unwrap())).unwrap();
/// tree.add(BusyTime::new("b", Timespan::from_f64(5.0, 15.0).unwrap())).unwrap();
/// tree.add(BusyTime::new("c", Timespan::from_f64(20.0, 30.0).unwrap())).unwrap();
///
/// let hits = tree.query(Timespan::from_f64(8.0, 22.0).unwrap());
/// let ids: Vec<&str> = hits.iter().map(|b| b.id()).collect();
/// assert_eq!(ids, vec!["a", "b", "c"]);
///
/// // Spans are half-open: [0, 10) and [20, 30) leave [10, 20) free.
/// tree.remove("b").unwrap();
/// assert!(tree.query(Timespan::from_f64(10.0, 20.0).unwrap()).is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct IntervalTree<U: Unit> {
    slots: Vec<Option<Node<U>>>,
    free: Vec<usize>,
    root: Option<usize>,
    by_id: HashMap<Id, usize>,
    next_seq: u64,
}

impl<U: Unit> Default for IntervalTree<U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U: Unit> IntervalTree<U> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: None,
            by_id: HashMap::new(),
            next_seq: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Returns true if a busy time with this id is indexed.
    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Looks up a busy time by id.
    pub fn get(&self, id: &str) -> Option<&BusyTime<U>> {
        let idx = *self.by_id.get(id)?;
        self.slots[idx].as_ref().map(|node| &node.busy)
    }

    /// Returns the insertion sequence number of a busy time.
    ///
    /// Sequence numbers increase monotonically with `add` order and are the
    /// tie-breaker everywhere this crate orders busy times.
    pub fn seq_of(&self, id: &str) -> Option<u64> {
        let idx = *self.by_id.get(id)?;
        self.slots[idx].as_ref().map(|node| node.seq)
    }

    /// Indexes a busy time.
    ///
    /// # Errors
    ///
    /// [`TreeError::DuplicateId`] if the id is already indexed.
    pub fn add(&mut self, busy: BusyTime<U>) -> Result<(), TreeError> {
        if self.by_id.contains_key(busy.id()) {
            return Err(TreeError::DuplicateId(busy.id().to_string()));
        }
        let seq = self.next_seq;
        self.next_seq += 1;

        let id = busy.id().to_string();
        let node = Node::new(busy, seq);
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };
        self.by_id.insert(id, idx);
        self.root = Some(self.insert_at(self.root, idx));
        Ok(())
    }

    /// Removes a busy time by id and returns it.
    ///
    /// # Errors
    ///
    /// [`TreeError::NotFound`] if the id is not indexed.
    pub fn remove(&mut self, id: &str) -> Result<BusyTime<U>, TreeError> {
        let idx = match self.by_id.remove(id) {
            Some(idx) => idx,
            None => return Err(TreeError::NotFound(id.to_string())),
        };
        let key = self.node(idx).key();
        self.root = self.remove_at(self.root, key, idx);
        let node = self.slots[idx]
            .take()
            .expect("a mapped id points at an occupied slot");
        self.free.push(idx);
        Ok(node.busy)
    }

    /// Returns all busy times whose span strictly overlaps `span`, ordered by
    /// insertion sequence.
    pub fn query(&self, span: Timespan<U>) -> Vec<&BusyTime<U>> {
        let mut hits: Vec<(u64, &BusyTime<U>)> = Vec::new();
        self.collect_overlaps(self.root, &span, &mut hits);
        hits.sort_by_key(|(seq, _)| *seq);
        hits.into_iter().map(|(_, busy)| busy).collect()
    }

    /// Returns an iterator over all busy times in start time order.
    pub fn iter(&self) -> Iter<'_, U> {
        Iter {
            tree: self,
            stack: Vec::new(),
            cur: self.root,
        }
    }

    /// Removes all busy times.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.root = None;
        self.by_id.clear();
        self.next_seq = 0;
    }
}

// =============================================================================
// Balanced tree internals
// =============================================================================

impl<U: Unit> IntervalTree<U> {
    fn node(&self, idx: usize) -> &Node<U> {
        self.slots[idx]
            .as_ref()
            .expect("a linked slot index points at an occupied slot")
    }

    fn node_mut(&mut self, idx: usize) -> &mut Node<U> {
        self.slots[idx]
            .as_mut()
            .expect("a linked slot index points at an occupied slot")
    }

    fn height_of(&self, idx: Option<usize>) -> i32 {
        idx.map_or(0, |i| self.node(i).height)
    }

    /// Recomputes `height` and `max_end` from the children.
    fn refresh(&mut self, idx: usize) {
        let (left, right, own_end) = {
            let node = self.node(idx);
            (node.left, node.right, node.busy.end().value())
        };
        let height = 1 + self.height_of(left).max(self.height_of(right));
        let mut max_end = own_end;
        if let Some(l) = left {
            max_end = max_end.max(self.node(l).max_end);
        }
        if let Some(r) = right {
            max_end = max_end.max(self.node(r).max_end);
        }
        let node = self.node_mut(idx);
        node.height = height;
        node.max_end = max_end;
    }

    fn rotate_left(&mut self, idx: usize) -> usize {
        let pivot = match self.node(idx).right {
            Some(pivot) => pivot,
            None => return idx,
        };
        let moved = self.node(pivot).left;
        self.node_mut(idx).right = moved;
        self.node_mut(pivot).left = Some(idx);
        self.refresh(idx);
        self.refresh(pivot);
        pivot
    }

    fn rotate_right(&mut self, idx: usize) -> usize {
        let pivot = match self.node(idx).left {
            Some(pivot) => pivot,
            None => return idx,
        };
        let moved = self.node(pivot).right;
        self.node_mut(idx).left = moved;
        self.node_mut(pivot).right = Some(idx);
        self.refresh(idx);
        self.refresh(pivot);
        pivot
    }

    /// Refreshes `idx` and restores the AVL balance invariant, returning the
    /// new root of the subtree.
    fn rebalance(&mut self, idx: usize) -> usize {
        self.refresh(idx);
        let balance = self.height_of(self.node(idx).left) - self.height_of(self.node(idx).right);

        if balance > 1 {
            let left = match self.node(idx).left {
                Some(left) => left,
                None => return idx,
            };
            if self.height_of(self.node(left).left) < self.height_of(self.node(left).right) {
                let rotated = self.rotate_left(left);
                self.node_mut(idx).left = Some(rotated);
            }
            return self.rotate_right(idx);
        }

        if balance < -1 {
            let right = match self.node(idx).right {
                Some(right) => right,
                None => return idx,
            };
            if self.height_of(self.node(right).right) < self.height_of(self.node(right).left) {
                let rotated = self.rotate_right(right);
                self.node_mut(idx).right = Some(rotated);
            }
            return self.rotate_left(idx);
        }

        idx
    }

    /// Inserts the already-allocated node `idx` into the subtree at `root`,
    /// returning the new subtree root.
    ///
    /// Keys are unique (seq tie-breaker), so there is no equal branch; a new
    /// node with a repeated start time lands to the right of its twins.
    fn insert_at(&mut self, root: Option<usize>, idx: usize) -> usize {
        let cur = match root {
            Some(cur) => cur,
            None => return idx,
        };
        if self.node(idx).key() < self.node(cur).key() {
            let new_left = self.insert_at(self.node(cur).left, idx);
            self.node_mut(cur).left = Some(new_left);
        } else {
            let new_right = self.insert_at(self.node(cur).right, idx);
            self.node_mut(cur).right = Some(new_right);
        }
        self.rebalance(cur)
    }

    /// Unlinks node `target` (whose key is `key`) from the subtree at `root`,
    /// returning the new subtree root. The slot itself is freed by the caller.
    fn remove_at(&mut self, root: Option<usize>, key: EntryKey, target: usize) -> Option<usize> {
        let cur = root?;

        if cur == target {
            let left = self.node(cur).left;
            let right = self.node(cur).right;
            return match (left, right) {
                (None, None) => None,
                (Some(l), None) => Some(l),
                (None, Some(r)) => Some(r),
                (Some(_), Some(r)) => {
                    // Replace with the in-order successor, relinked in place.
                    let (new_right, succ) = self.detach_min(r);
                    self.node_mut(succ).left = left;
                    self.node_mut(succ).right = new_right;
                    Some(self.rebalance(succ))
                }
            };
        }

        if key < self.node(cur).key() {
            let new_left = self.remove_at(self.node(cur).left, key, target);
            self.node_mut(cur).left = new_left;
        } else {
            let new_right = self.remove_at(self.node(cur).right, key, target);
            self.node_mut(cur).right = new_right;
        }
        Some(self.rebalance(cur))
    }

    /// Detaches the minimum node of the subtree at `root`. Returns the new
    /// subtree root and the detached node's index.
    fn detach_min(&mut self, root: usize) -> (Option<usize>, usize) {
        match self.node(root).left {
            Some(left) => {
                let (new_left, min) = self.detach_min(left);
                self.node_mut(root).left = new_left;
                (Some(self.rebalance(root)), min)
            }
            None => (self.node(root).right, root),
        }
    }

    fn collect_overlaps<'a>(
        &'a self,
        root: Option<usize>,
        span: &Timespan<U>,
        hits: &mut Vec<(u64, &'a BusyTime<U>)>,
    ) {
        let cur = match root {
            Some(cur) => cur,
            None => return,
        };
        let node = self.node(cur);
        // Nothing in this subtree ends after the query start.
        if node.max_end <= span.start().value() {
            return;
        }
        self.collect_overlaps(node.left, span, hits);
        if node.busy.span().overlaps(span) {
            hits.push((node.seq, &node.busy));
        }
        // Right-subtree starts are >= this start; skip when out of reach.
        if node.busy.start().value() < span.end().value() {
            self.collect_overlaps(node.right, span, hits);
        }
    }
}

/// In-order (start time order) iterator over a tree's busy times.
pub struct Iter<'a, U: Unit> {
    tree: &'a IntervalTree<U>,
    stack: Vec<usize>,
    cur: Option<usize>,
}

impl<'a, U: Unit> Iterator for Iter<'a, U> {
    type Item = &'a BusyTime<U>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(idx) = self.cur {
            self.stack.push(idx);
            self.cur = self.tree.node(idx).left;
        }
        let idx = self.stack.pop()?;
        let node = self.tree.node(idx);
        self.cur = node.right;
        Some(&node.busy)
    }
}

// =============================================================================
// IntervalTree Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<U: Unit> serde::Serialize for IntervalTree<U> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut entries: Vec<&Node<U>> = self
            .by_id
            .values()
            .filter_map(|&idx| self.slots[idx].as_ref())
            .collect();
        entries.sort_by_key(|node| node.seq);
        serializer.collect_seq(entries.into_iter().map(|node| &node.busy))
    }
}

#[cfg(feature = "serde")]
impl<'de, U: Unit> serde::Deserialize<'de> for IntervalTree<U> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let items = Vec::<BusyTime<U>>::deserialize(deserializer)?;
        let mut tree = Self::new();
        for busy in items {
            tree.add(busy).map_err(serde::de::Error::custom)?;
        }
        Ok(tree)
    }
}

//! Conflict spans: clusters of transitively-overlapping busy times.
//!
//! [`ConflictTracker`] is the incremental engine behind a calendar day view.
//! Every tracked busy time carries a layout element; whenever overlap
//! relations change, the affected cluster is re-packed into columns and each
//! element receives its `{left, width}` lane style. Spans merge when a new
//! busy time bridges them, shrink or split when a member leaves, and dissolve
//! when only one member remains.

use std::collections::{HashMap, HashSet};

use log::debug;
use qtty::Unit;

use crate::busytime::BusyTime;
use crate::layout::{LayoutTarget, SlotStyle, StyledElement};
use crate::tree::IntervalTree;
use crate::Id;

mod columns;
mod error;
mod graph;
mod span;


pub use columns::Column;
pub use error::OverlapError;
pub use span::{ConflictSpan, SpanId};

use columns::SpanEntry;
use graph::OverlapGraph;
use span::SpanArena;

/// Incremental overlap tracker that lays conflicting busy times out in
/// side-by-side columns.
///
/// Busy times that overlap nothing stay outside every span and their
/// elements keep whatever style they came with. As soon as two or more busy
/// times transitively overlap, they form a [`ConflictSpan`]; the tracker
/// assigns each member a column and pushes percentage styles to the bound
/// elements.
///
/// # Internal Structure
/// - `tree`: interval tree for overlap queries and id lookup
/// - `graph`: undirected overlap relation; spans are its connected components
/// - `spans`: generational arena of live spans
/// - `span_by_id`: busy time id to its span handle
/// - `elements`: busy time id to its layout element
///
/// # Complexity
/// For a mutation touching a cluster of c members, with n busy times tracked
/// and k of them overlapping the mutated span:
/// - `add`: O(log n + k) query, O(c) cluster walk, O(c log c) column packing
/// - `remove`: O(log n) unindex plus the same cluster rework
///
/// # Examples
///
/// ```
/// use overlane::busytime::BusyTime;
/// use overlane::conflict::ConflictTracker;
/// use overlane::layout::StyledElement;
/// use overlane::timespan::Timespan;
/// use qtty::Hour;
///
/// let mut tracker = ConflictTracker::<Hour>::new();
/// let span = |a, b| Timespan::from_f64(a, b).unwrap();
///
/// tracker.add(BusyTime::new("brief", span(9.0, 11.0)), StyledElement::new()).unwrap();
/// tracker.add(BusyTime::new("review", span(10.0, 12.0)), StyledElement::new()).unwrap();
/// tracker.add(BusyTime::new("standup", span(10.5, 11.5)), StyledElement::new()).unwrap();
///
/// let conflict = tracker.conflict_span_of("brief").unwrap();
/// assert_eq!(conflict.len(), 3);
/// assert_eq!(conflict.column_count(), 3);
///
/// assert_eq!(tracker.element("brief").unwrap().left(), "0%");
/// assert_eq!(tracker.element("review").unwrap().left(), "33.3333%");
/// assert_eq!(tracker.element("standup").unwrap().left(), "66.6667%");
/// assert_eq!(tracker.element("standup").unwrap().width(), "33.3333%");
/// ```
#[derive(Debug, Clone)]
pub struct ConflictTracker<U: Unit, E: LayoutTarget = StyledElement> {
    tree: IntervalTree<U>,
    graph: OverlapGraph,
    spans: SpanArena,
    span_by_id: HashMap<Id, SpanId>,
    elements: HashMap<Id, E>,
    in_update: bool,
}

impl<U: Unit, E: LayoutTarget> Default for ConflictTracker<U, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U: Unit, E: LayoutTarget> ConflictTracker<U, E> {
    pub fn new() -> Self {
        Self {
            tree: IntervalTree::new(),
            graph: OverlapGraph::new(),
            spans: SpanArena::new(),
            span_by_id: HashMap::new(),
            elements: HashMap::new(),
            in_update: false,
        }
    }

    /// Number of tracked busy times.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tree.contains(id)
    }

    pub fn busy_time(&self, id: &str) -> Option<&BusyTime<U>> {
        self.tree.get(id)
    }

    /// The layout element bound to a busy time.
    pub fn element(&self, id: &str) -> Option<&E> {
        self.elements.get(id)
    }

    pub fn element_mut(&mut self, id: &str) -> Option<&mut E> {
        self.elements.get_mut(id)
    }

    /// Read access to the underlying interval tree.
    pub fn tree(&self) -> &IntervalTree<U> {
        &self.tree
    }

    /// Number of live conflict spans.
    pub fn span_count(&self) -> usize {
        self.spans.len()
    }

    /// Iterates over all live spans.
    pub fn spans(&self) -> impl Iterator<Item = (SpanId, &ConflictSpan)> + '_ {
        self.spans.iter()
    }

    /// The handle of the span `id` belongs to, if it is in conflict.
    pub fn span_id_of(&self, id: &str) -> Option<SpanId> {
        self.span_by_id.get(id).copied()
    }

    /// The span `id` belongs to, if it is in conflict.
    pub fn conflict_span_of(&self, id: &str) -> Option<&ConflictSpan> {
        let span_id = self.span_id_of(id)?;
        self.spans.get(span_id)
    }

    /// Resolves a span handle. Stale handles (dissolved, merged away, split)
    /// return `None`.
    pub fn conflict_span(&self, span_id: SpanId) -> Option<&ConflictSpan> {
        self.spans.get(span_id)
    }

    /// True if a previous `add` or `remove` panicked midway. A poisoned
    /// tracker rejects further updates until [`reset`](Self::reset).
    pub fn is_poisoned(&self) -> bool {
        self.in_update
    }

    /// Starts tracking a busy time and binds `element` to it.
    ///
    /// If the new span overlaps tracked busy times, the affected cluster is
    /// reworked: conflict-free neighbours are pulled into a span, a single
    /// adjacent span absorbs the newcomer keeping its identity, and several
    /// adjacent spans merge into a fresh one. Every member of the resulting
    /// span gets its column style applied.
    ///
    /// # Errors
    ///
    /// [`OverlapError::DuplicateId`] if the id is already tracked,
    /// [`OverlapError::UpdateInProgress`] if the tracker is poisoned.
    pub fn add(&mut self, busy: BusyTime<U>, element: E) -> Result<(), OverlapError> {
        if self.in_update {
            return Err(OverlapError::UpdateInProgress);
        }
        if self.tree.contains(busy.id()) {
            return Err(OverlapError::DuplicateId(busy.id().to_string()));
        }
        self.in_update = true;

        let id = busy.id().to_string();
        // Query before indexing so the new span never matches itself.
        let overlapping: Vec<Id> = self
            .tree
            .query(busy.span())
            .into_iter()
            .map(|b| b.id().to_string())
            .collect();

        self.tree.add(busy)?;
        self.graph.insert(id.clone());
        for other in &overlapping {
            self.graph.connect(&id, other);
        }
        self.elements.insert(id.clone(), element);

        if overlapping.is_empty() {
            self.in_update = false;
            return Ok(());
        }

        let mut touched: Vec<SpanId> = Vec::new();
        for other in &overlapping {
            if let Some(&span_id) = self.span_by_id.get(other.as_str()) {
                if !touched.contains(&span_id) {
                    touched.push(span_id);
                }
            }
        }

        if touched.len() > 1 {
            // The newcomer bridges several spans; they merge into a fresh
            // one and the old handles go stale.
            for &span_id in &touched {
                self.spans.remove(span_id);
            }
        }

        let members = self.graph.component_of(&id);
        let rebuilt = self.build_span(&members);
        let span_id = if touched.len() == 1 {
            self.spans.replace(touched[0], rebuilt)
        } else {
            self.spans.insert(rebuilt)
        };
        for member in &members {
            self.span_by_id.insert(member.clone(), span_id);
        }

        if touched.is_empty() {
            debug!(
                "created conflict span {} for {} busy times",
                span_id,
                members.len()
            );
        } else if touched.len() > 1 {
            debug!("merged {} conflict spans into {}", touched.len(), span_id);
        }

        self.emit_layout(span_id);
        self.in_update = false;
        Ok(())
    }

    /// Stops tracking a busy time, returning it and its element with the
    /// element's style cleared.
    ///
    /// The departed member's span shrinks in place; if the member was the
    /// only bridge, the span splits into fresh spans per remaining cluster.
    /// Members left without any conflict drop out of span tracking and have
    /// their styles cleared; a span reduced to one member dissolves.
    ///
    /// # Errors
    ///
    /// [`OverlapError::NotFound`] if the id is not tracked,
    /// [`OverlapError::UpdateInProgress`] if the tracker is poisoned.
    pub fn remove(&mut self, id: &str) -> Result<(BusyTime<U>, E), OverlapError> {
        if self.in_update {
            return Err(OverlapError::UpdateInProgress);
        }
        if !self.tree.contains(id) {
            debug!("remove: busy time `{}` is not tracked", id);
            return Err(OverlapError::NotFound(id.to_string()));
        }
        self.in_update = true;

        let busy = self.tree.remove(id)?;
        self.graph.remove(id);
        let mut element = self
            .elements
            .remove(id)
            .expect("every tracked busy time has an element");
        element.clear();

        if let Some(span_id) = self.span_by_id.remove(id) {
            self.rework_after_leave(span_id, id);
        }

        self.in_update = false;
        Ok((busy, element))
    }

    /// Clears every tracked busy time, span, and element.
    ///
    /// Element styles are cleared before the elements are dropped, so shared
    /// layout targets do not keep stale lanes. The update flag is released
    /// too, which makes this the recovery path for a poisoned tracker.
    pub fn reset(&mut self) {
        self.tree.clear();
        self.graph.clear();
        self.spans.clear();
        self.span_by_id.clear();
        for element in self.elements.values_mut() {
            element.clear();
        }
        self.elements.clear();
        self.in_update = false;
    }
}

impl<U: Unit, E: LayoutTarget> ConflictTracker<U, E> {
    /// Regroups the span `span_id` after `departed` left it.
    fn rework_after_leave(&mut self, span_id: SpanId, departed: &str) {
        let remaining: Vec<Id> = match self.spans.get(span_id) {
            Some(span) => span
                .members()
                .iter()
                .filter(|member| member.as_str() != departed)
                .cloned()
                .collect(),
            None => Vec::new(),
        };

        // Without the departed member the cluster may fall apart; regroup
        // the rest by connectivity.
        let mut visited: HashSet<Id> = HashSet::new();
        let mut clusters: Vec<Vec<Id>> = Vec::new();
        let mut freed: Vec<Id> = Vec::new();
        for member in &remaining {
            if visited.contains(member) {
                continue;
            }
            let component = self.graph.component_of(member);
            for m in &component {
                visited.insert(m.clone());
            }
            if component.len() >= 2 {
                clusters.push(component);
            } else {
                freed.extend(component);
            }
        }

        for loner in &freed {
            self.span_by_id.remove(loner);
            if let Some(element) = self.elements.get_mut(loner) {
                element.clear();
            }
        }

        match clusters.len() {
            0 => {
                self.spans.remove(span_id);
                debug!("conflict span {} dissolved", span_id);
            }
            1 => {
                // Simple shrink: the span keeps its identity.
                let rebuilt = self.build_span(&clusters[0]);
                let target = self.spans.replace(span_id, rebuilt);
                for member in &clusters[0] {
                    self.span_by_id.insert(member.clone(), target);
                }
                self.emit_layout(target);
            }
            _ => {
                self.spans.remove(span_id);
                for cluster in &clusters {
                    let fresh = self.spans.insert(self.build_span(cluster));
                    for member in cluster {
                        self.span_by_id.insert(member.clone(), fresh);
                    }
                    self.emit_layout(fresh);
                }
                debug!(
                    "conflict span {} split into {} spans",
                    span_id,
                    clusters.len()
                );
            }
        }
    }

    fn build_span(&self, members: &[Id]) -> ConflictSpan {
        let mut entries = Vec::with_capacity(members.len());
        for id in members {
            if let (Some(busy), Some(seq)) = (self.tree.get(id), self.tree.seq_of(id)) {
                entries.push(SpanEntry {
                    id: id.clone(),
                    start: busy.start().value(),
                    end: busy.end().value(),
                    seq,
                });
            }
        }
        ConflictSpan::assemble(entries)
    }

    /// Applies each member's column style to its element.
    fn emit_layout(&mut self, span_id: SpanId) {
        let span = match self.spans.get(span_id) {
            Some(span) => span,
            None => return,
        };
        let count = span.column_count();
        for (index, column) in span.columns().iter().enumerate() {
            let style = SlotStyle::for_column(index, count);
            for member in column.members() {
                if let Some(element) = self.elements.get_mut(member) {
                    element.apply(style.clone());
                }
            }
        }
    }
}

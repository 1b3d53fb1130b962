//! Greedy column assignment for the members of one conflict span.
//!
//! Members are sorted by start time and placed first-fit: each goes into the
//! leftmost column whose latest occupant has already ended. For interval
//! overlap graphs this greedy order is optimal, so the number of columns
//! equals the maximum number of members busy at any one instant.

use crate::Id;

/// One vertical lane of a conflict span, listing its occupants in
/// chronological order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Column {
    pub(super) members: Vec<Id>,
}

impl Column {
    /// Occupant ids, earliest start first.
    pub fn members(&self) -> &[Id] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Flat projection of one span member used during column assignment.
#[derive(Debug, Clone)]
pub(super) struct SpanEntry {
    pub(super) id: Id,
    pub(super) start: f64,
    pub(super) end: f64,
    pub(super) seq: u64,
}

/// Packs `entries` into columns, first-fit by `(start, seq)` order.
///
/// Two entries share a column only if the earlier one ends at or before the
/// later one starts, matching half-open overlap semantics.
pub(super) fn assign_columns(mut entries: Vec<SpanEntry>) -> Vec<Column> {
    entries.sort_by(|a, b| a.start.total_cmp(&b.start).then_with(|| a.seq.cmp(&b.seq)));

    let mut columns: Vec<Column> = Vec::new();
    let mut last_ends: Vec<f64> = Vec::new();

    for entry in entries {
        let slot = last_ends.iter().position(|&end| end <= entry.start);
        match slot {
            Some(index) => {
                last_ends[index] = entry.end;
                columns[index].members.push(entry.id);
            }
            None => {
                last_ends.push(entry.end);
                columns.push(Column {
                    members: vec![entry.id],
                });
            }
        }
    }
    columns
}

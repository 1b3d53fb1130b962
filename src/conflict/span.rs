use std::fmt::Display;

use super::columns::{assign_columns, Column, SpanEntry};
use crate::Id;

/// Generational handle to a conflict span.
///
/// A span that dissolves, merges, or splits retires its handle: the arena
/// bumps the slot's generation, so a stale `SpanId` resolves to `None`
/// instead of whatever span reuses the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpanId {
    index: u32,
    generation: u32,
}

impl Display for SpanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// A maximal cluster of transitively-overlapping busy times, with its column
/// assignment.
///
/// Membership is kept in insertion order (tree sequence); columns come from
/// the greedy first-fit packing in [`super::columns`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConflictSpan {
    members: Vec<Id>,
    columns: Vec<Column>,
}

impl ConflictSpan {
    pub(super) fn assemble(entries: Vec<SpanEntry>) -> Self {
        let mut order: Vec<(u64, Id)> = entries.iter().map(|e| (e.seq, e.id.clone())).collect();
        order.sort_by_key(|(seq, _)| *seq);
        let members = order.into_iter().map(|(_, id)| id).collect();
        let columns = assign_columns(entries);
        Self { members, columns }
    }

    /// Member ids in insertion order.
    pub fn members(&self) -> &[Id] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.iter().any(|m| m == id)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// The column index `id` renders in, if it is a member.
    pub fn column_of(&self, id: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.members.iter().any(|m| m == id))
    }
}

impl Display for ConflictSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} busy times in {} columns",
            self.members.len(),
            self.columns.len()
        )
    }
}

/// Arena of live conflict spans with generational ids.
#[derive(Debug, Clone, Default)]
pub(super) struct SpanArena {
    slots: Vec<SpanSlot>,
    free: Vec<u32>,
    live: usize,
}

#[derive(Debug, Clone)]
struct SpanSlot {
    generation: u32,
    span: Option<ConflictSpan>,
}

impl SpanArena {
    pub(super) fn new() -> Self {
        Self::default()
    }

    pub(super) fn len(&self) -> usize {
        self.live
    }

    pub(super) fn insert(&mut self, span: ConflictSpan) -> SpanId {
        self.live += 1;
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.span = Some(span);
                SpanId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(SpanSlot {
                    generation: 0,
                    span: Some(span),
                });
                SpanId {
                    index,
                    generation: 0,
                }
            }
        }
    }

    pub(super) fn remove(&mut self, id: SpanId) -> Option<ConflictSpan> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let span = slot.span.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
        Some(span)
    }

    /// Replaces the span behind a live handle, keeping its identity. Falls
    /// back to a fresh insert if the handle is stale.
    pub(super) fn replace(&mut self, id: SpanId, span: ConflictSpan) -> SpanId {
        let live = match self.slots.get(id.index as usize) {
            Some(slot) => slot.generation == id.generation && slot.span.is_some(),
            None => false,
        };
        if live {
            self.slots[id.index as usize].span = Some(span);
            id
        } else {
            self.insert(span)
        }
    }

    pub(super) fn get(&self, id: SpanId) -> Option<&ConflictSpan> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.span.as_ref()
    }

    pub(super) fn iter(&self) -> impl Iterator<Item = (SpanId, &ConflictSpan)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.span.as_ref().map(|span| {
                (
                    SpanId {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    span,
                )
            })
        })
    }

    /// Drops every span. Generations keep advancing, so ids handed out
    /// before the clear stay dead.
    pub(super) fn clear(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.span.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
            }
        }
        self.live = 0;
    }
}

//! overlane - Overlap-aware lane layout for time-interval collections
//!
//! An incremental engine for calendar-style views: busy times are indexed in
//! an interval tree, transitively-overlapping events are clustered into
//! conflict spans, and every span member is assigned a column so that the
//! span renders as side-by-side lanes with percentage offsets.

pub mod busytime;
pub mod conflict;
pub mod layout;
pub mod timespan;
pub mod tree;

/// Identifier type used for busy times and the elements bound to them.
pub type Id = String;

/// Generates a new unique identifier (UUID v4).
pub fn generate_id() -> Id {
    uuid::Uuid::new_v4().to_string()
}

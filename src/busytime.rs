//! Busy time records: an identifier bound to a [`Timespan`].

use std::fmt::Display;

use qtty::{Quantity, Unit};

use crate::timespan::Timespan;
use crate::Id;

/// A scheduled occupation of the time axis.
///
/// The identifier names the calendar event (or any other domain object) that
/// produced the busy time; the engine treats it as opaque and only requires
/// uniqueness within one tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct BusyTime<U: Unit> {
    id: Id,
    span: Timespan<U>,
}

impl<U: Unit> BusyTime<U> {
    pub fn new(id: impl Into<Id>, span: Timespan<U>) -> Self {
        Self {
            id: id.into(),
            span,
        }
    }

    /// Creates a busy time with a freshly generated unique identifier.
    pub fn with_generated_id(span: Timespan<U>) -> Self {
        Self {
            id: crate::generate_id(),
            span,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub const fn span(&self) -> Timespan<U> {
        self.span
    }

    pub const fn start(&self) -> Quantity<U> {
        self.span.start()
    }

    pub const fn end(&self) -> Quantity<U> {
        self.span.end()
    }
}

impl<U: Unit> Display for BusyTime<U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.id, self.span)
    }
}

// =============================================================================
// BusyTime Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<U: Unit> serde::Serialize for BusyTime<U> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("BusyTime", 2)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("span", &self.span)?;
        s.end()
    }
}

#[cfg(feature = "serde")]
impl<'de, U: Unit> serde::Deserialize<'de> for BusyTime<U> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        struct RawSpan {
            start: f64,
            end: f64,
        }

        #[derive(serde::Deserialize)]
        struct Raw {
            id: String,
            span: RawSpan,
        }

        let raw = Raw::deserialize(deserializer)?;
        let span =
            Timespan::from_f64(raw.span.start, raw.span.end).map_err(serde::de::Error::custom)?;
        Ok(Self { id: raw.id, span })
    }
}

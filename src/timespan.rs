//! Half-open time interval value type.

use std::fmt::Display;

use qtty::{Quantity, Unit};
use thiserror::Error;

/// Errors that can occur when constructing a [`Timespan`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TimespanError {
    #[error("timespan start {start} must not be after end {end}")]
    Inverted { start: f64, end: f64 },

    #[error("timespan bounds cannot be NaN")]
    NaNTime,
}

/// Immutable half-open range `[start, end)` on a time axis.
///
/// Validated on construction: `start <= end` and neither bound NaN. A
/// zero-length span (`start == end`) is legal; it overlaps only spans that
/// strictly contain its instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timespan<U: Unit> {
    start: Quantity<U>,
    end: Quantity<U>,
}

impl<U: Unit> Timespan<U> {
    /// Creates the span `[start, end)`.
    ///
    /// # Errors
    ///
    /// [`TimespanError::NaNTime`] if either bound is NaN,
    /// [`TimespanError::Inverted`] if `start > end`.
    pub fn new(start: Quantity<U>, end: Quantity<U>) -> Result<Self, TimespanError> {
        if start.value().is_nan() || end.value().is_nan() {
            return Err(TimespanError::NaNTime);
        }
        if start.value() > end.value() {
            return Err(TimespanError::Inverted {
                start: start.value(),
                end: end.value(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn from_f64(start: f64, end: f64) -> Result<Self, TimespanError> {
        Self::new(Quantity::<U>::new(start), Quantity::<U>::new(end))
    }

    pub const fn start(&self) -> Quantity<U> {
        self.start
    }

    pub const fn end(&self) -> Quantity<U> {
        self.end
    }

    pub fn duration(&self) -> Quantity<U> {
        self.end - self.start
    }

    /// Returns true if `instant` lies within `[start, end)`.
    pub const fn contains(&self, instant: Quantity<U>) -> bool {
        self.start.value() <= instant.value() && instant.value() < self.end.value()
    }

    /// Strict half-open overlap: `self.start < other.end && self.end > other.start`.
    ///
    /// Back-to-back spans (`[a, b)` and `[b, c)`) do not overlap.
    ///
    /// # Example
    ///
    /// ```rust
    /// use overlane::timespan::Timespan;
    /// use qtty::Hour;
    ///
    /// let morning = Timespan::<Hour>::from_f64(9.0, 12.0).unwrap();
    /// let standup = Timespan::<Hour>::from_f64(11.0, 11.5).unwrap();
    /// let lunch = Timespan::<Hour>::from_f64(12.0, 13.0).unwrap();
    ///
    /// assert!(morning.overlaps(&standup));
    /// assert!(!morning.overlaps(&lunch));
    /// ```
    pub const fn overlaps(&self, other: &Timespan<U>) -> bool {
        self.start.value() < other.end.value() && self.end.value() > other.start.value()
    }

    /// Returns the shared sub-span, if any.
    pub fn intersection(&self, other: &Timespan<U>) -> Option<Timespan<U>> {
        if self.overlaps(other) {
            let start = if self.start.value() > other.start.value() {
                self.start
            } else {
                other.start
            };
            let end = if self.end.value() < other.end.value() {
                self.end
            } else {
                other.end
            };
            Some(Timespan { start, end })
        } else {
            None
        }
    }

    /// Converts this span to another unit of the same dimension.
    pub fn to<T: Unit<Dim = U::Dim>>(self) -> Timespan<T> {
        // Unit conversion scales by a positive factor, so ordering is preserved.
        Timespan {
            start: self.start.to(),
            end: self.end.to(),
        }
    }
}

impl<U: Unit> Display for Timespan<U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:.3}, {:.3})", self.start.value(), self.end.value())
    }
}

// =============================================================================
// Timespan Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<U: Unit> serde::Serialize for Timespan<U> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("Timespan", 2)?;
        s.serialize_field("start", &self.start.value())?;
        s.serialize_field("end", &self.end.value())?;
        s.end()
    }
}

#[cfg(feature = "serde")]
impl<'de, U: Unit> serde::Deserialize<'de> for Timespan<U> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        struct Raw {
            start: f64,
            end: f64,
        }

        let raw = Raw::deserialize(deserializer)?;
        Self::from_f64(raw.start, raw.end).map_err(serde::de::Error::custom)
    }
}

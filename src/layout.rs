//! Column layout emission for conflict spans.
//!
//! A conflict span with `n` columns renders each member as a lane occupying
//! `100/n` percent of the available width, offset by its column index. Styles
//! are emitted as CSS-ready percentage strings.

/// Horizontal placement of one busy time inside its conflict span.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotStyle {
    /// Offset from the left edge, e.g. `"33.3333%"`.
    pub left: String,
    /// Lane width, e.g. `"33.3333%"`.
    pub width: String,
}

impl SlotStyle {
    /// Computes the style for column `index` out of `count` columns.
    ///
    /// The offset is derived from the exact per-column width, not from its
    /// rounded rendering, so column 2 of 3 lands at `66.6667%` rather than
    /// the drifted `66.6666%`.
    pub fn for_column(index: usize, count: usize) -> Self {
        debug_assert!(count > 0, "column count must be positive");
        debug_assert!(index < count, "column index out of range");
        let width = 100.0 / count as f64;
        Self {
            left: format_percent(index as f64 * width),
            width: format_percent(width),
        }
    }
}

/// Formats a percentage with at most four decimal places and no trailing
/// zeros: `25 -> "25%"`, `100.0 / 3.0 -> "33.3333%"`.
fn format_percent(value: f64) -> String {
    let mut text = format!("{:.4}", value);
    if text.contains('.') {
        text.truncate(text.trim_end_matches('0').trim_end_matches('.').len());
    }
    text.push('%');
    text
}

/// Receiver of layout decisions.
///
/// In a calendar view this is the rendered element of a busy time; the
/// tracker applies a style whenever the element's conflict span changes shape
/// and clears it when the element no longer conflicts with anything.
pub trait LayoutTarget {
    fn apply(&mut self, style: SlotStyle);

    fn clear(&mut self);
}

/// Minimal [`LayoutTarget`] that records the last applied style.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StyledElement {
    style: Option<SlotStyle>,
}

impl StyledElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn style(&self) -> Option<&SlotStyle> {
        self.style.as_ref()
    }

    /// Current left offset, or `""` when no style is applied.
    pub fn left(&self) -> &str {
        self.style.as_ref().map_or("", |s| s.left.as_str())
    }

    /// Current width, or `""` when no style is applied.
    pub fn width(&self) -> &str {
        self.style.as_ref().map_or("", |s| s.width.as_str())
    }
}

impl LayoutTarget for StyledElement {
    fn apply(&mut self, style: SlotStyle) {
        self.style = Some(style);
    }

    fn clear(&mut self) {
        self.style = None;
    }
}

//! Rendering surface capability
//!
//! A surface is anything annotations can be drawn on: a line chart axis, a
//! spatio-temporal image. Each has its own mapping between recording time
//! and display x.

use crate::segment::TimeSegment;
use serde::{Deserialize, Serialize};

/// Opaque reference to a drawn element, issued by the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Handle(pub u64);

/// How the value axis of a surface is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisKind {
    /// Continuous values (pressure on a line chart)
    Value,
    /// Discrete rows (sensors on an image)
    Categorical,
}

/// Placement of annotation labels relative to their marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelStyle {
    /// Horizontal distance from the marker, display units
    pub text_offset: f64,
    /// Vertical position. Fraction of the visible range on value axes
    /// (0 bottom, 1 top); rows above the lowest on categorical axes.
    pub label_y_offset: f64,
    /// Text rotation in degrees
    pub rotation: f64,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            text_offset: 6.0,
            label_y_offset: 0.75,
            rotation: 90.0,
        }
    }
}

impl LabelStyle {
    /// Label anchor for a marker at display `x`
    pub fn position(&self, x: f64, kind: AxisKind, visible: (f64, f64)) -> (f64, f64) {
        let (lo, hi) = visible;
        let y = match kind {
            AxisKind::Value => lo + self.label_y_offset * (hi - lo),
            AxisKind::Categorical => lo + self.label_y_offset,
        };
        (x + self.text_offset, y)
    }
}

/// Drawing and coordinate capability of one surface
pub trait Surface {
    /// Human readable name for logs
    fn name(&self) -> &str {
        "surface"
    }

    fn draw_vertical_marker(&mut self, x: f64) -> Handle;

    fn draw_text(&mut self, x: f64, y: f64, text: &str, style: &LabelStyle) -> Handle;

    /// Release a drawn element; unknown handles are ignored
    fn remove(&mut self, handle: Handle);

    /// Forward transform, seconds to display x
    fn time_to_display(&self, time: f64) -> f64;

    /// Inverse transform, display x to seconds
    fn display_to_time(&self, x: f64) -> f64;

    /// Lowest and highest visible value-axis coordinate
    fn visible_value_range(&self) -> (f64, f64);

    fn axis_kind(&self) -> AxisKind;

    /// Retarget the transforms at a newly shown window
    ///
    /// Surfaces with a fixed mapping keep the default.
    fn set_window(&mut self, _segment: &TimeSegment<'_>) {}
}

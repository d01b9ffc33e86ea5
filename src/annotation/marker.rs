//! One annotation drawn on one surface

use crate::annotation::surface::{Handle, LabelStyle, Surface};
use crate::storage::{AnnotationId, AnnotationRecord};
use serde::Serialize;

/// Lifecycle of a marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MarkerState {
    /// Registered, nothing drawn yet
    Created,
    /// Drawn at the position of its bound time
    Positioned,
    /// Rebound to a new time by a move
    Moved,
}

/// Text label drawn next to a marker
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerLabel {
    pub handle: Handle,
    pub x: f64,
    pub y: f64,
}

/// Rendered instance of an annotation on one surface
#[derive(Debug, Clone)]
pub struct AnnotationMarker {
    id: AnnotationId,
    time: f64,
    text: String,
    display_x: f64,
    line: Option<Handle>,
    label: Option<MarkerLabel>,
    show_label: bool,
    style: LabelStyle,
    state: MarkerState,
}

impl AnnotationMarker {
    pub(crate) fn new(
        id: AnnotationId,
        record: &AnnotationRecord,
        show_label: bool,
        style: &LabelStyle,
    ) -> Self {
        Self {
            id,
            time: record.time,
            text: record.text.clone(),
            display_x: f64::NAN,
            line: None,
            label: None,
            show_label,
            style: style.clone(),
            state: MarkerState::Created,
        }
    }

    pub fn id(&self) -> AnnotationId {
        self.id
    }

    /// Bound time in seconds
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Display x derived from the bound time at the last draw
    pub fn display_x(&self) -> f64 {
        self.display_x
    }

    pub fn label(&self) -> Option<&MarkerLabel> {
        self.label.as_ref()
    }

    pub fn state(&self) -> MarkerState {
        self.state
    }

    /// Handles this marker currently holds on its surface
    pub fn handles(&self) -> Vec<Handle> {
        self.line
            .into_iter()
            .chain(self.label.as_ref().map(|l| l.handle))
            .collect()
    }

    /// Draw at the position of the bound time
    pub(crate) fn draw(&mut self, surface: &mut dyn Surface) {
        let x = surface.time_to_display(self.time);
        self.line = Some(surface.draw_vertical_marker(x));

        if self.show_label {
            let (lx, ly) = self
                .style
                .position(x, surface.axis_kind(), surface.visible_value_range());
            let handle = surface.draw_text(lx, ly, &self.text, &self.style);
            self.label = Some(MarkerLabel {
                handle,
                x: lx,
                y: ly,
            });
        }

        self.display_x = x;
        if self.state == MarkerState::Created {
            self.state = MarkerState::Positioned;
        }
    }

    /// Rebind to `time` and redraw
    pub(crate) fn rebind(&mut self, surface: &mut dyn Surface, time: f64) {
        self.release(surface);
        self.time = time;
        self.state = MarkerState::Moved;
        self.draw(surface);
    }

    /// Whether the surface now maps this marker somewhere else
    pub(crate) fn is_stale(&self, surface: &dyn Surface) -> bool {
        let x = surface.time_to_display(self.time);
        if x != self.display_x {
            return true;
        }
        match &self.label {
            Some(label) => {
                let (lx, ly) =
                    self.style
                        .position(x, surface.axis_kind(), surface.visible_value_range());
                lx != label.x || ly != label.y
            }
            None => false,
        }
    }

    /// Take the record's time and text unless a move is pending
    ///
    /// Returns whether the binding changed.
    pub(crate) fn follow(&mut self, record: &AnnotationRecord) -> bool {
        if self.state == MarkerState::Moved {
            return false;
        }
        if self.time == record.time && self.text == record.text {
            return false;
        }
        self.time = record.time;
        self.text = record.text.clone();
        true
    }

    /// Erase and draw again at the bound time
    pub(crate) fn redraw(&mut self, surface: &mut dyn Surface) {
        self.release(surface);
        self.draw(surface);
    }

    /// Mark the current binding as saved
    pub(crate) fn settle(&mut self) {
        if self.state == MarkerState::Moved {
            self.state = MarkerState::Positioned;
        }
    }

    /// Erase everything drawn for this marker
    pub(crate) fn release(&mut self, surface: &mut dyn Surface) {
        if let Some(line) = self.line.take() {
            surface.remove(line);
        }
        if let Some(label) = self.label.take() {
            surface.remove(label.handle);
        }
    }
}

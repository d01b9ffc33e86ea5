//! Line chart of one sensor

use crate::annotation::{AxisKind, Handle, LabelStyle, Surface};
use crate::render::draw_list::RenderBackend;
use crate::segment::{padded_limits, time_ticks, TimeSegment};
use crate::storage::SensorId;
use crate::time::TimeFormat;

/// Display units per second
pub const DEFAULT_X_SCALE: f64 = 100.0;

/// Value axis surface: x is seconds since the segment start times `x_scale`
pub struct LineView<B> {
    sensor: SensorId,
    name: String,
    origin: f64,
    x_scale: f64,
    margin: f64,
    limits: (f64, f64),
    backend: B,
}

impl<B: RenderBackend> LineView<B> {
    /// View of `sensor` over `segment`, `None` if the segment lacks it
    pub fn for_segment(
        segment: &TimeSegment<'_>,
        sensor: SensorId,
        x_scale: f64,
        margin: f64,
        backend: B,
    ) -> Option<Self> {
        let series = segment.series(sensor)?;

        Some(Self {
            sensor,
            name: format!("line:{}", sensor),
            origin: window_origin(segment),
            x_scale,
            margin,
            limits: series_limits(&series, margin),
            backend,
        })
    }

    pub fn sensor(&self) -> SensorId {
        self.sensor
    }

    pub fn limits(&self) -> (f64, f64) {
        self.limits
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Time ticks placed at display x
    pub fn ticks(&self, times: &[f64], steps: usize, format: TimeFormat) -> Vec<(f64, String)> {
        time_ticks(times, steps, format)
            .into_iter()
            .map(|tick| (self.time_to_display(tick.time), tick.label))
            .collect()
    }
}

fn window_origin(segment: &TimeSegment<'_>) -> f64 {
    segment.times().first().copied().unwrap_or(segment.start())
}

fn series_limits(series: &[f64], margin: f64) -> (f64, f64) {
    padded_limits(series, margin).unwrap_or((-1.0, 1.0))
}

impl<B: RenderBackend> Surface for LineView<B> {
    fn name(&self) -> &str {
        &self.name
    }

    fn draw_vertical_marker(&mut self, x: f64) -> Handle {
        self.backend.vertical_line(x)
    }

    fn draw_text(&mut self, x: f64, y: f64, text: &str, style: &LabelStyle) -> Handle {
        self.backend.text(x, y, text, style)
    }

    fn remove(&mut self, handle: Handle) {
        self.backend.erase(handle);
    }

    fn time_to_display(&self, time: f64) -> f64 {
        (time - self.origin) * self.x_scale
    }

    fn display_to_time(&self, x: f64) -> f64 {
        self.origin + x / self.x_scale
    }

    fn visible_value_range(&self) -> (f64, f64) {
        self.limits
    }

    fn axis_kind(&self) -> AxisKind {
        AxisKind::Value
    }

    /// Restart x at the window's first sample and refit the value axis
    fn set_window(&mut self, segment: &TimeSegment<'_>) {
        self.origin = window_origin(segment);
        if let Some(series) = segment.series(self.sensor) {
            self.limits = series_limits(&series, self.margin);
        }
    }
}

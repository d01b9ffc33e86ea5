//! Spatio-temporal image: sensors as rows, samples as columns

use crate::annotation::{AxisKind, Handle, LabelStyle, Surface};
use crate::render::draw_list::RenderBackend;
use crate::segment::{sensor_ticks, time_ticks, SensorTick, TimeSegment, TimeTick};
use crate::storage::SensorId;
use crate::time::TimeFormat;

/// Categorical surface: x is the fractional sample index into the segment
pub struct SpatioView<B> {
    times: Vec<f64>,
    sensors: Vec<SensorId>,
    backend: B,
}

impl<B: RenderBackend> SpatioView<B> {
    pub fn for_segment(segment: &TimeSegment<'_>, backend: B) -> Self {
        Self {
            times: segment.times().to_vec(),
            sensors: segment.sensors().to_vec(),
            backend,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Column ticks, positioned at sample indices
    pub fn time_ticks(&self, steps: usize, format: TimeFormat) -> Vec<TimeTick> {
        time_ticks(&self.times, steps, format)
    }

    /// Row ticks labeled with sensor ids
    pub fn sensor_ticks(&self) -> Vec<SensorTick> {
        sensor_ticks(&self.sensors)
    }

    /// Spacing used past either end of the segment
    fn edge_step(&self, at_end: bool) -> f64 {
        let n = self.times.len();
        if n < 2 {
            return 1.0;
        }
        if at_end {
            self.times[n - 1] - self.times[n - 2]
        } else {
            self.times[1] - self.times[0]
        }
    }
}

impl<B: RenderBackend> Surface for SpatioView<B> {
    fn name(&self) -> &str {
        "spatio"
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
        let n = self.times.len();
        if n == 0 {
            return 0.0;
        }

        let i = self.times.partition_point(|&t| t < time);
        if i == 0 {
            return (time - self.times[0]) / self.edge_step(false);
        }
        if i == n {
            return (n - 1) as f64 + (time - self.times[n - 1]) / self.edge_step(true);
        }

        let (before, after) = (self.times[i - 1], self.times[i]);
        (i - 1) as f64 + (time - before) / (after - before)
    }

    fn display_to_time(&self, x: f64) -> f64 {
        let n = self.times.len();
        if n == 0 {
            return x;
        }

        if x <= 0.0 {
            return self.times[0] + x * self.edge_step(false);
        }
        let last = (n - 1) as f64;
        if x >= last {
            return self.times[n - 1] + (x - last) * self.edge_step(true);
        }

        let i = x.floor() as usize;
        let frac = x - i as f64;
        self.times[i] + frac * (self.times[i + 1] - self.times[i])
    }

    fn visible_value_range(&self) -> (f64, f64) {
        (0.0, self.sensors.len() as f64)
    }

    fn axis_kind(&self) -> AxisKind {
        AxisKind::Categorical
    }

    fn set_window(&mut self, segment: &TimeSegment<'_>) {
        self.times = segment.times().to_vec();
        self.sensors = segment.sensors().to_vec();
    }
}

//! Axis helpers shared by the views

use crate::storage::SensorId;
use crate::time::TimeFormat;
use serde::Serialize;

/// Default number of samples between time ticks, as a fraction of the segment
pub const DEFAULT_TICK_STEPS: usize = 7;

/// Default value-axis margin, as a fraction of the data range
pub const DEFAULT_MARGIN: f64 = 0.25;

/// A tick on the time axis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeTick {
    /// Sample index, the position on image surfaces
    pub index: usize,
    /// Sample time, the position on value surfaces
    pub time: f64,
    pub label: String,
}

/// A tick on the sensor axis of an image surface
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorTick {
    pub row: usize,
    pub label: String,
}

/// Ticks every `len / steps_between_ticks` samples
pub fn time_ticks(times: &[f64], steps_between_ticks: usize, format: TimeFormat) -> Vec<TimeTick> {
    let step = (times.len() / steps_between_ticks.max(1)).max(1);
    times
        .iter()
        .enumerate()
        .step_by(step)
        .map(|(index, &time)| TimeTick {
            index,
            time,
            label: format.format(time),
        })
        .collect()
}

/// One tick per image row, labeled with the sensor id
pub fn sensor_ticks(sensors: &[SensorId]) -> Vec<SensorTick> {
    sensors
        .iter()
        .enumerate()
        .map(|(row, sensor)| SensorTick {
            row,
            label: sensor.to_string(),
        })
        .collect()
}

/// Value limits widened by `margin * range` on each side
///
/// Limits are rounded to two decimals. A flat signal gets one unit of room
/// on each side. Non-finite values are ignored.
pub fn padded_limits(values: &[f64], margin: f64) -> Option<(f64, f64)> {
    let (lo, hi) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })?;

    let range = hi - lo;
    if range == 0.0 {
        return Some((lo - 1.0, hi + 1.0));
    }
    Some((round2(lo - range * margin), round2(hi + range * margin)))
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

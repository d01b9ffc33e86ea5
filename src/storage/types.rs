//! Core data types for a manometry recording
//!
//! - `SensorId`: one of the 36 catheter pressure channels
//! - `PressureTable`: time-indexed readings, one column per sensor
//! - `AnnotationRecord`: a timed text event
//! - `Dataset`: both streams of one capture file

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Number of pressure channels on a full catheter
pub const MAX_SENSORS: usize = 36;

/// Identifier of a pressure channel, 1-based like the capture header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SensorId(u8);

impl SensorId {
    /// Create a sensor id, `None` outside 1..=36
    pub fn new(id: usize) -> Option<Self> {
        if (1..=MAX_SENSORS).contains(&id) {
            Some(Self(id as u8))
        } else {
            None
        }
    }

    /// The 1-based channel number
    pub fn get(&self) -> usize {
        self.0 as usize
    }

    /// All 36 channels in catheter order
    pub fn all() -> impl Iterator<Item = SensorId> {
        (1..=MAX_SENSORS as u8).map(SensorId)
    }
}

impl std::fmt::Display for SensorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SensorId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n: usize = s
            .trim()
            .parse()
            .map_err(|_| format!("'{}' is not a sensor number", s))?;
        SensorId::new(n).ok_or_else(|| format!("sensor {} outside 1..={}", n, MAX_SENSORS))
    }
}

/// Identifier of an annotation: its position in file order
///
/// Stable for the lifetime of one import; a re-import renumbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationId(pub usize);

impl std::fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A timed text event ("Bolus start", "Swallow 3", ...)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnnotationRecord {
    /// Seconds since capture start
    pub time: f64,
    /// Free text
    pub text: String,
}

impl AnnotationRecord {
    pub fn new(time: f64, text: impl Into<String>) -> Self {
        Self {
            time,
            text: text.into(),
        }
    }
}

/// Why a row was refused by [`PressureTable::try_push`]
#[derive(Debug, Clone, PartialEq)]
pub enum RowRejection {
    /// Row does not carry one value per sensor column
    Width { expected: usize, found: usize },
    /// Time is not strictly greater than the previous row's
    NotIncreasing { previous: f64 },
    /// Time is NaN or infinite
    NonFinite,
}

/// Pressure readings keyed by strictly increasing time
///
/// Values are stored row-major: row `i` occupies
/// `values[i * width .. (i + 1) * width]` in header column order.
#[derive(Debug, Clone, PartialEq)]
pub struct PressureTable {
    sensors: Vec<SensorId>,
    times: Vec<f64>,
    values: Vec<f64>,
}

impl PressureTable {
    /// Create an empty table with the given column layout
    pub fn new(sensors: Vec<SensorId>) -> Self {
        Self {
            sensors,
            times: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Append a row, keeping times strictly increasing
    pub fn try_push(&mut self, time: f64, row: &[f64]) -> Result<(), RowRejection> {
        if row.len() != self.sensors.len() {
            return Err(RowRejection::Width {
                expected: self.sensors.len(),
                found: row.len(),
            });
        }
        if !time.is_finite() {
            return Err(RowRejection::NonFinite);
        }
        if let Some(&previous) = self.times.last() {
            if time <= previous {
                return Err(RowRejection::NotIncreasing { previous });
            }
        }

        self.times.push(time);
        self.values.extend_from_slice(row);
        Ok(())
    }

    /// Column layout, in header order
    pub fn sensors(&self) -> &[SensorId] {
        &self.sensors
    }

    /// Number of sensor columns
    pub fn width(&self) -> usize {
        self.sensors.len()
    }

    /// Time keys, strictly increasing
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Row-major value storage
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Values of row `index` in header column order
    pub fn row(&self, index: usize) -> Option<&[f64]> {
        let width = self.width();
        if index < self.len() {
            Some(&self.values[index * width..(index + 1) * width])
        } else {
            None
        }
    }

    /// Column position of a sensor
    pub fn column_of(&self, sensor: SensorId) -> Option<usize> {
        self.sensors.iter().position(|&s| s == sensor)
    }

    /// Reading of one sensor at an exact sample time
    pub fn value_at(&self, time: f64, sensor: SensorId) -> Option<f64> {
        let column = self.column_of(sensor)?;
        let index = self
            .times
            .binary_search_by(|t| t.total_cmp(&time))
            .ok()?;
        self.row(index).map(|row| row[column])
    }

    /// Row indices with `start <= t < end`
    pub fn index_range(&self, start: f64, end: f64) -> Range<usize> {
        let lo = self.times.partition_point(|&t| t < start);
        let hi = self.times.partition_point(|&t| t < end).max(lo);
        lo..hi
    }

    /// First and last sample time
    pub fn time_span(&self) -> Option<(f64, f64)> {
        Some((*self.times.first()?, *self.times.last()?))
    }
}

/// Both streams of one capture file
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub pressures: PressureTable,
    /// Annotations in file order; the index is the [`AnnotationId`]
    pub annotations: Vec<AnnotationRecord>,
}

impl Dataset {
    /// Annotations sorted by time, ties kept in file order
    pub fn annotations_by_time(&self) -> Vec<(AnnotationId, &AnnotationRecord)> {
        let mut sorted: Vec<_> = self
            .annotations
            .iter()
            .enumerate()
            .map(|(i, record)| (AnnotationId(i), record))
            .collect();
        sorted.sort_by(|a, b| a.1.time.total_cmp(&b.1.time));
        sorted
    }

    pub fn summary(&self) -> StoreSummary {
        let span = self.pressures.time_span();
        StoreSummary {
            rows: self.pressures.len(),
            sensors: self.pressures.width(),
            annotations: self.annotations.len(),
            first_time: span.map(|(first, _)| first),
            last_time: span.map(|(_, last)| last),
        }
    }
}

/// Shape of a loaded recording
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreSummary {
    pub rows: usize,
    pub sensors: usize,
    pub annotations: usize,
    pub first_time: Option<f64>,
    pub last_time: Option<f64>,
}

impl std::fmt::Display for StoreSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "pressures: {} rows x {} sensors, annotations: {}",
            self.rows, self.sensors, self.annotations
        )?;
        if let (Some(first), Some(last)) = (self.first_time, self.last_time) {
            write!(f, ", span: {:.2}s - {:.2}s", first, last)?;
        }
        Ok(())
    }
}

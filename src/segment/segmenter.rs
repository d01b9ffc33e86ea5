//! Time and sensor sub-views of the loaded recording

use crate::segment::error::{SegmentError, SegmentResult};
use crate::storage::{AnnotationId, AnnotationRecord, PressureTable, SensorId, TimeSeriesStore};
use crate::time::TimeValue;
use serde::Serialize;
use std::ops::Range;

/// One element of a user-supplied time range
///
/// Ranges arrive from loosely typed sources (CLI, config, scripts) so an
/// element may itself be a list; only flat pairs are accepted.
#[derive(Debug, Clone, PartialEq)]
pub enum RangeArg {
    Time(TimeValue),
    List(Vec<RangeArg>),
}

impl From<f64> for RangeArg {
    fn from(value: f64) -> Self {
        RangeArg::Time(TimeValue::Seconds(value))
    }
}

impl From<&str> for RangeArg {
    fn from(value: &str) -> Self {
        RangeArg::Time(TimeValue::from(value))
    }
}

impl From<TimeValue> for RangeArg {
    fn from(value: TimeValue) -> Self {
        RangeArg::Time(value)
    }
}

impl From<Vec<RangeArg>> for RangeArg {
    fn from(value: Vec<RangeArg>) -> Self {
        RangeArg::List(value)
    }
}

/// Validate a range argument and convert both ends to seconds
///
/// Requires exactly two elements, neither of them a list. Each element may
/// be clock text, numeric text or seconds independently.
pub fn process_time_range(args: &[RangeArg]) -> SegmentResult<(f64, f64)> {
    if args.len() != 2 {
        return Err(SegmentError::Format(format!(
            "time range needs exactly 2 elements, got {}",
            args.len()
        )));
    }

    let mut ends = [0.0; 2];
    for (slot, arg) in ends.iter_mut().zip(args) {
        *slot = match arg {
            RangeArg::Time(value) => value.to_seconds()?,
            RangeArg::List(_) => {
                return Err(SegmentError::Format(
                    "time range elements must not be nested".to_string(),
                ))
            }
        };
    }

    Ok((ends[0], ends[1]))
}

/// Time interval `[start, end)` in either time form
#[derive(Debug, Clone, PartialEq)]
pub struct TimeRange {
    pub start: TimeValue,
    pub end: TimeValue,
}

impl TimeRange {
    pub fn new(start: impl Into<TimeValue>, end: impl Into<TimeValue>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Parse a range argument of exactly two flat elements
    pub fn from_args(args: &[RangeArg]) -> SegmentResult<Self> {
        let (start, end) = process_time_range(args)?;
        Ok(Self::new(start, end))
    }

    /// Both ends in seconds, checking `start < end`
    pub fn to_seconds(&self) -> SegmentResult<(f64, f64)> {
        let start = self.start.to_seconds()?;
        let end = self.end.to_seconds()?;
        if start >= end {
            return Err(SegmentError::Range { start, end });
        }
        Ok((start, end))
    }
}

impl<A: Into<TimeValue>, B: Into<TimeValue>> From<(A, B)> for TimeRange {
    fn from((start, end): (A, B)) -> Self {
        TimeRange::new(start, end)
    }
}

/// Validate raw sensor numbers
pub fn parse_sensors(ids: &[usize]) -> SegmentResult<Vec<SensorId>> {
    ids.iter()
        .map(|&id| {
            SensorId::new(id)
                .ok_or_else(|| SegmentError::Format(format!("sensor {} does not exist", id)))
        })
        .collect()
}

/// Borrowed view of rows in `[start, end)` and a chosen set of sensors
#[derive(Debug, Clone)]
pub struct TimeSegment<'a> {
    start: f64,
    end: f64,
    table: &'a PressureTable,
    rows: Range<usize>,
    sensors: Vec<SensorId>,
    columns: Vec<usize>,
    annotations: Vec<(AnnotationId, &'a AnnotationRecord)>,
}

impl<'a> TimeSegment<'a> {
    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    /// Sample times of the matched rows; also the sampling grid
    pub fn times(&self) -> &'a [f64] {
        &self.table.times()[self.rows.clone()]
    }

    /// Sensors in requested order
    pub fn sensors(&self) -> &[SensorId] {
        &self.sensors
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Valid range that matched no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value at segment row `row` for the `index`-th requested sensor
    pub fn value(&self, row: usize, index: usize) -> Option<f64> {
        let column = *self.columns.get(index)?;
        if row >= self.len() {
            return None;
        }
        self.table
            .row(self.rows.start + row)
            .map(|values| values[column])
    }

    /// Values of one row in requested sensor order
    pub fn row(&self, row: usize) -> Option<Vec<f64>> {
        if row >= self.len() {
            return None;
        }
        let values = self.table.row(self.rows.start + row)?;
        Some(self.columns.iter().map(|&c| values[c]).collect())
    }

    /// Series of one requested sensor
    pub fn series(&self, sensor: SensorId) -> Option<Vec<f64>> {
        let index = self.sensors.iter().position(|&s| s == sensor)?;
        let column = self.columns[index];
        Some(
            self.rows
                .clone()
                .filter_map(|r| self.table.row(r).map(|values| values[column]))
                .collect(),
        )
    }

    /// Annotations inside the interval, ordered by time
    pub fn annotations(&self) -> &[(AnnotationId, &'a AnnotationRecord)] {
        &self.annotations
    }

    /// Owned copy for serialization
    pub fn to_export(&self) -> SegmentExport {
        SegmentExport {
            start: self.start,
            end: self.end,
            sensors: self.sensors.clone(),
            rows: (0..self.len())
                .filter_map(|i| {
                    Some(SegmentRow {
                        time: self.times()[i],
                        values: self.row(i)?,
                    })
                })
                .collect(),
            annotations: self
                .annotations
                .iter()
                .map(|(id, record)| AnnotationEntry {
                    id: *id,
                    time: record.time,
                    text: record.text.clone(),
                })
                .collect(),
        }
    }
}

/// Serializable form of a [`TimeSegment`]
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SegmentExport {
    pub start: f64,
    pub end: f64,
    pub sensors: Vec<SensorId>,
    pub rows: Vec<SegmentRow>,
    pub annotations: Vec<AnnotationEntry>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SegmentRow {
    pub time: f64,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnnotationEntry {
    pub id: AnnotationId,
    pub time: f64,
    pub text: String,
}

/// Extracts [`TimeSegment`]s from a store
pub struct Segmenter<'a> {
    store: &'a TimeSeriesStore,
}

impl<'a> Segmenter<'a> {
    pub fn new(store: &'a TimeSeriesStore) -> Self {
        Self { store }
    }

    /// Rows with `start <= t < end` and the requested sensors, in order
    pub fn get_segment(
        &self,
        range: impl Into<TimeRange>,
        sensors: &[SensorId],
    ) -> SegmentResult<TimeSegment<'a>> {
        let dataset = self.store.dataset().ok_or(SegmentError::NoData)?;
        let (start, end) = range.into().to_seconds()?;

        let table = &dataset.pressures;
        let columns = resolve_columns(table, sensors)?;
        let rows = table.index_range(start, end);

        let annotations: Vec<_> = dataset
            .annotations_by_time()
            .into_iter()
            .filter(|(_, record)| record.time >= start && record.time < end)
            .collect();

        tracing::debug!(
            start,
            end,
            rows = rows.len(),
            sensors = sensors.len(),
            annotations = annotations.len(),
            "Extracted segment"
        );

        Ok(TimeSegment {
            start,
            end,
            table,
            rows,
            sensors: sensors.to_vec(),
            columns,
            annotations,
        })
    }

    /// Segment from an untyped range argument
    pub fn get_segment_from_args(
        &self,
        args: &[RangeArg],
        sensors: &[SensorId],
    ) -> SegmentResult<TimeSegment<'a>> {
        self.get_segment(TimeRange::from_args(args)?, sensors)
    }

    /// Segment covering the whole recording
    pub fn full(&self, sensors: &[SensorId]) -> SegmentResult<TimeSegment<'a>> {
        let dataset = self.store.dataset().ok_or(SegmentError::NoData)?;
        match dataset.pressures.time_span() {
            Some((first, last)) => self.get_segment((first, next_after(last)), sensors),
            None => Err(SegmentError::Format("recording has no rows".to_string())),
        }
    }
}

fn resolve_columns(table: &PressureTable, sensors: &[SensorId]) -> SegmentResult<Vec<usize>> {
    if sensors.is_empty() {
        return Err(SegmentError::Format("no sensors requested".to_string()));
    }

    let mut columns = Vec::with_capacity(sensors.len());
    for (i, &sensor) in sensors.iter().enumerate() {
        if sensors[..i].contains(&sensor) {
            return Err(SegmentError::Format(format!(
                "sensor {} requested twice",
                sensor
            )));
        }
        let column = table.column_of(sensor).ok_or_else(|| {
            SegmentError::Format(format!("sensor {} is not in the recording", sensor))
        })?;
        columns.push(column);
    }
    Ok(columns)
}

/// Smallest float above `x`, so a half-open range can include `x`
fn next_after(x: f64) -> f64 {
    if x == 0.0 {
        return f64::from_bits(1);
    }
    let bits = x.to_bits();
    if x > 0.0 {
        f64::from_bits(bits + 1)
    } else {
        f64::from_bits(bits - 1)
    }
}

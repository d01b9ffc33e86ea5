//! Capture text format
//!
//! ```text
//! Time    1       2       ...     36
//! 0.00    12.1    8.4     ...     -3.0
//! ...
//! Annotations:
//! 12.50   Bolus start
//! ```
//!
//! Cells are tab-separated. The first cell of the header may also be written
//! `TIME` or `TIME:` by the acquisition software. Everything after the
//! sentinel row is an annotation row of time and text.

use crate::storage::error::ImportError;
use crate::storage::types::{
    AnnotationRecord, Dataset, PressureTable, RowRejection, SensorId, MAX_SENSORS,
};
use std::fmt::Write;

/// First cell of the row separating readings from annotations
pub const SENTINEL: &str = "Annotations:";

/// Header label of the time column
pub const TIME_HEADER: &str = "Time";

/// Parse capture text into a fresh dataset
///
/// `required_sensors` rejects files whose header declares fewer columns.
pub fn parse_text(raw: &str, required_sensors: Option<usize>) -> Result<Dataset, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(raw.as_bytes());

    let mut records = reader.records();

    // Header
    let (header_line, header) = loop {
        match records.next() {
            None => return Err(ImportError::Empty),
            Some(result) => {
                let record = read_record(result)?;
                if !is_blank(&record.1) {
                    break record;
                }
            }
        }
    };

    let sensors = parse_header(header_line, &header)?;
    if let Some(required) = required_sensors {
        if sensors.len() < required {
            return Err(ImportError::TooFewSensors {
                line: header_line,
                found: sensors.len(),
                required,
            });
        }
    }

    let width = sensors.len();
    let mut pressures = PressureTable::new(sensors);
    let mut annotations = Vec::new();
    let mut seen_sentinel = false;
    let mut row = Vec::with_capacity(width);

    for result in records {
        let (line, cells) = read_record(result)?;
        if is_blank(&cells) {
            continue;
        }

        if !seen_sentinel {
            if cells[0].trim() == SENTINEL {
                seen_sentinel = true;
                continue;
            }

            let cells = trim_trailing_empty(&cells);
            if cells.len() != width + 1 {
                return Err(ImportError::RowWidth {
                    line,
                    expected: width + 1,
                    found: cells.len(),
                });
            }

            row.clear();
            for (column, cell) in cells.iter().enumerate().skip(1) {
                row.push(parse_number(line, column + 1, cell)?);
            }
            let time = parse_number(line, 1, &cells[0])?;

            pressures
                .try_push(time, &row)
                .map_err(|rejection| match rejection {
                    RowRejection::NotIncreasing { previous } => {
                        ImportError::NonIncreasingTime { line, time, previous }
                    }
                    RowRejection::NonFinite => ImportError::BadNumber {
                        line,
                        column: 1,
                        cell: cells[0].clone(),
                    },
                    RowRejection::Width { expected, found } => ImportError::RowWidth {
                        line,
                        expected: expected + 1,
                        found: found + 1,
                    },
                })?;
        } else {
            let time = parse_number(line, 1, &cells[0])?;
            if !time.is_finite() {
                return Err(ImportError::BadNumber {
                    line,
                    column: 1,
                    cell: cells[0].clone(),
                });
            }
            // Text may itself contain tabs
            let text = trim_trailing_empty(&cells[1..]).join("\t");
            annotations.push(AnnotationRecord::new(time, text.trim()));
        }
    }

    if !seen_sentinel {
        return Err(ImportError::MissingSentinel);
    }

    Ok(Dataset {
        pressures,
        annotations,
    })
}

/// Write a dataset back to capture text
///
/// Annotations are written sorted by time. Floats use the shortest
/// representation that parses back to the same value.
pub fn write_text(dataset: &Dataset) -> String {
    let table = &dataset.pressures;
    let mut out = String::with_capacity(table.len() * (table.width() + 1) * 8);

    out.push_str(TIME_HEADER);
    for sensor in table.sensors() {
        let _ = write!(out, "\t{}", sensor);
    }
    out.push('\n');

    for (index, &time) in table.times().iter().enumerate() {
        let _ = write!(out, "{}", time);
        if let Some(row) = table.row(index) {
            for value in row {
                let _ = write!(out, "\t{}", value);
            }
        }
        out.push('\n');
    }

    out.push_str(SENTINEL);
    out.push('\n');

    for (_, record) in dataset.annotations_by_time() {
        let text: String = record
            .text
            .chars()
            .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
            .collect();
        let _ = writeln!(out, "{}\t{}", record.time, text);
    }

    out
}

fn read_record(
    result: Result<csv::StringRecord, csv::Error>,
) -> Result<(u64, Vec<String>), ImportError> {
    match result {
        Ok(record) => {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            Ok((line, record.iter().map(|c| c.to_string()).collect()))
        }
        Err(e) => Err(ImportError::Malformed {
            line: e.position().map(|p| p.line()).unwrap_or(0),
            reason: e.to_string(),
        }),
    }
}

fn parse_header(line: u64, cells: &[String]) -> Result<Vec<SensorId>, ImportError> {
    let cells = trim_trailing_empty(cells);

    let first = cells[0].trim();
    let first = first.strip_suffix(':').unwrap_or(first);
    if !first.eq_ignore_ascii_case(TIME_HEADER) {
        return Err(ImportError::Header {
            line,
            cell: cells[0].clone(),
            reason: "first column must be 'Time'".to_string(),
        });
    }

    let mut sensors: Vec<SensorId> = Vec::with_capacity(MAX_SENSORS);
    for cell in &cells[1..] {
        let sensor: SensorId = cell.parse().map_err(|reason| ImportError::Header {
            line,
            cell: cell.clone(),
            reason,
        })?;
        if sensors.contains(&sensor) {
            return Err(ImportError::Header {
                line,
                cell: cell.clone(),
                reason: "sensor listed twice".to_string(),
            });
        }
        sensors.push(sensor);
    }

    if sensors.is_empty() {
        return Err(ImportError::TooFewSensors {
            line,
            found: 0,
            required: 1,
        });
    }

    Ok(sensors)
}

fn parse_number(line: u64, column: usize, cell: &str) -> Result<f64, ImportError> {
    cell.trim()
        .parse::<f64>()
        .map_err(|_| ImportError::BadNumber {
            line,
            column,
            cell: cell.to_string(),
        })
}

fn is_blank(cells: &[String]) -> bool {
    cells.iter().all(|c| c.trim().is_empty())
}

fn trim_trailing_empty(cells: &[String]) -> &[String] {
    let end = cells
        .iter()
        .rposition(|c| !c.trim().is_empty())
        .map(|i| i + 1)
        .unwrap_or(0);
    &cells[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Time\t1\t2\t3
1.0\t10\t20\t30
2.0\t11\t21\t31
Annotations:
1.5\tBolus start
";

    fn sensor(id: usize) -> SensorId {
        SensorId::new(id).unwrap()
    }

    #[test]
    fn test_parse_sample() {
        let dataset = parse_text(SAMPLE, None).unwrap();

        assert_eq!(dataset.pressures.len(), 2);
        assert_eq!(dataset.pressures.width(), 3);
        assert_eq!(dataset.pressures.times(), &[1.0, 2.0]);
        assert_eq!(dataset.pressures.row(0), Some(&[10.0, 20.0, 30.0][..]));
        assert_eq!(
            dataset.annotations,
            vec![AnnotationRecord::new(1.5, "Bolus start")]
        );
    }

    #[test]
    fn test_parse_instrument_header_and_crlf() {
        let raw = "TIME:\t1\t2\t\r\n0.5\t1\t2\t\r\n\r\nAnnotations:\r\n0.5\tSwallow\r\n";
        let dataset = parse_text(raw, None).unwrap();

        assert_eq!(dataset.pressures.sensors(), &[sensor(1), sensor(2)]);
        assert_eq!(dataset.pressures.row(0), Some(&[1.0, 2.0][..]));
        assert_eq!(dataset.annotations[0].text, "Swallow");
    }

    #[test]
    fn test_parse_annotation_with_tab_and_quotes() {
        let raw = "Time\t1\n0\t1\nAnnotations:\n3\t\"quoted\"\tand more\n";
        let dataset = parse_text(raw, None).unwrap();

        assert_eq!(dataset.annotations[0].text, "\"quoted\"\tand more");
    }

    #[test]
    fn test_missing_sentinel() {
        let raw = "Time\t1\n0\t1\n1\t2\n";
        assert_eq!(parse_text(raw, None), Err(ImportError::MissingSentinel));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_text("", None), Err(ImportError::Empty));
        assert_eq!(parse_text("\n\n", None), Err(ImportError::Empty));
    }

    #[test]
    fn test_bad_cell_reports_line_and_column() {
        let raw = "Time\t1\t2\n0\t1\t2\n1\t2\tabc\nAnnotations:\n";
        assert_eq!(
            parse_text(raw, None),
            Err(ImportError::BadNumber {
                line: 3,
                column: 3,
                cell: "abc".to_string()
            })
        );
    }

    #[test]
    fn test_short_row_rejected() {
        let raw = "Time\t1\t2\n0\t1\nAnnotations:\n";
        assert_eq!(
            parse_text(raw, None),
            Err(ImportError::RowWidth {
                line: 2,
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn test_required_sensor_count() {
        let err = parse_text(SAMPLE, Some(MAX_SENSORS)).unwrap_err();
        assert_eq!(
            err,
            ImportError::TooFewSensors {
                line: 1,
                found: 3,
                required: 36
            }
        );
    }

    #[test]
    fn test_header_validation() {
        assert!(matches!(
            parse_text("Depth\t1\nAnnotations:\n", None),
            Err(ImportError::Header { .. })
        ));
        assert!(matches!(
            parse_text("Time\t1\t1\nAnnotations:\n", None),
            Err(ImportError::Header { .. })
        ));
        assert!(matches!(
            parse_text("Time\t37\nAnnotations:\n", None),
            Err(ImportError::Header { .. })
        ));
        assert!(matches!(
            parse_text("Time\nAnnotations:\n", None),
            Err(ImportError::TooFewSensors { .. })
        ));
    }

    #[test]
    fn test_non_increasing_time() {
        let raw = "Time\t1\n1\t0\n1\t0\nAnnotations:\n";
        assert_eq!(
            parse_text(raw, None),
            Err(ImportError::NonIncreasingTime {
                line: 3,
                time: 1.0,
                previous: 1.0
            })
        );
    }

    #[test]
    fn test_bad_annotation_time() {
        let raw = "Time\t1\n1\t0\nAnnotations:\nsoon\tBolus\n";
        assert!(matches!(
            parse_text(raw, None),
            Err(ImportError::BadNumber { line: 4, .. })
        ));
    }

    #[test]
    fn test_full_catheter_header() {
        let mut raw = String::from("Time");
        for s in 1..=36 {
            raw.push_str(&format!("\t{}", s));
        }
        raw.push('\n');
        raw.push_str("0.0");
        for s in 1..=36 {
            raw.push_str(&format!("\t{}.5", s));
        }
        raw.push_str("\nAnnotations:\n");

        let dataset = parse_text(&raw, Some(MAX_SENSORS)).unwrap();
        assert_eq!(dataset.pressures.width(), 36);
        assert_eq!(dataset.pressures.value_at(0.0, sensor(36)), Some(36.5));
    }

    #[test]
    fn test_write_sorts_annotations() {
        let mut dataset = parse_text(SAMPLE, None).unwrap();
        dataset.annotations.insert(0, AnnotationRecord::new(1.9, "late"));
        dataset.annotations.push(AnnotationRecord::new(1.1, "early\nline"));

        let text = write_text(&dataset);
        let tail: Vec<&str> = text
            .lines()
            .skip_while(|l| *l != SENTINEL)
            .skip(1)
            .collect();
        assert_eq!(tail, vec!["1.1\tearly line", "1.5\tBolus start", "1.9\tlate"]);
        assert!(text.starts_with("Time\t1\t2\t3\n1\t10\t20\t30\n"));
    }

    #[test]
    fn test_export_then_import_reproduces_dataset() {
        let raw = "Time\t2\t5\t7
0.01\t-3.25\t0.1\t150
0.02\t1e-3\t7\t8
0.03\t0.30000000000000004\t9\t10
Annotations:
0.03\tB
0.01\tA\twith tab
0.03\tC
";
        let dataset = parse_text(raw, None).unwrap();
        let again = parse_text(&write_text(&dataset), None).unwrap();

        assert_eq!(again.pressures, dataset.pressures);

        let mut a: Vec<(f64, String)> = dataset
            .annotations
            .iter()
            .map(|r| (r.time, r.text.clone()))
            .collect();
        let mut b: Vec<(f64, String)> = again
            .annotations
            .iter()
            .map(|r| (r.time, r.text.clone()))
            .collect();
        a.sort_by(|x, y| x.0.total_cmp(&y.0).then(x.1.cmp(&y.1)));
        b.sort_by(|x, y| x.0.total_cmp(&y.0).then(x.1.cmp(&y.1)));
        assert_eq!(a, b);
    }
}

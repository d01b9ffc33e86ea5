//! Manometry CLI
//!
//! Command-line interface for manometry captures:
//! - Summarize and normalize capture files
//! - Extract segments and annotations
//! - Place and move annotation markers
//! - Convert between clock and seconds

use anyhow::{bail, Context};
use chrono::Local;
use clap::{Parser, Subcommand};
use manometry::annotation::{AnnotationRegistry, SurfaceId};
use manometry::config::{generate_default_config, Config};
use manometry::render::{DrawList, LineView, SpatioView};
use manometry::segment::{parse_sensors, RangeArg, Segmenter, TimeRange, TimeSegment};
use manometry::storage::{AnnotationId, LocalFiles, SensorId, TimeSeriesStore};
use manometry::time::{to_clock_batch, to_seconds_batch, TimeFormat};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "manometry")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inspect, segment and annotate high-resolution manometry captures")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search standard locations)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, json, csv)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize a capture file
    Info {
        /// Capture file
        file: PathBuf,
    },

    /// Print rows of a time range for selected sensors
    Segment {
        /// Capture file
        file: PathBuf,
        /// Time range "start,end", each as M:SS.S or seconds
        #[arg(short, long)]
        range: String,
        /// Sensors, e.g. "1,2,3" or "1-12" (default: all in the file)
        #[arg(short, long)]
        sensors: Option<String>,
    },

    /// List annotations, optionally within a time range
    Annotations {
        /// Capture file
        file: PathBuf,
        /// Time range "start,end"
        #[arg(short, long)]
        range: Option<String>,
    },

    /// Draw annotation markers on a line and a spatio view
    Markers {
        /// Capture file
        file: PathBuf,
        /// Time range "start,end"
        #[arg(short, long)]
        range: String,
        /// Sensors for the spatio view (default: all in the file)
        #[arg(short, long)]
        sensors: Option<String>,
        /// Move a marker on the spatio view: "<annotation>:<column>"
        #[arg(short, long = "move")]
        moves: Vec<String>,
        /// Save the capture with moved annotation times
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Re-export a capture file with sorted annotations
    Normalize {
        /// Input capture file
        input: PathBuf,
        /// Output path (default: timestamped file in the export directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert seconds to M:SS.S
    Clock {
        values: Vec<f64>,
    },

    /// Convert M:SS.S (or plain numbers) to seconds
    Seconds {
        values: Vec<String>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    config.logging.init();

    match cli.command {
        Commands::Info { file } => {
            let store = open(&config, &file)?;
            let summary = store.summary().context("nothing loaded")?;

            match cli.format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
                _ => {
                    println!("{}", file.display());
                    println!("  Rows:        {}", summary.rows);
                    println!("  Sensors:     {}", summary.sensors);
                    println!("  Annotations: {}", summary.annotations);
                    if let (Some(first), Some(last)) = (summary.first_time, summary.last_time) {
                        let fmt = config.display.time_format;
                        println!("  Span:        {} - {}", fmt.format(first), fmt.format(last));
                    }
                }
            }
        }

        Commands::Segment {
            file,
            range,
            sensors,
        } => {
            let store = open(&config, &file)?;
            let sensors = select_sensors(&store, sensors.as_deref())?;
            let segment = Segmenter::new(&store).get_segment(parse_range(&range)?, &sensors)?;

            match cli.format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&segment.to_export())?),
                "csv" => print_segment_csv(&segment),
                _ => print_segment_table(&segment, config.display.time_format),
            }
        }

        Commands::Annotations { file, range } => {
            let store = open(&config, &file)?;
            let dataset = store.dataset().context("nothing loaded")?;

            let window = match range {
                Some(r) => Some(parse_range(&r)?.to_seconds()?),
                None => None,
            };
            let listed: Vec<_> = dataset
                .annotations_by_time()
                .into_iter()
                .filter(|(_, record)| match window {
                    Some((start, end)) => record.time >= start && record.time < end,
                    None => true,
                })
                .collect();

            match cli.format.as_str() {
                "json" => {
                    let entries: Vec<_> = listed
                        .iter()
                        .map(|(id, record)| {
                            serde_json::json!({ "id": id, "time": record.time, "text": record.text })
                        })
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&entries)?);
                }
                _ => {
                    if listed.is_empty() {
                        println!("No annotations");
                    }
                    for (id, record) in listed {
                        println!(
                            "{:<6} {:>10}  {}",
                            id.to_string(),
                            config.display.time_format.format(record.time),
                            record.text
                        );
                    }
                }
            }
        }

        Commands::Markers {
            file,
            range,
            sensors,
            moves,
            save,
        } => {
            let mut store = open(&config, &file)?;
            let sensors = select_sensors(&store, sensors.as_deref())?;
            let style = config.annotations.style();
            let show_labels = config.annotations.show_labels;

            let mut registry = AnnotationRegistry::new();
            let spatio_list = DrawList::shared();
            let line_list = DrawList::shared();

            let (spatio, line) = {
                let segment = Segmenter::new(&store).get_segment(parse_range(&range)?, &sensors)?;
                if segment.is_empty() {
                    println!("No samples in range");
                    return Ok(());
                }

                let spatio = registry.attach(Box::new(SpatioView::for_segment(
                    &segment,
                    spatio_list.clone(),
                )));
                let line_view = LineView::for_segment(
                    &segment,
                    sensors[0],
                    config.display.x_scale,
                    config.display.value_margin,
                    line_list.clone(),
                )
                .context("line view sensor missing from segment")?;
                let line = registry.attach(Box::new(line_view));

                for surface in [spatio, line] {
                    let report = registry.show_segment(surface, &segment, show_labels, &style)?;
                    tracing::info!(
                        surface = %surface,
                        added = report.added,
                        "Markers drawn"
                    );
                }
                (spatio, line)
            };

            for request in &moves {
                let (id, column) = parse_move(request)?;
                let time = registry.move_marker(spatio, id, column)?;
                tracing::info!(annotation = %id, column, time, "Marker moved");
            }
            // The line view follows the committed times
            let committed = registry.commit_to_store(spatio, &mut store)?;

            print_markers(&registry, spatio, "spatio", config.display.time_format);
            print_markers(&registry, line, "line", config.display.time_format);
            println!(
                "Live primitives: spatio={} line={}",
                spatio_list.borrow().len(),
                line_list.borrow().len()
            );

            if let Some(path) = save {
                store.save(&LocalFiles, &path)?;
                println!("Saved {} with {} moved annotation(s)", path.display(), committed);
            }
        }

        Commands::Normalize { input, output } => {
            let store = open(&config, &input)?;
            let output = match output {
                Some(path) => path,
                None => default_export_path(&config, &input),
            };
            store.save(&LocalFiles, &output)?;
            println!("Wrote {}", output.display());
        }

        Commands::Clock { values } => {
            for (value, clock) in values.iter().zip(to_clock_batch(&values)?) {
                println!("{:>12} -> {}", value, clock);
            }
        }

        Commands::Seconds { values } => {
            for (value, seconds) in values.iter().zip(to_seconds_batch(&values)?) {
                println!("{:>12} -> {}", value, seconds);
            }
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, &content)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Config written to {}", path.display());
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

fn open(config: &Config, path: &Path) -> anyhow::Result<TimeSeriesStore> {
    let mut store = TimeSeriesStore::new(config.store.store_config());
    store
        .load(&LocalFiles, path)
        .with_context(|| format!("loading {}", path.display()))?;
    Ok(store)
}

fn parse_range(raw: &str) -> anyhow::Result<TimeRange> {
    let args: Vec<RangeArg> = raw.split(',').map(|s| RangeArg::from(s.trim())).collect();
    Ok(TimeRange::from_args(&args)?)
}

/// "1,2,3", "1-12" or a mix; all sensors in the file when absent
fn select_sensors(store: &TimeSeriesStore, raw: Option<&str>) -> anyhow::Result<Vec<SensorId>> {
    let Some(raw) = raw else {
        return Ok(store
            .pressures()
            .map(|p| p.sensors().to_vec())
            .unwrap_or_default());
    };

    let mut ids = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((lo, hi)) => {
                let lo: usize = lo.trim().parse().with_context(|| format!("bad sensor '{}'", part))?;
                let hi: usize = hi.trim().parse().with_context(|| format!("bad sensor '{}'", part))?;
                if lo > hi {
                    bail!("sensor range '{}' is reversed", part);
                }
                ids.extend(lo..=hi);
            }
            None => ids.push(part.parse().with_context(|| format!("bad sensor '{}'", part))?),
        }
    }
    Ok(parse_sensors(&ids)?)
}

fn parse_move(request: &str) -> anyhow::Result<(AnnotationId, f64)> {
    let (id, column) = request
        .split_once(':')
        .with_context(|| format!("move '{}' must be <annotation>:<column>", request))?;
    let id: usize = id.trim().parse().with_context(|| format!("bad annotation id in '{}'", request))?;
    let column: f64 = column.trim().parse().with_context(|| format!("bad column in '{}'", request))?;
    Ok((AnnotationId(id), column))
}

fn default_export_path(config: &Config, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "capture".to_string());
    let stamp = Local::now().format("%Y%m%d-%H%M%S");
    PathBuf::from(&config.store.export_dir).join(format!("{}-{}.txt", stem, stamp))
}

fn print_segment_table(segment: &TimeSegment<'_>, format: TimeFormat) {
    if segment.is_empty() {
        println!("No samples in range");
        return;
    }

    // Header
    print!("{:<10}", "Time");
    for sensor in segment.sensors() {
        print!(" | {:>7}", sensor);
    }
    println!();

    // Separator
    println!("{}", "-".repeat(10 + segment.sensors().len() * 10));

    // Data rows
    for (i, &time) in segment.times().iter().enumerate() {
        print!("{:<10}", format.format(time));
        for value in segment.row(i).unwrap_or_default() {
            print!(" | {:>7.2}", value);
        }
        println!();
    }

    if !segment.annotations().is_empty() {
        println!();
        println!("Annotations:");
        for (id, record) in segment.annotations() {
            println!("  {:<6} {:>10}  {}", id.to_string(), format.format(record.time), record.text);
        }
    }
}

fn print_segment_csv(segment: &TimeSegment<'_>) {
    let header: Vec<String> = segment.sensors().iter().map(|s| s.to_string()).collect();
    println!("time,{}", header.join(","));

    for (i, &time) in segment.times().iter().enumerate() {
        let values: Vec<String> = segment
            .row(i)
            .unwrap_or_default()
            .iter()
            .map(|v| v.to_string())
            .collect();
        println!("{},{}", time, values.join(","));
    }
}

fn print_markers(registry: &AnnotationRegistry, surface: SurfaceId, name: &str, format: TimeFormat) {
    println!("{} markers:", name);
    for marker in registry.markers_on(surface) {
        println!(
            "  {:<6} {:>10}  x={:<10.3} {:?}  {}",
            marker.id().to_string(),
            format.format(marker.time()),
            marker.display_x(),
            marker.state(),
            marker.text()
        );
    }
}

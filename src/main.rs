//! Manometry demo
//!
//! Loads a capture (or builds a synthetic one), cuts a segment and draws its
//! annotations on a spatio view and one line view per sensor.

use manometry::annotation::AnnotationRegistry;
use manometry::config::Config;
use manometry::render::{DrawList, LineView, SpatioView};
use manometry::segment::{padded_limits, Segmenter};
use manometry::storage::{LocalFiles, SensorId, StorageResult, StoreSummary, TimeSeriesStore};
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    let config = Config::load_default();
    config.logging.init();

    tracing::info!("Manometry v{}", env!("CARGO_PKG_VERSION"));

    let mut store = TimeSeriesStore::new(config.store.store_config());
    let summary = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => store.load(&LocalFiles, &path)?,
        None => load_synthetic(&mut store)?,
    };
    tracing::info!("Loaded: {}", summary);

    let (first, last) = match (summary.first_time, summary.last_time) {
        (Some(first), Some(last)) if last > first => (first, last),
        _ => {
            tracing::warn!("Recording too short to segment");
            return Ok(());
        }
    };

    let sensors: Vec<SensorId> = store
        .pressures()
        .map(|p| p.sensors().to_vec())
        .unwrap_or_default();
    let segment = Segmenter::new(&store).get_segment((first, (first + last) / 2.0), &sensors)?;
    tracing::info!(
        rows = segment.len(),
        annotations = segment.annotations().len(),
        "First half segment"
    );

    let mut registry = AnnotationRegistry::new();
    let style = config.annotations.style();

    let spatio = registry.attach(Box::new(SpatioView::for_segment(&segment, DrawList::new())));
    registry.show_segment(spatio, &segment, config.annotations.show_labels, &style)?;

    for &sensor in sensors.iter().take(3) {
        let Some(view) = LineView::for_segment(
            &segment,
            sensor,
            config.display.x_scale,
            config.display.value_margin,
            DrawList::new(),
        ) else {
            continue;
        };
        tracing::info!(sensor = %sensor, limits = ?view.limits(), "Line view");
        let surface = registry.attach(Box::new(view));
        let report =
            registry.show_segment(surface, &segment, config.annotations.show_labels, &style)?;
        tracing::info!(surface = %surface, added = report.added, "Markers drawn");
    }

    if let Some(series) = sensors.first().and_then(|&s| segment.series(s)) {
        tracing::info!(limits = ?padded_limits(&series, config.display.value_margin), "Sensor 1 range");
    }

    tracing::info!(markers = registry.len(), "Done");
    registry.remove_all();
    Ok(())
}

/// Two minutes of a swallow-like wave travelling down 36 sensors at 10 Hz
fn load_synthetic(store: &mut TimeSeriesStore) -> StorageResult<StoreSummary> {
    let mut text = String::from("Time");
    for sensor in SensorId::all() {
        text.push_str(&format!("\t{}", sensor));
    }
    text.push('\n');

    for i in 0..1200 {
        let t = i as f64 / 10.0;
        text.push_str(&format!("{:.1}", t));
        for sensor in SensorId::all() {
            let phase = t - sensor.get() as f64 * 0.3;
            let wave = (-(phase % 20.0 - 5.0).powi(2)).exp() * 120.0;
            text.push_str(&format!("\t{:.2}", wave));
        }
        text.push('\n');
    }

    text.push_str("Annotations:\n");
    for (n, t) in [5.0, 25.0, 45.0, 65.0, 85.0, 105.0].iter().enumerate() {
        text.push_str(&format!("{}\tSwallow {}\n", t, n + 1));
    }

    store.import_text(&text)
}

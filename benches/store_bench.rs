//! Benchmarks for import, segmenting and marker sync
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use manometry::annotation::{AnnotationRegistry, LabelStyle};
use manometry::render::{DrawList, SpatioView};
use manometry::segment::Segmenter;
use manometry::storage::{SensorId, TimeSeriesStore};

/// `rows` samples of all 36 sensors at 100 Hz, one annotation per second
fn create_capture(rows: usize) -> String {
    let mut text = String::from("Time");
    for sensor in SensorId::all() {
        text.push_str(&format!("\t{}", sensor));
    }
    text.push('\n');

    for i in 0..rows {
        text.push_str(&format!("{}", i as f64 / 100.0));
        for sensor in SensorId::all() {
            text.push_str(&format!("\t{:.2}", (i + sensor.get()) as f64 * 0.5));
        }
        text.push('\n');
    }

    text.push_str("Annotations:\n");
    for s in 0..rows / 100 {
        text.push_str(&format!("{}.5\tEvent {}\n", s, s));
    }
    text
}

fn bench_import(c: &mut Criterion) {
    let mut group = c.benchmark_group("import");

    for rows in [1_000, 10_000] {
        let text = create_capture(rows);
        group.throughput(Throughput::Bytes(text.len() as u64));

        group.bench_function(format!("import_{}", rows), |b| {
            let mut store = TimeSeriesStore::default();
            b.iter(|| store.import_text(black_box(&text)).unwrap())
        });

        let mut store = TimeSeriesStore::default();
        store.import_text(&text).unwrap();

        group.bench_function(format!("export_{}", rows), |b| {
            b.iter(|| store.export_text().unwrap())
        });
    }

    group.finish();
}

fn bench_segment(c: &mut Criterion) {
    let mut group = c.benchmark_group("segment");

    let mut store = TimeSeriesStore::default();
    store.import_text(&create_capture(60_000)).unwrap();
    let sensors: Vec<SensorId> = SensorId::all().collect();

    group.bench_function("ten_seconds_all_sensors", |b| {
        let segmenter = Segmenter::new(&store);
        b.iter(|| {
            segmenter
                .get_segment(black_box(("5:00.0", 310.0)), &sensors)
                .unwrap()
        })
    });

    group.bench_function("clock_range_to_export", |b| {
        let segmenter = Segmenter::new(&store);
        b.iter(|| {
            segmenter
                .get_segment(("1:00", "1:01"), &sensors[..4])
                .unwrap()
                .to_export()
        })
    });

    group.finish();
}

fn bench_sync(c: &mut Criterion) {
    let mut group = c.benchmark_group("sync");

    let mut store = TimeSeriesStore::default();
    store.import_text(&create_capture(60_000)).unwrap();
    let sensors: Vec<SensorId> = SensorId::all().collect();
    let segmenter = Segmenter::new(&store);
    let style = LabelStyle::default();

    group.bench_function("pan_window", |b| {
        let first = segmenter.get_segment((0.0, 120.0), &sensors).unwrap();
        let mut registry = AnnotationRegistry::new();
        let surface = registry.attach(Box::new(SpatioView::for_segment(&first, DrawList::new())));

        let windows: Vec<_> = (0..10)
            .map(|k| {
                let start = k as f64 * 30.0;
                segmenter.get_segment((start, start + 120.0), &sensors).unwrap()
            })
            .collect();

        b.iter(|| {
            for window in &windows {
                registry.show_segment(surface, window, true, &style).unwrap();
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_import, bench_segment, bench_sync);
criterion_main!(benches);

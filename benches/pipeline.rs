use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::fmt::Write;
use tempwatch::{compute_rolling_means, load_table, Pipeline, PipelineConfig};

const CITIES: [&str; 5] = ["Berlin", "Cairo", "Moscow", "Rio de Janeiro", "Tokyo"];
const SEASONS: [&str; 4] = ["winter", "spring", "summer", "autumn"];

/// Ten years of daily rows for each city, deterministic pseudo-noise.
fn synthetic_csv() -> String {
    let mut csv = String::from("city,timestamp,season,temperature\n");
    let start = chrono::NaiveDate::from_ymd_opt(2010, 1, 1).unwrap();
    for (c, city) in CITIES.iter().enumerate() {
        for day in 0..3650u32 {
            let date = start + chrono::Duration::days(day as i64);
            let season = SEASONS[(day as usize / 91) % 4];
            let noise = ((day * 7919 + c as u32 * 104729) % 100) as f64 / 10.0 - 5.0;
            let _ = writeln!(csv, "{},{},{},{:.1}", city, date, season, 10.0 * c as f64 + noise);
        }
    }
    csv
}

fn bench_pipeline(c: &mut Criterion) {
    let csv = synthetic_csv();
    let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
    let table = load_table(csv.as_bytes()).unwrap();

    c.bench_function("load_table", |b| b.iter(|| load_table(black_box(csv.as_bytes()))));
    c.bench_function("analyze", |b| b.iter(|| pipeline.analyze(black_box(csv.as_bytes()))));
    c.bench_function("rolling_means", |b| {
        b.iter(|| compute_rolling_means(black_box(table.observations()), 30))
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);

//! demos/anomaly_plot.rs
//!
//! Loads a temperature CSV, runs the analysis and plots one city's
//! temperature, rolling mean and anomalies with `plotlars`.
//!
//! To run this demo:
//! cargo run --example anomaly_plot --features examples -- temperature_data.csv Berlin

use std::env;
use std::error::Error;

use plotlars::{Legend, Line, Rgb, Shape, Text, TimeSeriesPlot};
use polars::prelude::*;
use tempwatch::{Pipeline, PipelineConfig, TimeSeriesView};

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = env::args().skip(1);
    let path = args.next().ok_or("usage: anomaly_plot <csv> [city]")?;
    let bytes = std::fs::read(&path)?;

    let analysis = Pipeline::new(PipelineConfig::default())?.analyze(&bytes)?;
    for corrupt in analysis.table.corrupt_rows() {
        eprintln!("skipped: {}", corrupt);
    }

    let city = match args.next() {
        Some(city) => city,
        None => analysis
            .cities()
            .first()
            .map(|c| c.to_string())
            .ok_or("table has no rows")?,
    };

    for stats in analysis.seasonal_for(&city) {
        println!(
            "{:>8}: mean {:6.2}  std {:>6}  bounds {}",
            stats.season,
            stats.mean,
            stats.std.map_or("-".to_string(), |s| format!("{:.2}", s)),
            stats
                .bounds
                .map_or("insufficient data".to_string(), |b| format!("[{:.2}, {:.2}]", b.lower, b.upper)),
        );
    }

    let view = analysis.time_series(&city);
    println!("{} anomalies for {}", view.anomalies().count(), city);
    plot(&view_frame(&view)?, &city);
    Ok(())
}

fn view_frame(view: &TimeSeriesView) -> PolarsResult<DataFrame> {
    let timestamps: Vec<String> = view.points.iter().map(|p| p.timestamp.to_string()).collect();
    let temperatures: Vec<f64> = view.points.iter().map(|p| p.temperature).collect();
    let rolling: Vec<Option<f64>> = view.points.iter().map(|p| p.rolling_mean).collect();
    let anomalies: Vec<Option<f64>> = view
        .points
        .iter()
        .map(|p| (p.verdict == tempwatch::Verdict::Anomalous).then_some(p.temperature))
        .collect();

    df!(
        "timestamp" => timestamps,
        "temperature" => temperatures,
        "rolling_mean" => rolling,
        "anomaly" => anomalies
    )
}

fn plot(data: &DataFrame, city: &str) {
    let title = format!("Temperature in {}", city);
    TimeSeriesPlot::builder()
        .data(data)
        .x("timestamp")
        .y("temperature")
        .additional_series(vec!["rolling_mean", "anomaly"])
        .colors(vec![Rgb(69, 157, 230), Rgb(235, 117, 0), Rgb(220, 20, 60)])
        .lines(vec![Line::Solid, Line::Dash, Line::Dot])
        .with_shape(true)
        .shapes(vec![Shape::Circle, Shape::Circle, Shape::Diamond])
        .plot_title(Text::from(title.as_str()).size(18))
        .legend(&Legend::new().x(0.05).y(0.9))
        .x_title("date")
        .y_title("temperature (°C)")
        .build()
        .plot();
}

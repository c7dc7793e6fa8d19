//! Recorded session replay
//!
//! Feeds a recorded accelerometer/magnetometer session through the fusion
//! pipeline and plots the two series a live display would show: direction
//! (azimuth) and movement (sum of absolute position components).
//!
//! Run with: `cargo run --example replay [path/to/session.csv]`

use heading_reckoner::{FusedOutput, FusionPipeline, FusionSettings, SensorSample};
use nalgebra::Vector3;
use plotters::prelude::*;
use serde::Deserialize;
use std::error::Error;

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RecordedSensor {
    Accelerometer,
    Magnetometer,
}

#[derive(Debug, Deserialize)]
struct RecordedSample {
    timestamp_ns: i64,
    sensor: RecordedSensor,
    x: f32,
    y: f32,
    z: f32,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "testdata/walk_session.csv".to_string());
    println!("Replaying {}", path);

    let mut reader = csv::Reader::from_path(&path)?;
    let mut samples = Vec::new();
    for result in reader.deserialize() {
        let record: RecordedSample = result?;
        let values = Vector3::new(record.x, record.y, record.z);
        samples.push(match record.sensor {
            RecordedSensor::Accelerometer => SensorSample::accelerometer(values, record.timestamp_ns),
            RecordedSensor::Magnetometer => SensorSample::magnetometer(values, record.timestamp_ns),
        });
    }

    let start = samples.first().map_or(0, |sample| sample.timestamp);
    let mut pipeline = FusionPipeline::with_settings(FusionSettings::default(), start)?;

    let outputs: Vec<FusedOutput> = samples
        .iter()
        .filter_map(|&sample| pipeline.feed(sample))
        .collect();

    let stats = pipeline.stats();
    println!(
        "{} samples: {} fused, {} waiting, {} degenerate, {} out of order",
        samples.len(),
        stats.fused,
        stats.waiting,
        stats.degenerate,
        stats.non_monotonic
    );

    if let Some(last) = outputs.last() {
        println!(
            "Final: azimuth={:.1}° position=({:.2}, {:.2}, {:.2}) dt={:.3}s",
            last.azimuth_degrees, last.position.x, last.position.y, last.position.z, last.delta_time
        );
    }

    if outputs.is_empty() {
        println!("No fused output, nothing to plot");
        return Ok(());
    }

    create_plots(&outputs, start)?;
    println!("✓ Plots saved to replay_plots.png");
    Ok(())
}

/// Direction chart on top, movement chart below
fn create_plots(outputs: &[FusedOutput], start: i64) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new("replay_plots.png", (1000, 700)).into_drawing_area();
    root.fill(&WHITE)?;
    let (upper, lower) = root.split_vertically(350);

    let seconds = |output: &FusedOutput| (output.timestamp - start) as f32 * 1e-9;
    let end = outputs.last().map_or(1.0, seconds).max(1e-3);

    let mut direction = ChartBuilder::on(&upper)
        .caption("Direction", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(0f32..end, -180f32..180f32)?;
    direction
        .configure_mesh()
        .x_desc("Time (s)")
        .y_desc("Azimuth (°)")
        .draw()?;
    direction.draw_series(LineSeries::new(
        outputs.iter().map(|o| (seconds(o), o.azimuth_degrees)),
        &BLUE,
    ))?;

    let max_movement = outputs
        .iter()
        .map(|o| o.total_movement)
        .fold(1.0f32, f32::max);

    let mut movement = ChartBuilder::on(&lower)
        .caption("Movement", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(0f32..end, 0f32..max_movement * 1.1)?;
    movement
        .configure_mesh()
        .x_desc("Time (s)")
        .y_desc("|x| + |y| + |z| (m)")
        .draw()?;
    movement.draw_series(LineSeries::new(
        outputs.iter().map(|o| (seconds(o), o.total_movement)),
        &RED,
    ))?;

    root.present()?;
    Ok(())
}

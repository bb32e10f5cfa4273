//! SVG figure of a sampled end-effector path.

use std::ops::Range;

use arm_kinematics::PlanarPath;
use arm_kinematics::path::Bounds;
use color_eyre::{Result, eyre::eyre};
use plotters::prelude::*;

use crate::config::PlotConfig;

/// Smallest axis span drawn, so straight-line paths still get a visible frame
const MIN_SPAN: f64 = 0.1;

/// Draw `path` as a line series and write the figure to `config.output`
pub fn draw_path(path: &PlanarPath, config: &PlotConfig, caption: &str) -> Result<()> {
    let bounds = path
        .bounds()
        .ok_or_else(|| eyre!("Cannot plot an empty path"))?;
    let (x_range, y_range) = padded_ranges(&bounds);
    let (x_name, y_name) = path.plane().axis_names();

    let root = SVGBackend::new(&config.output, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 24).into_font())
        .margin(16)
        .x_label_area_size(40)
        .y_label_area_size(56)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_desc(format!("{} [m]", x_name))
        .y_desc(format!("{} [m]", y_name))
        .draw()?;

    chart.draw_series(LineSeries::new(
        path.points().iter().map(|point| (point.x, point.y)),
        &BLUE,
    ))?;

    root.present()?;
    log::info!(
        "Plotted {} samples to {}",
        path.points().len(),
        config.output.display()
    );
    Ok(())
}

fn padded_ranges(bounds: &Bounds) -> (Range<f64>, Range<f64>) {
    (
        padded(bounds.min_x, bounds.max_x),
        padded(bounds.min_y, bounds.max_y),
    )
}

/// Range centered on `[min, max]` with a 10% margin on each side
fn padded(min: f64, max: f64) -> Range<f64> {
    let span = (max - min).max(MIN_SPAN);
    let center = (min + max) / 2.0;
    let half = span * 0.6;
    (center - half)..(center + half)
}

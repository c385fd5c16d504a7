//! Trajectory plot: scatter of (days after first date, value) with a
//! least-squares trend line, rendered to SVG with plotters.

use crate::result::AnalysisResult;
use crate::util::{create_with_backoff, replace_file_atomic_backoff, tmp_sibling};
use anyhow::{Context, Result};
use plotters::prelude::*;
use std::io::Write;
use std::path::Path;

const WIDTH: u32 = 1000;
const HEIGHT: u32 = 600;
const TICKS: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Ordinary least squares. `None` with fewer than two points or no spread in x.
pub fn linear_fit(xs: &[f64], ys: &[f64]) -> Option<LinearFit> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let n = xs.len() as f64;
    let mx = xs.iter().sum::<f64>() / n;
    let my = ys.iter().sum::<f64>() / n;
    let (mut sxx, mut sxy) = (0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        sxx += (x - mx) * (x - mx);
        sxy += (x - mx) * (y - my);
    }
    if sxx == 0.0 {
        return None;
    }
    let slope = sxy / sxx;
    Some(LinearFit { slope, intercept: my - slope * mx })
}

/// Whole days between each point and the first point.
pub fn day_offsets(result: &AnalysisResult) -> Vec<i64> {
    match result.dates.first() {
        Some(first) => result.dates.iter().map(|p| p.date.days_since(first.date)).collect(),
        None => Vec::new(),
    }
}

fn y_domain(values: &[f64]) -> (f64, f64) {
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !lo.is_finite() || !hi.is_finite() {
        return (-1.0, 1.0);
    }
    if hi - lo < 1e-12 {
        return (lo - 0.5, hi + 0.5);
    }
    let pad = (hi - lo) * 0.1;
    (lo - pad, hi + pad)
}

/// Render the trajectory as an SVG document.
pub fn render_svg(result: &AnalysisResult) -> Result<String> {
    let kind = result.analysis_type.as_str();
    let xs: Vec<f64> = day_offsets(result).into_iter().map(|d| d as f64).collect();
    let ys: Vec<f64> = result.dates.iter().map(|p| p.value).collect();
    let x_hi = xs.last().copied().unwrap_or(0.0).max(1.0);
    let (y_lo, y_hi) = y_domain(&ys);
    let start = result.dates.first().map(|p| p.date.to_string()).unwrap_or_else(|| "start".to_string());

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(format!("Mean {} of popular comments by day", kind), ("sans-serif", 24))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(0f64..x_hi, y_lo..y_hi)?;
        chart
            .configure_mesh()
            .x_labels(TICKS)
            .y_labels(TICKS)
            .x_desc(format!("Days after {}", start))
            .y_desc(format!("Mean {}", kind))
            .draw()?;

        // Trend line under the points.
        if let Some(fit) = linear_fit(&xs, &ys) {
            chart.draw_series(LineSeries::new(
                vec![(0.0, fit.at(0.0)), (x_hi, fit.at(x_hi))],
                RED.stroke_width(2),
            ))?;
        }
        chart.draw_series(xs.iter().zip(&ys).map(|(x, y)| Circle::new((*x, *y), 4, BLUE.filled())))?;

        if ys.is_empty() {
            let style = ("sans-serif", 18).into_font().color(&RGBColor(0x88, 0x88, 0x88));
            root.draw(&Text::new("no data", (WIDTH as i32 / 2 - 30, HEIGHT as i32 / 2), style))?;
        }
        root.present()?;
    }
    Ok(svg)
}

/// Render and write the SVG to `path`.
pub fn render_to_file(result: &AnalysisResult, path: &Path) -> Result<()> {
    let svg = render_svg(result).context("render trajectory")?;
    let tmp = tmp_sibling(path);
    let mut f = create_with_backoff(&tmp).with_context(|| format!("create {}", tmp.display()))?;
    f.write_all(svg.as_bytes()).with_context(|| format!("write {}", tmp.display()))?;
    f.flush()?;
    drop(f);
    replace_file_atomic_backoff(&tmp, path)?;
    tracing::info!("Rendered {} points to {}", result.dates.len(), path.display());
    Ok(())
}

//! Static Chart Renderer
//! Renders the trend chart to a PNG file with plotters.
//!
//! Layout: centered title, categorical quarter x-axis, one colored line with
//! circle markers per Sender ID, legend box in the upper right.

use crate::charts::series::{series_color, TrendChart, X_AXIS_LABEL, Y_AXIS_LABEL};
use plotters::prelude::*;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Nothing to render: the selection has no volume values")]
    EmptyChart,
    #[error("Chart drawing failed: {0}")]
    Draw(String),
}

fn draw_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Draw(e.to_string())
}

pub struct ChartRenderer;

impl ChartRenderer {
    /// Render `chart` as a `width` x `height` PNG at `path`.
    pub fn render_png(
        chart: &TrendChart,
        path: &Path,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        if chart.point_count() == 0 {
            return Err(RenderError::EmptyChart);
        }

        let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let x_max = chart.periods.len() as f64 - 0.5;
        let (y_min, y_max) = chart.y_range();

        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(90)
            .build_cartesian_2d(-0.5f64..x_max, y_min..y_max)
            .map_err(draw_err)?;

        let label_of = |x: &f64| chart.period_label(*x);
        ctx.configure_mesh()
            .x_desc(X_AXIS_LABEL)
            .y_desc(Y_AXIS_LABEL)
            .x_labels(chart.periods.len() * 2 + 1)
            .x_label_formatter(&label_of)
            .y_label_formatter(&|y| format!("{:.0}", y))
            .draw()
            .map_err(draw_err)?;

        for (i, series) in chart.series.iter().enumerate() {
            let (r, g, b) = series_color(i);
            let color = RGBColor(r, g, b);
            for (n, segment) in series.segments.iter().enumerate() {
                let points = segment.iter().map(|p| (p[0], p[1]));
                let anno = ctx
                    .draw_series(LineSeries::new(points, color.stroke_width(2)))
                    .map_err(draw_err)?;
                // One legend entry per Sender ID
                if n == 0 {
                    anno.label(series.sender_id.as_str()).legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                    });
                }
            }

            ctx.draw_series(
                series
                    .points()
                    .map(|p| Circle::new((p[0], p[1]), 4, color.filled())),
            )
            .map_err(draw_err)?;
        }

        ctx.configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.85))
            .border_style(BLACK)
            .draw()
            .map_err(draw_err)?;

        root.present().map_err(draw_err)?;
        tracing::info!(path = %path.display(), "chart image written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::series::TrendSeries;
    use tempfile::TempDir;

    #[test]
    fn test_empty_chart_rejected_without_writing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("chart.png");
        let chart = TrendChart {
            title: "empty".to_string(),
            periods: vec!["Q1".to_string()],
            series: vec![TrendSeries {
                sender_id: "A".to_string(),
                segments: Vec::new(),
            }],
        };

        let err = ChartRenderer::render_png(&chart, &path, 400, 300).unwrap_err();
        assert!(matches!(err, RenderError::EmptyChart));
        assert!(!path.exists());
    }
}

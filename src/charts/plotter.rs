//! Chart Plotter Module
//! Draws the interactive trend chart and raw data grid using egui_plot.

use crate::charts::series::{series_color, TrendChart, X_AXIS_LABEL, Y_AXIS_LABEL};
use crate::data::LongRecord;
use egui::{Color32, RichText};
use egui_plot::{GridMark, Legend, Line, Plot, PlotPoints, Points};

/// Rows shown in the raw data grid before truncating.
const MAX_GRID_ROWS: usize = 500;

pub fn egui_color(index: usize) -> Color32 {
    let (r, g, b) = series_color(index);
    Color32::from_rgb(r, g, b)
}

/// Creates trend visualizations using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Draw one line per Sender ID with a marker at every quarter.
    pub fn draw_trend_chart(ui: &mut egui::Ui, chart: &TrendChart, height: f32) {
        let x_labels = chart.clone();
        let period_count = chart.periods.len();

        Plot::new(format!("trend_{}", chart.title))
            .height(height)
            .legend(Legend::default())
            .x_axis_label(X_AXIS_LABEL)
            .y_axis_label(Y_AXIS_LABEL)
            .allow_scroll(false)
            .include_x(-0.5)
            .include_x(period_count as f64 - 0.5)
            // One grid mark per quarter category
            .x_grid_spacer(move |_input| {
                (0..period_count)
                    .map(|i| GridMark {
                        value: i as f64,
                        step_size: 1.0,
                    })
                    .collect()
            })
            .x_axis_formatter(move |mark, _range| x_labels.period_label(mark.value))
            .label_formatter(|name, value| {
                if name.is_empty() {
                    String::new()
                } else {
                    format!("{}\n{:.0}", name, value.y)
                }
            })
            .show(ui, |plot_ui| {
                for (i, series) in chart.series.iter().enumerate() {
                    let color = egui_color(i);

                    // Segments share a name so the legend shows one entry
                    for segment in &series.segments {
                        plot_ui.line(
                            Line::new(PlotPoints::from_iter(segment.iter().copied()))
                                .color(color)
                                .width(2.0)
                                .name(&series.sender_id),
                        );
                    }

                    plot_ui.points(
                        Points::new(PlotPoints::from_iter(series.points().copied()))
                            .radius(4.0)
                            .color(color)
                            .name(&series.sender_id),
                    );
                }
            });
    }

    /// Draw the filtered long rows as a striped grid.
    pub fn draw_records_table(ui: &mut egui::Ui, id: &str, records: &[LongRecord]) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new(ui.make_persistent_id(format!("records_{}", id)))
                    .striped(true)
                    .min_col_width(80.0)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        ui.label(RichText::new("Sender ID").strong().size(11.0));
                        ui.label(RichText::new("Tier").strong().size(11.0));
                        ui.label(RichText::new(X_AXIS_LABEL).strong().size(11.0));
                        ui.label(RichText::new("Volume").strong().size(11.0));
                        ui.end_row();

                        for record in records.iter().take(MAX_GRID_ROWS) {
                            ui.label(RichText::new(&record.sender_id).size(11.0));
                            ui.label(RichText::new(record.tier.label()).size(11.0));
                            ui.label(RichText::new(&record.period).size(11.0));
                            let volume = record
                                .volume
                                .map(|v| v.to_string())
                                .unwrap_or_else(|| "-".to_string());
                            ui.label(RichText::new(volume).size(11.0));
                            ui.end_row();
                        }
                    });

                if records.len() > MAX_GRID_ROWS {
                    ui.label(
                        RichText::new(format!(
                            "Showing first {} of {} rows; export CSV for the full table",
                            MAX_GRID_ROWS,
                            records.len()
                        ))
                        .size(11.0)
                        .color(Color32::GRAY),
                    );
                }
            });
    }
}

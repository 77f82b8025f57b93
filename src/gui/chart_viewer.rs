//! Chart Viewer Widget
//! Central panel showing the trend chart and the processed rows for the
//! current selection.

use crate::charts::{egui_color, ChartPlotter, TrendChart, LEGEND_TITLE};
use crate::data::FilteredView;
use egui::{Color32, RichText, ScrollArea};

/// Minimum chart height in points
const MIN_CHART_HEIGHT: f32 = 320.0;

/// What to show when there is no chart yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerHint {
    NoFile,
    NoSelection,
}

/// Displays the chart for the last successful selection.
#[derive(Default)]
pub struct ChartViewer {
    pub view: Option<FilteredView>,
    pub chart: Option<TrendChart>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.view = None;
        self.chart = None;
    }

    pub fn set_view(&mut self, view: FilteredView) {
        self.chart = Some(TrendChart::from_view(&view));
        self.view = Some(view);
    }

    pub fn show(&mut self, ui: &mut egui::Ui, hint: ViewerHint) {
        ui.label(RichText::new("📈 Volume Pattern per Quarter").size(20.0).strong());
        ui.add_space(8.0);

        let (Some(view), Some(chart)) = (&self.view, &self.chart) else {
            let text = match hint {
                ViewerHint::NoFile => "Upload a CSV or Excel file to continue.",
                ViewerHint::NoSelection => {
                    "Set the filter on the left and click 'Show Visualization'."
                }
            };
            egui::Frame::none()
                .fill(ui.visuals().widgets.noninteractive.bg_fill)
                .rounding(5.0)
                .inner_margin(12.0)
                .show(ui, |ui| {
                    ui.label(RichText::new(format!("ℹ {}", text)).size(14.0));
                });
            return;
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.label(RichText::new(&chart.title).size(16.0).strong());
                ui.add_space(6.0);

                // Legend
                ui.horizontal_wrapped(|ui| {
                    ui.label(RichText::new(format!("{}:", LEGEND_TITLE)).size(13.0).strong());
                    for (i, series) in chart.series.iter().enumerate() {
                        let (rect, _) =
                            ui.allocate_exact_size(egui::vec2(14.0, 14.0), egui::Sense::hover());
                        ui.painter().rect_filled(rect, 3.0, egui_color(i));
                        ui.label(RichText::new(&series.sender_id).size(13.0));
                        ui.add_space(8.0);
                    }
                });

                ui.add_space(8.0);

                let height = (ui.available_height() * 0.6).max(MIN_CHART_HEIGHT);
                ChartPlotter::draw_trend_chart(ui, chart, height);

                if chart.point_count() == 0 {
                    ui.label(
                        RichText::new("The selected rows have no volume values")
                            .color(Color32::from_rgb(255, 193, 7)),
                    );
                }

                ui.add_space(10.0);

                egui::CollapsingHeader::new(format!(
                    "View processed data for {} ({} rows)",
                    view.selection.describe(),
                    view.records.len()
                ))
                .id_salt("processed_rows")
                .show(ui, |ui| {
                    ChartPlotter::draw_records_table(ui, &chart.title, &view.records);
                });
            });
    }
}

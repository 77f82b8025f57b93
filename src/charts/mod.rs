//! Charts module - Trend chart model and rendering

mod plotter;
mod renderer;
mod series;

pub use plotter::{egui_color, ChartPlotter};
pub use renderer::{ChartRenderer, RenderError};
pub use series::{TrendChart, LEGEND_TITLE};

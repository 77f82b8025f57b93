//! GUI module - User interface components

mod app;
mod chart_viewer;
mod control_panel;

pub use app::TierViewApp;
pub use chart_viewer::{ChartViewer, ViewerHint};
pub use control_panel::{ControlPanel, ControlPanelAction, StatusLevel};

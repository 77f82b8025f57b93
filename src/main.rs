//! TierView - Quarterly Sender ID Volume Dashboard
//!
//! Ranks Sender IDs from a quarterly summary by grand total, buckets them
//! into tiers and charts their per-quarter volume.

mod charts;
mod config;
mod data;
mod export;
mod gui;

use config::AppConfig;
use eframe::egui;
use gui::TierViewApp;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> anyhow::Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let config = AppConfig::load_or_default();
    tracing::info!(
        tier_size = config.tier_size,
        entity = %config.columns.entity,
        total = %config.columns.total,
        "starting TierView"
    );

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([1000.0, 600.0])
            .with_title("TierView - Quarterly Volume Dashboard"),
        ..Default::default()
    };

    eframe::run_native(
        "TierView",
        options,
        Box::new(move |cc| Ok(Box::new(TierViewApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("TierView window failed: {e}"))
}

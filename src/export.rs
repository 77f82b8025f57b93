//! Export Module
//! Writes the current selection as CSV rows or a PNG chart.

use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use thiserror::Error;

use crate::charts::{ChartRenderer, RenderError, TrendChart};
use crate::config::ExportConfig;
use crate::data::FilteredView;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to create file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] PolarsError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Writes exports according to the export settings.
pub struct Exporter {
    config: ExportConfig,
}

impl Exporter {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Write the filtered long rows. Returns the number of rows written.
    pub fn write_csv(&self, view: &FilteredView, path: &Path) -> Result<usize, ExportError> {
        let mut df = view.to_dataframe()?;
        let mut file = File::create(path)?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut df)?;

        tracing::info!(path = %path.display(), rows = df.height(), "CSV exported");
        Ok(df.height())
    }

    pub fn write_png(&self, chart: &TrendChart, path: &Path) -> Result<(), ExportError> {
        ChartRenderer::render_png(chart, path, self.config.png_width, self.config.png_height)?;
        Ok(())
    }

    /// Open an exported file with the system default application, if enabled.
    pub fn reveal(&self, path: &Path) {
        if !self.config.open_after_export {
            return;
        }
        if let Err(e) = open::that(path) {
            tracing::warn!(path = %path.display(), "could not open export: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{LongRecord, Selection, Tier, Volume};
    use tempfile::TempDir;

    fn view() -> FilteredView {
        let tier = Tier::from_rank(0, 10);
        let record = |sid: &str, period: &str, volume: Option<Volume>| LongRecord {
            sender_id: sid.to_string(),
            tier,
            period: period.to_string(),
            volume,
        };
        FilteredView {
            selection: Selection::Tier(tier),
            records: vec![
                record("A", "Q1", Some(Volume::Int(40))),
                record("A", "Q2", Some(Volume::Float(60.5))),
                record("B", "Q1", None),
            ],
        }
    }

    #[test]
    fn test_csv_export_reads_back() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tier1.csv");
        let exporter = Exporter::new(ExportConfig {
            open_after_export: false,
            ..ExportConfig::default()
        });

        let rows = exporter.write_csv(&view(), &path).unwrap();
        assert_eq!(rows, 3);

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.clone()))
            .unwrap()
            .finish()
            .unwrap();
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(names, vec!["Sender ID", "Tier", "Quarter", "Volume"]);

        let volumes = df.column("Volume").unwrap().as_materialized_series().clone();
        let volumes = volumes.f64().unwrap();
        assert_eq!(volumes.get(0), Some(40.0));
        assert_eq!(volumes.get(1), Some(60.5));
        assert_eq!(volumes.get(2), None);
    }

    #[test]
    fn test_csv_export_keeps_large_integers() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("exact.csv");
        let tier = Tier::from_rank(0, 10);
        let view = FilteredView {
            selection: Selection::Tier(tier),
            records: vec![LongRecord {
                sender_id: "A".to_string(),
                tier,
                period: "Q1".to_string(),
                volume: Some(Volume::Int(9_007_199_254_740_993)),
            }],
        };

        Exporter::new(ExportConfig::default())
            .write_csv(&view, &path)
            .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains(",9007199254740993"));
    }

    #[test]
    fn test_csv_export_to_missing_dir_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing").join("out.csv");
        let exporter = Exporter::new(ExportConfig::default());
        assert!(matches!(
            exporter.write_csv(&view(), &path),
            Err(ExportError::Io(_))
        ));
    }
}

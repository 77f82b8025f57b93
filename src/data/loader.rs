//! Tabular Data Loader Module
//! Parses uploaded CSV (Polars) and spreadsheet (calamine) files into a DataFrame.

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use polars::prelude::*;
use std::io::Cursor;
use std::path::PathBuf;
use thiserror::Error;

use super::upload::{FileFormat, Upload};

/// Rows used by Polars to infer CSV column types.
const INFER_SCHEMA_ROWS: usize = 10_000;

static EMPTY_CELL: Data = Data::Empty;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to load CSV: {0}")]
    Csv(#[from] PolarsError),
    #[error("Failed to load spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),
    #[error("Spreadsheet has no worksheet")]
    NoWorksheet,
    #[error("Spreadsheet has no header row")]
    MissingHeader,
}

/// Scalar type inferred for a spreadsheet column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Int,
    Float,
    Text,
}

/// Loads tabular files. Stateless; memoization lives in the pipeline cache.
pub struct DataLoader;

impl DataLoader {
    /// Parse an upload according to its declared format.
    pub fn load(upload: &Upload) -> Result<DataFrame, LoadError> {
        let df = match upload.format {
            FileFormat::Csv => Self::load_csv(&upload.bytes)?,
            FileFormat::Spreadsheet => Self::load_spreadsheet(&upload.bytes)?,
        };

        tracing::info!(
            file = %upload.file_name(),
            rows = df.height(),
            columns = df.width(),
            "table loaded"
        );
        Ok(df)
    }

    /// Parse CSV bytes; the first row is the header.
    pub fn load_csv(bytes: &[u8]) -> Result<DataFrame, LoadError> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
            .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
            .finish()?;
        Ok(df)
    }

    /// Parse the first worksheet of an xlsx/xls/xlsb/ods workbook.
    pub fn load_spreadsheet(bytes: &[u8]) -> Result<DataFrame, LoadError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or(LoadError::NoWorksheet)??;
        Self::frame_from_range(&range)
    }

    /// Build a DataFrame from a worksheet range, inferring one type per column.
    pub fn frame_from_range(range: &Range<Data>) -> Result<DataFrame, LoadError> {
        let mut rows = range.rows();
        let header = rows.next().ok_or(LoadError::MissingHeader)?;
        let body: Vec<&[Data]> = rows.collect();

        let columns: Vec<Column> = header
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let name = match cell {
                    Data::Empty => format!("column_{}", i + 1),
                    other => other.to_string(),
                };
                let cells: Vec<&Data> = body
                    .iter()
                    .map(|row| row.get(i).unwrap_or(&EMPTY_CELL))
                    .collect();
                Self::build_column(&name, &cells)
            })
            .collect();

        Ok(DataFrame::new(columns)?)
    }

    fn build_column(name: &str, cells: &[&Data]) -> Column {
        match Self::infer_kind(cells) {
            CellKind::Int => {
                let values: Vec<Option<i64>> = cells
                    .iter()
                    .map(|cell| match cell {
                        Data::Int(v) => Some(*v),
                        Data::Float(v) => Some(*v as i64),
                        _ => None,
                    })
                    .collect();
                Column::new(name.into(), values)
            }
            CellKind::Float => {
                let values: Vec<Option<f64>> = cells
                    .iter()
                    .map(|cell| match cell {
                        Data::Int(v) => Some(*v as f64),
                        Data::Float(v) => Some(*v),
                        _ => None,
                    })
                    .collect();
                Column::new(name.into(), values)
            }
            CellKind::Text => {
                let values: Vec<Option<String>> = cells
                    .iter()
                    .map(|cell| match cell {
                        Data::Empty => None,
                        Data::String(s) => Some(s.clone()),
                        other => Some(other.to_string()),
                    })
                    .collect();
                Column::new(name.into(), values)
            }
        }
    }

    fn infer_kind(cells: &[&Data]) -> CellKind {
        let mut kind = CellKind::Int;
        let mut seen_value = false;

        for cell in cells {
            match cell {
                Data::Empty => {}
                Data::Int(_) => seen_value = true,
                Data::Float(v) => {
                    seen_value = true;
                    // Whole floats stay integers, as Excel stores every number as a float
                    let whole = v.is_finite()
                        && v.fract() == 0.0
                        && *v >= i64::MIN as f64
                        && *v <= i64::MAX as f64;
                    if !whole {
                        kind = CellKind::Float;
                    }
                }
                _ => return CellKind::Text,
            }
        }

        if seen_value {
            kind
        } else {
            CellKind::Text
        }
    }

    /// Get list of column names.
    pub fn column_names(df: &DataFrame) -> Vec<String> {
        df.get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Whether a column holds whole numbers.
    pub fn is_integer(dtype: &DataType) -> bool {
        matches!(
            dtype,
            DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64
        )
    }

    /// Whether a column holds numbers.
    pub fn is_numeric(dtype: &DataType) -> bool {
        Self::is_integer(dtype) || matches!(dtype, DataType::Float32 | DataType::Float64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn sheet(rows: &[Vec<Data>]) -> Range<Data> {
        let height = rows.len() as u32;
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0) as u32;
        let mut range = Range::new((0, 0), (height - 1, width - 1));
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                range.set_value((r as u32, c as u32), cell.clone());
            }
        }
        range
    }

    fn s(v: &str) -> Data {
        Data::String(v.to_string())
    }

    #[test]
    fn test_csv_types_inferred() {
        let csv = "Row Labels,Q1,Q2,Grand Total\nA,40,60.5,100.5\nB,20,30,50\n";
        let df = DataLoader::load_csv(csv.as_bytes()).unwrap();

        assert_eq!(df.height(), 2);
        assert_eq!(
            DataLoader::column_names(&df),
            vec!["Row Labels", "Q1", "Q2", "Grand Total"]
        );
        assert_eq!(df.column("Row Labels").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("Q1").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("Q2").unwrap().dtype(), &DataType::Float64);
        assert!(DataLoader::is_numeric(df.column("Grand Total").unwrap().dtype()));
    }

    #[test]
    fn test_csv_from_upload_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("summary.csv");
        std::fs::write(&path, "Row Labels,Q1,Grand Total\nA,1,1\n").unwrap();

        let upload = Upload::read(&path).unwrap();
        let df = DataLoader::load(&upload).unwrap();
        assert_eq!(df.shape(), (1, 3));
    }

    #[test]
    fn test_empty_csv_is_load_error() {
        assert!(matches!(DataLoader::load_csv(b""), Err(LoadError::Csv(_))));
    }

    #[test]
    fn test_garbage_spreadsheet_is_load_error() {
        let upload = Upload::from_bytes(Path::new("summary.xlsx"), b"not a workbook".to_vec());
        assert!(matches!(
            DataLoader::load(&upload),
            Err(LoadError::Spreadsheet(_))
        ));
    }

    #[test]
    fn test_xlsx_workbook_first_sheet() {
        let bytes = include_bytes!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/quarterly_summary.xlsx"
        ));
        let upload = Upload::from_bytes(Path::new("quarterly_summary.xlsx"), bytes.to_vec());
        let df = DataLoader::load(&upload).unwrap();

        assert_eq!(df.shape(), (2, 4));
        assert_eq!(
            DataLoader::column_names(&df),
            vec!["Row Labels", "Q1", "Q2", "Grand Total"]
        );
        assert_eq!(df.column("Row Labels").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("Q1").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("Q2").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("Grand Total").unwrap().dtype(), &DataType::Float64);

        let ids = df.column("Row Labels").unwrap().as_materialized_series().clone();
        let ids = ids.str().unwrap();
        assert_eq!(ids.get(0), Some("B"));
        assert_eq!(ids.get(1), Some("A"));

        let q1 = df.column("Q1").unwrap().as_materialized_series().clone();
        let q1 = q1.i64().unwrap();
        assert_eq!(q1.get(0), Some(20));
        assert_eq!(q1.get(1), Some(40));

        let q2 = df.column("Q2").unwrap().as_materialized_series().clone();
        let q2 = q2.f64().unwrap();
        assert_eq!(q2.get(0), None);
        assert_eq!(q2.get(1), Some(60.5));
    }

    #[test]
    fn test_sheet_type_inference() {
        let range = sheet(&[
            vec![s("Row Labels"), s("Q1"), s("Q2"), s("Grand Total")],
            vec![s("A"), Data::Float(40.0), Data::Float(1.5), Data::Int(100)],
            vec![s("B"), Data::Int(20), Data::Empty, Data::Float(50.0)],
        ]);
        let df = DataLoader::frame_from_range(&range).unwrap();

        assert_eq!(df.shape(), (2, 4));
        assert_eq!(df.column("Row Labels").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("Q1").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("Q2").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("Grand Total").unwrap().dtype(), &DataType::Int64);

        let q2 = df.column("Q2").unwrap().as_materialized_series().clone();
        let q2 = q2.f64().unwrap();
        assert_eq!(q2.get(0), Some(1.5));
        assert_eq!(q2.get(1), None);
    }

    #[test]
    fn test_sheet_mixed_column_is_text() {
        let range = sheet(&[
            vec![s("Row Labels"), s("Q1")],
            vec![Data::Int(628), Data::Int(1)],
            vec![s("SENDER"), Data::Int(2)],
        ]);
        let df = DataLoader::frame_from_range(&range).unwrap();

        let ids = df.column("Row Labels").unwrap().as_materialized_series().clone();
        let ids = ids.str().unwrap();
        assert_eq!(ids.get(0), Some("628"));
        assert_eq!(ids.get(1), Some("SENDER"));
    }

    #[test]
    fn test_sheet_blank_header_named_by_position() {
        let range = sheet(&[vec![s("Row Labels"), Data::Empty], vec![s("A"), Data::Int(1)]]);
        let df = DataLoader::frame_from_range(&range).unwrap();
        assert_eq!(DataLoader::column_names(&df), vec!["Row Labels", "column_2"]);
    }

    #[test]
    fn test_empty_sheet_has_no_header() {
        let range: Range<Data> = Range::empty();
        assert!(matches!(
            DataLoader::frame_from_range(&range),
            Err(LoadError::MissingHeader)
        ));
    }
}

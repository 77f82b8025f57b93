//! Tiering & Reshape Module
//! Ranks Sender IDs by grand total, buckets them into tiers and unpivots the
//! per-quarter columns into long format.

use polars::prelude::*;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

use super::loader::DataLoader;
use super::tier::Tier;
use crate::config::{AppConfig, ColumnConfig};

/// Output column names of the long table.
pub const SENDER_ID: &str = "Sender ID";
pub const TIER: &str = "Tier";
pub const PERIOD: &str = "Quarter";
pub const VOLUME: &str = "Volume";

#[derive(Error, Debug, PartialEq)]
pub enum SchemaError {
    #[error("Missing Sender ID column '{0}'")]
    MissingEntityColumn(String),
    #[error("Missing ranking column '{0}'")]
    MissingTotalColumn(String),
    #[error("No quarter columns found (expected column names starting with '{0}')")]
    NoPeriodColumns(String),
    #[error("Column '{column}' must be numeric, found {dtype}")]
    NotNumeric { column: String, dtype: String },
}

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Columns located in a loaded table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    pub entity: String,
    pub total: String,
    /// Period columns in source order.
    pub periods: Vec<String>,
}

impl TableSchema {
    /// Locate the required columns, failing before any reshaping happens.
    pub fn detect(df: &DataFrame, columns: &ColumnConfig) -> Result<Self, SchemaError> {
        let names = DataLoader::column_names(df);

        if !names.iter().any(|n| n == &columns.entity) {
            return Err(SchemaError::MissingEntityColumn(columns.entity.clone()));
        }

        let total = df
            .column(&columns.total)
            .map_err(|_| SchemaError::MissingTotalColumn(columns.total.clone()))?;
        // Header-only files and blank total columns infer as text
        if total.null_count() < df.height() && !DataLoader::is_numeric(total.dtype()) {
            return Err(SchemaError::NotNumeric {
                column: columns.total.clone(),
                dtype: total.dtype().to_string(),
            });
        }

        let periods: Vec<String> = names
            .iter()
            .filter(|n| {
                n.starts_with(&columns.period_prefix)
                    && !n.contains(&columns.total)
                    && **n != columns.entity
            })
            .cloned()
            .collect();
        if periods.is_empty() {
            return Err(SchemaError::NoPeriodColumns(columns.period_prefix.clone()));
        }

        Ok(Self {
            entity: columns.entity.clone(),
            total: columns.total.clone(),
            periods,
        })
    }
}

/// A quarter cell in its source column's numeric type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Volume {
    Int(i64),
    Float(f64),
}

impl Volume {
    /// Plotting coordinate; integers beyond 2^53 lose precision here only.
    pub fn as_f64(self) -> f64 {
        match self {
            Volume::Int(v) => v as f64,
            Volume::Float(v) => v,
        }
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Volume::Int(v) => write!(f, "{v}"),
            Volume::Float(v) => write!(f, "{v}"),
        }
    }
}

/// One (Sender ID, tier, quarter) observation.
#[derive(Debug, Clone, PartialEq)]
pub struct LongRecord {
    pub sender_id: String,
    pub tier: Tier,
    pub period: String,
    pub volume: Option<Volume>,
}

/// Unpivoted pipeline output, ordered by rank and then by source column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LongTable {
    records: Vec<LongRecord>,
    periods: Vec<String>,
    tiers: Vec<Tier>,
    sender_ids: Vec<String>,
}

impl LongTable {
    pub fn records(&self) -> &[LongRecord] {
        &self.records
    }

    /// Period columns in source order.
    pub fn periods(&self) -> &[String] {
        &self.periods
    }

    /// Distinct tiers, ascending by tier number.
    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    /// Distinct Sender IDs in rank order.
    pub fn sender_ids(&self) -> &[String] {
        &self.sender_ids
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Build a DataFrame `[Sender ID, Tier, Quarter, Volume]` from records.
    ///
    /// `Volume` is Int64 unless some record holds a fractional value.
    pub fn records_frame(records: &[LongRecord]) -> Result<DataFrame, PolarsError> {
        let sender_ids: Vec<&str> = records.iter().map(|r| r.sender_id.as_str()).collect();
        let tiers: Vec<String> = records.iter().map(|r| r.tier.label()).collect();
        let periods: Vec<&str> = records.iter().map(|r| r.period.as_str()).collect();

        let any_float = records
            .iter()
            .any(|r| matches!(r.volume, Some(Volume::Float(_))));
        let volumes = if any_float {
            let values: Vec<Option<f64>> =
                records.iter().map(|r| r.volume.map(Volume::as_f64)).collect();
            Column::new(VOLUME.into(), values)
        } else {
            let values: Vec<Option<i64>> = records
                .iter()
                .map(|r| match r.volume {
                    Some(Volume::Int(v)) => Some(v),
                    _ => None,
                })
                .collect();
            Column::new(VOLUME.into(), values)
        };

        DataFrame::new(vec![
            Column::new(SENDER_ID.into(), sender_ids),
            Column::new(TIER.into(), tiers),
            Column::new(PERIOD.into(), periods),
            volumes,
        ])
    }
}

/// Rank → tier → unpivot transformation over a loaded table.
#[derive(Debug, Clone)]
pub struct TierPipeline {
    columns: ColumnConfig,
    tier_size: usize,
}

impl TierPipeline {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            columns: config.columns.clone(),
            tier_size: config.tier_size.max(1),
        }
    }

    /// Transform a wide quarterly summary into the long table.
    pub fn run(&self, df: &DataFrame) -> Result<LongTable, ProcessorError> {
        let schema = TableSchema::detect(df, &self.columns)?;
        tracing::debug!(periods = ?schema.periods, "quarter columns detected");

        let id_series = df
            .column(&schema.entity)?
            .as_materialized_series()
            .cast(&DataType::String)?;
        let ids = id_series.str()?;

        let total_series = df
            .column(&schema.total)?
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        let totals: Vec<Option<f64>> = total_series.f64()?.into_iter().collect();

        let volumes = schema
            .periods
            .iter()
            .map(|p| Self::volume_cells(df.column(p)?))
            .collect::<Result<Vec<Vec<Option<Volume>>>, PolarsError>>()?;

        let order = Self::rank_order(&totals);
        let mut records = Vec::with_capacity(order.len() * schema.periods.len());
        let mut tiers: Vec<Tier> = Vec::new();
        let mut sender_ids: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut duplicates = 0usize;

        for (rank, &row) in order.iter().enumerate() {
            let tier = Tier::from_rank(rank, self.tier_size);
            if tiers.last() != Some(&tier) {
                tiers.push(tier);
            }

            let sender_id = ids.get(row).unwrap_or_default().to_string();
            if seen.insert(sender_id.clone()) {
                sender_ids.push(sender_id.clone());
            } else {
                duplicates += 1;
            }

            for (period, values) in schema.periods.iter().zip(&volumes) {
                records.push(LongRecord {
                    sender_id: sender_id.clone(),
                    tier,
                    period: period.clone(),
                    volume: values[row],
                });
            }
        }

        if duplicates > 0 {
            tracing::warn!(
                duplicates,
                "duplicate Sender IDs found; each row is ranked and tiered independently"
            );
        }
        tracing::info!(
            rows = order.len(),
            tiers = tiers.len(),
            records = records.len(),
            "tiering complete"
        );

        Ok(LongTable {
            records,
            periods: schema.periods,
            tiers,
            sender_ids,
        })
    }

    /// Quarter cells of one column. Integer columns stay exact; non-numeric
    /// cells become null volumes rather than dropping the record.
    fn volume_cells(column: &Column) -> Result<Vec<Option<Volume>>, PolarsError> {
        let series = column.as_materialized_series();
        if DataLoader::is_integer(series.dtype()) {
            let ints = series.cast(&DataType::Int64)?;
            Ok(ints.i64()?.into_iter().map(|v| v.map(Volume::Int)).collect())
        } else {
            let floats = series.cast(&DataType::Float64)?;
            Ok(floats.f64()?.into_iter().map(|v| v.map(Volume::Float)).collect())
        }
    }

    /// Row indices ordered by total descending. Stable on ties; missing totals last.
    pub fn rank_order(totals: &[Option<f64>]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..totals.len()).collect();
        let key = |i: usize| totals[i].filter(|v| !v.is_nan());

        order.sort_by(|&a, &b| match (key(a), key(b)) {
            (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        order
    }
}

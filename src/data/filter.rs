//! Filter Module
//! Selects long-table rows by tier or by an explicit set of Sender IDs.

use polars::prelude::*;
use std::collections::BTreeSet;
use thiserror::Error;

use super::processor::{LongRecord, LongTable};
use super::tier::Tier;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Choose a tier to display")]
    NoTierSelected,
    #[error("Select at least one Sender ID")]
    NoSendersSelected,
    #[error("No data for {0}")]
    EmptyResult(String),
}

impl FilterError {
    /// A valid selection that matched nothing, as opposed to a missing selection.
    pub fn is_empty_result(&self) -> bool {
        matches!(self, FilterError::EmptyResult(_))
    }
}

/// A validated filter request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Tier(Tier),
    Senders(BTreeSet<String>),
}

impl Selection {
    pub fn tier(tier: Option<Tier>) -> Result<Self, FilterError> {
        tier.map(Selection::Tier).ok_or(FilterError::NoTierSelected)
    }

    pub fn senders<I>(ids: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = String>,
    {
        let ids: BTreeSet<String> = ids.into_iter().collect();
        if ids.is_empty() {
            return Err(FilterError::NoSendersSelected);
        }
        Ok(Selection::Senders(ids))
    }

    fn matches(&self, record: &LongRecord) -> bool {
        match self {
            Selection::Tier(tier) => record.tier == *tier,
            Selection::Senders(ids) => ids.contains(&record.sender_id),
        }
    }

    /// Human-readable name used in titles and warnings.
    pub fn describe(&self) -> String {
        match self {
            Selection::Tier(tier) => tier.label(),
            Selection::Senders(ids) if ids.len() <= 3 => ids
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", "),
            Selection::Senders(ids) => format!("{} selected Sender IDs", ids.len()),
        }
    }
}

/// Rows of the long table matching one selection, in table order.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredView {
    pub selection: Selection,
    pub records: Vec<LongRecord>,
}

impl FilteredView {
    pub fn title(&self) -> String {
        format!("Volume trend per quarter for {}", self.selection.describe())
    }

    pub fn to_dataframe(&self) -> Result<DataFrame, PolarsError> {
        LongTable::records_frame(&self.records)
    }
}

/// Apply a selection. Unknown Sender IDs are ignored; no match at all is an error.
pub fn apply(table: &LongTable, selection: &Selection) -> Result<FilteredView, FilterError> {
    let records: Vec<LongRecord> = table
        .records()
        .iter()
        .filter(|r| selection.matches(r))
        .cloned()
        .collect();

    if records.is_empty() {
        tracing::warn!(selection = %selection.describe(), "selection matched no rows");
        return Err(FilterError::EmptyResult(selection.describe()));
    }

    tracing::debug!(
        selection = %selection.describe(),
        rows = records.len(),
        "selection applied"
    );
    Ok(FilteredView {
        selection: selection.clone(),
        records,
    })
}

/// Sender IDs containing `query` (case-insensitive), in rank order.
pub fn search_senders<'a>(table: &'a LongTable, query: &str) -> Vec<&'a String> {
    let query = query.trim().to_lowercase();
    table
        .sender_ids()
        .iter()
        .filter(|id| query.is_empty() || id.to_lowercase().contains(&query))
        .collect()
}

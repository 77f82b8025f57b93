//! Data module - file loading, tiering and filtering

mod cache;
mod filter;
mod loader;
mod processor;
mod tier;
mod upload;

pub use cache::{CacheEntry, PipelineCache};
pub use filter::{apply, search_senders, FilterError, FilteredView, Selection};
pub use processor::{LongRecord, LongTable, TierPipeline, Volume};
pub use tier::Tier;

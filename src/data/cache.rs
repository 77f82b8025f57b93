//! Pipeline Cache Module
//! Single-entry memo of the long table, keyed by upload content.

use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use super::loader::{DataLoader, LoadError};
use super::processor::{LongTable, ProcessorError, TierPipeline};
use super::upload::{FileKey, Upload};

#[derive(Error, Debug)]
pub enum UploadError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Process(#[from] ProcessorError),
}

/// Processed output of one upload.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: FileKey,
    pub file_name: String,
    pub table: Arc<LongTable>,
}

/// Holds at most one processed upload. A new upload replaces it wholesale.
#[derive(Debug, Clone, Default)]
pub struct PipelineCache {
    entry: Option<CacheEntry>,
}

impl PipelineCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &FileKey) -> Option<Arc<LongTable>> {
        self.entry
            .as_ref()
            .filter(|e| &e.key == key)
            .map(|e| Arc::clone(&e.table))
    }

    pub fn entry(&self) -> Option<&CacheEntry> {
        self.entry.as_ref()
    }

    pub fn store(&mut self, entry: CacheEntry) {
        self.entry = Some(entry);
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }

    /// Resolve an upload to its long table, reusing the cached one when the
    /// content matches. Returns the entry and whether it was a cache hit.
    pub fn resolve(
        &self,
        upload: &Upload,
        pipeline: &TierPipeline,
    ) -> Result<(CacheEntry, bool), UploadError> {
        let file_name = upload.file_name();

        if let Some(table) = self.get(&upload.key) {
            tracing::info!(file = %file_name, key = %upload.key, "pipeline cache hit");
            let entry = CacheEntry {
                key: upload.key.clone(),
                file_name,
                table,
            };
            return Ok((entry, true));
        }

        tracing::info!(file = %file_name, key = %upload.key, "pipeline cache miss");
        let df = DataLoader::load(upload)?;
        let table = pipeline.run(&df)?;

        let entry = CacheEntry {
            key: upload.key.clone(),
            file_name,
            table: Arc::new(table),
        };
        Ok((entry, false))
    }

    /// Read a file from disk and resolve it against this cache.
    pub fn resolve_path(
        &self,
        path: &Path,
        pipeline: &TierPipeline,
    ) -> Result<(CacheEntry, bool), UploadError> {
        let upload = Upload::read(path)?;
        self.resolve(&upload, pipeline)
    }
}

//! Upload Module
//! Reads a chosen file once and derives its format and content identity.

use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};

use super::loader::LoadError;

/// Declared format of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Spreadsheet,
}

impl FileFormat {
    /// `.csv` is CSV; every other extension is treated as a spreadsheet.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => FileFormat::Csv,
            _ => FileFormat::Spreadsheet,
        }
    }
}

/// Content identity of an upload (hex SHA-256).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileKey(String);

impl FileKey {
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        FileKey(format!("{:x}", hasher.finalize()))
    }
}

impl fmt::Display for FileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form is enough for log lines
        f.write_str(&self.0[..12.min(self.0.len())])
    }
}

/// A file as handed over by the file picker.
#[derive(Debug, Clone)]
pub struct Upload {
    pub path: PathBuf,
    pub format: FileFormat,
    pub key: FileKey,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn read(path: &Path) -> Result<Self, LoadError> {
        let bytes = std::fs::read(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_bytes(path, bytes))
    }

    pub fn from_bytes(path: &Path, bytes: Vec<u8>) -> Self {
        Self {
            path: path.to_path_buf(),
            format: FileFormat::from_path(path),
            key: FileKey::of_bytes(&bytes),
            bytes,
        }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

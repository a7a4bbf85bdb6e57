//! File Store
//!
//! Enumerates code files under a repository root, reads them with a UTF-8 then
//! Latin-1 fallback, and caches content by absolute path for the lifetime of
//! one session. Read failures never raise: they come back as a string starting
//! with [`READ_ERROR_PREFIX`] so callers can skip the file.

pub mod scan;
pub mod splitter;
pub mod summary;

pub use scan::{extension_of, FileRecord};
pub use splitter::RecursiveSplitter;
pub use summary::{FileSummary, PreviewLimits};

use crate::config::ScanConfig;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Prefix of the sentinel string returned for unreadable files
pub const READ_ERROR_PREFIX: &str = "Error reading file";

/// True when `content` is the read-failure sentinel
pub fn is_read_error(content: &str) -> bool {
    content.starts_with(READ_ERROR_PREFIX)
}

/// Decode bytes as UTF-8, falling back to Latin-1 (one char per byte)
pub fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => err.into_bytes().into_iter().map(char::from).collect(),
    }
}

/// Per-session view of one repository's files
pub struct FileStore {
    root: PathBuf,
    rules: ScanConfig,
    preview: PreviewLimits,
    cache: HashMap<PathBuf, String>,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>, rules: ScanConfig, preview: PreviewLimits) -> Self {
        Self {
            root: root.into(),
            rules,
            preview,
            cache: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full scan of the repository
    pub fn scan(&self) -> Vec<FileRecord> {
        scan::scan(&self.root, &self.rules)
    }

    /// Number of cached files
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    fn read_checked(&mut self, path: &Path) -> Result<String, String> {
        if let Some(content) = self.cache.get(path) {
            return Ok(content.clone());
        }

        let bytes = std::fs::read(path).map_err(|e| format!("{}: {}", READ_ERROR_PREFIX, e))?;
        let content = decode_text(bytes);
        self.cache.insert(path.to_path_buf(), content.clone());
        Ok(content)
    }

    /// Read a file through the cache.
    ///
    /// Returns the sentinel (see [`is_read_error`]) when the file can't be read.
    /// Failed reads are not cached.
    pub fn read(&mut self, path: &Path) -> String {
        match self.read_checked(path) {
            Ok(content) => content,
            Err(sentinel) => {
                tracing::warn!("{}", sentinel);
                sentinel
            }
        }
    }

    /// Scan, then summarize every file in scan order
    pub fn summaries(&mut self) -> Vec<FileSummary> {
        let records = self.scan();
        let mut summaries = Vec::with_capacity(records.len());

        for record in records {
            let summary = match self.read_checked(&record.absolute_path) {
                Ok(content) => FileSummary::Ok {
                    size: content.chars().count(),
                    extension: extension_of(Path::new(&record.relative_path)),
                    preview: summary::preview(&content, self.preview),
                    path: record.relative_path,
                },
                Err(error) => {
                    tracing::warn!("{}", error);
                    FileSummary::Failed {
                        path: record.relative_path,
                        error,
                    }
                }
            };
            summaries.push(summary);
        }

        summaries
    }
}

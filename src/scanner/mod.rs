//! Order file discovery for batch runs.
//!
//! The conversion pipeline drops order documents into a directory tree; the
//! scanner walks it and picks up the files worth feeding to the accumulator,
//! respecting configuration for extensions, excludes, and size limits.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Configuration for order file scanning.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// File extensions to include (e.g., ["xml"])
    pub extensions: Vec<String>,
    /// Directory or file names to exclude (e.g., ["archive", "tmp"])
    pub excludes: Vec<String>,
    /// Maximum file size in bytes
    pub max_file_size: u64,
    /// Maximum number of files to pick up per directory
    pub max_files: Option<usize>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["xml".to_string()],
            excludes: vec!["archive", "tmp", "logs"]
                .into_iter()
                .map(String::from)
                .collect(),
            max_file_size: 1024 * 1024, // 1MB
            max_files: None,
        }
    }
}

impl From<&crate::config::ScannerConfig> for ScanConfig {
    fn from(config: &crate::config::ScannerConfig) -> Self {
        Self {
            extensions: config.extensions.clone(),
            excludes: config.excludes.clone(),
            max_file_size: config.max_file_size,
            max_files: config.max_files,
        }
    }
}

/// One discovered order file.
#[derive(Debug, Clone)]
pub struct ScannedFile {
    /// Full path, ready for reading.
    pub path: PathBuf,
    /// Path relative to the scanned root, for logging.
    pub relative: String,
    /// File size in bytes.
    pub size: u64,
}

/// Walks a directory tree for order documents.
pub struct OrderScanner {
    root: PathBuf,
    config: ScanConfig,
}

impl OrderScanner {
    pub fn new(root: PathBuf, config: ScanConfig) -> Self {
        Self { root, config }
    }

    /// Scans for all matching files, in a stable name order.
    pub fn scan(&self) -> Result<Vec<ScannedFile>> {
        let mut files = Vec::new();

        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0 || !self.is_excluded(&entry.file_name().to_string_lossy())
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) => {
                    warn!("skipping unreadable entry: {}", error);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(max) = self.config.max_files {
                if files.len() >= max {
                    break;
                }
            }
            let path = entry.path();
            if !self.matches(path) {
                continue;
            }

            let size = entry.metadata().map(|meta| meta.len()).unwrap_or(0);
            if size > self.config.max_file_size {
                debug!("skipping oversized file: {}", path.display());
                continue;
            }

            let relative = path
                .strip_prefix(&self.root)
                .unwrap_or(path)
                .to_string_lossy()
                .to_string();
            files.push(ScannedFile {
                path: path.to_path_buf(),
                relative,
                size,
            });
        }

        Ok(files)
    }

    /// Check if a file matches scan criteria.
    fn matches(&self, path: &Path) -> bool {
        if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
            if self.is_excluded(name) {
                return false;
            }
        }

        let ext = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
        self.config.extensions.iter().any(|allowed| allowed == ext)
    }

    /// Check if a name matches exclusion patterns. Hidden files always are.
    fn is_excluded(&self, name: &str) -> bool {
        if name.starts_with('.') {
            return true;
        }
        self.config.excludes.iter().any(|pattern| name == pattern)
    }
}

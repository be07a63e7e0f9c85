//! Loader sessions: configured open entry points, load records, discovery.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::handle::LibraryHandle;
use crate::mode::OpenMode;
use crate::target::LibraryTarget;

/// Record of one successful open performed through a [`SymbolLoader`].
#[derive(Debug, Clone, Serialize)]
pub struct LoadRecord {
    /// Human-readable target identifier.
    pub target: String,

    /// Resolution mode the object was opened with.
    pub mode: OpenMode,

    /// When the open succeeded.
    pub loaded_at: DateTime<Utc>,
}

/// Session object over [`LibraryHandle`].
///
/// Carries a default resolution mode and keeps an audit trail of the opens
/// it performed. Handles are owned by the caller; the loader is not on the
/// invocation path and resolved symbols are called directly.
pub struct SymbolLoader {
    default_mode: OpenMode,
    records: Vec<LoadRecord>,
}

impl SymbolLoader {
    /// Create a loader with the platform-default (lazy) resolution mode.
    pub fn new() -> Self {
        Self::with_mode(OpenMode::default())
    }

    /// Create a loader with a specific default resolution mode.
    pub fn with_mode(default_mode: OpenMode) -> Self {
        Self {
            default_mode,
            records: Vec::new(),
        }
    }

    /// The mode used when no explicit one is given.
    pub fn default_mode(&self) -> OpenMode {
        self.default_mode
    }

    /// Open a shared object by path or soname with the default mode.
    pub fn open(&mut self, path: impl Into<PathBuf>) -> Result<LibraryHandle> {
        self.open_with_mode(LibraryTarget::path(path), self.default_mode)
    }

    /// Open the current process's own symbol table with the default mode.
    pub fn open_self(&mut self) -> Result<LibraryHandle> {
        self.open_with_mode(LibraryTarget::SelfProcess, self.default_mode)
    }

    /// Open an arbitrary target with an explicit mode.
    pub fn open_with_mode(
        &mut self,
        target: LibraryTarget,
        mode: OpenMode,
    ) -> Result<LibraryHandle> {
        let handle = LibraryHandle::open(target, mode)?;
        self.records.push(LoadRecord {
            target: handle.target().to_string(),
            mode,
            loaded_at: Utc::now(),
        });
        Ok(handle)
    }

    /// Audit trail of successful opens, in order.
    pub fn records(&self) -> &[LoadRecord] {
        &self.records
    }

    /// Scan `dir` for files carrying the platform shared-object extension,
    /// without loading any of them. Results are sorted for stable output.
    pub fn discover(&self, dir: &Path) -> Vec<PathBuf> {
        let ext = std::env::consts::DLL_EXTENSION;
        let mut found = Vec::new();

        match std::fs::read_dir(dir) {
            Ok(entries) => {
                for entry in entries.flatten() {
                    let path = entry.path();
                    if path.extension().and_then(|e| e.to_str()) == Some(ext) {
                        found.push(path);
                    }
                }
            }
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "discovery directory not readable");
            }
        }

        found.sort();
        found
    }
}

impl Default for SymbolLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_defaults_to_lazy() {
        let loader = SymbolLoader::new();
        assert_eq!(loader.default_mode(), OpenMode::Lazy);
        assert!(loader.records().is_empty());
    }

    #[test]
    fn test_records_track_successful_opens_only() {
        let mut loader = SymbolLoader::with_mode(OpenMode::Eager);

        let handle = loader.open_self().unwrap();
        assert_eq!(loader.records().len(), 1);
        assert_eq!(loader.records()[0].target, "<self>");
        assert_eq!(loader.records()[0].mode, OpenMode::Eager);
        drop(handle);

        assert!(loader.open("/no/such/library.so").is_err());
        assert_eq!(loader.records().len(), 1);
    }

    #[test]
    fn test_discover_filters_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let ext = std::env::consts::DLL_EXTENSION;

        std::fs::write(dir.path().join(format!("a.{}", ext)), b"").unwrap();
        std::fs::write(dir.path().join(format!("b.{}", ext)), b"").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"").unwrap();

        let loader = SymbolLoader::new();
        let found = loader.discover(dir.path());
        assert_eq!(found.len(), 2);
        assert!(found.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_discover_missing_dir_is_empty() {
        let loader = SymbolLoader::new();
        assert!(loader.discover(Path::new("/no/such/dir")).is_empty());
    }
}

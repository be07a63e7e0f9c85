//! Load targets: a shared object on disk, or the process itself.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// What to hand the platform loader.
///
/// `SelfProcess` is the sentinel for the running process's own symbol
/// table, equivalent to passing a null path to the underlying loader.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LibraryTarget {
    /// The running process's own exported symbols.
    SelfProcess,
    /// A shared object identified by a filesystem path or bare soname.
    Path(PathBuf),
}

impl LibraryTarget {
    /// Target the current process's own symbol table.
    pub fn self_process() -> Self {
        LibraryTarget::SelfProcess
    }

    /// Target a shared object by path or soname.
    pub fn path(path: impl Into<PathBuf>) -> Self {
        LibraryTarget::Path(path.into())
    }

    /// Whether this is the self-process sentinel.
    pub fn is_self(&self) -> bool {
        matches!(self, LibraryTarget::SelfProcess)
    }

    /// Whether the target names a filesystem location, as opposed to a bare
    /// soname (`libm.so.6`) that the platform resolves through its own
    /// search path. Only location-naming targets are pre-checked for
    /// existence before the platform loader is invoked.
    pub(crate) fn names_location(&self) -> bool {
        match self {
            LibraryTarget::SelfProcess => false,
            LibraryTarget::Path(path) => path.is_absolute() || path.components().count() > 1,
        }
    }
}

impl From<PathBuf> for LibraryTarget {
    fn from(path: PathBuf) -> Self {
        LibraryTarget::Path(path)
    }
}

impl From<&Path> for LibraryTarget {
    fn from(path: &Path) -> Self {
        LibraryTarget::Path(path.to_path_buf())
    }
}

impl From<&str> for LibraryTarget {
    fn from(path: &str) -> Self {
        LibraryTarget::Path(PathBuf::from(path))
    }
}

impl fmt::Display for LibraryTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibraryTarget::SelfProcess => write!(f, "<self>"),
            LibraryTarget::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(LibraryTarget::self_process().to_string(), "<self>");
        assert_eq!(
            LibraryTarget::path("/usr/lib/libz.so").to_string(),
            "/usr/lib/libz.so"
        );
    }

    #[test]
    fn test_names_location() {
        assert!(!LibraryTarget::self_process().names_location());
        assert!(!LibraryTarget::path("libm.so.6").names_location());
        assert!(LibraryTarget::path("/no/such/library.so").names_location());
        assert!(LibraryTarget::path("./library.so").names_location());
        assert!(LibraryTarget::path("plugins/library.so").names_location());
    }

    #[test]
    fn test_serde_round_trip() {
        for target in [
            LibraryTarget::self_process(),
            LibraryTarget::path("/tmp/lib.so"),
        ] {
            let json = serde_json::to_string(&target).unwrap();
            let parsed: LibraryTarget = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, target);
        }
    }
}

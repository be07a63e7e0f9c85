//! Symbol resolution policy for opening shared objects.

use std::fmt;
use std::os::raw::c_int;

use libloading::os::unix::{RTLD_LAZY, RTLD_LOCAL, RTLD_NOW};
use serde::{Deserialize, Serialize};

/// When undefined symbol references in a loaded object are resolved.
///
/// The default is [`OpenMode::Lazy`], which is also the platform default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenMode {
    /// Resolve every undefined reference at load time and fail fast on any
    /// unresolved dependency.
    Eager,
    /// Defer resolution of each symbol until its first use.
    #[default]
    Lazy,
}

impl OpenMode {
    /// Convert to string representation.
    pub fn as_str(&self) -> &str {
        match self {
            OpenMode::Eager => "eager",
            OpenMode::Lazy => "lazy",
        }
    }

    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "eager" => Some(OpenMode::Eager),
            "lazy" => Some(OpenMode::Lazy),
            _ => None,
        }
    }

    /// Flags handed to the platform loader. Loaded symbols stay local to
    /// the handle; this loader never promotes them with `RTLD_GLOBAL`.
    pub(crate) fn dlopen_flags(self) -> c_int {
        match self {
            OpenMode::Eager => RTLD_NOW | RTLD_LOCAL,
            OpenMode::Lazy => RTLD_LAZY | RTLD_LOCAL,
        }
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

//! Error taxonomy for loader operations.
//!
//! None of these errors is retryable from inside the loader: each one
//! reflects a precondition the caller controls (a missing file, a wrong
//! symbol name, a handle that was already closed). Diagnostic text coming
//! from the platform loader is advisory only and must not be used for
//! control flow.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LoaderError>;

/// Errors surfaced by open, resolve and close operations.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// Target shared object does not exist at the named location.
    #[error("Library not found: {0}")]
    NotFound(String),

    /// The platform loader refused the target (bad format, unresolved
    /// dependency under eager resolution, ...). Carries the platform
    /// diagnostic captured at the failing call.
    #[error("Failed to load library: {0}")]
    LoadFailed(String),

    /// Name absent from the handle's exported symbol table.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// Operation attempted on a handle that has already been closed.
    #[error("Use after close: {0}")]
    UseAfterClose(String),

    /// Symbol name rejected before reaching the platform loader.
    #[error("Invalid symbol name: {0}")]
    InvalidSymbolName(String),

    /// The platform loader refused to release the handle.
    #[error("Failed to close library: {0}")]
    CloseFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LoaderError::NotFound("/no/such/library.so".to_string());
        assert_eq!(err.to_string(), "Library not found: /no/such/library.so");

        let err = LoaderError::SymbolNotFound("frobnicate".to_string());
        assert!(err.to_string().contains("frobnicate"));
    }

    #[test]
    fn test_use_after_close_display() {
        let err = LoaderError::UseAfterClose("resolve on closed handle".to_string());
        assert!(err.to_string().starts_with("Use after close"));
    }
}

//! Library handle lifecycle: open, resolve, close.

use std::ffi::{c_void, OsStr};
use std::fmt;

use libloading::os::unix::Library;

use crate::diag;
use crate::error::{LoaderError, Result};
use crate::mode::OpenMode;
use crate::state::HandleState;
use crate::symbol::ResolvedSymbol;
use crate::target::LibraryTarget;

/// Exclusive ownership token for one loaded shared object.
///
/// Close policy: the handle carries an explicit open/closed state.
/// [`close`](Self::close) succeeds exactly once; a second close, or any
/// [`resolve`](Self::resolve) after close, fails with
/// [`LoaderError::UseAfterClose`]. A handle dropped while still open is
/// closed by `Drop`, so no control-flow exit, including early error
/// returns, leaks the mapping.
///
/// Opening the same shared object through several handles is fine: the
/// platform reference-counts the mapping, and each handle stays valid
/// until its own close.
pub struct LibraryHandle {
    inner: Option<Library>,
    target: LibraryTarget,
    mode: OpenMode,
    state: HandleState,
}

impl LibraryHandle {
    /// Open `target` with the given resolution mode.
    ///
    /// Targets that name a filesystem location are pre-checked for
    /// existence and fail with [`LoaderError::NotFound`]; bare sonames are
    /// handed to the platform untouched so its search path still applies.
    /// Anything the platform loader rejects (not a shared object for this
    /// platform, unresolved dependencies under [`OpenMode::Eager`])
    /// surfaces as [`LoaderError::LoadFailed`] carrying the platform
    /// diagnostic.
    pub fn open(target: LibraryTarget, mode: OpenMode) -> Result<Self> {
        if target.names_location() {
            if let LibraryTarget::Path(path) = &target {
                if !path.exists() {
                    return Err(LoaderError::NotFound(path.display().to_string()));
                }
            }
        }

        let filename: Option<&OsStr> = match &target {
            LibraryTarget::SelfProcess => None,
            LibraryTarget::Path(path) => Some(path.as_os_str()),
        };

        let library = diag::with_loader_lock(|| {
            // Diagnostic capture happens inside the failing call, under
            // the same lock acquisition.
            unsafe { Library::open(filename, mode.dlopen_flags()) }
        })
        .map_err(|e| LoaderError::LoadFailed(format!("{}: {}", target, e)))?;

        let state = HandleState::Unopened.transition(HandleState::Open)?;
        tracing::info!(library = %target, mode = %mode, "loaded shared object");

        Ok(Self {
            inner: Some(library),
            target,
            mode,
            state,
        })
    }

    /// Open a shared object by path or soname.
    pub fn open_path(path: impl Into<std::path::PathBuf>, mode: OpenMode) -> Result<Self> {
        Self::open(LibraryTarget::path(path), mode)
    }

    /// Open the current process's own symbol table.
    pub fn open_self(mode: OpenMode) -> Result<Self> {
        Self::open(LibraryTarget::SelfProcess, mode)
    }

    /// The target this handle was opened from.
    pub fn target(&self) -> &LibraryTarget {
        &self.target
    }

    /// The resolution mode this handle was opened with.
    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// Current lifecycle state.
    pub fn state(&self) -> HandleState {
        self.state
    }

    /// Whether the underlying mapping is still live.
    pub fn is_open(&self) -> bool {
        self.state == HandleState::Open
    }

    /// Resolve `name` against this handle's exported symbol table.
    ///
    /// The returned symbol borrows the handle and is therefore bounded by
    /// its lifetime. Resolution is deterministic within one open session:
    /// repeated calls for the same name return the same address.
    ///
    /// Resolution says nothing about the symbol's type; interpreting the
    /// address is the caller's contract via [`ResolvedSymbol::cast`].
    pub fn resolve(&self, name: &str) -> Result<ResolvedSymbol<'_>> {
        let library = match (self.state, self.inner.as_ref()) {
            (HandleState::Open, Some(library)) => library,
            _ => {
                return Err(LoaderError::UseAfterClose(format!(
                    "resolve {:?} on closed handle for {}",
                    name, self.target
                )));
            }
        };

        if name.is_empty() {
            return Err(LoaderError::InvalidSymbolName(
                "empty symbol name".to_string(),
            ));
        }
        if name.bytes().any(|b| b == 0) {
            return Err(LoaderError::InvalidSymbolName(format!(
                "embedded NUL in {:?}",
                name
            )));
        }

        let addr = diag::with_loader_lock(|| {
            unsafe { library.get::<*mut c_void>(name.as_bytes()) }.map(|sym| sym.into_raw())
        })
        .map_err(|e| LoaderError::SymbolNotFound(format!("{}: {}", name, e)))?;

        // The platform can report success for a symbol whose value is
        // null; a resolved symbol must always carry a usable address.
        if addr.is_null() {
            return Err(LoaderError::SymbolNotFound(format!(
                "{} resolved to a null address",
                name
            )));
        }

        Ok(ResolvedSymbol::new(name.to_string(), addr))
    }

    /// Release the underlying mapping.
    ///
    /// Valid exactly once; a second close fails with
    /// [`LoaderError::UseAfterClose`]. If the platform refuses the release
    /// the handle still ends up closed and the refusal surfaces as
    /// [`LoaderError::CloseFailed`].
    pub fn close(&mut self) -> Result<()> {
        self.state = self.state.transition(HandleState::Closed)?;

        if let Some(library) = self.inner.take() {
            diag::with_loader_lock(|| library.close())
                .map_err(|e| LoaderError::CloseFailed(format!("{}: {}", self.target, e)))?;
        }

        tracing::info!(library = %self.target, "closed shared object");
        Ok(())
    }
}

impl Drop for LibraryHandle {
    fn drop(&mut self) {
        if let Some(library) = self.inner.take() {
            self.state = HandleState::Closed;
            if let Err(e) = diag::with_loader_lock(|| library.close()) {
                tracing::warn!(
                    library = %self.target,
                    error = %e,
                    "failed to close shared object on drop"
                );
            }
        }
    }
}

impl fmt::Debug for LibraryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibraryHandle")
            .field("target", &self.target)
            .field("mode", &self.mode)
            .field("state", &self.state)
            .finish()
    }
}

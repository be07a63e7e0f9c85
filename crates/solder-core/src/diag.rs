//! Serialization of the platform loader's diagnostic state.
//!
//! The platform's last-error slot (`dlerror`) is one mutable value per
//! process, overwritten by every loader call and meaningful only when read
//! immediately after the failing call. If two threads interleave between a
//! failing call and its diagnostic read, one of them observes the other's
//! message. Every platform primitive in this crate therefore runs under a
//! single process-wide lock together with its error capture, so a caller's
//! diagnostic can never be clobbered by a concurrent loader operation.

use once_cell::sync::Lazy;
use parking_lot::Mutex;

static LOADER_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Run one platform loader primitive, and its error capture, exclusively.
pub(crate) fn with_loader_lock<T>(op: impl FnOnce() -> T) -> T {
    let _guard = LOADER_LOCK.lock();
    op()
}

//! Companion shared object for exercising the loader end to end.
//!
//! Exports a few `extern "C"` entry points with known signatures so the
//! tests can drive a full open / resolve / cast / invoke / close cycle
//! against a real artifact instead of the process's own symbol table.

/// ABI marker checked by the loading side.
#[no_mangle]
pub extern "C" fn solder_smoke_abi_version() -> u32 {
    1
}

/// Pure function with an easily checkable result.
#[no_mangle]
pub extern "C" fn solder_smoke_add(a: i32, b: i32) -> i32 {
    a.wrapping_add(b)
}

/// Entry point that exists only to be invoked.
#[no_mangle]
pub extern "C" fn solder_smoke_entry() {}

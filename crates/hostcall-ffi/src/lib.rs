//! C FFI bindings for hostcall
//!
//! The host hands over its three native call primitives as a function table
//! and its configuration as TOML text. Rust code in the same process then
//! invokes routines through `hostcall_sdk::invoke!`.
//!
//! The API follows these principles:
//! - ABI-stable (uses only C-compatible types)
//! - Error handling via out-parameters
//! - Manual memory management for error objects

pub mod config;
pub mod error;
pub mod logging;
pub mod primitive;

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::ptr;

use hostcall_sdk::RoutineCatalog;
use once_cell::sync::Lazy;
use parking_lot::RwLock;

pub use config::HostConfig;
pub use error::FfiError;
pub use logging::{LogConfig, LogHandlerFn};
pub use primitive::{ExternPrimitive, HostcallPrimitives};

// ============================================================================
// Error Objects
// ============================================================================

/// Error information
#[repr(C)]
pub struct HostcallErrorObj {
    message: *mut c_char,
}

static CATALOG: Lazy<RwLock<RoutineCatalog>> = Lazy::new(|| RwLock::new(RoutineCatalog::default()));

fn rust_to_c_string(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(c_str) => c_str.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

fn create_error(error: FfiError) -> *mut HostcallErrorObj {
    let message = rust_to_c_string(&error.to_string());
    Box::into_raw(Box::new(HostcallErrorObj { message }))
}

/// Set error out-parameter
unsafe fn set_error(error_out: *mut *mut HostcallErrorObj, error: FfiError) {
    tracing::error!("{}", error);
    if !error_out.is_null() {
        *error_out = create_error(error);
    }
}

unsafe fn c_str_arg<'a>(ptr: *const c_char, what: &'static str) -> Result<&'a str, FfiError> {
    if ptr.is_null() {
        return Err(FfiError::NullArgument(what));
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map_err(|_| FfiError::InvalidUtf8(what))
}

unsafe fn install_from_c(
    primitives: *const HostcallPrimitives,
    config_toml: *const c_char,
) -> Result<(), FfiError> {
    if primitives.is_null() {
        return Err(FfiError::NullArgument("primitive table"));
    }
    let primitive = ExternPrimitive::from_table(&*primitives)?;

    let config = if config_toml.is_null() {
        HostConfig::default()
    } else {
        HostConfig::from_toml_str(c_str_arg(config_toml, "config")?)?
    };

    logging::init_logging(&config.logging)?;
    let catalog = config.catalog()?;
    tracing::info!(routines = catalog.len(), "installing native call primitives");

    *CATALOG.write() = catalog;
    hostcall_sdk::install(primitive, config.invoker);
    Ok(())
}

// ============================================================================
// Installation
// ============================================================================

/// Install the host's native call primitives
///
/// # Arguments
/// * `primitives` - Function table; every entry must be non-NULL
/// * `config_toml` - Host configuration as TOML text (NULL for defaults)
/// * `error` - Output parameter for error information (may be NULL)
///
/// # Returns
/// * `0` on success, `-1` on error
///
/// # Safety
/// - `primitives` must point to a valid table
/// - `config_toml` must be NULL or a valid NUL-terminated string
/// - `execute_call` must return NULL or a pointer readable until the next `begin_call`
///
/// # Example
/// ```c
/// HostcallPrimitives table = { begin_call, push_word, execute_call };
/// HostcallErrorObj* error = NULL;
/// if (hostcall_install(&table, "[logging]\nconsole = true", &error) != 0) {
///     fprintf(stderr, "Failed to install: %s\n", hostcall_error_message(error));
///     hostcall_error_free(error);
///     return 1;
/// }
/// ```
#[no_mangle]
pub unsafe extern "C" fn hostcall_install(
    primitives: *const HostcallPrimitives,
    config_toml: *const c_char,
    error: *mut *mut HostcallErrorObj,
) -> c_int {
    match install_from_c(primitives, config_toml) {
        Ok(()) => 0,
        Err(e) => {
            set_error(error, e);
            -1
        }
    }
}

/// Remove the installed primitives and clear the routine catalog
///
/// # Returns
/// * `1` if primitives were installed, `0` otherwise
#[no_mangle]
pub extern "C" fn hostcall_uninstall() -> c_int {
    *CATALOG.write() = RoutineCatalog::default();
    c_int::from(hostcall_sdk::uninstall())
}

/// Check whether primitives are installed
#[no_mangle]
pub extern "C" fn hostcall_is_installed() -> c_int {
    c_int::from(hostcall_sdk::is_installed())
}

/// Run queued jobs on the calling thread
///
/// Call once per host tick on the invoking thread.
///
/// # Returns
/// * Number of jobs run
#[no_mangle]
pub extern "C" fn hostcall_tick() -> u32 {
    hostcall_sdk::jobs::run_pending() as u32
}

// ============================================================================
// Routine Catalog
// ============================================================================

/// Look up a routine identifier by name in the installed catalog
///
/// # Arguments
/// * `name` - Routine name (NUL-terminated)
/// * `id_out` - Receives the identifier
/// * `error` - Output parameter for error information (may be NULL)
///
/// # Returns
/// * `1` if found, `0` if not found, `-1` on error
///
/// # Safety
/// - `name` must be a valid NUL-terminated string
/// - `id_out` must be valid for writes
#[no_mangle]
pub unsafe extern "C" fn hostcall_routine_id(
    name: *const c_char,
    id_out: *mut u64,
    error: *mut *mut HostcallErrorObj,
) -> c_int {
    if id_out.is_null() {
        set_error(error, FfiError::NullArgument("id_out"));
        return -1;
    }
    let name = match c_str_arg(name, "name") {
        Ok(name) => name,
        Err(e) => {
            set_error(error, e);
            return -1;
        }
    };
    match CATALOG.read().get(name) {
        Some(id) => {
            *id_out = id.raw();
            1
        }
        None => 0,
    }
}

/// Access the installed routine catalog from Rust
pub fn with_catalog<R>(f: impl FnOnce(&RoutineCatalog) -> R) -> R {
    f(&CATALOG.read())
}

// ============================================================================
// Logging
// ============================================================================

/// Register a callback that receives every log event
///
/// # Returns
/// * `1` if added, `0` if NULL or already registered
#[no_mangle]
pub extern "C" fn hostcall_add_log_handler(handler: Option<LogHandlerFn>) -> c_int {
    handler.map_or(0, |h| c_int::from(logging::add_handler(h)))
}

/// Flush and close the log file
///
/// Call once at process teardown. Later file output is dropped.
#[no_mangle]
pub extern "C" fn hostcall_shutdown_logging() {
    logging::shutdown_logging();
}

/// Unregister a log callback
///
/// # Returns
/// * `1` if removed, `0` if it was not registered
#[no_mangle]
pub extern "C" fn hostcall_remove_log_handler(handler: Option<LogHandlerFn>) -> c_int {
    handler.map_or(0, |h| c_int::from(logging::remove_handler(h)))
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get error message
///
/// # Arguments
/// * `error` - Pointer to HostcallErrorObj (may be NULL)
///
/// # Returns
/// * Error message (valid until `hostcall_error_free`), or NULL
///
/// # Safety
/// - Error pointer must be NULL or created by this API
#[no_mangle]
pub unsafe extern "C" fn hostcall_error_message(error: *const HostcallErrorObj) -> *const c_char {
    if error.is_null() {
        return ptr::null();
    }
    (*error).message
}

/// Free an error
///
/// # Safety
/// - Error pointer must be NULL or created by this API
/// - Must not be called twice for the same error
#[no_mangle]
pub unsafe extern "C" fn hostcall_error_free(error: *mut HostcallErrorObj) {
    if error.is_null() {
        return;
    }
    if !(*error).message.is_null() {
        let _ = CString::from_raw((*error).message);
    }
    let _ = Box::from_raw(error);
}

/// Get library version string
#[no_mangle]
pub extern "C" fn hostcall_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        let version = unsafe { CStr::from_ptr(hostcall_version()) };
        assert_eq!(version.to_str().unwrap(), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_error_message_and_free() {
        let error = create_error(FfiError::NullArgument("name"));
        unsafe {
            let message = CStr::from_ptr(hostcall_error_message(error));
            assert_eq!(message.to_str().unwrap(), "Invalid arguments (null name)");
            hostcall_error_free(error);
            assert!(hostcall_error_message(ptr::null()).is_null());
            hostcall_error_free(ptr::null_mut());
        }
    }

    #[test]
    fn test_install_rejects_null_table() {
        let mut error = ptr::null_mut();
        let code = unsafe { hostcall_install(ptr::null(), ptr::null(), &mut error) };
        assert_eq!(code, -1);
        assert!(!error.is_null());
        unsafe { hostcall_error_free(error) };
    }

    #[test]
    fn test_null_log_handler_ignored() {
        assert_eq!(hostcall_add_log_handler(None), 0);
        assert_eq!(hostcall_remove_log_handler(None), 0);
    }
}

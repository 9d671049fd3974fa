// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// iOS binding.
//
// liblouis is linked statically into the framework and the tables ship in a
// resource bundle (`<resource_bundle>.bundle/tables`) located through
// NSBundle. The Swift module calls the C functions exported below.
//
// Strings crossing the C boundary are owned by Rust and must be released
// with `nativelouis_string_free`.

use std::ffi::{CStr, CString, c_char};
use std::path::PathBuf;
use std::ptr;
use std::sync::{Arc, LazyLock, OnceLock};

use objc2::rc::autoreleasepool;
use objc2_foundation::{NSBundle, NSString};
use tracing::{debug, warn};

use nativelouis_core::config::BridgeConfig;
use nativelouis_core::error::{InitError, LouisError, Result};
use nativelouis_core::readiness::Readiness;
use nativelouis_core::types::TablesLocation;

use crate::facade::LouisModule;
use crate::ffi::LiblouisEngine;
use crate::marshal::c_string;
use crate::native::NativeBinding;
use crate::provision::BundledTables;

static CONFIG: OnceLock<BridgeConfig> = OnceLock::new();
static READINESS: LazyLock<Arc<Readiness<TablesLocation>>> =
    LazyLock::new(|| Arc::new(Readiness::new()));
static MODULE: OnceLock<LouisModule<NativeBinding>> = OnceLock::new();

/// Path of `<name>.bundle`, searched in the main bundle and then in every
/// loaded framework.
fn locate_resource_bundle(name: &str) -> std::result::Result<PathBuf, InitError> {
    let bundle_name = format!("{name}.bundle");
    autoreleasepool(|_| {
        let resource = NSString::from_str(name);
        let kind = NSString::from_str("bundle");
        // SAFETY: NSBundle lookups are thread-safe and the returned objects
        // are retained for the duration of this pool.
        let found = unsafe {
            let frameworks = NSBundle::allFrameworks();
            std::iter::once(NSBundle::mainBundle())
                .chain(frameworks.iter())
                .find_map(|bundle| bundle.pathForResource_ofType(Some(&resource), Some(&kind)))
        };
        match found {
            Some(path) => {
                let path = PathBuf::from(path.to_string());
                debug!(path = %path.display(), "found liblouis resource bundle");
                Ok(path)
            }
            None => Err(InitError::MissingAssets {
                path: bundle_name,
                reason: "resource bundle not found in the app or its frameworks".into(),
            }),
        }
    })
}

/// Native binding over the tables in the framework's resource bundle.
pub fn binding(config: &BridgeConfig) -> NativeBinding {
    let bundle = config.resource_bundle.clone();
    NativeBinding::new(
        "iOS",
        Arc::new(LiblouisEngine::new()),
        Box::new(BundledTables::located_by(
            move || locate_resource_bundle(&bundle),
            config,
        )),
        READINESS.clone(),
        config.clone(),
    )
}

fn module() -> &'static LouisModule<NativeBinding> {
    MODULE.get_or_init(|| {
        let config = CONFIG.get_or_init(BridgeConfig::default);
        LouisModule::new(binding(config))
    })
}

/// Borrow a C string argument as UTF-8.
///
/// # Safety
/// `ptr` must be NULL or point to a NUL-terminated string that stays valid
/// for `'a`.
unsafe fn arg<'a>(ptr: *const c_char, what: &str) -> Result<&'a str> {
    if ptr.is_null() {
        return Err(LouisError::Bridge(format!("{what} is NULL")));
    }
    // SAFETY: upheld by the caller.
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| LouisError::Bridge(format!("{what} is not valid UTF-8")))
}

/// Owned copy of an error message. A message with an interior NUL is cut
/// there, since the error path has no further channel to report it.
fn message_into_raw(text: String) -> *mut c_char {
    match CString::new(text) {
        Ok(owned) => owned.into_raw(),
        Err(e) => {
            let end = e.nul_position();
            warn!(at = end, "error message truncated at interior NUL");
            let mut bytes = e.into_vec();
            bytes.truncate(end);
            CString::new(bytes).map_or(ptr::null_mut(), CString::into_raw)
        }
    }
}

/// Store `error` in `*error_out` when the caller asked for it.
///
/// # Safety
/// `error_out` must be NULL or valid for one pointer write.
unsafe fn report(error: &LouisError, error_out: *mut *mut c_char) {
    warn!(error = %error, "liblouis call failed");
    if !error_out.is_null() {
        // SAFETY: upheld by the caller.
        unsafe { *error_out = message_into_raw(error.to_string()) };
    }
}

/// # Safety
/// `text`, `table` and `error_out` as for `nativelouis_translate`.
unsafe fn call(
    text: *const c_char,
    table: *const c_char,
    error_out: *mut *mut c_char,
    op: fn(&LouisModule<NativeBinding>, &str, &str) -> Result<String>,
) -> *mut c_char {
    let outcome = (|| {
        // SAFETY: upheld by the caller.
        let (text, table) = unsafe { (arg(text, "input")?, arg(table, "table")?) };
        c_string(op(module(), text, table)?, "liblouis output")
    })();
    match outcome {
        Ok(output) => output.into_raw(),
        Err(e) => {
            // SAFETY: upheld by the caller.
            unsafe { report(&e, error_out) };
            ptr::null_mut()
        }
    }
}

/// Apply a JSON configuration before first use. Returns `false` (with an
/// error string) if the JSON is invalid or the module is already configured.
///
/// # Safety
/// `json` must be a valid NUL-terminated string; `error_out` must be NULL or
/// writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nativelouis_configure(
    json: *const c_char,
    error_out: *mut *mut c_char,
) -> bool {
    // SAFETY: upheld by the caller.
    let parsed = unsafe { arg(json, "configuration") }.and_then(BridgeConfig::from_json);
    let outcome = parsed.and_then(|config| {
        CONFIG
            .set(config)
            .map_err(|_| LouisError::Bridge("bridge configuration already fixed".into()))
    });
    match outcome {
        Ok(()) => true,
        Err(e) => {
            // SAFETY: upheld by the caller.
            unsafe { report(&e, error_out) };
            false
        }
    }
}

/// Translate `text` to braille. Returns an owned string, or NULL with an
/// owned message in `*error_out`.
///
/// # Safety
/// `text` and `table` must be valid NUL-terminated strings; `error_out` must
/// be NULL or writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nativelouis_translate(
    text: *const c_char,
    table: *const c_char,
    error_out: *mut *mut c_char,
) -> *mut c_char {
    // SAFETY: upheld by the caller.
    unsafe { call(text, table, error_out, LouisModule::<NativeBinding>::translate) }
}

/// Back-translate braille `dots`. Same ownership rules as
/// `nativelouis_translate`.
///
/// # Safety
/// As for `nativelouis_translate`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nativelouis_back_translate(
    dots: *const c_char,
    table: *const c_char,
    error_out: *mut *mut c_char,
) -> *mut c_char {
    // SAFETY: upheld by the caller.
    unsafe { call(dots, table, error_out, LouisModule::<NativeBinding>::back_translate) }
}

/// Run setup eagerly. Optional: the translate calls do it on first use.
///
/// # Safety
/// `error_out` must be NULL or writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nativelouis_initialize(error_out: *mut *mut c_char) -> bool {
    match module().binding().ensure_ready() {
        Ok(_) => true,
        Err(e) => {
            // SAFETY: upheld by the caller.
            unsafe { report(&e, error_out) };
            false
        }
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn nativelouis_is_initialized() -> bool {
    module().is_initialized()
}

/// Release a string returned by this library.
///
/// # Safety
/// `ptr` must be NULL or a pointer returned by this library that has not
/// been freed yet.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn nativelouis_string_free(ptr: *mut c_char) {
    if !ptr.is_null() {
        // SAFETY: upheld by the caller.
        drop(unsafe { CString::from_raw(ptr) });
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// liblouis linked as a native library.
//
// liblouis keeps process-global state (data path, table cache, log
// callback), so every call goes through one lock. The log callback runs on
// the calling thread, so the captured error is kept per thread.

use std::cell::RefCell;
use std::ffi::{CStr, CString, c_char, c_int};
use std::path::Path;
use std::ptr;
use std::sync::{Mutex, MutexGuard, Once, PoisonError};

use tracing::{debug, error, info, warn};

use nativelouis_core::types::{Direction, EngineLogLevel};

use crate::traits::LouisEngine;

/// `widechar` in a default (16-bit) liblouis build.
type Widechar = u16;
/// `formtype` (typeform entries).
type Formtype = u16;
type LogCallback = extern "C" fn(level: c_int, message: *const c_char);
type TranslateFn = unsafe extern "C" fn(
    *const c_char,
    *const Widechar,
    *mut c_int,
    *mut Widechar,
    *mut c_int,
    *mut Formtype,
    *mut c_char,
    c_int,
) -> c_int;

#[link(name = "louis")]
unsafe extern "C" {
    fn lou_setDataPath(path: *const c_char) -> *mut c_char;

    fn lou_translateString(
        table_list: *const c_char,
        inbuf: *const Widechar,
        inlen: *mut c_int,
        outbuf: *mut Widechar,
        outlen: *mut c_int,
        typeform: *mut Formtype,
        spacing: *mut c_char,
        mode: c_int,
    ) -> c_int;

    fn lou_backTranslateString(
        table_list: *const c_char,
        inbuf: *const Widechar,
        inlen: *mut c_int,
        outbuf: *mut Widechar,
        outlen: *mut c_int,
        typeform: *mut Formtype,
        spacing: *mut c_char,
        mode: c_int,
    ) -> c_int;

    fn lou_setLogLevel(level: c_int);

    fn lou_registerLogCallback(callback: Option<LogCallback>);
}

static ENGINE_LOCK: Mutex<()> = Mutex::new(());
static CALLBACK: Once = Once::new();

thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn take_last_error() -> Option<String> {
    LAST_ERROR.with(|slot| slot.borrow_mut().take())
}

/// Receives liblouis diagnostics; must never unwind into C.
extern "C" fn forward_log(level: c_int, message: *const c_char) {
    if message.is_null() {
        return;
    }
    // SAFETY: liblouis passes a NUL-terminated string valid for this call.
    let text = unsafe { CStr::from_ptr(message) }
        .to_string_lossy()
        .trim_end()
        .to_string();

    match EngineLogLevel::from_raw(level) {
        EngineLogLevel::Error | EngineLogLevel::Fatal => {
            error!(target: "liblouis", "{text}");
            LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(text));
        }
        EngineLogLevel::Warn => warn!(target: "liblouis", "{text}"),
        EngineLogLevel::Info => info!(target: "liblouis", "{text}"),
        _ => debug!(target: "liblouis", "{text}"),
    }
}

/// The process's liblouis library.
pub struct LiblouisEngine {
    _private: (),
}

impl LiblouisEngine {
    /// Handle to the linked library; registers the log callback on first use.
    pub fn new() -> Self {
        CALLBACK.call_once(|| {
            // SAFETY: `forward_log` is a plain function with the expected
            // signature and lives for the whole process.
            unsafe { lou_registerLogCallback(Some(forward_log)) };
        });
        Self { _private: () }
    }
}

impl Default for LiblouisEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LouisEngine for LiblouisEngine {
    fn set_data_path(&self, path: &Path) -> Result<(), String> {
        let raw = CString::new(path.to_string_lossy().into_owned())
            .map_err(|_| "data path contains a NUL byte".to_string())?;

        let _guard = lock(&ENGINE_LOCK);
        take_last_error();
        // SAFETY: `raw` is NUL-terminated and outlives the call; liblouis
        // copies it into its own buffer.
        let accepted = unsafe { lou_setDataPath(raw.as_ptr()) };
        if accepted.is_null() {
            return Err(take_last_error().unwrap_or_else(|| "lou_setDataPath returned NULL".into()));
        }
        Ok(())
    }

    fn set_log_level(&self, level: EngineLogLevel) {
        let _guard = lock(&ENGINE_LOCK);
        // SAFETY: plain integer argument.
        unsafe { lou_setLogLevel(level.as_raw()) };
    }

    fn translate(
        &self,
        direction: Direction,
        tables: &CStr,
        input: &[u16],
        input_len: &mut i32,
        output: &mut [u16],
        output_len: &mut i32,
    ) -> i32 {
        // The length fields must never describe more than the slices hold.
        *input_len = (*input_len).clamp(0, i32::try_from(input.len()).unwrap_or(i32::MAX));
        *output_len = (*output_len).clamp(0, i32::try_from(output.len()).unwrap_or(i32::MAX));

        let entry: TranslateFn = match direction {
            Direction::Forward => lou_translateString,
            Direction::Backward => lou_backTranslateString,
        };

        let _guard = lock(&ENGINE_LOCK);
        take_last_error();
        // SAFETY: both buffers are valid for the lengths passed, `tables` is
        // NUL-terminated, and the optional typeform/spacing arguments are
        // NULL, which liblouis accepts.
        unsafe {
            entry(
                tables.as_ptr(),
                input.as_ptr(),
                input_len,
                output.as_mut_ptr(),
                output_len,
                ptr::null_mut(),
                ptr::null_mut(),
                0,
            )
        }
    }

    fn last_error(&self) -> Option<String> {
        take_last_error()
    }
}

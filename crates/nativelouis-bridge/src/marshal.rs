// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Buffer marshaling for the native engine.
//
// Host strings become owned UTF-16 buffers for the duration of one call; only
// the units the engine reports as written are decoded back.

use std::ffi::CString;

use tracing::{debug, warn};

use nativelouis_core::error::{LouisError, Result};
use nativelouis_core::types::{Direction, OutputCapacity, snippet};

use crate::traits::LouisEngine;

/// What a translation call was asked to do, for error reporting.
#[derive(Debug, Clone, Copy)]
pub struct CallContext<'a> {
    pub direction: Direction,
    /// Input exactly as the caller supplied it.
    pub input: &'a str,
    /// Table specification exactly as the caller supplied it.
    pub table: &'a str,
    /// Longest input snippet quoted in the error.
    pub snippet_chars: usize,
}

/// Build the error raised when the engine reports failure.
pub fn translation_failure(ctx: &CallContext<'_>, engine_error: Option<String>) -> LouisError {
    let detail = engine_error
        .filter(|msg| !msg.trim().is_empty())
        .unwrap_or_else(|| format!("{} returned 0", ctx.direction.entry_point()));
    LouisError::Translation {
        operation: ctx.direction.operation(),
        detail,
        input: snippet(ctx.input, ctx.snippet_chars),
        table: ctx.table.to_string(),
    }
}

/// Length field value for a buffer of `len` units.
pub(crate) fn length_field(len: usize) -> Result<i32> {
    i32::try_from(len).map_err(|_| {
        LouisError::Bridge(format!(
            "buffer of {len} code units exceeds the engine's length field"
        ))
    })
}

/// Owned C copy of a string handed back across a C boundary.
///
/// Text with an interior NUL would arrive cut short, so it is an error.
#[cfg_attr(not(target_os = "ios"), allow(dead_code))]
pub(crate) fn c_string(text: String, what: &str) -> Result<CString> {
    CString::new(text).map_err(|e| {
        LouisError::Bridge(format!(
            "{what} contains a NUL at byte {} and cannot be returned as a C string",
            e.nul_position()
        ))
    })
}

/// Run one translation through `engine`.
///
/// `text` is the sanitized input and `tables` the resolved table list.
pub fn translate_buffers(
    engine: &dyn LouisEngine,
    ctx: &CallContext<'_>,
    text: &str,
    tables: &str,
    capacity: OutputCapacity,
) -> Result<String> {
    let tables = CString::new(tables).map_err(|_| LouisError::InvalidTable(ctx.table.to_string()))?;

    let input: Vec<u16> = text.encode_utf16().collect();
    let supplied = length_field(input.len())?;
    let mut output = vec![0u16; capacity.for_input(input.len())];

    let mut consumed = supplied;
    let mut written = length_field(output.len())?;

    let rc = engine.translate(
        ctx.direction,
        &tables,
        &input,
        &mut consumed,
        &mut output,
        &mut written,
    );
    if rc == 0 {
        return Err(translation_failure(ctx, engine.last_error()));
    }

    if consumed < supplied {
        warn!(
            operation = ctx.direction.operation(),
            consumed,
            supplied,
            capacity = output.len(),
            "output buffer filled before the input was consumed; result is truncated"
        );
    }

    let written = usize::try_from(written).unwrap_or(0).min(output.len());
    debug!(
        operation = ctx.direction.operation(),
        input_units = input.len(),
        output_units = written,
        "liblouis call succeeded"
    );

    String::from_utf16(&output[..written]).map_err(|_| {
        translation_failure(ctx, Some("engine produced malformed UTF-16".into()))
    })
}

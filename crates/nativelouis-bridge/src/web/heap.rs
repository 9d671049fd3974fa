// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Buffer marshaling on the Emscripten module heap.
//
// Every allocation is wrapped in a `HeapBlock` so it is released on every
// exit path, including failed calls and JavaScript exceptions.

use tracing::{debug, warn};

use nativelouis_core::error::{LouisError, Result};
use nativelouis_core::types::OutputCapacity;

use super::WasmRuntime;
use crate::marshal::{CallContext, length_field, translation_failure};

const I32_BYTES: usize = 4;
const UNIT_BYTES: usize = 2;

/// One allocation on the module heap, freed on drop.
pub(crate) struct HeapBlock<'r> {
    runtime: &'r dyn WasmRuntime,
    ptr: u32,
}

impl<'r> HeapBlock<'r> {
    pub(crate) fn alloc(runtime: &'r dyn WasmRuntime, bytes: usize) -> Result<Self> {
        let size = u32::try_from(bytes).map_err(|_| {
            LouisError::Bridge(format!("{bytes} bytes exceeds the wasm address space"))
        })?;
        let ptr = runtime
            .malloc(size)
            .map_err(|e| LouisError::Bridge(format!("_malloc({size}) failed: {e}")))?;
        if ptr == 0 {
            return Err(LouisError::Bridge(format!("_malloc({size}) returned NULL")));
        }
        Ok(Self { runtime, ptr })
    }

    /// NUL-terminated UTF-8 copy of `text` (`allocateUTF8`).
    pub(crate) fn utf8(runtime: &'r dyn WasmRuntime, text: &str) -> Result<Self> {
        let ptr = runtime
            .alloc_utf8(text)
            .map_err(|e| LouisError::Bridge(format!("allocateUTF8 failed: {e}")))?;
        if ptr == 0 {
            return Err(LouisError::Bridge("allocateUTF8 returned NULL".into()));
        }
        Ok(Self { runtime, ptr })
    }

    pub(crate) fn ptr(&self) -> u32 {
        self.ptr
    }

    fn unit_addr(&self, index: usize) -> u32 {
        // Offsets stay inside an allocation whose size fitted in a u32.
        self.ptr + (index * UNIT_BYTES) as u32
    }
}

fn heap_access(export: &'static str) -> impl Fn(String) -> LouisError {
    move |e| LouisError::Bridge(format!("{export} failed: {e}"))
}

impl Drop for HeapBlock<'_> {
    fn drop(&mut self) {
        self.runtime.free(self.ptr);
    }
}

/// Run one translation through the module's exported entry point.
///
/// `text` is the sanitized input and `tables` the resolved table list.
pub(crate) fn translate_on_heap(
    runtime: &dyn WasmRuntime,
    ctx: &CallContext<'_>,
    text: &str,
    tables: &str,
    capacity: OutputCapacity,
) -> Result<String> {
    if tables.contains('\0') {
        return Err(LouisError::InvalidTable(ctx.table.to_string()));
    }

    let units: Vec<u16> = text.encode_utf16().collect();
    let max_out = capacity.for_input(units.len());
    let supplied = length_field(units.len())?;
    let out_field = length_field(max_out)?;

    let in_len = HeapBlock::alloc(runtime, I32_BYTES)?;
    let out_len = HeapBlock::alloc(runtime, I32_BYTES)?;
    let in_buf = HeapBlock::alloc(runtime, (units.len() + 1) * UNIT_BYTES)?;
    let out_buf = HeapBlock::alloc(runtime, (max_out + 1) * UNIT_BYTES)?;
    let table = HeapBlock::utf8(runtime, tables)?;

    let set = heap_access("setValue");
    runtime.set_i32(in_len.ptr(), supplied).map_err(&set)?;
    runtime.set_i32(out_len.ptr(), out_field).map_err(&set)?;
    for (i, unit) in units.iter().enumerate() {
        runtime.set_u16(in_buf.unit_addr(i), *unit).map_err(&set)?;
    }
    runtime.set_u16(in_buf.unit_addr(units.len()), 0).map_err(&set)?;

    let args = [
        table.ptr(),
        in_buf.ptr(),
        in_len.ptr(),
        out_buf.ptr(),
        out_len.ptr(),
        0,
        0,
        0,
    ];
    let rc = runtime
        .call_translate(ctx.direction, args)
        .map_err(|e| translation_failure(ctx, Some(e)))?;
    if rc == 0 {
        return Err(translation_failure(ctx, runtime.last_error()));
    }

    let get = heap_access("getValue");
    let consumed = runtime.get_i32(in_len.ptr()).map_err(&get)?;
    if consumed < supplied {
        warn!(
            operation = ctx.direction.operation(),
            consumed,
            supplied,
            capacity = max_out,
            "output buffer filled before the input was consumed; result is truncated"
        );
    }

    let reported = runtime.get_i32(out_len.ptr()).map_err(&get)?;
    let written = usize::try_from(reported).map_err(|_| {
        translation_failure(ctx, Some(format!("negative output length {reported}")))
    })?;
    let written = written.min(max_out);
    let output = (0..written)
        .map(|i| runtime.get_u16(out_buf.unit_addr(i)).map_err(&get))
        .collect::<Result<Vec<u16>>>()?;
    debug!(
        operation = ctx.direction.operation(),
        input_units = units.len(),
        output_units = written,
        "liblouis call succeeded"
    );

    String::from_utf16(&output)
        .map_err(|_| translation_failure(ctx, Some("engine produced malformed UTF-16".into())))
}

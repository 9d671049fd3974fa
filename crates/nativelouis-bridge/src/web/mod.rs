// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Web binding over the Emscripten build of liblouis.
//
// The module is instantiated asynchronously and the tables are mounted into
// its virtual filesystem by the build. Unlike the native bindings, nothing
// here initializes lazily: operations fail with `NotInitialized` until
// `initialize()` has been awaited.

mod heap;

#[cfg(target_arch = "wasm32")]
pub mod emscripten;

#[cfg(test)]
pub(crate) mod mock;

use std::rc::Rc;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use nativelouis_core::config::BridgeConfig;
use nativelouis_core::error::{InitError, Result};
use nativelouis_core::readiness::AsyncReadiness;
use nativelouis_core::sanitize::{Sanitized, sanitize};
use nativelouis_core::tables::resolve_table_list;
use nativelouis_core::types::Direction;

use crate::marshal::CallContext;
use crate::traits::PlatformBinding;

/// Exports the binding needs from the instantiated module.
pub const REQUIRED_EXPORTS: [&str; 7] = [
    "_malloc",
    "_free",
    "setValue",
    "getValue",
    "ccall",
    "FS",
    "allocateUTF8",
];

/// An instantiated Emscripten module: its heap, its virtual filesystem and
/// its exported liblouis entry points.
///
/// Heap addresses are 32-bit. Errors are the JavaScript exception text.
pub trait WasmRuntime {
    fn has_export(&self, name: &str) -> bool;

    /// Entry names under `path` in the module filesystem.
    fn read_dir(&self, path: &str) -> std::result::Result<Vec<String>, String>;

    fn malloc(&self, bytes: u32) -> std::result::Result<u32, String>;
    fn free(&self, ptr: u32);

    fn set_i32(&self, ptr: u32, value: i32) -> std::result::Result<(), String>;
    fn get_i32(&self, ptr: u32) -> std::result::Result<i32, String>;
    fn set_u16(&self, ptr: u32, value: u16) -> std::result::Result<(), String>;
    fn get_u16(&self, ptr: u32) -> std::result::Result<u16, String>;

    /// Copy `text` onto the heap as NUL-terminated UTF-8; release with `free`.
    fn alloc_utf8(&self, text: &str) -> std::result::Result<u32, String>;

    /// Call `lou_translateString` or `lou_backTranslateString` with the eight
    /// pointer-sized arguments of the C signature.
    fn call_translate(
        &self,
        direction: Direction,
        args: [u32; 8],
    ) -> std::result::Result<i32, String>;

    fn set_log_level(&self, level: i32) -> std::result::Result<(), String>;

    /// Engine diagnostic for the last failed call, if the module keeps one.
    fn last_error(&self) -> Option<String> {
        None
    }
}

/// Produces an instantiated module.
#[async_trait(?Send)]
pub trait WasmLoader {
    async fn instantiate(&self) -> std::result::Result<Box<dyn WasmRuntime>, String>;
}

/// Binding over a lazily instantiated Emscripten module.
pub struct WebBinding<L> {
    loader: L,
    readiness: Rc<AsyncReadiness<Box<dyn WasmRuntime>>>,
    config: BridgeConfig,
}

impl<L: WasmLoader> WebBinding<L> {
    pub fn new(loader: L, config: BridgeConfig) -> Self {
        Self::with_readiness(loader, Rc::new(AsyncReadiness::new()), config)
    }

    pub fn with_readiness(
        loader: L,
        readiness: Rc<AsyncReadiness<Box<dyn WasmRuntime>>>,
        config: BridgeConfig,
    ) -> Self {
        Self {
            loader,
            readiness,
            config,
        }
    }

    pub fn readiness(&self) -> &Rc<AsyncReadiness<Box<dyn WasmRuntime>>> {
        &self.readiness
    }

    async fn setup(&self) -> std::result::Result<Box<dyn WasmRuntime>, InitError> {
        info!("instantiating liblouis WebAssembly module");
        let runtime = self
            .loader
            .instantiate()
            .await
            .map_err(InitError::Instantiation)?;

        let missing: Vec<String> = REQUIRED_EXPORTS
            .iter()
            .filter(|name| !runtime.has_export(name))
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(InitError::MissingExports { missing });
        }

        let level = self.config.engine_log_level;
        if let Err(e) = runtime.set_log_level(level.as_raw()) {
            debug!(error = %e, "lou_setLogLevel unavailable");
        }

        let mount = self.config.web_tables_mount.as_str();
        let entries = runtime.read_dir(mount).map_err(|reason| InitError::MissingAssets {
            path: mount.to_string(),
            reason,
        })?;
        let files = entries
            .iter()
            .filter(|name| name.as_str() != "." && name.as_str() != "..")
            .count();
        if files == 0 {
            return Err(InitError::NoTables { path: mount.into() });
        }

        info!(mount, files, "liblouis WebAssembly module ready");
        Ok(runtime)
    }

    fn run(&self, direction: Direction, input: &str, table: &str) -> Result<String> {
        let runtime = self.readiness.get()?;

        let text = match sanitize(input) {
            Sanitized::Blank(spaces) => return Ok(spaces),
            Sanitized::Text(text) => text,
        };

        let tables = resolve_table_list(table, &self.config.web_tables_mount);
        debug!(operation = direction.operation(), %tables, "calling liblouis");

        let ctx = CallContext {
            direction,
            input,
            table,
            snippet_chars: self.config.error_snippet_chars,
        };
        heap::translate_on_heap(
            runtime.as_ref(),
            &ctx,
            &text,
            &tables,
            self.config.web_capacity,
        )
        .inspect_err(|e| error!(error = %e, "liblouis call failed"))
    }
}

#[async_trait(?Send)]
impl<L: WasmLoader> PlatformBinding for WebBinding<L> {
    fn platform_name(&self) -> &str {
        "Web"
    }

    fn translate(&self, text: &str, table: &str) -> Result<String> {
        self.run(Direction::Forward, text, table)
    }

    fn back_translate(&self, dots: &str, table: &str) -> Result<String> {
        self.run(Direction::Backward, dots, table)
    }

    async fn initialize(&self) -> Result<()> {
        self.readiness
            .ensure_ready(|| self.setup())
            .await
            .map(|_| ())
            .inspect_err(|e| warn!(error = %e, "liblouis WebAssembly setup failed"))
    }

    fn is_initialized(&self) -> bool {
        self.readiness.is_ready()
    }
}

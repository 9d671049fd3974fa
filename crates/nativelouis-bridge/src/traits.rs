// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions.
//
// `PlatformBinding` is the uniform surface the facade routes to. The other
// traits are the seams each binding is assembled from: the liblouis calling
// convention, the table provisioning step, and the application package the
// Android tables are extracted from.

use std::ffi::CStr;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use nativelouis_core::error::{InitError, Result};
use nativelouis_core::types::{Direction, EngineLogLevel, TablesLocation};

/// One platform's implementation of the four public operations.
///
/// Not `Send`: the web binding holds JavaScript handles. Native bindings are
/// `Send + Sync` on their own.
#[async_trait(?Send)]
pub trait PlatformBinding {
    /// Human-readable platform name (e.g. "Android", "Web").
    fn platform_name(&self) -> &str;

    /// Forward-translate `text` with the comma-separated `table` list.
    fn translate(&self, text: &str, table: &str) -> Result<String>;

    /// Back-translate braille `dots` with the comma-separated `table` list.
    fn back_translate(&self, dots: &str, table: &str) -> Result<String>;

    /// Run the one-time setup. Optional on native targets (every operation
    /// does it lazily), required on the web.
    async fn initialize(&self) -> Result<()>;

    /// Whether setup has completed successfully. Never triggers setup.
    fn is_initialized(&self) -> bool;
}

#[async_trait(?Send)]
impl<B: PlatformBinding + ?Sized> PlatformBinding for Box<B> {
    fn platform_name(&self) -> &str {
        (**self).platform_name()
    }

    fn translate(&self, text: &str, table: &str) -> Result<String> {
        (**self).translate(text, table)
    }

    fn back_translate(&self, dots: &str, table: &str) -> Result<String> {
        (**self).back_translate(dots, table)
    }

    async fn initialize(&self) -> Result<()> {
        (**self).initialize().await
    }

    fn is_initialized(&self) -> bool {
        (**self).is_initialized()
    }
}

/// The liblouis calling convention: C strings for table lists, UTF-16
/// buffers with explicit length fields, integer success codes.
pub trait LouisEngine: Send + Sync {
    /// Point the engine at the directory it searches for tables.
    /// `Err` carries the engine's diagnostic.
    fn set_data_path(&self, path: &Path) -> std::result::Result<(), String>;

    fn set_log_level(&self, level: EngineLogLevel);

    /// Translate `input` into `output`.
    ///
    /// On entry `input_len` is the number of units to read and `output_len`
    /// the output capacity; on return they hold the units consumed and
    /// written. Returns non-zero on success.
    fn translate(
        &self,
        direction: Direction,
        tables: &CStr,
        input: &[u16],
        input_len: &mut i32,
        output: &mut [u16],
        output_len: &mut i32,
    ) -> i32;

    /// Most recent error the engine reported, cleared by reading it.
    fn last_error(&self) -> Option<String>;
}

/// Makes table files available on disk for the native engine.
pub trait TableProvisioner: Send + Sync {
    /// Short description used in logs (e.g. "APK assets").
    fn describe(&self) -> String;

    /// Provision the tables, verifying at least one file is present.
    fn provision(&self) -> std::result::Result<TablesLocation, InitError>;
}

/// The installed application package (Android assets and private storage).
pub trait AppPackage: Send + Sync {
    /// Writable per-app directory.
    fn files_dir(&self) -> io::Result<PathBuf>;

    /// File names directly under the asset directory `dir`.
    fn list_assets(&self, dir: &str) -> io::Result<Vec<String>>;

    /// Contents of the asset at `path`.
    fn read_asset(&self, path: &str) -> io::Result<Vec<u8>>;
}

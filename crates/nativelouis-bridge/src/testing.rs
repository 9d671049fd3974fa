// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Test doubles shared by the bridge's unit tests.

use std::collections::HashMap;
use std::ffi::CStr;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use nativelouis_core::error::InitError;
use nativelouis_core::types::{Direction, EngineLogLevel, TablesLocation};

use crate::traits::{LouisEngine, TableProvisioner};

/// One recorded engine invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub direction: Direction,
    pub tables: String,
    pub input: String,
}

/// Scripted stand-in for liblouis.
///
/// Answers `(input, resolved tables)` pairs registered with [`respond`];
/// anything else fails with a "Cannot resolve table" error. Empty input
/// always succeeds with empty output.
///
/// [`respond`]: MockEngine::respond
#[derive(Default)]
pub struct MockEngine {
    responses: HashMap<(String, String), String>,
    reject_data_path: Option<String>,
    silent: bool,
    calls: Mutex<Vec<RecordedCall>>,
    data_paths: Mutex<Vec<PathBuf>>,
    log_levels: Mutex<Vec<EngineLogLevel>>,
    last_capacity: Mutex<Option<usize>>,
    last_error: Mutex<Option<String>>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, input: &str, tables: &str, output: &str) -> Self {
        self.responses
            .insert((input.to_string(), tables.to_string()), output.to_string());
        self
    }

    pub fn reject_data_path(mut self, detail: &str) -> Self {
        self.reject_data_path = Some(detail.to_string());
        self
    }

    /// Fail without leaving an error message behind.
    pub fn silent_failures(mut self) -> Self {
        self.silent = true;
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn translate_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn data_paths(&self) -> Vec<PathBuf> {
        self.data_paths.lock().unwrap().clone()
    }

    pub fn log_levels(&self) -> Vec<EngineLogLevel> {
        self.log_levels.lock().unwrap().clone()
    }

    pub fn last_capacity(&self) -> Option<usize> {
        *self.last_capacity.lock().unwrap()
    }
}

impl LouisEngine for MockEngine {
    fn set_data_path(&self, path: &Path) -> Result<(), String> {
        self.data_paths.lock().unwrap().push(path.to_path_buf());
        match &self.reject_data_path {
            Some(detail) => Err(detail.clone()),
            None => Ok(()),
        }
    }

    fn set_log_level(&self, level: EngineLogLevel) {
        self.log_levels.lock().unwrap().push(level);
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
        let supplied = usize::try_from(*input_len).unwrap();
        let text = String::from_utf16_lossy(&input[..supplied]);
        let tables = tables.to_string_lossy().into_owned();
        *self.last_capacity.lock().unwrap() = Some(output.len());
        self.calls.lock().unwrap().push(RecordedCall {
            direction,
            tables: tables.clone(),
            input: text.clone(),
        });

        if text.is_empty() {
            *output_len = 0;
            return 1;
        }

        match self.responses.get(&(text, tables.clone())) {
            Some(answer) => {
                let units: Vec<u16> = answer.encode_utf16().collect();
                let n = units.len().min(output.len());
                output[..n].copy_from_slice(&units[..n]);
                *output_len = i32::try_from(n).unwrap();
                if n < units.len() {
                    *input_len = (*input_len - 1).max(0);
                }
                1
            }
            None => {
                if !self.silent {
                    *self.last_error.lock().unwrap() =
                        Some(format!("Cannot resolve table '{tables}'"));
                }
                0
            }
        }
    }

    fn last_error(&self) -> Option<String> {
        self.last_error.lock().unwrap().take()
    }
}

/// Wraps a provisioner and counts how often it runs.
pub struct CountingProvisioner<P> {
    inner: P,
    delay: Duration,
    runs: AtomicUsize,
}

impl<P: TableProvisioner> CountingProvisioner<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            delay: Duration::ZERO,
            runs: AtomicUsize::new(0),
        }
    }

    /// Hold each run open for `delay` so concurrent callers overlap.
    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

impl<P: TableProvisioner> TableProvisioner for CountingProvisioner<P> {
    fn describe(&self) -> String {
        format!("counting {}", self.inner.describe())
    }

    fn provision(&self) -> Result<TablesLocation, InitError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        self.inner.provision()
    }
}

impl<P: TableProvisioner> TableProvisioner for std::sync::Arc<P> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn provision(&self) -> Result<TablesLocation, InitError> {
        (**self).provision()
    }
}

/// A data root holding `tables/en-ueb-g1.ctb`.
pub fn tables_fixture() -> tempfile::TempDir {
    let root = tempfile::tempdir().unwrap();
    let tables = root.path().join("tables");
    std::fs::create_dir_all(&tables).unwrap();
    std::fs::write(tables.join("en-ueb-g1.ctb"), "include latinLetterDef6Dots.uti\n").unwrap();
    root
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types shared by the bridges and the table manager.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// File extensions liblouis uses for table, display and character
/// definition files.
pub const TABLE_EXTENSIONS: [&str; 4] = ["ctb", "utb", "uti", "dis"];

/// Whether `name` carries one of the [`TABLE_EXTENSIONS`].
pub fn is_table_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| TABLE_EXTENSIONS.contains(&ext))
}

/// Which way a string is translated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Plain text to braille cells.
    Forward,
    /// Braille cells to plain text.
    Backward,
}

impl Direction {
    /// Name of the liblouis entry point for this direction.
    pub fn entry_point(self) -> &'static str {
        match self {
            Direction::Forward => "lou_translateString",
            Direction::Backward => "lou_backTranslateString",
        }
    }

    /// Human-readable operation name used in error messages.
    pub fn operation(self) -> &'static str {
        match self {
            Direction::Forward => "translation",
            Direction::Backward => "back-translation",
        }
    }
}

/// Output buffer sizing policy: `len * factor + reserve` code units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputCapacity {
    pub factor: usize,
    pub reserve: usize,
}

impl OutputCapacity {
    /// Native default: four units per input unit plus a terminator slot.
    pub const NATIVE: Self = Self {
        factor: 4,
        reserve: 1,
    };

    /// Web default: ten units per input unit.
    pub const WEB: Self = Self {
        factor: 10,
        reserve: 0,
    };

    /// Output capacity for an input of `input_len` code units.
    pub fn for_input(&self, input_len: usize) -> usize {
        input_len
            .saturating_mul(self.factor)
            .saturating_add(self.reserve)
    }
}

/// liblouis log levels (`logLevels` in `liblouis.h`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineLogLevel {
    All,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    Off,
}

impl EngineLogLevel {
    /// Numeric value passed to `lou_setLogLevel`.
    pub fn as_raw(self) -> i32 {
        match self {
            EngineLogLevel::All => 0,
            EngineLogLevel::Debug => 10_000,
            EngineLogLevel::Info => 20_000,
            EngineLogLevel::Warn => 30_000,
            EngineLogLevel::Error => 40_000,
            EngineLogLevel::Fatal => 50_000,
            EngineLogLevel::Off => 60_000,
        }
    }

    /// Map a raw level reported by the engine back to the nearest variant.
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            i32::MIN..=9_999 => EngineLogLevel::All,
            10_000..=19_999 => EngineLogLevel::Debug,
            20_000..=29_999 => EngineLogLevel::Info,
            30_000..=39_999 => EngineLogLevel::Warn,
            40_000..=49_999 => EngineLogLevel::Error,
            50_000..=59_999 => EngineLogLevel::Fatal,
            60_000.. => EngineLogLevel::Off,
        }
    }
}

/// Where the provisioned tables live once initialization succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablesLocation {
    /// Directory containing the table files; relative table names are
    /// resolved against it.
    pub tables_dir: PathBuf,
    /// Root handed to `lou_setDataPath`.
    pub data_path: PathBuf,
}

/// Shorten `input` to at most `max_chars` characters for error messages.
pub fn snippet(input: &str, max_chars: usize) -> String {
    match input.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &input[..cut]),
        None => input.to_string(),
    }
}

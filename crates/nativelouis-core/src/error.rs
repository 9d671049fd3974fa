// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for nativelouis.

use std::path::PathBuf;

use thiserror::Error;

/// Failure of the one-time table provisioning step.
///
/// Cloneable so a cached failure can be handed to every later caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitError {
    #[error("braille table assets missing at {path}: {reason}")]
    MissingAssets { path: String, reason: String },

    #[error("no braille table files found at {}", path.display())]
    NoTables { path: PathBuf },

    #[error("liblouis rejected data path {}: {detail}", path.display())]
    DataPathRejected { path: PathBuf, detail: String },

    #[error("liblouis web module is missing required exports: {}", missing.join(", "))]
    MissingExports { missing: Vec<String> },

    #[error("failed to instantiate liblouis web module: {0}")]
    Instantiation(String),
}

/// Top-level error type for all nativelouis operations.
#[derive(Debug, Error)]
pub enum LouisError {
    // -- Setup --
    #[error(transparent)]
    Init(#[from] InitError),

    #[error("liblouis not initialized; call initialize() first and await it")]
    NotInitialized,

    // -- Translation --
    #[error("liblouis {operation} failed: {detail} (input: '{input}', table: '{table}')")]
    Translation {
        operation: &'static str,
        detail: String,
        input: String,
        table: String,
    },

    #[error("invalid table specification '{0}': contains a NUL character")]
    InvalidTable(String),

    // -- Platform bridge --
    #[error("platform bridge error: {0}")]
    Bridge(String),

    #[error("native module not available on this platform")]
    PlatformUnavailable,

    // -- Table management / persistence --
    #[error("table download failed: {0}")]
    Download(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LouisError>;

/// Where an error came from, as far as an operator is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Table assets missing or empty at startup.
    Packaging,
    /// liblouis refused the data path or table specification.
    EngineRejection,
    /// liblouis failed a specific input/table pair.
    Translation,
    /// Operation invoked before initialization completed.
    NotReady,
    /// No real binding on this target.
    PlatformUnavailable,
    /// Host-side I/O, JNI or serialization trouble.
    Host,
}

impl LouisError {
    /// Classify this error so packaging problems can be told apart from
    /// engine problems.
    pub fn class(&self) -> ErrorClass {
        match self {
            LouisError::Init(init) => match init {
                InitError::MissingAssets { .. } | InitError::NoTables { .. } => {
                    ErrorClass::Packaging
                }
                InitError::MissingExports { .. } => ErrorClass::Packaging,
                InitError::DataPathRejected { .. } => ErrorClass::EngineRejection,
                InitError::Instantiation(_) => ErrorClass::Host,
            },
            LouisError::NotInitialized => ErrorClass::NotReady,
            LouisError::Translation { .. } => ErrorClass::Translation,
            LouisError::InvalidTable(_) => ErrorClass::EngineRejection,
            LouisError::PlatformUnavailable => ErrorClass::PlatformUnavailable,
            LouisError::Bridge(_)
            | LouisError::Download(_)
            | LouisError::Io(_)
            | LouisError::Serialization(_) => ErrorClass::Host,
        }
    }

    /// Short operator-facing suggestion for this error.
    pub fn hint(&self) -> &'static str {
        match self.class() {
            ErrorClass::Packaging => {
                "Check that the braille tables were bundled with the app (run `louis-tables list`)."
            }
            ErrorClass::EngineRejection => {
                "liblouis could not use the supplied path; check the table names and data path."
            }
            ErrorClass::Translation => {
                "Check the table name is spelled correctly and is one of the bundled tables."
            }
            ErrorClass::NotReady => "Await initialize() before translating.",
            ErrorClass::PlatformUnavailable => {
                "This build has no liblouis binding; use an Android, iOS or web build."
            }
            ErrorClass::Host => "See the error detail; the host environment reported a failure.",
        }
    }
}

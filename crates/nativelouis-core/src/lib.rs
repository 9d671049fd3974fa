// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// nativelouis: core types, errors, table resolution, input sanitizing and
// readiness state shared by every platform binding.

pub mod config;
pub mod error;
pub mod readiness;
pub mod sanitize;
pub mod tables;
pub mod types;

pub use config::BridgeConfig;
pub use error::{ErrorClass, InitError, LouisError};
pub use readiness::{AsyncReadiness, Readiness, ReadinessState};
pub use sanitize::{Sanitized, sanitize};
pub use tables::{TableSpec, resolve_table_list};
pub use types::*;

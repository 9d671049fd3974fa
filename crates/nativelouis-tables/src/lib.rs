// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Bundled table management.
//!
//! Keeps the directory of liblouis tables that the Android, iOS and web
//! builds package, pulling tables and everything they include from the
//! upstream liblouis repository.

pub mod fetch;
pub mod includes;
pub mod store;

pub use fetch::{HttpFetcher, TableFetcher};
pub use includes::parse_includes;
pub use store::{AddReport, RemoveOutcome, TableStore};

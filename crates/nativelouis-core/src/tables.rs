// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Table list resolution.
//
// liblouis accepts a comma-separated list of table files. Callers pass bare
// file names; each one is rooted at the directory the platform initializer
// provisioned (or the virtual mount point on the web).

use std::path::Path;

/// An ordered list of table identifiers as supplied by the caller.
///
/// Order is significant and entries are never dropped, merged or deduplicated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    entries: Vec<String>,
}

impl TableSpec {
    /// Split a comma-separated specification, trimming each entry.
    pub fn parse(spec: &str) -> Self {
        Self {
            entries: spec.split(',').map(|e| e.trim().to_string()).collect(),
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Resolve every entry against `base` and join the result with commas.
    pub fn resolve(&self, base: &str) -> String {
        self.entries
            .iter()
            .map(|entry| resolve_entry(entry, base))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Resolve a comma-separated table list against `base`.
pub fn resolve_table_list(spec: &str, base: &str) -> String {
    TableSpec::parse(spec).resolve(base)
}

fn resolve_entry(entry: &str, base: &str) -> String {
    if is_absolute(entry) {
        entry.to_string()
    } else {
        format!("{}/{}", base.trim_end_matches('/'), entry)
    }
}

// Virtual paths on the web always start with '/', whatever the host is.
fn is_absolute(entry: &str) -> bool {
    entry.starts_with('/') || Path::new(entry).is_absolute()
}

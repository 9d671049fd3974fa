// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The directory of tables that gets packaged into the app builds.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use nativelouis_core::error::{LouisError, Result};
use nativelouis_core::types::is_table_file;

use crate::fetch::TableFetcher;
use crate::includes::parse_includes;

/// What `remove` did with one requested name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotFound,
}

/// Tables touched by one `add`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AddReport {
    /// Downloaded during this run, in download order.
    pub downloaded: Vec<String>,
    /// Already present locally (and scanned for includes).
    pub present: Vec<String>,
}

/// A flat directory of table files.
pub struct TableStore {
    dir: PathBuf,
}

fn check_name(name: &str) -> Result<()> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || Path::new(name).is_absolute()
    {
        return Err(LouisError::InvalidTable(name.to_string()));
    }
    Ok(())
}

impl TableStore {
    /// Open `dir`, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Table files in the store, sorted by name.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if is_table_file(name) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Add `names` and, recursively, every table they include.
    ///
    /// Tables already in the store are not downloaded again but are still
    /// scanned, so their includes get filled in.
    pub async fn add(&self, names: &[String], fetcher: &dyn TableFetcher) -> Result<AddReport> {
        let mut report = AddReport::default();
        let mut visited = HashSet::new();
        // Depth-first, so includes land right after their parent.
        let mut pending: Vec<String> = names.iter().rev().cloned().collect();

        while let Some(name) = pending.pop() {
            if !visited.insert(name.clone()) {
                continue;
            }
            check_name(&name)?;
            if !is_table_file(&name) {
                debug!(table = %name, "include without a table extension");
            }

            let path = self.dir.join(&name);
            let source = if tokio::fs::try_exists(&path).await? {
                report.present.push(name.clone());
                tokio::fs::read_to_string(&path).await?
            } else {
                let text = fetcher.fetch(&name).await?;
                tokio::fs::write(&path, &text).await?;
                info!(table = %name, "downloaded");
                report.downloaded.push(name.clone());
                text
            };

            let includes = parse_includes(&source);
            pending.extend(includes.into_iter().rev());
        }
        Ok(report)
    }

    /// Delete the named files.
    pub fn remove(&self, names: &[String]) -> Result<Vec<(String, RemoveOutcome)>> {
        let mut outcomes = Vec::with_capacity(names.len());
        for name in names {
            check_name(name)?;
            let path = self.dir.join(name);
            let outcome = if path.is_file() {
                fs::remove_file(&path)?;
                info!(table = %name, "removed");
                RemoveOutcome::Removed
            } else {
                warn!(table = %name, "not found");
                RemoveOutcome::NotFound
            };
            outcomes.push((name.clone(), outcome));
        }
        Ok(outcomes)
    }

    /// Delete every table file; other files are left alone.
    pub fn clear(&self) -> Result<Vec<String>> {
        let names = self.list()?;
        for name in &names {
            fs::remove_file(self.dir.join(name))?;
        }
        info!(count = names.len(), "cleared bundled tables");
        Ok(names)
    }
}

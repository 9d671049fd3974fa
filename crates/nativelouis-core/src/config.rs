// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{EngineLogLevel, OutputCapacity};

/// Settings shared by every platform binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Name of the directory that holds the table files.
    pub tables_dir_name: String,
    /// Directory under the app's files dir that tables are extracted into
    /// (Android).
    pub extract_dir_name: String,
    /// Resource bundle carrying the tables (iOS), without `.bundle`.
    pub resource_bundle: String,
    /// Virtual filesystem mount point of the tables (web).
    pub web_tables_mount: String,
    /// Data path for desktop builds linked against a system liblouis.
    pub desktop_data_path: Option<PathBuf>,
    /// Output buffer sizing on native targets.
    pub native_capacity: OutputCapacity,
    /// Output buffer sizing on the web target.
    pub web_capacity: OutputCapacity,
    /// Level handed to `lou_setLogLevel` after initialization.
    pub engine_log_level: EngineLogLevel,
    /// Longest input snippet quoted in error messages.
    pub error_snippet_chars: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            tables_dir_name: "tables".into(),
            extract_dir_name: "liblouis".into(),
            resource_bundle: "NativeLiblouisModule".into(),
            web_tables_mount: "/tables".into(),
            desktop_data_path: None,
            native_capacity: OutputCapacity::NATIVE,
            web_capacity: OutputCapacity::WEB,
            engine_log_level: EngineLogLevel::Warn,
            error_snippet_chars: 48,
        }
    }
}

impl BridgeConfig {
    /// Parse a JSON document; absent fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load the configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = BridgeConfig::from_json(r#"{ "web_capacity": { "factor": 16, "reserve": 2 } }"#)
            .unwrap();
        assert_eq!(cfg.web_capacity, OutputCapacity { factor: 16, reserve: 2 });
        assert_eq!(cfg.native_capacity, OutputCapacity::NATIVE);
        assert_eq!(cfg.tables_dir_name, "tables");
    }

    #[test]
    fn log_level_is_lowercase_in_json() {
        let cfg = BridgeConfig::from_json(r#"{ "engine_log_level": "error" }"#).unwrap();
        assert_eq!(cfg.engine_log_level, EngineLogLevel::Error);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nativelouis.json");
        std::fs::write(&path, r#"{ "resource_bundle": "Tables" }"#).unwrap();
        let cfg = BridgeConfig::load(&path).unwrap();
        assert_eq!(cfg.resource_bundle, "Tables");
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        let err = BridgeConfig::from_json("{ nope").unwrap_err();
        assert!(matches!(err, crate::LouisError::Serialization(_)));
    }
}

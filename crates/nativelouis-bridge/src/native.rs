// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Binding for targets that link liblouis directly (Android, iOS, desktop).
//
// Initialization is lazy: every operation first makes sure the tables are
// provisioned and the engine's data path is set, and the first caller does
// that work for everyone.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info};

use nativelouis_core::config::BridgeConfig;
use nativelouis_core::error::{InitError, Result};
use nativelouis_core::readiness::Readiness;
use nativelouis_core::sanitize::{Sanitized, sanitize};
use nativelouis_core::tables::resolve_table_list;
use nativelouis_core::types::{Direction, TablesLocation};

use crate::marshal::{self, CallContext};
use crate::traits::{LouisEngine, PlatformBinding, TableProvisioner};

/// Native liblouis binding assembled from an engine and a provisioner.
pub struct NativeBinding {
    name: &'static str,
    engine: Arc<dyn LouisEngine>,
    provisioner: Box<dyn TableProvisioner>,
    readiness: Arc<Readiness<TablesLocation>>,
    config: BridgeConfig,
}

impl NativeBinding {
    pub fn new(
        name: &'static str,
        engine: Arc<dyn LouisEngine>,
        provisioner: Box<dyn TableProvisioner>,
        readiness: Arc<Readiness<TablesLocation>>,
        config: BridgeConfig,
    ) -> Self {
        Self {
            name,
            engine,
            provisioner,
            readiness,
            config,
        }
    }

    pub fn readiness(&self) -> &Arc<Readiness<TablesLocation>> {
        &self.readiness
    }

    /// Provision tables and configure the engine unless already done.
    pub fn ensure_ready(&self) -> Result<&TablesLocation> {
        self.readiness.ensure_ready(|| {
            info!(
                platform = self.name,
                source = %self.provisioner.describe(),
                "initializing liblouis"
            );
            let location = self.provisioner.provision().inspect_err(|e| {
                error!(platform = self.name, error = %e, "braille table provisioning failed");
            })?;

            self.engine
                .set_data_path(&location.data_path)
                .map_err(|detail| InitError::DataPathRejected {
                    path: location.data_path.clone(),
                    detail,
                })
                .inspect_err(|e| {
                    error!(platform = self.name, error = %e, "liblouis setup failed")
                })?;
            self.engine.set_log_level(self.config.engine_log_level);

            info!(
                platform = self.name,
                data_path = %location.data_path.display(),
                tables = %location.tables_dir.display(),
                "liblouis initialized"
            );
            Ok(location)
        })
    }

    fn run(&self, direction: Direction, input: &str, table: &str) -> Result<String> {
        let location = self.ensure_ready()?;

        let text = match sanitize(input) {
            Sanitized::Blank(spaces) => return Ok(spaces),
            Sanitized::Text(text) => text,
        };

        let tables = resolve_table_list(table, &location.tables_dir.to_string_lossy());
        debug!(operation = direction.operation(), %tables, "calling liblouis");

        let ctx = CallContext {
            direction,
            input,
            table,
            snippet_chars: self.config.error_snippet_chars,
        };
        marshal::translate_buffers(
            self.engine.as_ref(),
            &ctx,
            &text,
            &tables,
            self.config.native_capacity,
        )
        .inspect_err(|e| error!(platform = self.name, error = %e, "liblouis call failed"))
    }
}

#[async_trait(?Send)]
impl PlatformBinding for NativeBinding {
    fn platform_name(&self) -> &str {
        self.name
    }

    fn translate(&self, text: &str, table: &str) -> Result<String> {
        self.run(Direction::Forward, text, table)
    }

    fn back_translate(&self, dots: &str, table: &str) -> Result<String> {
        self.run(Direction::Backward, dots, table)
    }

    async fn initialize(&self) -> Result<()> {
        self.ensure_ready().map(|_| ())
    }

    fn is_initialized(&self) -> bool {
        self.readiness.is_ready()
    }
}

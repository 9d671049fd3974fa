// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub binding for platforms without a liblouis build.
//
// Every operation returns `PlatformUnavailable`; real implementations live in
// the `native` and `web` modules.

use async_trait::async_trait;

use nativelouis_core::error::{LouisError, Result};

use crate::traits::PlatformBinding;

/// Binding returned when the running platform has no engine.
pub struct StubBinding {
    platform: &'static str,
}

impl StubBinding {
    pub fn new(platform: &'static str) -> Self {
        Self { platform }
    }
}

#[async_trait(?Send)]
impl PlatformBinding for StubBinding {
    fn platform_name(&self) -> &str {
        self.platform
    }

    fn translate(&self, _text: &str, _table: &str) -> Result<String> {
        tracing::warn!(platform = self.platform, "translate called on stub binding");
        Err(LouisError::PlatformUnavailable)
    }

    fn back_translate(&self, _dots: &str, _table: &str) -> Result<String> {
        tracing::warn!(platform = self.platform, "back_translate called on stub binding");
        Err(LouisError::PlatformUnavailable)
    }

    async fn initialize(&self) -> Result<()> {
        tracing::warn!(platform = self.platform, "initialize called on stub binding");
        Err(LouisError::PlatformUnavailable)
    }

    fn is_initialized(&self) -> bool {
        false
    }
}

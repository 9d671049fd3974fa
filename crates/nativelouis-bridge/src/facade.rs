// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The public module surface. Routes every call to the platform binding and
// adds nothing of its own.

use nativelouis_core::config::BridgeConfig;
use nativelouis_core::error::Result;

use crate::traits::PlatformBinding;
use crate::{Platform, platform_binding};

/// Translation module as seen by application code.
pub struct LouisModule<B: PlatformBinding = Box<dyn PlatformBinding>> {
    binding: B,
}

impl LouisModule {
    /// Module backed by the binding for `platform`.
    pub fn for_platform(platform: Platform, config: &BridgeConfig) -> Self {
        Self::new(platform_binding(platform, config))
    }

    /// Module backed by the binding this build targets.
    pub fn for_current_platform(config: &BridgeConfig) -> Self {
        Self::for_platform(Platform::current(), config)
    }
}

impl<B: PlatformBinding> LouisModule<B> {
    pub fn new(binding: B) -> Self {
        Self { binding }
    }

    pub fn binding(&self) -> &B {
        &self.binding
    }

    pub fn platform_name(&self) -> &str {
        self.binding.platform_name()
    }

    /// Translate print `text` to braille using a comma-separated table list.
    pub fn translate(&self, text: &str, table: &str) -> Result<String> {
        self.binding.translate(text, table)
    }

    /// Translate braille `dots` back to print.
    pub fn back_translate(&self, dots: &str, table: &str) -> Result<String> {
        self.binding.back_translate(dots, table)
    }

    /// Run one-time setup. Safe to call repeatedly and concurrently.
    pub async fn initialize(&self) -> Result<()> {
        self.binding.initialize().await
    }

    pub fn is_initialized(&self) -> bool {
        self.binding.is_initialized()
    }
}

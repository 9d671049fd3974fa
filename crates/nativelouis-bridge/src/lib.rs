// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! NativeLouis: platform bindings for liblouis.
//!
//! Android and iOS link liblouis natively and extract or locate the bundled
//! tables on first use; the web build drives the Emscripten module through
//! its heap. All of them sit behind [`PlatformBinding`] and are reached
//! through the [`LouisModule`] facade.

pub mod facade;
pub mod marshal;
pub mod native;
pub mod provision;
pub mod stub;
pub mod traits;
pub mod web;

#[cfg(any(
    target_os = "android",
    target_os = "ios",
    all(feature = "system-liblouis", not(target_arch = "wasm32"))
))]
pub mod ffi;

#[cfg(target_os = "android")]
pub mod android;

#[cfg(target_os = "ios")]
pub mod ios;

#[cfg(test)]
mod testing;

use nativelouis_core::config::BridgeConfig;

pub use facade::LouisModule;
pub use native::NativeBinding;
pub use stub::StubBinding;
pub use traits::{AppPackage, LouisEngine, PlatformBinding, TableProvisioner};
pub use web::{WasmLoader, WasmRuntime, WebBinding};

/// Targets the bridge knows how to serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Android,
    Ios,
    Web,
    /// Desktop build linked against a system liblouis.
    Desktop,
    Unsupported,
}

impl Platform {
    /// The platform this build targets.
    pub const fn current() -> Self {
        if cfg!(target_os = "android") {
            Platform::Android
        } else if cfg!(target_os = "ios") {
            Platform::Ios
        } else if cfg!(target_arch = "wasm32") {
            Platform::Web
        } else if cfg!(feature = "system-liblouis") {
            Platform::Desktop
        } else {
            Platform::Unsupported
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Platform::Android => "Android",
            Platform::Ios => "iOS",
            Platform::Web => "Web",
            Platform::Desktop => "Desktop",
            Platform::Unsupported => "Unsupported",
        }
    }

    fn stub_name(self) -> &'static str {
        match self {
            Platform::Android => "Android (stub)",
            Platform::Ios => "iOS (stub)",
            Platform::Web => "Web (stub)",
            Platform::Desktop => "Desktop (stub)",
            Platform::Unsupported => "Unsupported (stub)",
        }
    }
}

/// Default data directory of a system liblouis install.
pub const DEFAULT_DESKTOP_DATA_PATH: &str = "/usr/share/liblouis";

/// Build the binding for `platform`.
///
/// A platform this build cannot serve (another OS, or desktop without the
/// `system-liblouis` feature) gets a [`StubBinding`].
pub fn platform_binding(platform: Platform, config: &BridgeConfig) -> Box<dyn PlatformBinding> {
    match platform {
        #[cfg(target_os = "android")]
        Platform::Android => Box::new(android::binding(config)),
        #[cfg(target_os = "ios")]
        Platform::Ios => Box::new(ios::binding(config)),
        #[cfg(target_arch = "wasm32")]
        Platform::Web => Box::new(web::emscripten::binding(config)),
        #[cfg(all(
            feature = "system-liblouis",
            not(any(target_os = "android", target_os = "ios", target_arch = "wasm32"))
        ))]
        Platform::Desktop => Box::new(desktop_binding(config)),
        other => {
            tracing::warn!(
                platform = other.name(),
                "no liblouis binding for this platform in this build; using stub"
            );
            Box::new(StubBinding::new(other.stub_name()))
        }
    }
}

#[cfg(all(
    feature = "system-liblouis",
    not(any(target_os = "android", target_os = "ios", target_arch = "wasm32"))
))]
fn desktop_binding(config: &BridgeConfig) -> NativeBinding {
    use std::path::PathBuf;
    use std::sync::{Arc, LazyLock};

    use nativelouis_core::readiness::Readiness;
    use nativelouis_core::types::TablesLocation;

    static READINESS: LazyLock<Arc<Readiness<TablesLocation>>> =
        LazyLock::new(|| Arc::new(Readiness::new()));

    let root = config
        .desktop_data_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DESKTOP_DATA_PATH));
    NativeBinding::new(
        "Desktop",
        Arc::new(ffi::LiblouisEngine::new()),
        Box::new(provision::BundledTables::new(root, config)),
        READINESS.clone(),
        config.clone(),
    )
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The Emscripten liblouis module seen through wasm-bindgen, and the
// JavaScript-facing exports.

use std::rc::Rc;

use async_trait::async_trait;
use js_sys::{Array, Function, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use nativelouis_core::config::BridgeConfig;
use nativelouis_core::error::LouisError;
use nativelouis_core::readiness::AsyncReadiness;
use nativelouis_core::types::Direction;

use super::{WasmLoader, WasmRuntime, WebBinding};
use crate::facade::LouisModule;

#[wasm_bindgen(raw_module = "./liblouis-web/liblouis.js")]
extern "C" {
    /// The Emscripten module factory (`MODULARIZE=1` default export).
    #[wasm_bindgen(js_name = default)]
    fn liblouis_factory() -> js_sys::Promise;
}

fn js_error_text(value: JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    match value.dyn_into::<js_sys::Error>() {
        Ok(error) => String::from(error.message()),
        Err(other) => format!("{other:?}"),
    }
}

/// Instantiates the module through its factory.
pub struct EmscriptenLoader;

#[async_trait(?Send)]
impl WasmLoader for EmscriptenLoader {
    async fn instantiate(&self) -> Result<Box<dyn WasmRuntime>, String> {
        let module = JsFuture::from(liblouis_factory())
            .await
            .map_err(js_error_text)?;
        if module.is_undefined() || module.is_null() {
            return Err("liblouis module factory resolved to nothing".into());
        }
        Ok(Box::new(EmscriptenRuntime { module }))
    }
}

/// An instantiated module object.
pub struct EmscriptenRuntime {
    module: JsValue,
}

impl EmscriptenRuntime {
    fn call_on(&self, target: &JsValue, name: &str, args: &[JsValue]) -> Result<JsValue, String> {
        let function: Function = Reflect::get(target, &JsValue::from_str(name))
            .map_err(js_error_text)?
            .dyn_into()
            .map_err(|_| format!("{name} is not a function"))?;
        let args: Array = args.iter().collect();
        function.apply(target, &args).map_err(js_error_text)
    }

    fn call(&self, name: &str, args: &[JsValue]) -> Result<JsValue, String> {
        self.call_on(&self.module, name, args)
    }

    fn number(value: &JsValue, what: &str) -> Result<f64, String> {
        value
            .as_f64()
            .ok_or_else(|| format!("{what} did not return a number"))
    }

    fn set_value(&self, ptr: u32, value: i32, kind: &str) -> Result<(), String> {
        let args = [ptr.into(), value.into(), kind.into()];
        self.call("setValue", &args).map(|_| ())
    }

    fn get_value(&self, ptr: u32, kind: &str) -> Result<i32, String> {
        let value = self.call("getValue", &[ptr.into(), kind.into()])?;
        Ok(Self::number(&value, "getValue")? as i32)
    }

    fn ccall(&self, name: &str, args: &[JsValue]) -> Result<JsValue, String> {
        let types: Array = args.iter().map(|_| JsValue::from_str("number")).collect();
        let values: Array = args.iter().collect();
        self.call(
            "ccall",
            &[name.into(), "number".into(), types.into(), values.into()],
        )
    }
}

impl WasmRuntime for EmscriptenRuntime {
    fn has_export(&self, name: &str) -> bool {
        Reflect::get(&self.module, &JsValue::from_str(name))
            .map(|value| !value.is_undefined() && !value.is_null())
            .unwrap_or(false)
    }

    fn read_dir(&self, path: &str) -> Result<Vec<String>, String> {
        let fs = Reflect::get(&self.module, &JsValue::from_str("FS")).map_err(js_error_text)?;
        let listing: Array = self
            .call_on(&fs, "readdir", &[path.into()])?
            .dyn_into()
            .map_err(|_| "FS.readdir did not return an array".to_string())?;
        Ok(listing.iter().filter_map(|entry| entry.as_string()).collect())
    }

    fn malloc(&self, bytes: u32) -> Result<u32, String> {
        let ptr = self.call("_malloc", &[bytes.into()])?;
        Ok(Self::number(&ptr, "_malloc")? as u32)
    }

    fn free(&self, ptr: u32) {
        if let Err(e) = self.call("_free", &[ptr.into()]) {
            tracing::error!(ptr, error = %e, "_free failed");
        }
    }

    fn set_i32(&self, ptr: u32, value: i32) -> Result<(), String> {
        self.set_value(ptr, value, "i32")
    }

    fn get_i32(&self, ptr: u32) -> Result<i32, String> {
        self.get_value(ptr, "i32")
    }

    fn set_u16(&self, ptr: u32, value: u16) -> Result<(), String> {
        self.set_value(ptr, i32::from(value as i16), "i16")
    }

    fn get_u16(&self, ptr: u32) -> Result<u16, String> {
        // `getValue(.., 'i16')` sign-extends.
        Ok((self.get_value(ptr, "i16")? & 0xFFFF) as u16)
    }

    fn alloc_utf8(&self, text: &str) -> Result<u32, String> {
        let ptr = self.call("allocateUTF8", &[text.into()])?;
        Ok(Self::number(&ptr, "allocateUTF8")? as u32)
    }

    fn call_translate(&self, direction: Direction, args: [u32; 8]) -> Result<i32, String> {
        let args: Vec<JsValue> = args.iter().map(|arg| JsValue::from(*arg)).collect();
        let rc = self.ccall(direction.entry_point(), &args)?;
        Ok(Self::number(&rc, direction.entry_point())? as i32)
    }

    fn set_log_level(&self, level: i32) -> Result<(), String> {
        self.ccall("lou_setLogLevel", &[level.into()]).map(|_| ())
    }
}

thread_local! {
    static READINESS: Rc<AsyncReadiness<Box<dyn WasmRuntime>>> = Rc::new(AsyncReadiness::new());
    static MODULE: Rc<LouisModule<WebBinding<EmscriptenLoader>>> =
        Rc::new(LouisModule::new(binding(&BridgeConfig::default())));
}

/// Web binding sharing this thread's module instance.
pub fn binding(config: &BridgeConfig) -> WebBinding<EmscriptenLoader> {
    let readiness = READINESS.with(Rc::clone);
    WebBinding::with_readiness(EmscriptenLoader, readiness, config.clone())
}

fn to_js(error: LouisError) -> JsValue {
    js_sys::Error::new(&error.to_string()).into()
}

/// Instantiate the module. Resolves to `true`; safe to call repeatedly.
#[wasm_bindgen]
pub async fn initialize() -> Result<bool, JsValue> {
    let module = MODULE.with(Rc::clone);
    module.initialize().await.map(|()| true).map_err(to_js)
}

#[wasm_bindgen]
pub fn translate(text: &str, table: &str) -> Result<String, JsValue> {
    MODULE.with(|module| module.translate(text, table)).map_err(to_js)
}

#[wasm_bindgen(js_name = backTranslate)]
pub fn back_translate(dots: &str, table: &str) -> Result<String, JsValue> {
    MODULE.with(|module| module.back_translate(dots, table)).map_err(to_js)
}

#[wasm_bindgen(js_name = isInitialized)]
pub fn is_initialized() -> bool {
    MODULE.with(|module| module.is_initialized())
}

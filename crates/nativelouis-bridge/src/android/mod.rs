// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android binding via JNI.
//
// The Kotlin side (`com.nativelouis.NativeLouisModule`) calls `nativeAttach`
// once with the application `Context`; the tables are then extracted from the
// APK's `assets/tables` on first use. Apps built on the NDK glue may skip
// `nativeAttach`, in which case the context comes from `ndk_context`.

use std::io;
use std::sync::{Arc, LazyLock, OnceLock};

use jni::objects::{GlobalRef, JClass, JObject, JObjectArray, JString, JValue};
use jni::sys::{JNI_FALSE, JNI_TRUE, jboolean, jstring};
use jni::{JNIEnv, JavaVM};
use tracing::{debug, info, warn};

use nativelouis_core::config::BridgeConfig;
use nativelouis_core::error::{LouisError, Result};
use nativelouis_core::readiness::Readiness;
use nativelouis_core::types::TablesLocation;

use crate::facade::LouisModule;
use crate::ffi::LiblouisEngine;
use crate::native::NativeBinding;
use crate::provision::{AssetExtractor, read_then_close};
use crate::traits::AppPackage;

const READ_CHUNK: usize = 8192;
/// Local references one `with_env` call may hold at once.
const LOCAL_FRAME: i32 = 16;

/// The JVM and application context the bridge was attached to.
struct Host {
    vm: JavaVM,
    context: GlobalRef,
}

static HOST: OnceLock<Host> = OnceLock::new();
static CONFIG: OnceLock<BridgeConfig> = OnceLock::new();
static READINESS: LazyLock<Arc<Readiness<TablesLocation>>> =
    LazyLock::new(|| Arc::new(Readiness::new()));
static MODULE: OnceLock<LouisModule<NativeBinding>> = OnceLock::new();

fn jni_err(context: &str, e: jni::errors::Error) -> LouisError {
    LouisError::Bridge(format!("{context}: {e}"))
}

/// The attached host, or one built from the NDK glue's context.
fn host() -> io::Result<&'static Host> {
    if let Some(host) = HOST.get() {
        return Ok(host);
    }

    let ctx = ndk_context::android_context();
    if ctx.context().is_null() {
        return Err(io::Error::other(
            "Android context is null; call NativeLouisModule.nativeAttach first",
        ));
    }
    // SAFETY: `ctx.vm()` is the `JavaVM*` registered by the NDK glue and is
    // valid for the lifetime of the process.
    let vm = unsafe { JavaVM::from_raw(ctx.vm().cast()) }
        .map_err(|e| io::Error::other(format!("failed to obtain JavaVM: {e}")))?;
    let context = {
        let env = vm
            .attach_current_thread()
            .map_err(|e| io::Error::other(format!("failed to attach JNI thread: {e}")))?;
        // SAFETY: the NDK glue keeps this jobject alive as a global reference.
        let activity = unsafe { JObject::from_raw(ctx.context().cast()) };
        env.new_global_ref(activity)
            .map_err(|e| io::Error::other(format!("failed to pin Android context: {e}")))?
    };
    Ok(HOST.get_or_init(|| Host { vm, context }))
}

/// Run `f` with a JNI environment for this thread and the app context.
///
/// `f` runs in its own local frame, so the references it creates are released
/// when it returns even if the thread is inside a long native call. A pending
/// Java exception is cleared and reported as the error.
fn with_env<T>(
    f: impl FnOnce(&mut JNIEnv<'_>, &JObject<'_>) -> jni::errors::Result<T>,
) -> io::Result<T> {
    let host = host()?;
    let mut env = host
        .vm
        .attach_current_thread()
        .map_err(|e| io::Error::other(format!("failed to attach JNI thread: {e}")))?;
    let result = env.with_local_frame(LOCAL_FRAME, |env| f(env, host.context.as_obj()));
    result.map_err(|e| {
        if env.exception_check().unwrap_or(false) {
            let _ = env.exception_clear();
        }
        io::Error::other(format!("JNI call failed: {e}"))
    })
}

fn asset_manager<'local>(
    env: &mut JNIEnv<'local>,
    context: &JObject<'_>,
) -> jni::errors::Result<JObject<'local>> {
    env.call_method(
        context,
        "getAssets",
        "()Landroid/content/res/AssetManager;",
        &[],
    )?
    .l()
}

/// The installed APK, reached through `Context` and `AssetManager`.
pub struct JniPackage;

impl AppPackage for JniPackage {
    fn files_dir(&self) -> io::Result<std::path::PathBuf> {
        with_env(|env, context| {
            let dir = env
                .call_method(context, "getFilesDir", "()Ljava/io/File;", &[])?
                .l()?;
            let path = JString::from(
                env.call_method(&dir, "getAbsolutePath", "()Ljava/lang/String;", &[])?
                    .l()?,
            );
            let path: String = env.get_string(&path)?.into();
            Ok(path.into())
        })
    }

    fn list_assets(&self, dir: &str) -> io::Result<Vec<String>> {
        with_env(|env, context| {
            let assets = asset_manager(env, context)?;
            let dir = env.new_string(dir)?;
            let listing = env
                .call_method(
                    &assets,
                    "list",
                    "(Ljava/lang/String;)[Ljava/lang/String;",
                    &[JValue::Object(&dir)],
                )?
                .l()?;
            if listing.is_null() {
                return Ok(Vec::new());
            }

            let listing = JObjectArray::from(listing);
            let len = env.get_array_length(&listing)?;
            let mut names = Vec::with_capacity(usize::try_from(len).unwrap_or(0));
            for i in 0..len {
                let item = JString::from(env.get_object_array_element(&listing, i)?);
                let name: String = env.get_string(&item)?.into();
                env.delete_local_ref(item)?;
                names.push(name);
            }
            Ok(names)
        })
    }

    fn read_asset(&self, path: &str) -> io::Result<Vec<u8>> {
        with_env(|env, context| {
            let assets = asset_manager(env, context)?;
            let name = env.new_string(path)?;
            let stream = env
                .call_method(
                    &assets,
                    "open",
                    "(Ljava/lang/String;)Ljava/io/InputStream;",
                    &[JValue::Object(&name)],
                )?
                .l()?;

            let buffer = env.new_byte_array(READ_CHUNK as i32)?;
            let mut chunk = [0i8; READ_CHUNK];
            read_then_close(
                env,
                |env, bytes| {
                    let n = env
                        .call_method(&stream, "read", "([B)I", &[JValue::Object(&buffer)])?
                        .i()?;
                    // -1 at end of stream.
                    let Ok(n) = usize::try_from(n) else {
                        return Ok(false);
                    };
                    env.get_byte_array_region(&buffer, 0, &mut chunk[..n])?;
                    bytes.extend(chunk[..n].iter().map(|b| *b as u8));
                    Ok(true)
                },
                |env, failed| {
                    // `close` cannot run with the read's exception pending.
                    if failed && env.exception_check()? {
                        env.exception_clear()?;
                    }
                    env.call_method(&stream, "close", "()V", &[])?;
                    Ok(())
                },
            )
        })
    }
}

/// Native binding that extracts the APK's tables into app storage.
pub fn binding(config: &BridgeConfig) -> NativeBinding {
    NativeBinding::new(
        "Android",
        Arc::new(LiblouisEngine::new()),
        Box::new(AssetExtractor::new(JniPackage, config)),
        READINESS.clone(),
        config.clone(),
    )
}

fn module() -> &'static LouisModule<NativeBinding> {
    MODULE.get_or_init(|| {
        let config = CONFIG.get_or_init(BridgeConfig::default);
        LouisModule::new(binding(config))
    })
}

fn throw(env: &mut JNIEnv<'_>, error: &LouisError) {
    if env.exception_check().unwrap_or(false) {
        let _ = env.exception_clear();
    }
    if let Err(e) = env.throw_new("java/lang/RuntimeException", error.to_string()) {
        warn!(error = %e, "failed to raise Java exception");
    }
}

fn attach(env: &mut JNIEnv<'_>, context: &JObject<'_>, config_json: &JString<'_>) -> Result<()> {
    let config = if config_json.is_null() {
        BridgeConfig::default()
    } else {
        let json: String = env
            .get_string(config_json)
            .map_err(|e| jni_err("reading configuration", e))?
            .into();
        BridgeConfig::from_json(&json)?
    };

    let vm = env
        .get_java_vm()
        .map_err(|e| jni_err("failed to obtain JavaVM", e))?;
    let context = env
        .new_global_ref(context)
        .map_err(|e| jni_err("failed to pin Android context", e))?;
    if HOST.set(Host { vm, context }).is_err() {
        debug!("bridge already attached to a context");
    }
    if CONFIG.set(config).is_err() {
        warn!("bridge configuration already fixed; ignoring the new one");
    }
    info!("liblouis bridge attached");
    Ok(())
}

fn call(
    env: &mut JNIEnv<'_>,
    input: &JString<'_>,
    table: &JString<'_>,
    op: fn(&LouisModule<NativeBinding>, &str, &str) -> Result<String>,
) -> Result<jstring> {
    let input: String = env
        .get_string(input)
        .map_err(|e| jni_err("reading input", e))?
        .into();
    let table: String = env
        .get_string(table)
        .map_err(|e| jni_err("reading table list", e))?
        .into();
    let output = op(module(), &input, &table)?;
    Ok(env
        .new_string(output)
        .map_err(|e| jni_err("creating result string", e))?
        .into_raw())
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_nativelouis_NativeLouisModule_nativeAttach<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    context: JObject<'local>,
    config_json: JString<'local>,
) {
    if let Err(e) = attach(&mut env, &context, &config_json) {
        throw(&mut env, &e);
    }
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_nativelouis_NativeLouisModule_nativeTranslate<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    text: JString<'local>,
    table: JString<'local>,
) -> jstring {
    call(&mut env, &text, &table, LouisModule::<NativeBinding>::translate).unwrap_or_else(|e| {
        throw(&mut env, &e);
        std::ptr::null_mut()
    })
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_nativelouis_NativeLouisModule_nativeBackTranslate<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    dots: JString<'local>,
    table: JString<'local>,
) -> jstring {
    call(&mut env, &dots, &table, LouisModule::<NativeBinding>::back_translate).unwrap_or_else(|e| {
        throw(&mut env, &e);
        std::ptr::null_mut()
    })
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_nativelouis_NativeLouisModule_nativeIsInitialized<'local>(
    _env: JNIEnv<'local>,
    _class: JClass<'local>,
) -> jboolean {
    if module().is_initialized() {
        JNI_TRUE
    } else {
        JNI_FALSE
    }
}

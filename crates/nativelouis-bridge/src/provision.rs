// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Table provisioning for the native bindings.
//
// Android ships the tables inside the APK, which liblouis cannot read, so
// they are copied once into private storage. iOS and desktop builds already
// have the tables on disk and only need them located and checked.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use nativelouis_core::config::BridgeConfig;
use nativelouis_core::error::InitError;
use nativelouis_core::types::TablesLocation;

use crate::traits::{AppPackage, TableProvisioner};

fn has_entries(dir: &Path) -> bool {
    fs::read_dir(dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

fn missing(path: &Path, reason: impl ToString) -> InitError {
    InitError::MissingAssets {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Drain a chunked stream into memory, then close it whether or not a read
/// failed.
///
/// `read_chunk` appends the next chunk and returns `false` at end of stream.
/// `close` is told whether reading failed. A read error wins over a close
/// error.
#[cfg_attr(not(target_os = "android"), allow(dead_code))]
pub(crate) fn read_then_close<S, E>(
    stream: &mut S,
    mut read_chunk: impl FnMut(&mut S, &mut Vec<u8>) -> Result<bool, E>,
    close: impl FnOnce(&mut S, bool) -> Result<(), E>,
) -> Result<Vec<u8>, E> {
    let mut bytes = Vec::new();
    let copied = loop {
        match read_chunk(stream, &mut bytes) {
            Ok(true) => continue,
            Ok(false) => break Ok(()),
            Err(e) => break Err(e),
        }
    };
    let closed = close(stream, copied.is_err());
    copied?;
    closed?;
    Ok(bytes)
}

/// Extracts the packaged tables into `<files dir>/<extract dir>/<tables dir>`.
pub struct AssetExtractor<P> {
    package: P,
    extract_dir_name: String,
    tables_dir_name: String,
}

impl<P: AppPackage> AssetExtractor<P> {
    pub fn new(package: P, config: &BridgeConfig) -> Self {
        Self {
            package,
            extract_dir_name: config.extract_dir_name.clone(),
            tables_dir_name: config.tables_dir_name.clone(),
        }
    }

    /// Copy every asset under the tables directory into `target`.
    ///
    /// Files land in a staging directory first so an interrupted extraction
    /// is never mistaken for a complete one on the next launch.
    fn extract(&self, data_path: &Path, target: &Path) -> Result<usize, InitError> {
        let asset_dir = self.tables_dir_name.as_str();
        let names = self
            .package
            .list_assets(asset_dir)
            .map_err(|e| missing(&Path::new("assets").join(asset_dir), e))?;
        if names.is_empty() {
            return Err(InitError::NoTables {
                path: Path::new("assets").join(asset_dir),
            });
        }
        info!(count = names.len(), "extracting braille tables");

        let staging = data_path.join(format!("{asset_dir}.partial"));
        if staging.exists() {
            fs::remove_dir_all(&staging).map_err(|e| missing(&staging, e))?;
        }
        fs::create_dir_all(&staging).map_err(|e| missing(&staging, e))?;

        for name in &names {
            let asset = format!("{asset_dir}/{name}");
            let bytes = self
                .package
                .read_asset(&asset)
                .map_err(|e| missing(&Path::new("assets").join(&asset), e))?;
            let dest = staging.join(name);
            fs::write(&dest, bytes).map_err(|e| missing(&dest, e))?;
            debug!(file = %name, "extracted");
        }

        if target.exists() {
            fs::remove_dir_all(target).map_err(|e| missing(target, e))?;
        }
        fs::rename(&staging, target).map_err(|e| missing(target, e))?;
        Ok(names.len())
    }
}

impl<P: AppPackage> TableProvisioner for AssetExtractor<P> {
    fn describe(&self) -> String {
        format!("packaged assets/{}", self.tables_dir_name)
    }

    fn provision(&self) -> Result<TablesLocation, InitError> {
        let files_dir = self
            .package
            .files_dir()
            .map_err(|e| missing(Path::new("<app files dir>"), e))?;
        let data_path = files_dir.join(&self.extract_dir_name);
        let tables_dir = data_path.join(&self.tables_dir_name);

        if has_entries(&tables_dir) {
            info!(path = %tables_dir.display(), "braille tables already extracted");
        } else {
            let count = self.extract(&data_path, &tables_dir)?;
            info!(count, path = %tables_dir.display(), "extracted braille tables");
        }

        if !has_entries(&tables_dir) {
            return Err(InitError::NoTables { path: tables_dir });
        }
        Ok(TablesLocation {
            tables_dir,
            data_path,
        })
    }
}

type RootLocator = Box<dyn Fn() -> Result<PathBuf, InitError> + Send + Sync>;

/// Tables that already sit on disk under `<root>/<tables dir>`.
///
/// The root is an iOS resource bundle or a desktop data directory; it is
/// handed to liblouis as the data path.
pub struct BundledTables {
    locate: RootLocator,
    tables_dir_name: String,
}

impl BundledTables {
    /// Tables under a known root directory.
    pub fn new(root: impl Into<PathBuf>, config: &BridgeConfig) -> Self {
        let root = root.into();
        Self::located_by(move || Ok(root.clone()), config)
    }

    /// Tables under a root found lazily, on first provisioning.
    pub fn located_by<F>(locate: F, config: &BridgeConfig) -> Self
    where
        F: Fn() -> Result<PathBuf, InitError> + Send + Sync + 'static,
    {
        Self {
            locate: Box::new(locate),
            tables_dir_name: config.tables_dir_name.clone(),
        }
    }
}

impl TableProvisioner for BundledTables {
    fn describe(&self) -> String {
        format!("bundled {} directory", self.tables_dir_name)
    }

    fn provision(&self) -> Result<TablesLocation, InitError> {
        let root = (self.locate)()?;
        let tables_dir = root.join(&self.tables_dir_name);
        if !tables_dir.is_dir() {
            return Err(missing(
                &tables_dir,
                format!("no '{}' directory under the data path", self.tables_dir_name),
            ));
        }
        if !has_entries(&tables_dir) {
            return Err(InitError::NoTables { path: tables_dir });
        }
        info!(path = %tables_dir.display(), "found bundled braille tables");
        Ok(TablesLocation {
            tables_dir,
            data_path: root,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::tables_fixture;
    use std::collections::BTreeMap;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MemoryPackage {
        files_dir: PathBuf,
        assets: BTreeMap<String, Vec<u8>>,
        reads: AtomicUsize,
        list_fails: bool,
    }

    impl MemoryPackage {
        fn new(files_dir: &Path, assets: &[(&str, &str)]) -> Self {
            Self {
                files_dir: files_dir.to_path_buf(),
                assets: assets
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.as_bytes().to_vec()))
                    .collect(),
                reads: AtomicUsize::new(0),
                list_fails: false,
            }
        }
    }

    impl AppPackage for &MemoryPackage {
        fn files_dir(&self) -> io::Result<PathBuf> {
            Ok(self.files_dir.clone())
        }

        fn list_assets(&self, dir: &str) -> io::Result<Vec<String>> {
            if self.list_fails {
                return Err(io::Error::other("AssetManager unavailable"));
            }
            let prefix = format!("{dir}/");
            Ok(self
                .assets
                .keys()
                .filter_map(|k| k.strip_prefix(&prefix).map(str::to_string))
                .collect())
        }

        fn read_asset(&self, path: &str) -> io::Result<Vec<u8>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.assets
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.to_string()))
        }
    }

    #[test]
    fn extracts_assets_once() {
        let files = tempfile::tempdir().unwrap();
        let package = MemoryPackage::new(
            files.path(),
            &[
                ("tables/en-ueb-g1.ctb", "include en-ueb-chardefs.uti"),
                ("tables/en-ueb-chardefs.uti", "letter a 1"),
            ],
        );
        let extractor = AssetExtractor::new(&package, &BridgeConfig::default());

        let location = extractor.provision().unwrap();
        assert_eq!(location.data_path, files.path().join("liblouis"));
        assert_eq!(location.tables_dir, files.path().join("liblouis/tables"));
        assert_eq!(
            fs::read_to_string(location.tables_dir.join("en-ueb-chardefs.uti")).unwrap(),
            "letter a 1"
        );
        assert!(!files.path().join("liblouis/tables.partial").exists());
        assert_eq!(package.reads.load(Ordering::SeqCst), 2);

        // A second process start reuses the extracted copy.
        let again = AssetExtractor::new(&package, &BridgeConfig::default())
            .provision()
            .unwrap();
        assert_eq!(again, location);
        assert_eq!(package.reads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn empty_asset_dir_is_a_packaging_error() {
        let files = tempfile::tempdir().unwrap();
        let package = MemoryPackage::new(files.path(), &[]);
        let err = AssetExtractor::new(&package, &BridgeConfig::default())
            .provision()
            .unwrap_err();
        assert_eq!(
            err,
            InitError::NoTables {
                path: PathBuf::from("assets/tables")
            }
        );
    }

    #[test]
    fn unreadable_asset_names_the_asset() {
        let files = tempfile::tempdir().unwrap();
        let mut package = MemoryPackage::new(files.path(), &[("tables/a.ctb", "x")]);
        package.list_fails = true;
        let err = AssetExtractor::new(&package, &BridgeConfig::default())
            .provision()
            .unwrap_err();
        match err {
            InitError::MissingAssets { path, reason } => {
                assert_eq!(path, "assets/tables");
                assert!(reason.contains("AssetManager unavailable"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[derive(Default)]
    struct ChunkedStream {
        chunks: Vec<&'static str>,
        fail_after: Option<usize>,
        reads: usize,
        closed_after_failure: Option<bool>,
    }

    fn drain(stream: &mut ChunkedStream) -> Result<Vec<u8>, String> {
        read_then_close(
            stream,
            |s, out| {
                if s.fail_after == Some(s.reads) {
                    return Err("IOException: stream reset".to_string());
                }
                let Some(chunk) = s.chunks.get(s.reads) else {
                    return Ok(false);
                };
                s.reads += 1;
                out.extend_from_slice(chunk.as_bytes());
                Ok(true)
            },
            |s, failed| {
                s.closed_after_failure = Some(failed);
                Ok(())
            },
        )
    }

    #[test]
    fn stream_is_read_to_the_end_and_closed() {
        let mut stream = ChunkedStream {
            chunks: vec!["letter ", "a 1"],
            ..Default::default()
        };
        assert_eq!(drain(&mut stream).unwrap(), b"letter a 1");
        assert_eq!(stream.closed_after_failure, Some(false));
    }

    #[test]
    fn stream_is_closed_when_a_read_fails() {
        let mut stream = ChunkedStream {
            chunks: vec!["letter ", "a 1"],
            fail_after: Some(1),
            ..Default::default()
        };
        let err = drain(&mut stream).unwrap_err();
        assert!(err.contains("stream reset"));
        assert_eq!(stream.closed_after_failure, Some(true));
    }

    #[test]
    fn read_error_wins_over_close_error() {
        let err = read_then_close(
            &mut (),
            |_, _| Err::<bool, _>("read failed"),
            |_, _| Err("close failed"),
        )
        .unwrap_err();
        assert_eq!(err, "read failed");
    }

    #[test]
    fn stale_staging_dir_is_replaced() {
        let files = tempfile::tempdir().unwrap();
        let staging = files.path().join("liblouis/tables.partial");
        fs::create_dir_all(&staging).unwrap();
        fs::write(staging.join("half-written.ctb"), "").unwrap();

        let package = MemoryPackage::new(files.path(), &[("tables/a.ctb", "x")]);
        let location = AssetExtractor::new(&package, &BridgeConfig::default())
            .provision()
            .unwrap();
        assert!(location.tables_dir.join("a.ctb").exists());
        assert!(!location.tables_dir.join("half-written.ctb").exists());
    }

    #[test]
    fn bundled_tables_use_root_as_data_path() {
        let root = tables_fixture();
        let location = BundledTables::new(root.path(), &BridgeConfig::default())
            .provision()
            .unwrap();
        assert_eq!(location.data_path, root.path());
        assert_eq!(location.tables_dir, root.path().join("tables"));
    }

    #[test]
    fn bundle_without_tables_dir_names_the_path() {
        let root = tempfile::tempdir().unwrap();
        let err = BundledTables::new(root.path(), &BridgeConfig::default())
            .provision()
            .unwrap_err();
        assert!(err.to_string().contains(&root.path().join("tables").display().to_string()));
    }

    #[test]
    fn bundle_with_empty_tables_dir_fails() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("tables")).unwrap();
        let err = BundledTables::new(root.path(), &BridgeConfig::default())
            .provision()
            .unwrap_err();
        assert!(matches!(err, InitError::NoTables { .. }));
    }

    #[test]
    fn locator_failure_propagates() {
        let provisioner = BundledTables::located_by(
            || {
                Err(InitError::MissingAssets {
                    path: "NativeLiblouisModule.bundle".into(),
                    reason: "resource bundle not found".into(),
                })
            },
            &BridgeConfig::default(),
        );
        let err = provisioner.provision().unwrap_err();
        assert!(err.to_string().contains("NativeLiblouisModule.bundle"));
    }
}

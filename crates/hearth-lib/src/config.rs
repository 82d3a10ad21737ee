//! Centralized launcher settings.
//! Everything has a default so a missing or partial config file still works.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// URL Constants
pub const VANILLA_MANIFEST_URL: &str =
    "https://launchermeta.mojang.com/mc/game/version_manifest.json";

pub const LAUNCHER_NAME: &str = "Hearth";
pub const LAUNCHER_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONCURRENCY: usize = 8;
pub const DEFAULT_MEMORY_GB: u32 = 2;

const ROOT_DIR_NAME: &str = ".hearth";

/// Runtime configuration for the resolver and planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HearthConfig {
    /// Data root holding `versions/`, `libraries/` and `assets/`
    pub root_dir: PathBuf,

    /// Remote version index
    pub index_url: String,

    /// Identifying User-Agent sent with every request
    pub user_agent: String,

    pub request_timeout_secs: u64,

    /// Skip TLS certificate validation for every request.
    /// Checksums still cover content, but not where it came from.
    pub accept_invalid_certs: bool,

    /// Maximum number of artifact downloads in flight
    pub concurrency: usize,

    pub default_memory_gb: u32,
}

impl Default for HearthConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            index_url: VANILLA_MANIFEST_URL.to_string(),
            user_agent: format!("{}/{} (Game Launcher)", LAUNCHER_NAME, LAUNCHER_VERSION),
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            accept_invalid_certs: false,
            concurrency: DEFAULT_CONCURRENCY,
            default_memory_gb: DEFAULT_MEMORY_GB,
        }
    }
}

impl HearthConfig {
    /// Config rooted at `root_dir` with every other setting at its default
    pub fn with_root(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            ..Self::default()
        }
    }

    /// Load a JSON config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config: HearthConfig = serde_json::from_str(&content).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Ok(config)
    }

    /// Write the config as pretty JSON, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, json).map_err(|e| Error::io(path, e))
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }

    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.max(1)
    }

    pub fn dirs(&self) -> GameDirs {
        GameDirs::new(self.root_dir.clone())
    }
}

fn default_root_dir() -> PathBuf {
    match directories::BaseDirs::new() {
        Some(base) => base.home_dir().join(ROOT_DIR_NAME),
        None => PathBuf::from(ROOT_DIR_NAME),
    }
}

/// On-disk layout rooted at the data directory.
///
/// These paths are stable; other tooling may read them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameDirs {
    root: PathBuf,
}

impl GameDirs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the root data directory (also the game directory)
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the path to the libraries directory
    pub fn libraries_dir(&self) -> PathBuf {
        self.root.join("libraries")
    }

    /// Get the path to the assets directory
    pub fn assets_dir(&self) -> PathBuf {
        self.root.join("assets")
    }

    /// Get the path to the versions directory
    pub fn versions_dir(&self) -> PathBuf {
        self.root.join("versions")
    }

    pub fn version_dir(&self, version_id: &str) -> PathBuf {
        self.versions_dir().join(version_id)
    }

    pub fn descriptor_path(&self, version_id: &str) -> PathBuf {
        self.version_dir(version_id)
            .join(format!("{}.json", version_id))
    }

    pub fn client_jar_path(&self, version_id: &str) -> PathBuf {
        self.version_dir(version_id).join(format!("{}.jar", version_id))
    }

    /// Get the path to the natives directory for this version
    pub fn natives_dir(&self, version_id: &str) -> PathBuf {
        self.version_dir(version_id).join("natives")
    }

    /// Where native archives wait between download and extraction
    pub fn native_staging_dir(&self, version_id: &str) -> PathBuf {
        self.version_dir(version_id).join(".natives-staging")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_paths() {
        let dirs = GameDirs::new("/data");
        assert_eq!(
            dirs.descriptor_path("1.20"),
            Path::new("/data/versions/1.20/1.20.json")
        );
        assert_eq!(
            dirs.client_jar_path("1.20"),
            Path::new("/data/versions/1.20/1.20.jar")
        );
        assert_eq!(dirs.natives_dir("1.8.9"), Path::new("/data/versions/1.8.9/natives"));
        assert_eq!(dirs.libraries_dir(), Path::new("/data/libraries"));
    }

    #[test]
    fn partial_config_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("hearth.json");
        std::fs::write(&path, r#"{"concurrency": 0, "accept_invalid_certs": true}"#).unwrap();

        let config = HearthConfig::load(&path).unwrap();
        assert!(config.accept_invalid_certs);
        assert_eq!(config.effective_concurrency(), 1);
        assert_eq!(config.index_url, VANILLA_MANIFEST_URL);
        assert_eq!(config.request_timeout_secs, REQUEST_TIMEOUT_SECS);
    }

    #[test]
    fn missing_config_is_default() {
        let tmp = tempfile::tempdir().unwrap();
        let config = HearthConfig::load(&tmp.path().join("absent.json")).unwrap();
        assert!(!config.accept_invalid_certs);
        assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
    }

    #[test]
    fn invalid_config_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("hearth.json");
        std::fs::write(&path, "{ not json").unwrap();

        match HearthConfig::load(&path) {
            Err(Error::Config { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("hearth.json");
        let mut config = HearthConfig::with_root(tmp.path().join("root"));
        config.default_memory_gb = 6;
        config.save(&path).unwrap();

        let loaded = HearthConfig::load(&path).unwrap();
        assert_eq!(loaded.root_dir, tmp.path().join("root"));
        assert_eq!(loaded.default_memory_gb, 6);
    }
}

//! Potluck Settings
//!
//! Persists a service's config (for the indexer, `IndexerConfig`) as pretty JSON under the
//! platform config directory. A missing file is created from `T::default()`; fields absent
//! from an existing file fall back to defaults when `T` is `#[serde(default)]`.

pub mod paths;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub use paths::{data_dir_for, default_config_dir_for, expand_path};

const SETTINGS_FILE: &str = "settings.json";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid settings in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SettingsError>;

/// A config value bound to the file it was loaded from.
///
/// ```ignore
/// let settings: Settings<IndexerConfig> = Settings::load_or_default("potluck-indexer", None)?;
/// let capacity = settings.config.channel_capacity;
/// ```
pub struct Settings<T> {
    pub config: T,
    path: PathBuf,
}

impl<T: Serialize + DeserializeOwned + Default> Settings<T> {
    /// Load `service`'s settings from `custom_path`, or from
    /// `<config dir>/<service>/settings.json` when none is given.
    pub fn load_or_default(service: &str, custom_path: Option<&Path>) -> Result<Self> {
        let path = match custom_path {
            Some(p) => p.to_path_buf(),
            None => default_settings_path(service),
        };
        Self::open(path)
    }

    /// Load the file at `path`, writing defaults there first if it does not exist.
    pub fn open(path: PathBuf) -> Result<Self> {
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no settings file, writing defaults");
                let settings = Self {
                    config: T::default(),
                    path,
                };
                settings.save()?;
                return Ok(settings);
            }
            Err(source) => return Err(SettingsError::Read { path, source }),
        };

        match serde_json::from_str(&content) {
            Ok(config) => {
                debug!(path = %path.display(), "settings loaded");
                Ok(Self { config, path })
            }
            Err(source) => Err(SettingsError::Parse { path, source }),
        }
    }

    /// Write the current config. The file is replaced in one rename so a crash mid-write
    /// never leaves a truncated config behind.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| SettingsError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let content = serde_json::to_string_pretty(&self.config)?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, content)
            .and_then(|()| fs::rename(&staging, &self.path))
            .map_err(|source| SettingsError::Write {
                path: self.path.clone(),
                source,
            })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// `<config dir>/<service>/settings.json`
pub fn default_settings_path(service: &str) -> PathBuf {
    default_config_dir_for(service).join(SETTINGS_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    /// Shaped like the indexer's config: optional contract and database, tuned capacity.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct WatchConfig {
        contract: Option<String>,
        database_path: Option<PathBuf>,
        channel_capacity: usize,
    }

    impl Default for WatchConfig {
        fn default() -> Self {
            Self {
                contract: None,
                database_path: None,
                channel_capacity: 1024,
            }
        }
    }

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("indexer").join("settings.json");

        let settings: Settings<WatchConfig> =
            Settings::load_or_default("potluck-indexer", Some(&path)).unwrap();
        assert_eq!(settings.config, WatchConfig::default());
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());

        let written: WatchConfig = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.channel_capacity, 1024);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "database_path": "/var/lib/potluck/entities.db" }"#).unwrap();

        let settings: Settings<WatchConfig> = Settings::open(path.clone()).unwrap();
        assert_eq!(
            settings.config.database_path,
            Some(PathBuf::from("/var/lib/potluck/entities.db"))
        );
        assert_eq!(settings.config.channel_capacity, 1024);
        assert_eq!(settings.path(), path.as_path());
    }

    #[test]
    fn test_save_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut settings: Settings<WatchConfig> = Settings::open(path.clone()).unwrap();
        settings.config.contract = Some("0x00000000000000000000000000000000000000cc".to_string());
        settings.config.channel_capacity = 16;
        settings.save().unwrap();

        let reloaded: Settings<WatchConfig> = Settings::open(path.clone()).unwrap();
        assert_eq!(reloaded.config, settings.config);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let err = Settings::<WatchConfig>::open(path.clone()).err().unwrap();
        match &err {
            SettingsError::Parse { path: reported, .. } => assert_eq!(reported, &path),
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_default_settings_path() {
        let path = default_settings_path("potluck-indexer");
        assert!(path.ends_with("settings.json"));
        assert!(path.to_string_lossy().to_lowercase().contains("potluck-indexer"));
    }
}

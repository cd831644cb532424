//! Potluck App
//!
//! Unified initialization for Potluck services: logging + settings, and for the indexer
//! the entity store selected by its config.

use std::fs;
use std::path::{Path, PathBuf};

use potluck_core::{parse_address, Address, CoreError, PotReader};
use potluck_indexer::{IndexerConfig, IndexerService};
use potluck_logging::LogLevel;
use potluck_settings::{data_dir_for, expand_path, Settings, SettingsError};
use potluck_store::{StoreBackend, StoreError};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Initialization failed: {0}")]
    InitError(String),
    #[error("Settings error: {0}")]
    SettingsError(#[from] SettingsError),
    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),
    #[error("Config error: {0}")]
    ConfigError(#[from] CoreError),
}

/// How the service is being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppType {
    Cli,
    Daemon,
}

impl AppType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cli => "CLI",
            Self::Daemon => "Daemon",
        }
    }
}

/// Initialized application context
pub struct App<T> {
    pub service: String,
    pub app_type: AppType,
    pub settings: Settings<T>,
}

impl App<IndexerConfig> {
    /// Restrict indexing to `contract` (e.g. from a `--contract` flag), overriding the
    /// settings file for this run only.
    pub fn watch_contract(&mut self, contract: &str) -> Result<Address, AppError> {
        let address = parse_address(contract)?;
        if let Some(previous) = self.settings.config.contract.filter(|c| *c != address) {
            info!(previous = %previous, contract = %address, "contract overridden");
        }
        self.settings.config.contract = Some(address);
        Ok(address)
    }

    /// Where the SQLite store lives, if configured. `~` is expanded and relative paths
    /// are placed under the service's data directory.
    pub fn database_path(&self) -> Option<PathBuf> {
        let configured = self.settings.config.database_path.as_ref()?;
        let expanded = expand_path(&configured.to_string_lossy());
        if expanded.is_absolute() {
            Some(expanded)
        } else {
            Some(data_dir_for(&self.service).join(expanded))
        }
    }

    /// Open the configured store and build an indexer around `reader`.
    pub fn indexer<R: PotReader>(&self, reader: R) -> Result<IndexerService<StoreBackend, R>, AppError> {
        let config = self.settings.config.clone();
        let database = self.database_path();
        if let Some(parent) = database.as_deref().and_then(Path::parent) {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::InitError(format!("cannot create {}: {e}", parent.display()))
            })?;
        }
        let store = StoreBackend::open(database.as_deref())?;
        info!(
            backend = store.name(),
            contract = ?config.contract,
            release = ?config.active_pots_release,
            "indexer store opened"
        );
        Ok(IndexerService::new(config, store, reader))
    }
}

/// Builder for constructing an App with configurable options.
pub struct AppBuilder<T> {
    service: String,
    app_type: AppType,
    log_level: LogLevel,
    skip_logging: bool,
    skip_banner: bool,
    config_path: Option<String>,
    _phantom: std::marker::PhantomData<T>,
}

impl<T: Serialize + DeserializeOwned + Default> AppBuilder<T> {
    pub fn new(service: &str) -> Self {
        Self {
            service: service.to_string(),
            app_type: AppType::Daemon,
            log_level: LogLevel::Info,
            skip_logging: false,
            skip_banner: false,
            config_path: None,
            _phantom: std::marker::PhantomData,
        }
    }

    pub fn app_type(mut self, app_type: AppType) -> Self {
        self.app_type = app_type;
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.log_level = LogLevel::from_verbose(verbose);
        self
    }

    pub fn skip_logging(mut self) -> Self {
        self.skip_logging = true;
        self
    }

    pub fn skip_banner(mut self) -> Self {
        self.skip_banner = true;
        self
    }

    pub fn config_path(mut self, path: &str) -> Self {
        self.config_path = Some(path.to_string());
        self
    }

    pub fn build(self) -> Result<App<T>, AppError> {
        if !self.skip_logging {
            // another subscriber may already be installed by the host process
            let _ = potluck_logging::try_init(self.log_level);
        }

        let config_path = self.config_path.as_deref().map(Path::new);
        let settings = Settings::load_or_default(&self.service, config_path)?;

        if !self.skip_banner {
            info!(
                "{} {} ({}) starting, settings at {}",
                self.service,
                env!("CARGO_PKG_VERSION"),
                self.app_type.name(),
                settings.path().display(),
            );
        }

        Ok(App {
            service: self.service,
            app_type: self.app_type,
            settings,
        })
    }
}

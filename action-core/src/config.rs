//! src/config.rs
//! ============================================================================
//! # Config: Dispatch, Scheduler and Logging Settings
//!
//! Loaded from and saved to TOML at the platform config directory resolved
//! through [`directories`](https://docs.rs/directories). Every section is
//! optional in the file; missing sections fall back to defaults.
//!
//! ## Example
//! ```rust,ignore
//! let config = Config::load().await?;
//! let helper = ActionHelper::new(subscriber, scheduler, config.dispatch.clone());
//! ```

use std::path::{Path, PathBuf};

use compact_str::CompactString;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tokio::fs as TokioFs;
use tracing::info;

use crate::error::{ActionError, ActionResult};
use crate::logging::LoggerConfig;
use crate::model::binding::DEFAULT_EVENT_NAME;

/// Binding defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Event class used when a binding does not name one
    pub default_event_name: CompactString,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            default_event_name: CompactString::const_new(DEFAULT_EVENT_NAME),
        }
    }
}

/// Run loop limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Upper bound on jobs executed by a single flush
    pub max_jobs_per_flush: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_jobs_per_flush: 10_000,
        }
    }
}

/// Main configuration struct.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub dispatch: DispatchConfig,

    #[serde(default)]
    pub scheduler: SchedulerConfig,

    #[serde(default)]
    pub logging: LoggerConfig,
}

impl Config {
    pub fn from_toml_str(text: &str) -> ActionResult<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml_string(&self) -> ActionResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub async fn load_from(path: &Path) -> ActionResult<Self> {
        let text = TokioFs::read_to_string(path)
            .await
            .map_err(|source| ActionError::ConfigIo {
                path: path.to_path_buf(),
                source,
            })?;

        Self::from_toml_str(&text)
    }

    pub async fn save_to(&self, path: &Path) -> ActionResult<()> {
        let text = self.to_toml_string()?;
        let io_err = |source| ActionError::ConfigIo {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            TokioFs::create_dir_all(parent).await.map_err(io_err)?;
        }
        TokioFs::write(path, text).await.map_err(io_err)?;

        Ok(())
    }

    /// Loads config from the platform config dir, writing defaults if absent.
    pub async fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            info!("Loading config from {}", path.display());
            Ok(Self::load_from(&path).await?)
        } else {
            info!(
                "No config file found at {}, using default configuration. Creating it now.",
                path.display()
            );

            let default_config = Self::default();
            default_config.save_to(&path).await?;

            Ok(default_config)
        }
    }

    pub async fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_path()?;
        info!("Saving config to {}", path.display());
        Ok(self.save_to(&path).await?)
    }

    /// Canonical config file path using `directories::ProjectDirs`.
    pub fn config_path() -> anyhow::Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "action-core", "ActionCore")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory."))?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }
}

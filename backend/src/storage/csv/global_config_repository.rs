//! # Global Config Repository
//!
//! A single `global_config.yaml` at the root of the data directory holds the data
//! format version, the time of the last weekly rollover and the engine tuning.
//!
//! ## YAML Format
//!
//! ```yaml
//! data_format_version: "1.0"
//! last_weekly_reset: 2024-01-29T00:00:00
//! engine:
//!   assignment:
//!     task_weight: 100
//!   scoring:
//!     fallback_points: 10
//!     points_source: live_chore
//! created_at: 2024-01-01T08:00:00Z
//! updated_at: 2024-01-29T00:00:03Z
//! ```
//!
//! Every key under `engine` is optional; missing keys fall back to the defaults.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;

use super::connection::CsvConnection;
use crate::domain::models::EngineConfig;

pub const DATA_FORMAT_VERSION: &str = "1.0";

/// Global configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Data format version for future migrations
    pub data_format_version: String,
    /// Local time of the last weekly rollover, `None` before the first one
    #[serde(default)]
    pub last_weekly_reset: Option<NaiveDateTime>,
    #[serde(default)]
    pub engine: EngineConfig,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            data_format_version: DATA_FORMAT_VERSION.to_string(),
            last_weekly_reset: None,
            engine: EngineConfig::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Storage trait for global configuration operations
pub trait GlobalConfigStorage: Send + Sync {
    /// Get the global configuration, creating the file with defaults on first use
    fn get_global_config(&self) -> Result<GlobalConfig>;

    /// Record when the weekly rollover last ran
    fn set_last_weekly_reset(&self, at: NaiveDateTime) -> Result<()>;

    /// Replace the stored configuration, stamping `updated_at`
    fn update_global_config(&self, config: &GlobalConfig) -> Result<()>;
}

#[derive(Clone)]
pub struct GlobalConfigRepository {
    connection: CsvConnection,
}

impl GlobalConfigRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn load_or_create_global_config(&self) -> Result<GlobalConfig> {
        let config_path = self.connection.global_config_file_path();

        if config_path.exists() {
            let yaml_content = fs::read_to_string(&config_path)?;
            let config: GlobalConfig = serde_yaml::from_str(&yaml_content)
                .with_context(|| format!("Failed to parse {}", config_path.display()))?;
            debug!("Loaded global config from {}", config_path.display());
            Ok(config)
        } else {
            let config = GlobalConfig::default();
            self.save_global_config(&config)?;
            info!("Created default global config at {}", config_path.display());
            Ok(config)
        }
    }

    fn save_global_config(&self, config: &GlobalConfig) -> Result<()> {
        self.connection
            .write_yaml(&self.connection.global_config_file_path(), config)
    }
}

impl GlobalConfigStorage for GlobalConfigRepository {
    fn get_global_config(&self) -> Result<GlobalConfig> {
        self.load_or_create_global_config()
    }

    fn set_last_weekly_reset(&self, at: NaiveDateTime) -> Result<()> {
        let mut config = self.load_or_create_global_config()?;
        config.last_weekly_reset = Some(at);
        self.update_global_config(&config)?;
        info!("Recorded weekly reset at {}", at);
        Ok(())
    }

    fn update_global_config(&self, config: &GlobalConfig) -> Result<()> {
        let mut updated = config.clone();
        updated.updated_at = Utc::now();
        self.save_global_config(&updated)
    }
}

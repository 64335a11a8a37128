use anyhow::{Context, Result};
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DATA_DIR_ENV: &str = "CHORE_ROTA_DATA_DIR";

const CHORES_FILE: &str = "chores.yaml";
const PEOPLE_FILE: &str = "people.yaml";
const ASSIGNMENTS_FILE: &str = "assignments.csv";
const POINTS_FILE: &str = "points.csv";
const RATING_LEDGER_FILE: &str = "rated_assignments.yaml";
const GLOBAL_CONFIG_FILE: &str = "global_config.yaml";

/// CsvConnection owns the data directory and the layout of the files inside it
#[derive(Debug, Clone)]
pub struct CsvConnection {
    base_directory: PathBuf,
}

impl CsvConnection {
    /// Create a new connection, creating the base directory if it doesn't exist
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path).with_context(|| {
                format!("Failed to create data directory {}", base_path.display())
            })?;
            info!("Created data directory: {}", base_path.display());
        }

        Ok(Self {
            base_directory: base_path,
        })
    }

    /// Create a connection in the default data directory.
    /// `CHORE_ROTA_DATA_DIR` wins; otherwise ~/Documents/Chore Rota
    pub fn new_default() -> Result<Self> {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            if !dir.trim().is_empty() {
                info!("Using data directory from {}: {}", DATA_DIR_ENV, dir);
                return Self::new(dir.trim());
            }
        }

        let home_dir = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| anyhow::anyhow!("Could not determine home directory"))?;

        let default_data_dir = PathBuf::from(home_dir).join("Documents").join("Chore Rota");
        info!("Using default data directory: {}", default_data_dir.display());
        Self::new(default_data_dir)
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    pub fn chores_file_path(&self) -> PathBuf {
        self.base_directory.join(CHORES_FILE)
    }

    pub fn people_file_path(&self) -> PathBuf {
        self.base_directory.join(PEOPLE_FILE)
    }

    pub fn assignments_file_path(&self) -> PathBuf {
        self.base_directory.join(ASSIGNMENTS_FILE)
    }

    pub fn points_file_path(&self) -> PathBuf {
        self.base_directory.join(POINTS_FILE)
    }

    pub fn rating_ledger_file_path(&self) -> PathBuf {
        self.base_directory.join(RATING_LEDGER_FILE)
    }

    pub fn global_config_file_path(&self) -> PathBuf {
        self.base_directory.join(GLOBAL_CONFIG_FILE)
    }

    /// Write a file using the atomic write pattern: write to temp file, then rename
    pub fn write_atomically(&self, path: &Path, contents: &[u8]) -> Result<()> {
        if !self.base_directory.exists() {
            fs::create_dir_all(&self.base_directory)?;
        }

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, contents)
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        fs::rename(&temp_path, path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;

        debug!("Wrote {} bytes to {}", contents.len(), path.display());
        Ok(())
    }

    /// Load a YAML document, falling back to the type's default when the file is missing
    pub fn read_yaml_or_default<T: DeserializeOwned + Default>(&self, path: &Path) -> Result<T> {
        if !path.exists() {
            debug!("{} does not exist yet, using defaults", path.display());
            return Ok(T::default());
        }

        let yaml_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if yaml_content.trim().is_empty() {
            return Ok(T::default());
        }

        serde_yaml::from_str(&yaml_content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn write_yaml<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<()> {
        let yaml_content = serde_yaml::to_string(value)?;
        self.write_atomically(path, yaml_content.as_bytes())
    }
}

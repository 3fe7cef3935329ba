use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::{anyhow, Context, Result};
use dirs::data_dir;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::utils;

const APP_DIR: &str = "dev-event";

/// Per-user directory holding the config file and the default database.
static DATA_ROOT: Lazy<PathBuf> = Lazy::new(|| {
    data_dir()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
});

pub fn default_database_path() -> PathBuf {
    DATA_ROOT.join(format!("{APP_DIR}.sqlite"))
}

pub fn default_config_path() -> PathBuf {
    DATA_ROOT.join("config.json")
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub database_path: Option<PathBuf>,
    pub log_filter: Option<String>,
    pub seed_sample_events: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            log_filter: None,
            seed_sample_events: true,
        }
    }
}

impl AppConfig {
    pub fn resolved_database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(default_database_path)
    }
}

pub struct ConfigStore {
    path: PathBuf,
    data: Mutex<AppConfig>,
}

impl ConfigStore {
    pub fn load() -> Result<Self> {
        Self::at(default_config_path())
    }

    pub fn at(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = read_config(&path)?;
        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    pub fn read(&self) -> AppConfig {
        match self.data.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn update<F>(&self, transform: F) -> Result<AppConfig>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut guard = self
            .data
            .lock()
            .map_err(|_| anyhow!("config mutex poisoned"))?;
        transform(&mut guard);
        write_config(&self.path, &guard)?;
        Ok(guard.clone())
    }
}

fn read_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("unable to read config {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("invalid config {}", path.display()))
}

fn write_config(path: &Path, config: &AppConfig) -> Result<()> {
    utils::ensure_parent(path);
    let contents = serde_json::to_string_pretty(config).context("config serialization")?;
    fs::write(path, contents).with_context(|| format!("unable to write config {}", path.display()))
}

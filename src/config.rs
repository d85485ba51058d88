use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub use_json: bool,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub transfers: TransferPolicy,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorageConfig {
    pub path: String,
    /// Remove the database when the last handle drops. Handy for tests and demos.
    #[serde(default)]
    pub temporary: bool,
    pub cache_capacity: u64,
    pub flush_every_ms: Option<u64>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: "./data/stock-transfer".to_string(),
            temporary: false,
            cache_capacity: 64 * 1024 * 1024,
            flush_every_ms: Some(500),
        }
    }
}

impl StorageConfig {
    pub fn open(&self) -> Result<sled::Db, sled::Error> {
        sled::Config::new()
            .path(&self.path)
            .temporary(self.temporary)
            .cache_capacity(self.cache_capacity)
            .flush_every_ms(self.flush_every_ms)
            .open()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TransferPolicy {
    /// Refuse transfers whose source and destination are the same warehouse.
    pub reject_same_warehouse: bool,
}

impl Default for TransferPolicy {
    fn default() -> Self {
        Self {
            reject_same_warehouse: true,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            use_json: false,
            storage: StorageConfig::default(),
            transfers: TransferPolicy::default(),
        }
    }
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse config yaml")
    }
}

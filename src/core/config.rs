use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub indexing: IndexingConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub default_db: String,
    pub data_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub page_size: usize,
    pub buffer_pool_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingConfig {
    pub btree_order: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub log_to_file: bool,
    pub rotation: String,
    pub retention: u32,
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn default() -> Self {
        Self {
            database: DatabaseConfig {
                default_db: "main".to_string(),
                data_dir: "./data".to_string(),
            },
            storage: StorageConfig {
                page_size: crate::storage::page::PAGE_SIZE,
                buffer_pool_size: 500,
            },
            indexing: IndexingConfig {
                btree_order: crate::storage::btree::ORDER,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                log_to_file: true,
                rotation: "daily".to_string(),
                retention: 7,
            },
        }
    }
}

/// Resolves the per-user root directory and loads/saves `Config` under it,
/// the way the host project's own manager resolves its directories.
pub struct ConfigManager {
    pub root_dir: std::path::PathBuf,
    config_dir: std::path::PathBuf,
    data_dir: std::path::PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        let root_dir = directories::ProjectDirs::from("com", "rootdb", "rootdb")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| std::path::PathBuf::from(".rootdb"));

        let config_dir = root_dir.join("config");
        let data_dir = root_dir.join("data");

        Ok(Self { root_dir, config_dir, data_dir })
    }

    pub fn init(&mut self) -> Result<()> {
        std::fs::create_dir_all(&self.root_dir)?;
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(self.root_dir.join("databases"))?;

        let config_path = self.config_path();
        if !config_path.exists() {
            self.save_config(&Config::default())?;
        }

        Ok(())
    }

    pub fn config_path(&self) -> std::path::PathBuf {
        self.config_dir.join("config.toml")
    }

    #[allow(dead_code)]
    pub fn data_dir(&self) -> &std::path::Path {
        &self.data_dir
    }

    pub fn get_database_path(&self, db_name: &str) -> std::path::PathBuf {
        self.root_dir.join("databases").join(db_name)
    }

    pub fn load_config(&self) -> Result<Config> {
        let path = self.config_path();
        if path.exists() {
            Config::load_from_file(path)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save_config(&self, config: &Config) -> Result<()> {
        let path = self.config_path();
        let content = toml::to_string_pretty(config)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.storage.page_size, config.storage.page_size);
        assert_eq!(back.indexing.btree_order, config.indexing.btree_order);
    }
}

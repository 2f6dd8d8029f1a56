use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::storage::RentalStore;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    pub database: Option<String>,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("fleetrent.toml")
}

pub fn default_database_path_in(base: &Path) -> PathBuf {
    base.join(".fleetrent").join("fleet.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<StoreConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: StoreConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &StoreConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Open the store a config points at, creating the database directory
/// and file on first use. Falls back to the default path when the
/// config names none.
pub fn open_store(config: &StoreConfig) -> anyhow::Result<RentalStore> {
    let db_path = config
        .database
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| default_database_path_in(Path::new(".")));
    ensure_db_dir(&db_path)?;
    Ok(RentalStore::open(&db_path)?)
}

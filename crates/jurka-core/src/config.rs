use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::credentials::normalize_base_url;
use crate::error::{CoreResult, StoreError};

pub const CONFIG_HOME_ENV: &str = "JURKA_CONFIG_HOME";

/// Durable store of the default base URL.
pub trait ConfigStore {
    fn get(&self) -> Result<Option<String>, StoreError>;
    fn set(&self, base_url: &str) -> CoreResult<()>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JurkaConfig {
    pub base_url: Option<String>,
}

pub fn resolve_user_home_dir() -> Option<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        let trimmed = home.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }
    if let Ok(profile) = std::env::var("USERPROFILE") {
        let trimmed = profile.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }
    None
}

/// `$JURKA_CONFIG_HOME`, else `$XDG_CONFIG_HOME/jurka`, else `~/.config/jurka`.
pub fn resolve_config_dir() -> Option<PathBuf> {
    if let Ok(value) = std::env::var(CONFIG_HOME_ENV) {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed).join("jurka"));
        }
    }
    resolve_user_home_dir().map(|home| home.join(".config").join("jurka"))
}

pub fn config_path(config_dir: &Path) -> PathBuf {
    config_dir.join("config.toml")
}

pub fn load_config(config_dir: &Path) -> Result<Option<JurkaConfig>, StoreError> {
    let path = config_path(config_dir);
    if !path.is_file() {
        return Ok(None);
    }
    let text = fs::read_to_string(&path)?;
    Ok(Some(toml::from_str::<JurkaConfig>(&text)?))
}

pub fn write_config(config_dir: &Path, config: &JurkaConfig) -> Result<PathBuf, StoreError> {
    fs::create_dir_all(config_dir)?;
    let path = config_path(config_dir);
    let body = toml::to_string_pretty(config)?;
    fs::write(&path, body)?;
    Ok(path)
}

/// TOML-backed config store rooted at a single directory.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    dir: PathBuf,
}

impl FileConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_env() -> Result<Self, StoreError> {
        resolve_config_dir()
            .map(Self::new)
            .ok_or(StoreError::NoConfigDir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ConfigStore for FileConfigStore {
    fn get(&self) -> Result<Option<String>, StoreError> {
        Ok(load_config(&self.dir)?
            .and_then(|config| config.base_url)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty()))
    }

    fn set(&self, base_url: &str) -> CoreResult<()> {
        let mut config = load_config(&self.dir)?.unwrap_or_default();
        config.base_url = Some(normalize_base_url(base_url)?);
        write_config(&self.dir, &config)?;
        Ok(())
    }
}

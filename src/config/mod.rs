use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::backup::{BackupResult, FolderHandle, HandleStore, DEFAULT_PREFIX};
use crate::core::utils::{ensure_dir, PathResolver};
use crate::errors::{LedgerError, Result};
use crate::storage::{json_backend::write_atomic, DEFAULT_USER};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub currency: String,
    pub app_prefix: String,
    pub default_user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_folder: Option<FolderHandle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency: "$".into(),
            app_prefix: DEFAULT_PREFIX.into(),
            default_user: DEFAULT_USER.into(),
            backup_folder: None,
            retention: None,
        }
    }
}

/// Loads and saves [`Config`] under the data directory.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(PathResolver::base_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        ensure_dir(&PathResolver::config_dir_in(&base))?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
            base,
        })
    }

    /// The stored configuration, or defaults when none was saved yet.
    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)?;
        serde_json::from_str(&data).map_err(|err| {
            LedgerError::Config(format!("`{}` is invalid: {}", self.path.display(), err))
        })
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)
    }

    /// Load, modify and save in one step.
    pub fn update(&self, change: impl FnOnce(&mut Config)) -> Result<Config> {
        let mut config = self.load()?;
        change(&mut config);
        self.save(&config)?;
        Ok(config)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }
}

impl HandleStore for ConfigManager {
    fn load_handle(&self) -> BackupResult<Option<FolderHandle>> {
        Ok(self.load()?.backup_folder)
    }

    fn save_handle(&self, handle: &FolderHandle) -> BackupResult<()> {
        self.update(|config| config.backup_folder = Some(handle.clone()))?;
        Ok(())
    }

    fn clear_handle(&self) -> BackupResult<()> {
        self.update(|config| config.backup_folder = None)?;
        Ok(())
    }
}

use dirs::home_dir;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

const DEFAULT_DIR_NAME: &str = ".quick_money";
const STATE_DIR: &str = "state";
const CONFIG_DIR: &str = "config";
const CONFIG_FILE: &str = "config.json";
const HOME_ENV: &str = "QUICK_MONEY_HOME";

/// Resolves the on-disk layout of the application data directory.
pub struct PathResolver;

impl PathResolver {
    /// Returns the application data directory, defaulting to `~/.quick_money`.
    pub fn base_dir() -> PathBuf {
        if let Some(custom) = env::var_os(HOME_ENV) {
            return PathBuf::from(custom);
        }
        home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DIR_NAME)
    }

    /// Uses `root` when provided, otherwise [`PathResolver::base_dir`].
    pub fn resolve_base(root: Option<PathBuf>) -> PathBuf {
        root.unwrap_or_else(Self::base_dir)
    }

    /// Directory holding the key-value state files.
    pub fn state_dir_in(base: &Path) -> PathBuf {
        base.join(STATE_DIR)
    }

    pub fn config_dir_in(base: &Path) -> PathBuf {
        base.join(CONFIG_DIR)
    }

    pub fn config_file_in(base: &Path) -> PathBuf {
        Self::config_dir_in(base).join(CONFIG_FILE)
    }

    /// Where fallback backups land when no folder handle is available.
    pub fn downloads_dir_or(base: &Path) -> PathBuf {
        dirs::download_dir().unwrap_or_else(|| base.join("downloads"))
    }
}

/// Creates `path` and any missing parents.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

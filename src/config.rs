use std::fs;
use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::form::FormOptions;

const DEFAULT_EXPORT_DIR: &str = "~/Documents/Invoices";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    pub export_dir: String,
    pub keep_row_position: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            export_dir: DEFAULT_EXPORT_DIR.to_string(),
            keep_row_position: true,
        }
    }
}

impl AppSettings {
    pub fn export_root(&self) -> PathBuf {
        PathBuf::from(expand_home_dir(&self.export_dir))
    }

    pub fn form_options(&self) -> FormOptions {
        FormOptions { keep_row_position: self.keep_row_position }
    }
}

pub fn config_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "invoice-form", "app") {
        return proj_dirs.config_dir().join("settings.toml");
    }
    PathBuf::from("settings.toml")
}

pub fn load_settings() -> Result<AppSettings, ConfigError> {
    load_settings_from(&config_path())
}

pub fn save_settings(settings: &AppSettings) -> Result<(), ConfigError> {
    save_settings_to(&config_path(), settings)
}

/// A missing file yields the defaults.
pub fn load_settings_from(path: &Path) -> Result<AppSettings, ConfigError> {
    if !path.exists() {
        debug!("no settings at {}, using defaults", path.display());
        return Ok(AppSettings::default());
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Like [`load_settings_from`], but a broken file falls back to the defaults
/// and hands the error back so the caller can show it.
pub fn load_settings_or_default_from(path: &Path) -> (AppSettings, Option<ConfigError>) {
    match load_settings_from(path) {
        Ok(settings) => (settings, None),
        Err(e) => {
            warn!("falling back to default settings: {e}");
            (AppSettings::default(), Some(e))
        }
    }
}

pub fn save_settings_to(path: &Path, settings: &AppSettings) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    let toml_str = toml::to_string_pretty(settings)?;
    fs::write(path, toml_str).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn expand_home_dir(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(base_dirs) = BaseDirs::new() {
            let home = base_dirs.home_dir().to_string_lossy();
            return path.replacen('~', &home, 1);
        }
    }
    path.to_string()
}

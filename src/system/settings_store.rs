// src/system/settings_store.rs

//! Loading and saving `settings.toml`.

use crate::constants::{SETTINGS_DIR, SETTINGS_FILENAME};
use crate::models::UserSettings;
use lazy_static::lazy_static;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

lazy_static! {
    static ref SETTINGS_DIR_CACHE: Mutex<Option<PathBuf>> = Mutex::new(None);
}

/// Errors from reading or writing the settings file.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The OS reports no per-user config directory.
    #[error("Could not find system config directory.")]
    ConfigDirNotFound,
    /// Reading, writing or creating the parent directory failed.
    #[error("Could not access settings at '{path}': {source}")]
    Io {
        /// The settings file.
        path: String,
        /// The underlying failure.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML for [`UserSettings`].
    #[error("Failed to parse settings: {0}")]
    TomlParse(#[from] toml::de::Error),
    /// Serializing [`UserSettings`] failed.
    #[error("Failed to serialize settings: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Returns the directory holding `settings.toml` (`<config dir>/composer-shell`).
///
/// Memoized: only the first call asks the OS.
pub fn settings_dir() -> Result<PathBuf, SettingsError> {
    let mut cached = SETTINGS_DIR_CACHE
        .lock()
        .unwrap_or_else(PoisonError::into_inner);

    if let Some(path) = &*cached {
        return Ok(path.clone());
    }

    let path = dirs::config_dir()
        .ok_or(SettingsError::ConfigDirNotFound)?
        .join(SETTINGS_DIR);
    *cached = Some(path.clone());
    Ok(path)
}

/// User-scope key/value storage for the persisted preferences.
pub trait SettingsStore: Send + Sync {
    /// An absent store reads as all-defaults.
    fn load(&self) -> Result<UserSettings, SettingsError>;
    /// Replaces the stored settings.
    fn save(&self, settings: &UserSettings) -> Result<(), SettingsError>;
}

/// Settings kept in a TOML file.
#[derive(Debug, Clone)]
pub struct TomlSettingsStore {
    path: PathBuf,
}

impl TomlSettingsStore {
    /// A store backed by the file at `path`. Nothing is read yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The store in the user's config directory.
    pub fn user_scope() -> Result<Self, SettingsError> {
        Ok(Self::new(settings_dir()?.join(SETTINGS_FILENAME)))
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> SettingsError {
        SettingsError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl SettingsStore for TomlSettingsStore {
    fn load(&self) -> Result<UserSettings, SettingsError> {
        if !self.path.exists() {
            log::debug!("No settings at '{}', using defaults", self.path.display());
            return Ok(UserSettings::default());
        }
        let content = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        Ok(toml::from_str(&content)?)
    }

    fn save(&self, settings: &UserSettings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let toml_string = toml::to_string_pretty(settings)?;
        fs::write(&self.path, toml_string).map_err(|e| self.io_error(e))
    }
}

/// Settings kept in memory, for previews and tests.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    settings: Mutex<UserSettings>,
}

impl MemorySettingsStore {
    /// A store that starts out holding `settings`.
    pub fn new(settings: UserSettings) -> Self {
        Self {
            settings: Mutex::new(settings),
        }
    }

    /// A copy of what is stored now.
    pub fn snapshot(&self) -> UserSettings {
        self.settings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<UserSettings, SettingsError> {
        Ok(self.snapshot())
    }

    fn save(&self, settings: &UserSettings) -> Result<(), SettingsError> {
        *self
            .settings
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = settings.clone();
        Ok(())
    }
}

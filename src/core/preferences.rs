// src/core/preferences.rs

//! The process-wide preferences, loaded lazily from the settings store and
//! cached until the elevation toggle or an explicit refresh changes them.

use crate::constants::DEFAULT_CONSOLE_PROGRAM;
use crate::core::command_resolver;
use crate::models::{ConsoleTemplates, DisplayPreferences, IconHandle, UserSettings};
use crate::system::fs::Filesystem;
use crate::system::settings_store::{SettingsError, SettingsStore};
use lazy_static::lazy_static;
use std::env;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

lazy_static! {
    static ref DEFAULT_PROGRAM: String =
        env::var("COMSPEC").unwrap_or_else(|_| DEFAULT_CONSOLE_PROGRAM.to_string());
}

/// The console used when none is registered: `%COMSPEC%`, else `cmd.exe`.
pub fn default_console_program() -> &'static str {
    DEFAULT_PROGRAM.as_str()
}

/// Loads, caches and updates the display preferences for the process.
pub struct PreferencesProvider {
    store: Box<dyn SettingsStore>,
    fs: Arc<dyn Filesystem>,
    is_process_elevated: bool,
    composer_icon: Option<IconHandle>,
    uac_icon: Option<IconHandle>,
    cache: Mutex<Option<DisplayPreferences>>,
}

impl fmt::Debug for PreferencesProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreferencesProvider")
            .field("is_process_elevated", &self.is_process_elevated)
            .field("composer_icon", &self.composer_icon)
            .field("uac_icon", &self.uac_icon)
            .finish_non_exhaustive()
    }
}

impl PreferencesProvider {
    /// `is_process_elevated` is computed once by the caller; it is never stored.
    pub fn new(
        store: Box<dyn SettingsStore>,
        fs: Arc<dyn Filesystem>,
        is_process_elevated: bool,
    ) -> Self {
        Self {
            store,
            fs,
            is_process_elevated,
            composer_icon: None,
            uac_icon: None,
            cache: Mutex::new(None),
        }
    }

    /// Icon handles copied into every `DisplayPreferences`.
    pub fn with_icons(mut self, composer: Option<IconHandle>, uac: Option<IconHandle>) -> Self {
        self.composer_icon = composer;
        self.uac_icon = uac;
        self
    }

    /// The cached display preferences, loading them on first use.
    pub fn display_preferences(&self) -> DisplayPreferences {
        let mut cached = self.cache.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(prefs) = &*cached {
            return prefs.clone();
        }

        let settings = self.load_settings();
        let prefs = DisplayPreferences {
            collapse_into_submenu: settings.collapse_menu,
            require_elevation_for_write_ops: settings.elevate_on_write,
            is_process_elevated: self.is_process_elevated,
            settings_command: trimmed(settings.settings_command.as_deref()),
            composer_icon: self.composer_icon,
            uac_icon: self.uac_icon,
        };
        *cached = Some(prefs.clone());
        prefs
    }

    /// Flips the persisted elevation-on-write flag and returns the new value.
    pub fn toggle_elevation(&self) -> Result<bool, SettingsError> {
        let mut settings = self.store.load()?;
        settings.elevate_on_write = !settings.elevate_on_write;
        self.store.save(&settings)?;
        log::debug!("Elevation on write is now {}", settings.elevate_on_write);
        self.refresh();
        Ok(settings.elevate_on_write)
    }

    /// Drops the cache so the next read goes back to the store.
    pub fn refresh(&self) {
        *self.cache.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// The console program and templates to use for a launch. Read fresh on
    /// every call so a newly registered console applies immediately.
    pub fn console_templates(&self) -> ConsoleTemplates {
        let settings = self.load_settings();
        let program = trimmed(settings.console_program.as_deref());
        let program = match shellexpand::full(&program) {
            Ok(expanded) => expanded.into_owned(),
            Err(e) => {
                log::warn!("Could not expand console program '{}': {}", program, e);
                program
            }
        };

        let registered = ConsoleTemplates {
            program,
            open: trimmed(settings.console_open.as_deref()),
            run: trimmed(settings.console_run.as_deref()),
        };
        command_resolver::select_templates(registered, self.fs.as_ref(), default_console_program())
    }

    fn load_settings(&self) -> UserSettings {
        self.store.load().unwrap_or_else(|e| {
            log::warn!("Could not read settings, using defaults: {}", e);
            UserSettings::default()
        })
    }
}

fn trimmed(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

// src/models.rs

//! Plain data shared by the core and the system layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

// --- LOGICAL COMMANDS ---

/// The stable set of actions the menu can offer, independent of the numeric
/// ids the host hands out for a given menu population.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum LogicalCommandId {
    /// The single "Composer" entry of a collapsed menu.
    ShowRootMenu,
    /// The "Composer Options" submenu.
    ShowOptionsSubmenu,
    /// Opens a console in the target directory.
    OpenShellHere,
    /// `composer init`
    Init,
    /// `composer install`
    Install,
    /// `composer install --prefer-dist`
    InstallPreferDist,
    /// `composer install --prefer-source`
    InstallPreferSource,
    /// `composer update`
    Update,
    /// `composer update --prefer-dist`
    UpdatePreferDist,
    /// `composer update --prefer-source`
    UpdatePreferSource,
    /// `composer dump-autoload`
    DumpAutoload,
    /// `composer dump-autoload --optimize`
    DumpAutoloadOptimized,
    /// `composer self-update`
    SelfUpdate,
    /// `composer help`
    Help,
    /// Flips the elevation-on-write preference.
    ToggleRunAsAdmin,
    /// Runs the configured settings program.
    OpenSettings,
}

impl LogicalCommandId {
    /// Every command, in catalog order.
    pub const ALL: [Self; 16] = [
        Self::ShowRootMenu,
        Self::ShowOptionsSubmenu,
        Self::OpenShellHere,
        Self::Init,
        Self::Install,
        Self::InstallPreferDist,
        Self::InstallPreferSource,
        Self::Update,
        Self::UpdatePreferDist,
        Self::UpdatePreferSource,
        Self::DumpAutoload,
        Self::DumpAutoloadOptimized,
        Self::SelfUpdate,
        Self::Help,
        Self::ToggleRunAsAdmin,
        Self::OpenSettings,
    ];

    /// The kebab-case name used on the command line and in JSON output.
    pub fn name(self) -> &'static str {
        match self {
            Self::ShowRootMenu => "show-root-menu",
            Self::ShowOptionsSubmenu => "show-options-submenu",
            Self::OpenShellHere => "open-shell-here",
            Self::Init => "init",
            Self::Install => "install",
            Self::InstallPreferDist => "install-prefer-dist",
            Self::InstallPreferSource => "install-prefer-source",
            Self::Update => "update",
            Self::UpdatePreferDist => "update-prefer-dist",
            Self::UpdatePreferSource => "update-prefer-source",
            Self::DumpAutoload => "dump-autoload",
            Self::DumpAutoloadOptimized => "dump-autoload-optimized",
            Self::SelfUpdate => "self-update",
            Self::Help => "help",
            Self::ToggleRunAsAdmin => "toggle-run-as-admin",
            Self::OpenSettings => "open-settings",
        }
    }

    /// Install and update variants modify the project's vendor tree.
    pub fn is_write_operation(self) -> bool {
        matches!(
            self,
            Self::Install
                | Self::InstallPreferDist
                | Self::InstallPreferSource
                | Self::Update
                | Self::UpdatePreferDist
                | Self::UpdatePreferSource
        )
    }
}

impl fmt::Display for LogicalCommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A command name that matches no [`LogicalCommandId`].
#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unknown menu command '{0}'.")]
pub struct UnknownCommandName(pub String);

impl FromStr for LogicalCommandId {
    type Err = UnknownCommandName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .iter()
            .copied()
            .find(|id| id.name() == wanted)
            .ok_or_else(|| UnknownCommandName(s.to_string()))
    }
}

/// A static catalog record: what an entry is called, what the host shows as
/// help text, and which Composer sub-command it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuEntryDescriptor {
    /// The command this record describes.
    pub id: LogicalCommandId,
    /// Localized menu text.
    pub title: &'static str,
    /// Localized status-bar help.
    pub help_text: &'static str,
    /// Substituted for `{a}` in the run template. Empty for non-launching entries.
    pub cli_fragment: &'static str,
}

// --- TARGET CLASSIFICATION ---

/// What the Target Resolver learned about the selected directory.
///
/// `is_installed` implies `is_composer_project`. When `invalid` is set the
/// other two flags carry no meaning.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetState {
    /// The directory lies inside a `vendor` tree.
    pub invalid: bool,
    /// `composer.json` is present.
    pub is_composer_project: bool,
    /// `vendor/composer/installed.json` is present.
    pub is_installed: bool,
    /// The resolved target directory.
    pub directory: PathBuf,
}

// --- DISPLAY PREFERENCES ---

/// Opaque bitmap/icon handle supplied by the host side.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IconHandle(pub usize);

/// Identity stamped on every item this extension inserts, so a second query
/// against the same menu can tell the entries are already there.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExtensionTag(pub usize);

/// Process-wide display settings, read once and cached by the preferences provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayPreferences {
    /// Nest everything under one "Composer" entry.
    pub collapse_into_submenu: bool,
    /// Launch write operations through `runas`.
    pub require_elevation_for_write_ops: bool,
    /// This process already runs as administrator.
    pub is_process_elevated: bool,
    /// Settings program; empty hides the Settings entry.
    pub settings_command: String,
    /// Icon for the collapsed root entry.
    pub composer_icon: Option<IconHandle>,
    /// Shield icon for entries that will elevate.
    pub uac_icon: Option<IconHandle>,
}

impl DisplayPreferences {
    /// Write operations go through `runas` whenever elevation-on-write is on,
    /// even if this process already runs as admin.
    pub fn requires_elevation(&self, id: LogicalCommandId) -> bool {
        self.require_elevation_for_write_ops && id.is_write_operation()
    }

    /// True when a settings program is configured.
    pub fn has_settings_command(&self) -> bool {
        !self.settings_command.is_empty()
    }
}

/// Flags passed by the host with a menu query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryFlags(pub u32);

impl QueryFlags {
    /// `CMF_NORMAL`
    pub const NORMAL: Self = Self(0x0000_0000);
    /// `CMF_DEFAULTONLY`: the host only wants the default verb.
    pub const DEFAULT_ONLY: Self = Self(0x0000_0001);

    /// True when every bit of `other` is set. `NORMAL` is never contained.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }
}

// --- DISPLAY RECORD ---

/// One inserted entry of the current menu.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayEntry {
    /// Offset from the host's first id; this is what comes back on invocation.
    pub ui_id: u32,
    /// The command the entry stands for.
    pub logical_id: LogicalCommandId,
}

/// The ids handed out during one menu population, in insertion order.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayRecord {
    entries: Vec<DisplayEntry>,
}

impl DisplayRecord {
    /// An empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry. Ids are pushed in ascending order.
    pub fn push(&mut self, ui_id: u32, logical_id: LogicalCommandId) {
        self.entries.push(DisplayEntry { ui_id, logical_id });
    }

    /// Maps a host id back to the command that produced it. `None` means
    /// the id belongs to someone else.
    pub fn lookup(&self, ui_id: u32) -> Option<LogicalCommandId> {
        self.entries
            .iter()
            .find(|entry| entry.ui_id == ui_id)
            .map(|entry| entry.logical_id)
    }

    /// True when `logical_id` was inserted in this population.
    pub fn contains(&self, logical_id: LogicalCommandId) -> bool {
        self.entries.iter().any(|entry| entry.logical_id == logical_id)
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[DisplayEntry] {
        &self.entries
    }

    /// Number of recorded entries. Separators are not recorded.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forgets every entry before a new population.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// --- COMMAND RESOLUTION ---

/// The shell verb a command is launched with.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    /// Plain launch.
    Open,
    /// Launch through a UAC prompt.
    RunAs,
}

impl Verb {
    /// The verb string the shell expects.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::RunAs => "runas",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully synthesized process invocation, consumed by the launcher.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommand {
    /// `open` or `runas`.
    pub verb: Verb,
    /// The console program.
    pub program: String,
    /// The expanded template.
    pub arguments: String,
    /// Set when the template carried `[d]`.
    pub working_directory: Option<PathBuf>,
}

/// The console program and its two command-line patterns.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsoleTemplates {
    /// Executable to launch.
    pub program: String,
    /// Pattern for "Use Composer here".
    pub open: String,
    /// Pattern for every Composer sub-command.
    pub run: String,
}

/// What choosing a menu entry amounts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Start a process.
    Launch(ResolvedCommand),
    /// Flip the persisted elevation-on-write preference. Nothing is launched.
    ToggleElevation,
}

// --- USER SETTINGS (settings.toml) ---

/// The persisted user-scope keys. Every key is optional: an absent key reads
/// as empty/false.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct UserSettings {
    /// Overrides the console executable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub console_program: Option<String>,
    /// Overrides the open-shell pattern.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub console_open: Option<String>,
    /// Overrides the run pattern.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub console_run: Option<String>,
    /// Program behind the Settings entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings_command: Option<String>,
    /// Run install/update elevated.
    #[serde(default)]
    pub elevate_on_write: bool,
    /// Collapse the menu into one entry.
    #[serde(default)]
    pub collapse_menu: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_names_round_trip_through_from_str() {
        for id in LogicalCommandId::ALL {
            assert_eq!(id.name().parse::<LogicalCommandId>(), Ok(id));
        }
        assert_eq!(
            "Install_Prefer_Dist".parse::<LogicalCommandId>(),
            Ok(LogicalCommandId::InstallPreferDist)
        );
        assert!("uninstall".parse::<LogicalCommandId>().is_err());
    }

    #[test]
    fn test_only_install_and_update_variants_write() {
        let writers: Vec<_> = LogicalCommandId::ALL
            .into_iter()
            .filter(|id| id.is_write_operation())
            .collect();
        assert_eq!(writers.len(), 6);
        assert!(!LogicalCommandId::DumpAutoload.is_write_operation());
        assert!(!LogicalCommandId::SelfUpdate.is_write_operation());
    }

    #[test]
    fn test_elevation_applies_even_when_already_admin() {
        let prefs = DisplayPreferences {
            require_elevation_for_write_ops: true,
            is_process_elevated: true,
            ..Default::default()
        };
        assert!(prefs.requires_elevation(LogicalCommandId::Install));
        assert!(prefs.requires_elevation(LogicalCommandId::UpdatePreferSource));
        assert!(!prefs.requires_elevation(LogicalCommandId::DumpAutoload));

        let off = DisplayPreferences {
            is_process_elevated: true,
            ..Default::default()
        };
        assert!(!off.requires_elevation(LogicalCommandId::Install));
    }

    #[test]
    fn test_default_only_flag() {
        assert!(QueryFlags(0x11).contains(QueryFlags::DEFAULT_ONLY));
        assert!(!QueryFlags::NORMAL.contains(QueryFlags::DEFAULT_ONLY));
        assert!(!QueryFlags(0x10).contains(QueryFlags::NORMAL));
    }

    #[test]
    fn test_display_record_lookup() {
        let mut record = DisplayRecord::new();
        record.push(1, LogicalCommandId::Install);
        record.push(3, LogicalCommandId::Help);

        assert_eq!(record.lookup(1), Some(LogicalCommandId::Install));
        assert_eq!(record.lookup(3), Some(LogicalCommandId::Help));
        assert_eq!(record.lookup(2), None);
        assert!(record.contains(LogicalCommandId::Help));

        record.clear();
        assert!(record.is_empty());
    }

    #[test]
    fn test_user_settings_missing_keys_default() {
        let settings: UserSettings = toml::from_str("collapse_menu = true").unwrap();
        assert!(settings.collapse_menu);
        assert!(!settings.elevate_on_write);
        assert!(settings.console_program.is_none());
    }
}

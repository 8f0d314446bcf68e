// src/constants.rs

/// The name of the directory holding the user-scope settings (inside the system config dir).
pub const SETTINGS_DIR: &str = "composer-shell";

/// The name of the user-scope settings file (inside `SETTINGS_DIR`).
pub const SETTINGS_FILENAME: &str = "settings.toml";

/// Template marker asking for the working directory to be set to the target.
pub const PLACEHOLDER_WORKING_DIR: &str = "[d]";

/// Template token replaced by the Composer script invocation.
pub const PLACEHOLDER_SCRIPT: &str = "{s}";

/// Template token replaced by the target directory (forward slashes).
pub const PLACEHOLDER_DIRECTORY: &str = "{d}";

/// Template token replaced by the command argument (forward slashes).
pub const PLACEHOLDER_ARGUMENT: &str = "{a}";

/// The script token substituted for `{s}`.
pub const COMPOSER_SCRIPT: &str = "composer";

/// The argument substituted for `{a}` when opening a console without a command.
pub const SHELL_OPEN_ARGUMENT: &str = "--version";

/// Built-in open template, used when no console is registered.
pub const DEFAULT_OPEN_TEMPLATE: &str = "/k [d]";

/// Built-in run template, used when no console is registered.
pub const DEFAULT_RUN_TEMPLATE: &str = "/k {s} \"{d}\" {a}";

/// Console program used when `COMSPEC` is not set.
pub const DEFAULT_CONSOLE_PROGRAM: &str = "cmd.exe";

/// `ERROR_INVALID_PARAMETER`, reported when a menu entry has no catalog record.
pub const ERROR_INVALID_PARAMETER: u32 = 87;

/// `ERROR_GEN_FAILURE`, reported by the in-memory menu when asked to fail.
pub const ERROR_GEN_FAILURE: u32 = 31;

/// `ERROR_INVALID_MENU_HANDLE`.
pub const ERROR_INVALID_MENU_HANDLE: u32 = 1401;

/// Overrides the location of the settings file when set.
pub const ENV_SETTINGS_PATH: &str = "COMPOSER_SHELL_SETTINGS";

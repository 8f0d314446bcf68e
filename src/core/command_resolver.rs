// src/core/command_resolver.rs

//! Maps a chosen menu entry to the process the host should start.

use crate::constants::{
    COMPOSER_SCRIPT, DEFAULT_OPEN_TEMPLATE, DEFAULT_RUN_TEMPLATE, PLACEHOLDER_ARGUMENT,
    PLACEHOLDER_DIRECTORY, PLACEHOLDER_SCRIPT, PLACEHOLDER_WORKING_DIR, SHELL_OPEN_ARGUMENT,
};
use crate::core::catalog;
use crate::models::{
    ConsoleTemplates, DisplayPreferences, Invocation, LogicalCommandId, ResolvedCommand,
    TargetState, Verb,
};
use crate::system::fs::Filesystem;
use std::path::{Path, PathBuf};

/// A template after placeholder substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedTemplate {
    /// The trimmed argument string.
    pub parameters: String,
    /// The target directory, when the template asked for it with `[d]`.
    pub working_directory: Option<PathBuf>,
}

/// Uses the registered console only when its program exists and both
/// patterns are set; anything less falls back to the built-in console.
pub fn select_templates(
    registered: ConsoleTemplates,
    fs: &dyn Filesystem,
    default_program: &str,
) -> ConsoleTemplates {
    let usable = !registered.program.is_empty()
        && fs.file_exists(Path::new(&registered.program))
        && !registered.open.is_empty()
        && !registered.run.is_empty();

    if usable {
        return registered;
    }

    log::debug!(
        "No usable console registered (program '{}'), using '{}'",
        registered.program,
        default_program
    );
    ConsoleTemplates {
        program: default_program.to_string(),
        open: DEFAULT_OPEN_TEMPLATE.to_string(),
        run: DEFAULT_RUN_TEMPLATE.to_string(),
    }
}

/// Resolves a logical command against the current target.
pub fn resolve(
    id: LogicalCommandId,
    target: &TargetState,
    prefs: &DisplayPreferences,
    templates: &ConsoleTemplates,
) -> Invocation {
    match id {
        LogicalCommandId::ToggleRunAsAdmin => Invocation::ToggleElevation,
        LogicalCommandId::OpenSettings => Invocation::Launch(ResolvedCommand {
            verb: Verb::Open,
            program: prefs.settings_command.clone(),
            arguments: String::new(),
            working_directory: Some(target.directory.clone()),
        }),
        _ => Invocation::Launch(console_command(id, target, prefs, templates)),
    }
}

fn console_command(
    id: LogicalCommandId,
    target: &TargetState,
    prefs: &DisplayPreferences,
    templates: &ConsoleTemplates,
) -> ResolvedCommand {
    let fragment = catalog::descriptor(id)
        .map(|record| record.cli_fragment)
        .unwrap_or_default();

    let (verb, pattern, argument) = if prefs.requires_elevation(id) {
        (Verb::RunAs, &templates.run, fragment)
    } else if id == LogicalCommandId::OpenShellHere {
        (Verb::Open, &templates.open, SHELL_OPEN_ARGUMENT)
    } else {
        (Verb::Open, &templates.run, fragment)
    };

    let expanded = expand_template(pattern, argument, &target.directory);
    log::debug!(
        "Resolved '{}' to {} {} {}",
        id,
        verb,
        templates.program,
        expanded.parameters
    );

    ResolvedCommand {
        verb,
        program: templates.program.clone(),
        arguments: expanded.parameters,
        working_directory: expanded.working_directory,
    }
}

/// Substitutes the template placeholders, in this order: `[d]` is removed
/// (and selects the target as working directory), then `{s}`, `{d}` and
/// `{a}`. Directory and argument get forward slashes because Unix-style
/// shells read a backslash as an escape.
pub fn expand_template(template: &str, argument: &str, directory: &Path) -> ExpandedTemplate {
    let mut working_directory = None;
    let mut params = template.to_string();

    if params.contains(PLACEHOLDER_WORKING_DIR) {
        params = params.replace(PLACEHOLDER_WORKING_DIR, "");
        working_directory = Some(directory.to_path_buf());
    }

    let directory = directory.to_string_lossy().replace('\\', "/");
    let argument = argument.replace('\\', "/");

    let params = params
        .replace(PLACEHOLDER_SCRIPT, COMPOSER_SCRIPT)
        .replace(PLACEHOLDER_DIRECTORY, &directory)
        .replace(PLACEHOLDER_ARGUMENT, &argument);

    ExpandedTemplate {
        parameters: params.trim().to_string(),
        working_directory,
    }
}

// src/system/launcher.rs

//! Starting the resolved console command.

use crate::models::{ResolvedCommand, Verb};
use std::process::{Command as StdCommand, Stdio};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Why a command could not be started.
#[derive(Error, Debug)]
pub enum LaunchError {
    /// The resolved program was blank.
    #[error("No program specified to launch.")]
    EmptyProgram,
    /// Unbalanced quotes in the argument string.
    #[error("Arguments could not be parsed: {0}")]
    ArgumentParse(String),
    /// The OS refused to start the program.
    #[error("Program '{0}' could not be started: {1}")]
    Spawn(String, std::io::Error),
    /// `runas` outside Windows.
    #[error("Running elevated is not supported on this platform.")]
    ElevationUnsupported,
}

/// Starts external processes for resolved commands.
pub trait ProcessLauncher: Send + Sync {
    /// Starts the process and returns as soon as it is running.
    fn launch(&self, command: &ResolvedCommand) -> Result<(), LaunchError>;
}

/// Launches through the operating system. Fire-and-forget: the child is
/// never waited on and its output is not captured.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl ProcessLauncher for SystemLauncher {
    fn launch(&self, command: &ResolvedCommand) -> Result<(), LaunchError> {
        let program = command.program.trim();
        if program.is_empty() {
            return Err(LaunchError::EmptyProgram);
        }

        let mut process = match command.verb {
            Verb::Open => open_command(program, &command.arguments)?,
            Verb::RunAs => runas_command(program, command)?,
        };

        if let Some(dir) = &command.working_directory {
            process.current_dir(dunce::simplified(dir));
        }

        process
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let child = process
            .spawn()
            .map_err(|e| LaunchError::Spawn(program.to_string(), e))?;
        log::debug!(
            "Started '{}' ({}) with PID {}",
            program,
            command.verb,
            child.id()
        );
        Ok(())
    }
}

/// The argument string goes to the program untouched; consoles such as
/// `cmd.exe` parse their own command line.
#[cfg(windows)]
fn open_command(program: &str, arguments: &str) -> Result<StdCommand, LaunchError> {
    use std::os::windows::process::CommandExt;

    let mut process = StdCommand::new(program);
    if !arguments.is_empty() {
        process.raw_arg(arguments);
    }
    Ok(process)
}

#[cfg(not(windows))]
fn open_command(program: &str, arguments: &str) -> Result<StdCommand, LaunchError> {
    let args =
        shlex::split(arguments).ok_or_else(|| LaunchError::ArgumentParse(arguments.to_string()))?;
    let mut process = StdCommand::new(program);
    process.args(args);
    Ok(process)
}

/// UAC elevation goes through `Start-Process -Verb RunAs`.
#[cfg(windows)]
fn runas_command(program: &str, command: &ResolvedCommand) -> Result<StdCommand, LaunchError> {
    let mut script = format!(
        "Start-Process -FilePath {} -Verb RunAs",
        powershell_quote(program)
    );
    if !command.arguments.is_empty() {
        script.push_str(" -ArgumentList ");
        script.push_str(&powershell_quote(&command.arguments));
    }
    if let Some(dir) = &command.working_directory {
        script.push_str(" -WorkingDirectory ");
        script.push_str(&powershell_quote(
            &dunce::simplified(dir).to_string_lossy(),
        ));
    }

    let mut process = StdCommand::new("powershell");
    process.args(["-NoProfile", "-NonInteractive", "-Command", &script]);
    Ok(process)
}

#[cfg(not(windows))]
fn runas_command(_program: &str, _command: &ResolvedCommand) -> Result<StdCommand, LaunchError> {
    Err(LaunchError::ElevationUnsupported)
}

/// Single-quoted PowerShell literal; embedded quotes are doubled.
#[cfg_attr(not(windows), allow(dead_code))]
fn powershell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Records launches instead of performing them. Used by the `resolve`
/// command and in tests.
#[derive(Debug, Default)]
pub struct RecordingLauncher {
    launched: Mutex<Vec<ResolvedCommand>>,
}

impl RecordingLauncher {
    /// A launcher with nothing recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every command passed to `launch`, oldest first.
    pub fn launched(&self) -> Vec<ResolvedCommand> {
        self.launched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ProcessLauncher for RecordingLauncher {
    fn launch(&self, command: &ResolvedCommand) -> Result<(), LaunchError> {
        if command.program.trim().is_empty() {
            return Err(LaunchError::EmptyProgram);
        }
        self.launched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(command.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn command(verb: Verb, program: &str) -> ResolvedCommand {
        ResolvedCommand {
            verb,
            program: program.to_string(),
            arguments: String::new(),
            working_directory: None,
        }
    }

    #[test]
    fn test_empty_program_is_rejected() {
        let result = SystemLauncher.launch(&command(Verb::Open, "   "));

        assert!(matches!(result, Err(LaunchError::EmptyProgram)));
    }

    #[test]
    fn test_missing_program_is_a_spawn_error() {
        let result = SystemLauncher.launch(&command(
            Verb::Open,
            "composer-shell-no-such-program-1f9c",
        ));

        assert!(matches!(result, Err(LaunchError::Spawn(program, _)) if program.starts_with("composer-shell-no-such")));
    }

    #[cfg(not(windows))]
    #[test]
    fn test_runas_is_unsupported_off_windows() {
        let result = SystemLauncher.launch(&command(Verb::RunAs, "sh"));

        assert!(matches!(result, Err(LaunchError::ElevationUnsupported)));
    }

    #[cfg(not(windows))]
    #[test]
    fn test_unbalanced_quotes_fail_to_parse() {
        let mut cmd = command(Verb::Open, "sh");
        cmd.arguments = "-c \"echo".to_string();

        assert!(matches!(
            SystemLauncher.launch(&cmd),
            Err(LaunchError::ArgumentParse(_))
        ));
    }

    #[test]
    fn test_powershell_quote_doubles_quotes() {
        assert_eq!(powershell_quote("C:\\it's here"), "'C:\\it''s here'");
    }

    #[test]
    fn test_recording_launcher_keeps_commands() {
        let launcher = RecordingLauncher::new();
        let mut cmd = command(Verb::Open, "cmd.exe");
        cmd.working_directory = Some(PathBuf::from("C:\\proj"));

        launcher.launch(&cmd).unwrap();

        assert_eq!(launcher.launched(), vec![cmd]);
        assert!(launcher.launch(&command(Verb::Open, "")).is_err());
    }
}

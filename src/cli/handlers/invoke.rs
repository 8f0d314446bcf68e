// src/cli/handlers/invoke.rs

use crate::{
    cli::handlers::{commons, resolve},
    core::handler::InvokeOutcome,
    models::LogicalCommandId,
    system::launcher::SystemLauncher,
};
use anyhow::Result;
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    no_binary_name = true,
    about = "Runs a Composer menu entry for a folder, as if it had been clicked."
)]
struct InvokeArgs {
    /// The selected file or folder.
    path: PathBuf,

    /// The entry to run, e.g. `install`, `update-prefer-dist`, `open-shell-here`.
    command: LogicalCommandId,
}

/// Builds the menu for the path and runs the named entry.
pub fn handle(args: Vec<String>) -> Result<()> {
    let args = InvokeArgs::try_parse_from(&args)?;

    let (mut queried, ui_id) =
        commons::offered_id(&args.path, args.command, Arc::new(SystemLauncher))?;

    match queried.handler.invoke_command(ui_id)? {
        InvokeOutcome::Launched(command) => {
            println!(
                "{}",
                format!(t!("cli.invoke.launched"), command = args.command).green()
            );
            resolve::print_command(&command);
        }
        InvokeOutcome::ElevationToggled { enabled } => {
            let message = if enabled {
                t!("cli.toggle.enabled")
            } else {
                t!("cli.toggle.disabled")
            };
            println!("{}", message.green());
        }
    }
    Ok(())
}

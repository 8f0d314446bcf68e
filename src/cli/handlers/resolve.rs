// src/cli/handlers/resolve.rs

use crate::{
    cli::handlers::commons,
    core::handler::InvokeOutcome,
    models::{LogicalCommandId, ResolvedCommand},
    system::launcher::RecordingLauncher,
};
use anyhow::Result;
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    no_binary_name = true,
    about = "Prints the process a Composer menu entry would start, without starting it."
)]
struct ResolveArgs {
    /// The selected file or folder.
    path: PathBuf,

    /// The entry to resolve, e.g. `install`, `update-prefer-dist`, `open-shell-here`.
    command: LogicalCommandId,

    /// Print the command as JSON.
    #[arg(long)]
    json: bool,
}

/// Prints what the named entry would launch, without launching it.
pub fn handle(args: Vec<String>) -> Result<()> {
    let args = ResolveArgs::try_parse_from(&args)?;

    // The toggle writes settings instead of launching; never run it here.
    if args.command == LogicalCommandId::ToggleRunAsAdmin {
        println!(
            "{}",
            format!(t!("cli.resolve.toggle"), command = args.command).yellow()
        );
        return Ok(());
    }

    let (mut queried, ui_id) = commons::offered_id(
        &args.path,
        args.command,
        Arc::new(RecordingLauncher::new()),
    )?;

    if let InvokeOutcome::Launched(command) = queried.handler.invoke_command(ui_id)? {
        if args.json {
            println!("{}", serde_json::to_string_pretty(&command)?);
        } else {
            print_command(&command);
        }
    }
    Ok(())
}

/// Verb, program, arguments and working directory, one per line.
pub fn print_command(command: &ResolvedCommand) {
    println!("  {:<12} {}", t!("cli.label.verb").blue(), command.verb);
    println!("  {:<12} {}", t!("cli.label.program").blue(), command.program);
    println!(
        "  {:<12} {}",
        t!("cli.label.arguments").blue(),
        command.arguments.dimmed()
    );
    if let Some(dir) = &command.working_directory {
        println!("  {:<12} {}", t!("cli.label.directory").blue(), dir.display());
    }
}

// src/cli/mod.rs

use clap::Parser;

/// One handler per console action.
pub mod handlers;

/// composer-shell: the Composer context-menu engine, driven from a console.
///
/// Actions:
/// - `menu [PATH...] [--collapse] [--json]`: show the menu Explorer would get.
/// - `invoke <PATH> <COMMAND>`: run a menu entry for a folder.
/// - `resolve <PATH> <COMMAND>`: print what an entry would run.
/// - `toggle-admin`: flip "Run as admin (Install/Update)".
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// The action to run.
    pub action: Option<String>,

    /// Arguments passed on to the action.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

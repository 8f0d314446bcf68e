// src/bin/composer-shell.rs

//! Console entry point: dispatches an action to its handler.

use anyhow::{Result, anyhow};
use clap::Parser;
use colored::*;
use composer_shell::{
    cli::{Cli, handlers},
    t,
};

// --- Command Definition and Registry ---

/// A console action, its aliases and its handler.
struct CommandDefinition {
    name: &'static str,
    aliases: &'static [&'static str],
    handler: fn(Vec<String>) -> Result<()>,
}

/// Every action the console front end understands.
static COMMAND_REGISTRY: &[CommandDefinition] = &[
    CommandDefinition {
        name: "menu",
        aliases: &["show"],
        handler: handlers::menu::handle,
    },
    CommandDefinition {
        name: "invoke",
        aliases: &["run"],
        handler: handlers::invoke::handle,
    },
    CommandDefinition {
        name: "resolve",
        aliases: &[],
        handler: handlers::resolve::handle,
    },
    CommandDefinition {
        name: "toggle-admin",
        aliases: &["runas"],
        handler: handlers::toggle_admin::handle,
    },
];

fn find_command(name: &str) -> Option<&'static CommandDefinition> {
    COMMAND_REGISTRY
        .iter()
        .find(|cmd| cmd.name == name || cmd.aliases.contains(&name))
}

fn main() {
    env_logger::init();

    if let Err(e) = run_cli(Cli::parse()) {
        // clap renders its own help and usage errors.
        if let Some(clap_err) = e.downcast_ref::<clap::Error>() {
            clap_err.exit();
        }
        eprintln!("\n{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);

    let Some(action) = cli.action else {
        println!("{}", t!("cli.usage"));
        return Ok(());
    };

    match find_command(&action) {
        Some(command) => (command.handler)(cli.args),
        None => {
            let available: Vec<&str> = COMMAND_REGISTRY.iter().map(|cmd| cmd.name).collect();
            Err(anyhow!(
                t!("cli.error.unknown_action"),
                action = action,
                available = available.join(", ")
            ))
        }
    }
}

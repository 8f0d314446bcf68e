// src/cli/handlers/menu.rs

use crate::{
    cli::handlers::commons::{self, COMPOSER_ICON, UAC_ICON},
    core::handler::QueryOutcome,
    models::{DisplayRecord, TargetState},
    system::{launcher::RecordingLauncher, native_menu::RenderedNode},
};
use anyhow::Result;
use clap::Parser;
use colored::*;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Shows the Composer menu Explorer would display for a selection."
)]
struct MenuArgs {
    /// Selected items. Defaults to the current folder.
    paths: Vec<PathBuf>,

    /// Nest everything under a single "Composer" entry, for this run only.
    #[arg(long)]
    collapse: bool,

    /// Print the menu as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Serialize, Debug)]
struct MenuReport<'a> {
    target: Option<&'a TargetState>,
    consumed: u32,
    record: Option<&'a DisplayRecord>,
    items: Vec<RenderedNode>,
}

/// Prints the tree, or the JSON report with `--json`.
pub fn handle(args: Vec<String>) -> Result<()> {
    let args = MenuArgs::try_parse_from(&args)?;
    let collapse = args.collapse.then_some(true);

    let queried = commons::query_menu(&args.paths, collapse, Arc::new(RecordingLauncher::new()))?;

    let consumed = match &queried.outcome {
        QueryOutcome::Populated { consumed } => *consumed,
        QueryOutcome::Declined(reason) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&MenuReport {
                    target: None,
                    consumed: 0,
                    record: None,
                    items: Vec::new(),
                })?);
            } else {
                println!(
                    "{}",
                    format!(
                        t!("cli.menu.declined"),
                        reason = commons::decline_message(reason)
                    )
                    .yellow()
                );
            }
            return Ok(());
        }
    };

    let items = queried.tree.render();

    if args.json {
        let report = MenuReport {
            target: queried.handler.target(),
            consumed,
            record: queried.handler.record(),
            items,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let path = queried
        .handler
        .target()
        .map(|target| target.directory.display().to_string())
        .unwrap_or_default();
    println!(
        "\n--- {} ---",
        format!(t!("cli.menu.header"), path = path.yellow())
    );
    print_nodes(&items, 1);
    println!(
        "\n{}",
        format!(t!("cli.menu.consumed"), count = consumed).dimmed()
    );
    Ok(())
}

fn print_nodes(nodes: &[RenderedNode], depth: usize) {
    let indent = "  ".repeat(depth);
    for node in nodes {
        let Some(text) = &node.text else {
            println!("{}{}", indent, "--------".dimmed());
            continue;
        };

        let id = node
            .ui_id
            .map(|id| format!("[{id:>2}]"))
            .unwrap_or_default();
        let mut line = format!("{} {}", id.dimmed(), text);
        if node.checked {
            line = format!("{} {}", line, "(x)".green());
        }
        if node.icon == Some(UAC_ICON) {
            line = format!("{} {}", line, format!("({})", t!("cli.label.admin")).red());
        } else if node.icon == Some(COMPOSER_ICON) {
            line = line.bold().to_string();
        }
        println!("{}{}", indent, line);

        if !node.children.is_empty() {
            print_nodes(&node.children, depth + 1);
        }
    }
}

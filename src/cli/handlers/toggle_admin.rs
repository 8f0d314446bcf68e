// src/cli/handlers/toggle_admin.rs

use crate::{
    cli::handlers::commons,
    core::preferences::PreferencesProvider,
    system::{elevation, fs::StdFilesystem},
};
use anyhow::Result;
use clap::Parser;
use colored::*;
use std::sync::Arc;

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Turns running Install/Update as administrator on or off."
)]
struct ToggleAdminArgs {}

/// Flips elevation-on-write and reports the new value.
pub fn handle(args: Vec<String>) -> Result<()> {
    let _args = ToggleAdminArgs::try_parse_from(&args)?;

    let store = commons::settings_store()?;
    let path = store.path().to_path_buf();
    let preferences = PreferencesProvider::new(
        Box::new(store),
        Arc::new(StdFilesystem),
        elevation::is_process_elevated(),
    );

    let message = if preferences.toggle_elevation()? {
        t!("cli.toggle.enabled")
    } else {
        t!("cli.toggle.disabled")
    };
    println!("{}", message.green());
    println!(
        "{}",
        format!(t!("cli.toggle.settings_file"), path = path.display()).dimmed()
    );
    Ok(())
}

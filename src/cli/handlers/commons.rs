// src/cli/handlers/commons.rs

// Setup shared by the handlers: settings, services and one menu query.

use crate::{
    constants::ENV_SETTINGS_PATH,
    core::{
        handler::{ContextMenuHandler, DeclineReason, HandlerServices, QueryOutcome},
        menu_builder::BuildRequest,
        preferences::PreferencesProvider,
        shell_item::Selection,
    },
    models::{ExtensionTag, IconHandle, LogicalCommandId, QueryFlags},
    system::{
        elevation,
        fs::{Filesystem, StdFilesystem},
        fs_items::{FsItem, FsSelection},
        launcher::ProcessLauncher,
        native_menu::{MenuTree, NativeMenu},
        settings_store::{MemorySettingsStore, SettingsStore, TomlSettingsStore},
    },
};
use anyhow::{Context, Result, anyhow};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Marks the items this front end inserts.
pub const CLI_TAG: ExtensionTag = ExtensionTag(0x00C0_4B05);

/// Explorer never hands out id 0, so neither do we.
pub const CLI_FIRST_ID: u32 = 1;

/// Stand-in handle for the Composer bitmap.
pub const COMPOSER_ICON: IconHandle = IconHandle(1);
/// Stand-in handle for the UAC shield.
pub const UAC_ICON: IconHandle = IconHandle(2);

/// The settings file: `$COMPOSER_SHELL_SETTINGS` if set, else the user config dir.
pub fn settings_store() -> Result<TomlSettingsStore> {
    match env::var(ENV_SETTINGS_PATH) {
        Ok(path) if !path.trim().is_empty() => Ok(TomlSettingsStore::new(path.trim())),
        _ => Ok(TomlSettingsStore::user_scope()?),
    }
}

/// Builds the shared services. `collapse` overrides the stored layout for this
/// run only; the settings file is not touched.
pub fn services(
    collapse: Option<bool>,
    launcher: Arc<dyn ProcessLauncher>,
) -> Result<HandlerServices> {
    let store = settings_store()?;
    let store: Box<dyn SettingsStore> = match collapse {
        Some(collapse) => {
            let mut settings = store.load()?;
            settings.collapse_menu = collapse;
            Box::new(MemorySettingsStore::new(settings))
        }
        None => Box::new(store),
    };

    let fs: Arc<dyn Filesystem> = Arc::new(StdFilesystem);
    let preferences =
        PreferencesProvider::new(store, Arc::clone(&fs), elevation::is_process_elevated())
            .with_icons(Some(COMPOSER_ICON), Some(UAC_ICON));

    Ok(HandlerServices {
        preferences: Arc::new(preferences),
        fs,
        launcher,
    })
}

/// No paths means the current folder, as when right-clicking its background.
pub fn selection_for(paths: &[PathBuf]) -> Result<Selection<FsSelection>> {
    if paths.is_empty() {
        let cwd = env::current_dir().context("Could not read the current directory")?;
        return Ok(Selection::Folder(FsItem::new(cwd)));
    }
    Ok(Selection::Data(FsSelection(paths.to_vec())))
}

/// A handler that has run one query against a fresh in-memory menu.
#[derive(Debug)]
pub struct QueriedMenu {
    /// The handler, ready to invoke.
    pub handler: ContextMenuHandler<FsSelection>,
    /// The menu it populated.
    pub tree: MenuTree,
    /// Whether it populated or declined.
    pub outcome: QueryOutcome,
}

/// Runs one query for `paths`. A decline is an outcome, not an error.
pub fn query_menu(
    paths: &[PathBuf],
    collapse: Option<bool>,
    launcher: Arc<dyn ProcessLauncher>,
) -> Result<QueriedMenu> {
    let mut handler = ContextMenuHandler::new(CLI_TAG, services(collapse, launcher)?);
    handler.initialize(selection_for(paths)?);

    let mut tree = MenuTree::new();
    let request = BuildRequest {
        menu: tree.root(),
        index: tree.item_count(tree.root()),
        first_id: CLI_FIRST_ID,
        flags: QueryFlags::NORMAL,
    };
    let outcome = handler
        .query_context_menu(&mut tree, &request)
        .context(t!("cli.error.build_failed"))?;

    Ok(QueriedMenu {
        handler,
        tree,
        outcome,
    })
}

/// Builds the menu for `path` and returns the id assigned to `command`.
pub fn offered_id(
    path: &Path,
    command: LogicalCommandId,
    launcher: Arc<dyn ProcessLauncher>,
) -> Result<(QueriedMenu, u32)> {
    let queried = query_menu(&[path.to_path_buf()], None, launcher)?;

    if let QueryOutcome::Declined(reason) = &queried.outcome {
        return Err(anyhow!(
            t!("cli.menu.declined"),
            reason = decline_message(reason)
        ));
    }

    let ui_id = queried
        .handler
        .record()
        .and_then(|record| {
            record
                .entries()
                .iter()
                .find(|entry| entry.logical_id == command)
        })
        .map(|entry| entry.ui_id)
        .ok_or_else(|| {
            anyhow!(
                t!("cli.error.not_offered"),
                command = command,
                path = path.display()
            )
        })?;

    Ok((queried, ui_id))
}

/// A localized line explaining a decline.
pub fn decline_message(reason: &DeclineReason) -> String {
    match reason {
        DeclineReason::DefaultOnly => t!("cli.decline.default_only").to_string(),
        DeclineReason::AlreadyPopulated => t!("cli.decline.already_populated").to_string(),
        DeclineReason::NoSelection => t!("cli.decline.no_selection").to_string(),
        DeclineReason::InvalidTarget => t!("cli.decline.invalid_target").to_string(),
        DeclineReason::Selection(e) => e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shell_item::SelectionError;

    #[test]
    fn test_empty_paths_select_current_folder() {
        let selection = selection_for(&[]).unwrap();

        assert!(matches!(selection, Selection::Folder(_)));
    }

    #[test]
    fn test_paths_become_a_data_selection() {
        let selection = selection_for(&[PathBuf::from("a"), PathBuf::from("b")]).unwrap();

        let Selection::Data(FsSelection(paths)) = selection else {
            panic!("expected a data selection");
        };
        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn test_selection_errors_keep_their_message() {
        let reason = DeclineReason::Selection(SelectionError::NotSingleSelection(3));

        assert_eq!(
            decline_message(&reason),
            SelectionError::NotSingleSelection(3).to_string()
        );
    }
}

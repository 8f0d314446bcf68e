// src/core/handler.rs

//! One context-menu handler instance: the host hands it a selection, asks it
//! to populate a menu, then invokes one of the ids it assigned.

use crate::core::catalog;
use crate::core::command_resolver;
use crate::core::menu_builder::{self, BuildOutcome, BuildRequest, SkipReason};
use crate::core::preferences::PreferencesProvider;
use crate::core::shell_item::{self, DataSelection, Selection, SelectionError};
use crate::core::target_resolver;
use crate::models::{
    DisplayPreferences, DisplayRecord, ExtensionTag, Invocation, LogicalCommandId,
    ResolvedCommand, TargetState,
};
use crate::system::fs::Filesystem;
use crate::system::launcher::{LaunchError, ProcessLauncher};
use crate::system::native_menu::{MenuError, NativeMenu};
use crate::system::settings_store::SettingsError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Failures while running a chosen entry.
#[derive(Error, Debug)]
pub enum InvokeError {
    /// The id is not in the current record, or nothing was built yet.
    #[error("Command id {0} does not belong to this menu.")]
    UnknownCommand(u32),
    /// The console could not be started.
    #[error(transparent)]
    Launch(#[from] LaunchError),
    /// The elevation toggle could not be persisted.
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Why a query added nothing. None of these are errors for the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclineReason {
    /// The host only wanted the default verb.
    DefaultOnly,
    /// Our entries are already in the menu.
    AlreadyPopulated,
    /// `initialize` was never called.
    NoSelection,
    /// The selection resolved to no directory.
    Selection(SelectionError),
    /// The directory is inside a vendor tree.
    InvalidTarget,
}

impl From<SkipReason> for DeclineReason {
    fn from(reason: SkipReason) -> Self {
        match reason {
            SkipReason::DefaultOnly => Self::DefaultOnly,
            SkipReason::AlreadyPopulated => Self::AlreadyPopulated,
            SkipReason::InvalidTarget => Self::InvalidTarget,
        }
    }
}

/// Result of a menu query that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// Nothing was added; the host sees zero ids consumed.
    Declined(DeclineReason),
    /// Entries were added.
    Populated {
        /// Number of host ids used, starting at `first_id`.
        consumed: u32,
    },
}

/// What an invocation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvokeOutcome {
    /// The command was handed to the launcher.
    Launched(ResolvedCommand),
    /// The elevation preference was flipped and saved.
    ElevationToggled {
        /// The new value.
        enabled: bool,
    },
}

/// Where the handler is in its query/invoke cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuState {
    /// No menu built for the current selection.
    Unbuilt,
    /// Entries inserted; their ids are in the record.
    Built(DisplayRecord),
    /// At least one entry was invoked.
    Invoked {
        /// The record of the build that was invoked.
        record: DisplayRecord,
        /// The most recent invocation.
        last: LogicalCommandId,
    },
}

impl MenuState {
    /// The ids of the current build, if any.
    pub fn record(&self) -> Option<&DisplayRecord> {
        match self {
            Self::Unbuilt => None,
            Self::Built(record) | Self::Invoked { record, .. } => Some(record),
        }
    }
}

/// The collaborators shared by every handler in the process.
#[derive(Clone)]
pub struct HandlerServices {
    /// Cached display preferences and the settings store behind them.
    pub preferences: Arc<PreferencesProvider>,
    /// Used to classify the target directory.
    pub fs: Arc<dyn Filesystem>,
    /// Starts resolved commands.
    pub launcher: Arc<dyn ProcessLauncher>,
}

impl fmt::Debug for HandlerServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerServices")
            .field("preferences", &self.preferences)
            .finish_non_exhaustive()
    }
}

/// Per-menu handler state for one right-click.
pub struct ContextMenuHandler<D: DataSelection> {
    tag: ExtensionTag,
    services: HandlerServices,
    selection: Option<Selection<D>>,
    target: Option<TargetState>,
    prefs: DisplayPreferences,
    state: MenuState,
}

impl<D: DataSelection> fmt::Debug for ContextMenuHandler<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextMenuHandler")
            .field("tag", &self.tag)
            .field("selection", &self.selection)
            .field("target", &self.target)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<D: DataSelection> ContextMenuHandler<D> {
    /// `tag` marks every item this handler inserts.
    pub fn new(tag: ExtensionTag, services: HandlerServices) -> Self {
        Self {
            tag,
            services,
            selection: None,
            target: None,
            prefs: DisplayPreferences::default(),
            state: MenuState::Unbuilt,
        }
    }

    /// Takes the selection for the next query, dropping the previous one.
    pub fn initialize(&mut self, selection: Selection<D>) {
        log::debug!("Handler initialized with {:?}", selection);
        self.selection = Some(selection);
        self.target = None;
        self.state = MenuState::Unbuilt;
    }

    /// Current position in the query/invoke cycle.
    pub fn state(&self) -> &MenuState {
        &self.state
    }

    /// The classification used by the last build.
    pub fn target(&self) -> Option<&TargetState> {
        self.target.as_ref()
    }

    /// The ids handed out by the last successful (or partial) build.
    pub fn record(&self) -> Option<&DisplayRecord> {
        self.state.record()
    }

    /// Populates `menu` for the current selection.
    ///
    /// Selection and target problems decline quietly. Only a failing menu
    /// primitive is an error; the entries inserted before it stay and
    /// remain invokable.
    pub fn query_context_menu<M: NativeMenu>(
        &mut self,
        menu: &mut M,
        request: &BuildRequest,
    ) -> Result<QueryOutcome, MenuError> {
        if let Some(reason) = menu_builder::precheck(menu, request, self.tag) {
            log::debug!("Query declined: {:?}", reason);
            return Ok(QueryOutcome::Declined(reason.into()));
        }

        let Some(selection) = &self.selection else {
            return Ok(QueryOutcome::Declined(DeclineReason::NoSelection));
        };

        let directory = match shell_item::resolve_directory(selection) {
            Ok(directory) => directory,
            Err(e) => {
                log::debug!("Selection not usable: {}", e);
                return Ok(QueryOutcome::Declined(DeclineReason::Selection(e)));
            }
        };

        let target = target_resolver::resolve_target(&directory, self.services.fs.as_ref());
        let prefs = self.services.preferences.display_preferences();

        self.state = MenuState::Unbuilt;
        let mut record = DisplayRecord::new();
        let result = menu_builder::build(menu, request, &prefs, &target, self.tag, &mut record);

        match result {
            Ok(BuildOutcome::Skipped(reason)) => Ok(QueryOutcome::Declined(reason.into())),
            Ok(BuildOutcome::Built { consumed }) => {
                self.commit(record, target, prefs);
                Ok(QueryOutcome::Populated { consumed })
            }
            Err(e) => {
                log::warn!("Menu build failed: {}", e);
                if !record.is_empty() {
                    self.commit(record, target, prefs);
                }
                Err(e)
            }
        }
    }

    fn commit(&mut self, record: DisplayRecord, target: TargetState, prefs: DisplayPreferences) {
        self.state = MenuState::Built(record);
        self.target = Some(target);
        self.prefs = prefs;
    }

    fn lookup(&self, ui_id: u32) -> Option<LogicalCommandId> {
        self.state.record()?.lookup(ui_id)
    }

    /// Runs the entry the host assigned `ui_id` (relative to `first_id`).
    pub fn invoke_command(&mut self, ui_id: u32) -> Result<InvokeOutcome, InvokeError> {
        let logical = self
            .lookup(ui_id)
            .ok_or(InvokeError::UnknownCommand(ui_id))?;
        let target = self
            .target
            .as_ref()
            .ok_or(InvokeError::UnknownCommand(ui_id))?;

        let templates = self.services.preferences.console_templates();
        let outcome = match command_resolver::resolve(logical, target, &self.prefs, &templates) {
            Invocation::ToggleElevation => {
                let enabled = self.services.preferences.toggle_elevation()?;
                InvokeOutcome::ElevationToggled { enabled }
            }
            Invocation::Launch(command) => {
                self.services.launcher.launch(&command)?;
                InvokeOutcome::Launched(command)
            }
        };

        if let Some(record) = self.state.record() {
            self.state = MenuState::Invoked {
                record: record.clone(),
                last: logical,
            };
        }
        Ok(outcome)
    }

    /// Status-bar help for an id we assigned.
    pub fn command_help(&self, ui_id: u32) -> Option<&'static str> {
        let logical = self.lookup(ui_id)?;
        catalog::descriptor(logical).map(|descriptor| descriptor.help_text)
    }

    /// Whether `ui_id` is one of ours.
    pub fn validate_command(&self, ui_id: u32) -> bool {
        self.lookup(ui_id).is_some()
    }
}

// src/core/menu_builder.rs

//! Populates the host menu from a target classification and the display
//! preferences, recording which host id maps to which logical command.

use crate::constants::ERROR_INVALID_PARAMETER;
use crate::core::catalog;
use crate::models::{
    DisplayPreferences, DisplayRecord, ExtensionTag, LogicalCommandId, QueryFlags, TargetState,
};
use crate::system::native_menu::{MenuError, MenuHandle, MenuItemSpec, NativeMenu};
use scopeguard::ScopeGuard;

/// Where and how the host asked us to insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildRequest {
    /// The host menu to populate.
    pub menu: MenuHandle,
    /// Position of our first entry.
    pub index: u32,
    /// First host id we may use.
    pub first_id: u32,
    /// Query flags from the host.
    pub flags: QueryFlags,
}

/// Why the builder inserted nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Only the default verb was requested.
    DefaultOnly,
    /// Our tag is already in the menu.
    AlreadyPopulated,
    /// The target lies inside a vendor tree.
    InvalidTarget,
}

/// Result of a build that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Nothing was inserted.
    Skipped(SkipReason),
    /// Entries were inserted.
    Built {
        /// Id slots used, separators included.
        consumed: u32,
    },
}

/// True when an item carrying our tag is already in `handle`.
pub fn menu_exists<M: NativeMenu>(menu: &M, handle: MenuHandle, tag: ExtensionTag) -> bool {
    (0..menu.item_count(handle)).any(|position| menu.item_tag(handle, position) == Some(tag))
}

/// The checks that do not need a target: default-only queries and a menu we
/// already populated.
pub fn precheck<M: NativeMenu>(
    menu: &M,
    request: &BuildRequest,
    tag: ExtensionTag,
) -> Option<SkipReason> {
    if request.flags.contains(QueryFlags::DEFAULT_ONLY) {
        return Some(SkipReason::DefaultOnly);
    }
    if menu_exists(menu, request.menu, tag) {
        return Some(SkipReason::AlreadyPopulated);
    }
    None
}

/// Builds the Composer entries into `request.menu`.
///
/// On failure the error code of the failing primitive is returned and the
/// entries inserted so far stay where they are; `record` keeps their ids.
/// Popups that never got attached are destroyed.
pub fn build<M: NativeMenu>(
    menu: &mut M,
    request: &BuildRequest,
    prefs: &DisplayPreferences,
    target: &TargetState,
    tag: ExtensionTag,
    record: &mut DisplayRecord,
) -> Result<BuildOutcome, MenuError> {
    if let Some(reason) = precheck(menu, request, tag) {
        return Ok(BuildOutcome::Skipped(reason));
    }
    if target.invalid {
        return Ok(BuildOutcome::Skipped(SkipReason::InvalidTarget));
    }

    record.clear();

    let builder = Builder {
        menu,
        prefs,
        tag,
        first_id: request.first_id,
        next_id: 0,
        record,
        orphans: Vec::new(),
    };
    let mut builder = scopeguard::guard(builder, Builder::release_orphans);

    builder.populate(request.menu, request.index, target)?;

    let builder = ScopeGuard::into_inner(builder);
    log::debug!(
        "Menu built for '{}': {} entries, {} ids",
        target.directory.display(),
        builder.record.len(),
        builder.next_id
    );
    Ok(BuildOutcome::Built {
        consumed: builder.next_id,
    })
}

struct Builder<'a, M: NativeMenu> {
    menu: &'a mut M,
    prefs: &'a DisplayPreferences,
    tag: ExtensionTag,
    first_id: u32,
    next_id: u32,
    record: &'a mut DisplayRecord,
    orphans: Vec<MenuHandle>,
}

impl<M: NativeMenu> Builder<'_, M> {
    fn populate(
        &mut self,
        host_menu: MenuHandle,
        index: u32,
        target: &TargetState,
    ) -> Result<(), MenuError> {
        let collapse = self.prefs.collapse_into_submenu;
        let main = if collapse { self.popup()? } else { host_menu };
        let mut pos_main = if collapse { 0 } else { index };
        let options = self.popup()?;
        let mut pos_opts = 0;

        if !collapse {
            self.separator(main, &mut pos_main)?;
        }

        if !target.is_composer_project {
            self.add(LogicalCommandId::Init, main, None, &mut pos_main)?;
        } else {
            self.add(LogicalCommandId::Install, main, None, &mut pos_main)?;
            if target.is_installed {
                self.add(LogicalCommandId::Update, main, None, &mut pos_main)?;
            }
        }

        if target.is_composer_project {
            self.add(LogicalCommandId::InstallPreferDist, options, None, &mut pos_opts)?;
            self.add(LogicalCommandId::InstallPreferSource, options, None, &mut pos_opts)?;
            self.separator(options, &mut pos_opts)?;

            if target.is_installed {
                self.add(LogicalCommandId::UpdatePreferDist, options, None, &mut pos_opts)?;
                self.add(LogicalCommandId::UpdatePreferSource, options, None, &mut pos_opts)?;
                self.separator(options, &mut pos_opts)?;
            }

            self.add(LogicalCommandId::DumpAutoload, options, None, &mut pos_opts)?;
            self.add(LogicalCommandId::DumpAutoloadOptimized, options, None, &mut pos_opts)?;
            self.separator(options, &mut pos_opts)?;
        }

        self.add(LogicalCommandId::SelfUpdate, options, None, &mut pos_opts)?;
        self.add(LogicalCommandId::Help, options, None, &mut pos_opts)?;

        // Only separate when something follows.
        if !self.prefs.is_process_elevated || self.prefs.has_settings_command() {
            self.separator(options, &mut pos_opts)?;
        }
        if !self.prefs.is_process_elevated {
            self.add(LogicalCommandId::ToggleRunAsAdmin, options, None, &mut pos_opts)?;
        }
        if self.prefs.has_settings_command() {
            self.add(LogicalCommandId::OpenSettings, options, None, &mut pos_opts)?;
        }

        self.add(
            LogicalCommandId::ShowOptionsSubmenu,
            main,
            Some(options),
            &mut pos_main,
        )?;
        self.add(LogicalCommandId::OpenShellHere, main, None, &mut pos_main)?;

        if !collapse {
            self.separator(main, &mut pos_main)?;
        } else {
            let mut position = index;
            self.add(
                LogicalCommandId::ShowRootMenu,
                host_menu,
                Some(main),
                &mut position,
            )?;
        }

        Ok(())
    }

    fn popup(&mut self) -> Result<MenuHandle, MenuError> {
        let handle = self.menu.create_popup()?;
        self.orphans.push(handle);
        Ok(handle)
    }

    fn add(
        &mut self,
        id: LogicalCommandId,
        menu: MenuHandle,
        submenu: Option<MenuHandle>,
        position: &mut u32,
    ) -> Result<(), MenuError> {
        let descriptor = catalog::descriptor(id).ok_or(MenuError::UnknownEntry {
            code: ERROR_INVALID_PARAMETER,
        })?;

        let checked =
            id == LogicalCommandId::ToggleRunAsAdmin && self.prefs.require_elevation_for_write_ops;
        let icon = if checked {
            None
        } else if id == LogicalCommandId::ShowRootMenu {
            self.prefs.composer_icon
        } else if self.prefs.requires_elevation(id) {
            self.prefs.uac_icon
        } else {
            None
        };

        let item = MenuItemSpec {
            ui_id: self.first_id.saturating_add(self.next_id),
            text: descriptor.title,
            icon,
            checked,
            submenu,
            tag: self.tag,
        };
        self.menu.insert_item(menu, *position, &item)?;

        if let Some(attached) = submenu {
            self.orphans.retain(|handle| *handle != attached);
        }
        self.record.push(self.next_id, id);
        self.next_id += 1;
        *position += 1;
        Ok(())
    }

    /// Separators take an id slot but no record entry.
    fn separator(&mut self, menu: MenuHandle, position: &mut u32) -> Result<(), MenuError> {
        self.menu.insert_separator(menu, *position)?;
        self.next_id += 1;
        *position += 1;
        Ok(())
    }

    fn release_orphans(self) {
        let Self { menu, orphans, .. } = self;
        for handle in orphans {
            log::debug!("Destroying unattached popup {:?}", handle);
            menu.destroy_popup(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ERROR_GEN_FAILURE;
    use crate::models::IconHandle;
    use crate::system::native_menu::{MenuTree, RenderedNode};

    const TAG: ExtensionTag = ExtensionTag(0xC0DE);
    const COMPOSER_ICON: IconHandle = IconHandle(1);
    const UAC_ICON: IconHandle = IconHandle(2);

    fn target(composer: bool, installed: bool) -> TargetState {
        TargetState {
            invalid: false,
            is_composer_project: composer,
            is_installed: installed,
            directory: "C:\\proj".into(),
        }
    }

    fn prefs() -> DisplayPreferences {
        DisplayPreferences {
            composer_icon: Some(COMPOSER_ICON),
            uac_icon: Some(UAC_ICON),
            ..Default::default()
        }
    }

    fn request(tree: &MenuTree, index: u32, first_id: u32) -> BuildRequest {
        BuildRequest {
            menu: tree.root(),
            index,
            first_id,
            flags: QueryFlags::NORMAL,
        }
    }

    fn run(
        tree: &mut MenuTree,
        prefs: &DisplayPreferences,
        target: &TargetState,
    ) -> (BuildOutcome, DisplayRecord) {
        let mut record = DisplayRecord::new();
        let req = request(tree, 0, 0);
        let outcome = build(tree, &req, prefs, target, TAG, &mut record).unwrap();
        (outcome, record)
    }

    fn texts(nodes: &[RenderedNode]) -> Vec<&str> {
        nodes
            .iter()
            .map(|node| node.text.as_deref().unwrap_or(SEP))
            .collect()
    }

    const SEP: &str = "-";

    /// Titles come from the locale the crate was built with.
    fn title(id: LogicalCommandId) -> &'static str {
        catalog::descriptor(id).unwrap().title
    }

    fn find<'a>(nodes: &'a [RenderedNode], id: LogicalCommandId) -> &'a RenderedNode {
        nodes
            .iter()
            .find(|node| node.text.as_deref() == Some(title(id)))
            .unwrap()
    }

    #[test]
    fn test_plain_folder_offers_init() {
        let mut tree = MenuTree::new();

        let (outcome, record) = run(&mut tree, &prefs(), &target(false, false));

        let rendered = tree.render();
        assert_eq!(
            texts(&rendered),
            [
                SEP,
                title(LogicalCommandId::Init),
                title(LogicalCommandId::ShowOptionsSubmenu),
                title(LogicalCommandId::OpenShellHere),
                SEP
            ]
        );
        assert_eq!(
            texts(&rendered[2].children),
            [
                title(LogicalCommandId::SelfUpdate),
                title(LogicalCommandId::Help),
                SEP,
                title(LogicalCommandId::ToggleRunAsAdmin)
            ]
        );
        // sep, init, self-update, help, sep, runas, options, shell, sep
        assert_eq!(outcome, BuildOutcome::Built { consumed: 9 });
        assert_eq!(record.len(), 6);
        assert!(!record.contains(LogicalCommandId::Install));
    }

    #[test]
    fn test_project_without_install_offers_install_only() {
        let mut tree = MenuTree::new();

        let (_, record) = run(&mut tree, &prefs(), &target(true, false));

        let rendered = tree.render();
        assert_eq!(
            texts(&rendered),
            [
                SEP,
                title(LogicalCommandId::Install),
                title(LogicalCommandId::ShowOptionsSubmenu),
                title(LogicalCommandId::OpenShellHere),
                SEP
            ]
        );
        assert_eq!(
            texts(&rendered[2].children),
            [
                title(LogicalCommandId::InstallPreferDist),
                title(LogicalCommandId::InstallPreferSource),
                SEP,
                title(LogicalCommandId::DumpAutoload),
                title(LogicalCommandId::DumpAutoloadOptimized),
                SEP,
                title(LogicalCommandId::SelfUpdate),
                title(LogicalCommandId::Help),
                SEP,
                title(LogicalCommandId::ToggleRunAsAdmin),
            ]
        );
        assert!(record.contains(LogicalCommandId::Install));
        assert!(!record.contains(LogicalCommandId::Update));
        assert!(!record.contains(LogicalCommandId::UpdatePreferDist));
    }

    #[test]
    fn test_installed_project_offers_update_variants() {
        let mut tree = MenuTree::new();

        let (_, record) = run(&mut tree, &prefs(), &target(true, true));

        let rendered = tree.render();
        assert_eq!(
            texts(&rendered),
            [
                SEP,
                title(LogicalCommandId::Install),
                title(LogicalCommandId::Update),
                title(LogicalCommandId::ShowOptionsSubmenu),
                title(LogicalCommandId::OpenShellHere),
                SEP
            ]
        );
        let options = texts(&rendered[3].children);
        assert!(options.contains(&title(LogicalCommandId::UpdatePreferDist)));
        assert!(options.contains(&title(LogicalCommandId::UpdatePreferSource)));
        assert!(record.contains(LogicalCommandId::Update));
        assert!(record.contains(LogicalCommandId::UpdatePreferSource));
    }

    #[test]
    fn test_admin_without_settings_has_no_trailing_separator() {
        let mut tree = MenuTree::new();
        let prefs = DisplayPreferences {
            is_process_elevated: true,
            ..prefs()
        };

        let (_, record) = run(&mut tree, &prefs, &target(false, false));

        let rendered = tree.render();
        assert_eq!(
            texts(&rendered[2].children),
            [title(LogicalCommandId::SelfUpdate), title(LogicalCommandId::Help)]
        );
        assert!(!record.contains(LogicalCommandId::ToggleRunAsAdmin));
    }

    #[test]
    fn test_admin_with_settings_shows_settings_only() {
        let mut tree = MenuTree::new();
        let prefs = DisplayPreferences {
            is_process_elevated: true,
            settings_command: "C:\\tools\\settings.exe".to_string(),
            ..prefs()
        };

        run(&mut tree, &prefs, &target(false, false));

        let rendered = tree.render();
        assert_eq!(
            texts(&rendered[2].children),
            [
                title(LogicalCommandId::SelfUpdate),
                title(LogicalCommandId::Help),
                SEP,
                title(LogicalCommandId::OpenSettings)
            ]
        );
    }

    #[test]
    fn test_collapsed_menu_wraps_everything_under_one_entry() {
        let mut tree = MenuTree::new();
        tree.push_host_item("Open", 1000);
        tree.push_host_item("Properties", 1001);
        let prefs = DisplayPreferences {
            collapse_into_submenu: true,
            ..prefs()
        };
        let mut record = DisplayRecord::new();
        let req = request(&tree, 1, 0);

        build(&mut tree, &req, &prefs, &target(true, false), TAG, &mut record).unwrap();

        let rendered = tree.render();
        assert_eq!(
            texts(&rendered),
            ["Open", title(LogicalCommandId::ShowRootMenu), "Properties"]
        );
        assert_eq!(rendered[1].icon, Some(COMPOSER_ICON));
        assert_eq!(
            texts(&rendered[1].children),
            [
                title(LogicalCommandId::Install),
                title(LogicalCommandId::ShowOptionsSubmenu),
                title(LogicalCommandId::OpenShellHere)
            ]
        );
        assert_eq!(tree.live_popups(), 2);
        assert_eq!(
            record.entries().last().map(|entry| entry.logical_id),
            Some(LogicalCommandId::ShowRootMenu)
        );
    }

    #[test]
    fn test_elevation_marks_write_entries() {
        let mut tree = MenuTree::new();
        let prefs = DisplayPreferences {
            require_elevation_for_write_ops: true,
            ..prefs()
        };

        run(&mut tree, &prefs, &target(true, true));

        let rendered = tree.render();
        assert_eq!(rendered[1].icon, Some(UAC_ICON));
        assert_eq!(rendered[2].icon, Some(UAC_ICON));
        assert_eq!(rendered[4].icon, None);
        let options = &rendered[3].children;
        assert!(find(options, LogicalCommandId::ToggleRunAsAdmin).checked);
        assert_eq!(find(options, LogicalCommandId::DumpAutoload).icon, None);
    }

    #[test]
    fn test_elevated_process_keeps_uac_icons_but_hides_toggle() {
        let mut tree = MenuTree::new();
        let prefs = DisplayPreferences {
            require_elevation_for_write_ops: true,
            is_process_elevated: true,
            ..prefs()
        };

        let (_, record) = run(&mut tree, &prefs, &target(true, true));

        let rendered = tree.render();
        assert_eq!(find(&rendered, LogicalCommandId::Install).icon, Some(UAC_ICON));
        assert_eq!(find(&rendered, LogicalCommandId::Update).icon, Some(UAC_ICON));
        let options = &rendered[3].children;
        assert_eq!(
            find(options, LogicalCommandId::InstallPreferDist).icon,
            Some(UAC_ICON)
        );
        assert!(!record.contains(LogicalCommandId::ToggleRunAsAdmin));
    }

    #[test]
    fn test_ids_round_trip_with_offset() {
        let mut tree = MenuTree::new();
        let mut record = DisplayRecord::new();
        let req = request(&tree, 0, 5000);

        let outcome =
            build(&mut tree, &req, &prefs(), &target(true, true), TAG, &mut record).unwrap();

        let BuildOutcome::Built { consumed } = outcome else {
            panic!("expected a built menu");
        };
        let mut rendered = Vec::new();
        let mut stack = tree.render();
        while let Some(node) = stack.pop() {
            stack.extend(node.children.iter().cloned());
            rendered.push(node);
        }
        for entry in record.entries() {
            let node = rendered
                .iter()
                .find(|node| node.ui_id == Some(5000 + entry.ui_id))
                .unwrap();
            let title = catalog::descriptor(entry.logical_id).unwrap().title;
            assert_eq!(node.text.as_deref(), Some(title));
            assert_eq!(record.lookup(entry.ui_id), Some(entry.logical_id));
        }
        assert_eq!(record.lookup(consumed), None);
        assert_eq!(record.lookup(5000), None);
    }

    #[test]
    fn test_second_build_is_a_no_op() {
        let mut tree = MenuTree::new();
        run(&mut tree, &prefs(), &target(false, false));
        let count = tree.item_count(tree.root());

        let (outcome, _) = run(&mut tree, &prefs(), &target(false, false));

        assert_eq!(outcome, BuildOutcome::Skipped(SkipReason::AlreadyPopulated));
        assert_eq!(tree.item_count(tree.root()), count);
    }

    #[test]
    fn test_default_only_skips() {
        let mut tree = MenuTree::new();
        let mut record = DisplayRecord::new();
        let req = BuildRequest {
            flags: QueryFlags::DEFAULT_ONLY,
            ..request(&tree, 0, 0)
        };

        let outcome =
            build(&mut tree, &req, &prefs(), &target(false, false), TAG, &mut record).unwrap();

        assert_eq!(outcome, BuildOutcome::Skipped(SkipReason::DefaultOnly));
        assert_eq!(tree.item_count(tree.root()), 0);
    }

    #[test]
    fn test_invalid_target_leaves_menu_empty() {
        let mut tree = MenuTree::new();
        let invalid = TargetState {
            invalid: true,
            ..target(false, false)
        };

        let (outcome, record) = run(&mut tree, &prefs(), &invalid);

        assert_eq!(outcome, BuildOutcome::Skipped(SkipReason::InvalidTarget));
        assert_eq!(tree.item_count(tree.root()), 0);
        assert_eq!(tree.live_popups(), 0);
        assert!(record.is_empty());
    }

    #[test]
    fn test_failed_collapsed_build_frees_nested_popups() {
        let mut tree = MenuTree::new();
        // Everything but the final root entry succeeds.
        tree.fail_after(7);
        let prefs = DisplayPreferences {
            collapse_into_submenu: true,
            ..prefs()
        };
        let mut record = DisplayRecord::new();
        let req = request(&tree, 0, 0);

        let result = build(&mut tree, &req, &prefs, &target(false, false), TAG, &mut record);

        assert!(result.is_err());
        assert_eq!(tree.item_count(tree.root()), 0);
        assert_eq!(tree.live_popups(), 0);
    }

    #[test]
    fn test_failed_insert_keeps_partial_menu_and_frees_popups() {
        let mut tree = MenuTree::new();
        tree.fail_after(3);
        let mut record = DisplayRecord::new();
        let req = request(&tree, 0, 0);

        let err = build(&mut tree, &req, &prefs(), &target(false, false), TAG, &mut record)
            .unwrap_err();

        assert_eq!(err.code(), ERROR_GEN_FAILURE);
        // Leading separator and Init made it into the host menu.
        assert_eq!(texts(&tree.render()), [SEP, title(LogicalCommandId::Init)]);
        assert_eq!(record.lookup(1), Some(LogicalCommandId::Init));
        assert_eq!(tree.live_popups(), 0);
    }
}

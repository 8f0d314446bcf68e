// src/core/catalog.rs

//! The static table of menu entries. Titles and help texts come from the
//! compiled-in locale, the CLI fragments are Composer sub-commands.

use crate::models::{LogicalCommandId, MenuEntryDescriptor};

static CATALOG: [MenuEntryDescriptor; 16] = [
    MenuEntryDescriptor {
        id: LogicalCommandId::ShowRootMenu,
        title: t!("menu.composer.title"),
        help_text: t!("menu.composer.help"),
        cli_fragment: "",
    },
    MenuEntryDescriptor {
        id: LogicalCommandId::ShowOptionsSubmenu,
        title: t!("menu.options.title"),
        help_text: t!("menu.options.help"),
        cli_fragment: "",
    },
    MenuEntryDescriptor {
        id: LogicalCommandId::OpenShellHere,
        title: t!("menu.shell.title"),
        help_text: t!("menu.shell.help"),
        cli_fragment: "",
    },
    MenuEntryDescriptor {
        id: LogicalCommandId::Init,
        title: t!("menu.init.title"),
        help_text: t!("menu.init.help"),
        cli_fragment: "init",
    },
    MenuEntryDescriptor {
        id: LogicalCommandId::Install,
        title: t!("menu.install.title"),
        help_text: t!("menu.install.help"),
        cli_fragment: "install",
    },
    MenuEntryDescriptor {
        id: LogicalCommandId::InstallPreferDist,
        title: t!("menu.install_dist.title"),
        help_text: t!("menu.install_dist.help"),
        cli_fragment: "install --prefer-dist",
    },
    MenuEntryDescriptor {
        id: LogicalCommandId::InstallPreferSource,
        title: t!("menu.install_source.title"),
        help_text: t!("menu.install_source.help"),
        cli_fragment: "install --prefer-source",
    },
    MenuEntryDescriptor {
        id: LogicalCommandId::Update,
        title: t!("menu.update.title"),
        help_text: t!("menu.update.help"),
        cli_fragment: "update",
    },
    MenuEntryDescriptor {
        id: LogicalCommandId::UpdatePreferDist,
        title: t!("menu.update_dist.title"),
        help_text: t!("menu.update_dist.help"),
        cli_fragment: "update --prefer-dist",
    },
    MenuEntryDescriptor {
        id: LogicalCommandId::UpdatePreferSource,
        title: t!("menu.update_source.title"),
        help_text: t!("menu.update_source.help"),
        cli_fragment: "update --prefer-source",
    },
    MenuEntryDescriptor {
        id: LogicalCommandId::DumpAutoload,
        title: t!("menu.dump_autoload.title"),
        help_text: t!("menu.dump_autoload.help"),
        cli_fragment: "dump-autoload",
    },
    MenuEntryDescriptor {
        id: LogicalCommandId::DumpAutoloadOptimized,
        title: t!("menu.dump_autoload_optimize.title"),
        help_text: t!("menu.dump_autoload_optimize.help"),
        cli_fragment: "dump-autoload --optimize",
    },
    MenuEntryDescriptor {
        id: LogicalCommandId::SelfUpdate,
        title: t!("menu.self_update.title"),
        help_text: t!("menu.self_update.help"),
        cli_fragment: "self-update",
    },
    MenuEntryDescriptor {
        id: LogicalCommandId::Help,
        title: t!("menu.help.title"),
        help_text: t!("menu.help.help"),
        cli_fragment: "",
    },
    MenuEntryDescriptor {
        id: LogicalCommandId::ToggleRunAsAdmin,
        title: t!("menu.runas.title"),
        help_text: t!("menu.runas.help"),
        cli_fragment: "",
    },
    MenuEntryDescriptor {
        id: LogicalCommandId::OpenSettings,
        title: t!("menu.settings.title"),
        help_text: t!("menu.settings.help"),
        cli_fragment: "",
    },
];

/// Finds the catalog record for a logical command.
pub fn descriptor(id: LogicalCommandId) -> Option<&'static MenuEntryDescriptor> {
    CATALOG.iter().find(|record| record.id == id)
}

/// All catalog records, in declaration order.
pub fn all() -> &'static [MenuEntryDescriptor] {
    &CATALOG
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_command_has_exactly_one_descriptor() {
        let ids: HashSet<_> = all().iter().map(|record| record.id).collect();
        assert_eq!(ids.len(), all().len());
        for id in LogicalCommandId::ALL {
            assert_eq!(descriptor(id).map(|record| record.id), Some(id));
        }
    }

    #[test]
    fn test_cli_fragments() {
        let fragment = |id| descriptor(id).map(|record| record.cli_fragment);
        assert_eq!(fragment(LogicalCommandId::Init), Some("init"));
        assert_eq!(
            fragment(LogicalCommandId::InstallPreferDist),
            Some("install --prefer-dist")
        );
        assert_eq!(
            fragment(LogicalCommandId::DumpAutoloadOptimized),
            Some("dump-autoload --optimize")
        );
        // The help entry runs plain `composer`.
        assert_eq!(fragment(LogicalCommandId::Help), Some(""));
    }

    #[test]
    fn test_titles_and_help_are_not_empty() {
        for record in all() {
            assert!(!record.title.is_empty(), "{} has no title", record.id);
            assert!(!record.help_text.is_empty(), "{} has no help", record.id);
        }
    }
}

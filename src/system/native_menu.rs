// src/system/native_menu.rs

//! The menu primitives the builder needs from the host, plus `MenuTree`, an
//! in-memory menu used for previews and tests.

use crate::constants::{ERROR_GEN_FAILURE, ERROR_INVALID_MENU_HANDLE};
use crate::models::{ExtensionTag, IconHandle};
use serde::Serialize;
use thiserror::Error;

/// A failed menu primitive, carrying the platform error code.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuError {
    /// `InsertMenuItem` failed.
    #[error("Inserting a menu item failed (error {code}).")]
    Insert {
        /// Platform error code.
        code: u32,
    },
    /// `CreatePopupMenu` failed.
    #[error("Creating a popup menu failed (error {code}).")]
    CreatePopup {
        /// Platform error code.
        code: u32,
    },
    /// The entry is missing from the catalog.
    #[error("Menu entry has no catalog record (error {code}).")]
    UnknownEntry {
        /// Always `ERROR_INVALID_PARAMETER`.
        code: u32,
    },
}

impl MenuError {
    /// The platform error code, passed through to the host unchanged.
    pub fn code(self) -> u32 {
        match self {
            Self::Insert { code } | Self::CreatePopup { code } | Self::UnknownEntry { code } => {
                code
            }
        }
    }
}

/// Opaque handle to a host menu or popup.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MenuHandle(pub usize);

/// Everything the host needs to insert one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItemSpec<'a> {
    /// Absolute host id, `first_id` plus the offset.
    pub ui_id: u32,
    /// Display text.
    pub text: &'a str,
    /// Bitmap shown next to the text.
    pub icon: Option<IconHandle>,
    /// Draw a check mark.
    pub checked: bool,
    /// Popup opened by this entry. Attaching it hands ownership to the parent.
    pub submenu: Option<MenuHandle>,
    /// Marks the entry as ours.
    pub tag: ExtensionTag,
}

/// The host menu operations the builder uses.
pub trait NativeMenu {
    /// Creates an empty, unattached popup.
    fn create_popup(&mut self) -> Result<MenuHandle, MenuError>;
    /// Frees a popup that never got attached to a parent item.
    fn destroy_popup(&mut self, menu: MenuHandle);
    /// Inserts an entry at `position`.
    fn insert_item(
        &mut self,
        menu: MenuHandle,
        position: u32,
        item: &MenuItemSpec<'_>,
    ) -> Result<(), MenuError>;
    /// Inserts a separator at `position`.
    fn insert_separator(&mut self, menu: MenuHandle, position: u32) -> Result<(), MenuError>;
    /// Number of entries in `menu`, separators included.
    fn item_count(&self, menu: MenuHandle) -> u32;
    /// The tag of the entry at `position`, if it has one.
    fn item_tag(&self, menu: MenuHandle, position: u32) -> Option<ExtensionTag>;
}

/// One slot of a `MenuTree` menu.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MenuNode {
    /// A clickable entry.
    Item {
        /// Host id.
        ui_id: u32,
        /// Display text.
        text: String,
        /// Bitmap, if any.
        icon: Option<IconHandle>,
        /// Check mark.
        checked: bool,
        /// Attached popup.
        submenu: Option<MenuHandle>,
        /// `None` for entries the host added.
        tag: Option<ExtensionTag>,
    },
    /// A separator line.
    Separator,
}

/// A rendered, nested view of a `MenuTree`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RenderedNode {
    /// `None` for separators.
    pub text: Option<String>,
    /// `None` for separators.
    pub ui_id: Option<u32>,
    /// Bitmap, if any.
    pub icon: Option<IconHandle>,
    /// Check mark.
    pub checked: bool,
    /// Contents of the attached popup.
    pub children: Vec<RenderedNode>,
}

impl RenderedNode {
    /// True for separator lines.
    pub fn is_separator(&self) -> bool {
        self.text.is_none()
    }
}

/// In-memory menu. Handle 0 is the root; popups get the following slots.
#[derive(Debug, Clone)]
pub struct MenuTree {
    menus: Vec<Option<Vec<MenuNode>>>,
    fail_after: Option<usize>,
    inserts: usize,
}

impl Default for MenuTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MenuTree {
    /// An empty root menu.
    pub fn new() -> Self {
        Self {
            menus: vec![Some(Vec::new())],
            fail_after: None,
            inserts: 0,
        }
    }

    /// Handle of the root menu.
    pub fn root(&self) -> MenuHandle {
        MenuHandle(0)
    }

    /// Adds an entry owned by somebody else, as the host would.
    pub fn push_host_item(&mut self, text: &str, ui_id: u32) {
        if let Some(Some(items)) = self.menus.first_mut() {
            items.push(MenuNode::Item {
                ui_id,
                text: text.to_string(),
                icon: None,
                checked: false,
                submenu: None,
                tag: None,
            });
        }
    }

    /// Makes every insertion after the first `successful` ones fail.
    pub fn fail_after(&mut self, successful: usize) {
        self.fail_after = Some(successful);
    }

    /// The raw slots of `menu`. Unknown or destroyed handles read as empty.
    pub fn items(&self, menu: MenuHandle) -> &[MenuNode] {
        self.menus
            .get(menu.0)
            .and_then(Option::as_ref)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of popups that exist and have not been destroyed, root excluded.
    pub fn live_popups(&self) -> usize {
        self.menus.iter().skip(1).filter(|menu| menu.is_some()).count()
    }

    /// The root menu with every attached popup nested in place.
    pub fn render(&self) -> Vec<RenderedNode> {
        self.render_menu(self.root())
    }

    fn render_menu(&self, menu: MenuHandle) -> Vec<RenderedNode> {
        self.items(menu)
            .iter()
            .map(|node| match node {
                MenuNode::Item {
                    ui_id,
                    text,
                    icon,
                    checked,
                    submenu,
                    ..
                } => RenderedNode {
                    text: Some(text.clone()),
                    ui_id: Some(*ui_id),
                    icon: *icon,
                    checked: *checked,
                    children: submenu.map(|sub| self.render_menu(sub)).unwrap_or_default(),
                },
                MenuNode::Separator => RenderedNode {
                    text: None,
                    ui_id: None,
                    icon: None,
                    checked: false,
                    children: Vec::new(),
                },
            })
            .collect()
    }

    fn insert_node(
        &mut self,
        menu: MenuHandle,
        position: u32,
        node: MenuNode,
    ) -> Result<(), MenuError> {
        if self.fail_after.is_some_and(|limit| self.inserts >= limit) {
            return Err(MenuError::Insert {
                code: ERROR_GEN_FAILURE,
            });
        }
        let items = self
            .menus
            .get_mut(menu.0)
            .and_then(Option::as_mut)
            .ok_or(MenuError::Insert {
                code: ERROR_INVALID_MENU_HANDLE,
            })?;
        // Out-of-range positions append, as the Win32 menu functions do.
        let index = usize::try_from(position)
            .unwrap_or(usize::MAX)
            .min(items.len());
        items.insert(index, node);
        self.inserts += 1;
        Ok(())
    }
}

impl NativeMenu for MenuTree {
    fn create_popup(&mut self) -> Result<MenuHandle, MenuError> {
        self.menus.push(Some(Vec::new()));
        Ok(MenuHandle(self.menus.len() - 1))
    }

    fn destroy_popup(&mut self, menu: MenuHandle) {
        if menu.0 == 0 {
            return;
        }
        // Attached submenus go with their parent.
        let children: Vec<MenuHandle> = self
            .items(menu)
            .iter()
            .filter_map(|node| match node {
                MenuNode::Item { submenu, .. } => *submenu,
                MenuNode::Separator => None,
            })
            .collect();
        if let Some(slot) = self.menus.get_mut(menu.0) {
            *slot = None;
        }
        for child in children {
            self.destroy_popup(child);
        }
    }

    fn insert_item(
        &mut self,
        menu: MenuHandle,
        position: u32,
        item: &MenuItemSpec<'_>,
    ) -> Result<(), MenuError> {
        let node = MenuNode::Item {
            ui_id: item.ui_id,
            text: item.text.to_string(),
            icon: item.icon,
            checked: item.checked,
            submenu: item.submenu,
            tag: Some(item.tag),
        };
        self.insert_node(menu, position, node)
    }

    fn insert_separator(&mut self, menu: MenuHandle, position: u32) -> Result<(), MenuError> {
        self.insert_node(menu, position, MenuNode::Separator)
    }

    fn item_count(&self, menu: MenuHandle) -> u32 {
        u32::try_from(self.items(menu).len()).unwrap_or(u32::MAX)
    }

    fn item_tag(&self, menu: MenuHandle, position: u32) -> Option<ExtensionTag> {
        let index = usize::try_from(position).ok()?;
        match self.items(menu).get(index)? {
            MenuNode::Item { tag, .. } => *tag,
            MenuNode::Separator => None,
        }
    }
}

// src/core/shell_item.rs

//! Turns whatever the host selected into one concrete directory.
//!
//! Shell items are owned values: a parent fetched during resolution is
//! dropped (released) on every exit path, including early error returns.

use std::fmt;
use std::ops::BitOr;
use std::path::PathBuf;
use thiserror::Error;

/// Why a selection yields no target directory.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// Zero or several items.
    #[error("Exactly one item must be selected (found {0}).")]
    NotSingleSelection(usize),
    /// Virtual items such as Control Panel.
    #[error("The selected item is not backed by the filesystem.")]
    NotFilesystemItem,
    /// The file's parent is missing, virtual, or itself a file.
    #[error("The selected file has no usable parent folder.")]
    NoValidParent,
    /// The host could not produce a path for the item.
    #[error("The selected item has no filesystem path.")]
    NoDisplayPath,
    /// Any other failure reported by the host.
    #[error("Shell error: {0}")]
    Shell(String),
}

/// The subset of shell attributes the adapter inspects (`SFGAO_*` values).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemAttributes(pub u32);

impl ItemAttributes {
    /// No attributes.
    pub const NONE: Self = Self(0);
    /// `SFGAO_STREAM`
    pub const STREAM: Self = Self(0x0040_0000);
    /// `SFGAO_FOLDER`
    pub const FOLDER: Self = Self(0x2000_0000);
    /// `SFGAO_FILESYSTEM`
    pub const FILESYSTEM: Self = Self(0x4000_0000);

    /// True when every bit of `other` is set.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// `None` when the item is not a real filesystem entry. Archives can
    /// report both stream and folder; those count as files.
    pub fn classify(self) -> Option<ItemKind> {
        if !self.contains(Self::FILESYSTEM) {
            return None;
        }
        if self.contains(Self::FOLDER) && !self.contains(Self::STREAM) {
            Some(ItemKind::Folder)
        } else {
            Some(ItemKind::File)
        }
    }
}

impl BitOr for ItemAttributes {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// How a filesystem item is treated when picking the target directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// Regular files and archives; the target is the parent.
    File,
    /// The item is the target.
    Folder,
}

/// A host-supplied shell item.
pub trait ShellItem: Sized {
    /// The item's `SFGAO_*` attributes.
    fn attributes(&self) -> Result<ItemAttributes, SelectionError>;
    /// The containing item. Dropping it releases it.
    fn parent(&self) -> Result<Self, SelectionError>;
    /// The item's absolute path.
    fn filesystem_path(&self) -> Result<PathBuf, SelectionError>;
}

/// A host-supplied multi-item selection (a data object in Explorer terms).
pub trait DataSelection {
    /// The items this selection hands out.
    type Item: ShellItem;

    /// Number of selected items.
    fn count(&self) -> Result<usize, SelectionError>;
    /// The item at `index`, owned by the caller.
    fn item_at(&self, index: usize) -> Result<Self::Item, SelectionError>;
}

/// The two ways the host can tell us what was right-clicked.
pub enum Selection<D: DataSelection> {
    /// A folder reference, e.g. the background of an open folder.
    Folder(D::Item),
    /// A selection of items in a view.
    Data(D),
}

impl<D: DataSelection> fmt::Debug for Selection<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Folder(_) => f.write_str("Selection::Folder"),
            Self::Data(_) => f.write_str("Selection::Data"),
        }
    }
}

/// Resolves the selection to the directory the menu should act on.
pub fn resolve_directory<D: DataSelection>(
    selection: &Selection<D>,
) -> Result<PathBuf, SelectionError> {
    match selection {
        Selection::Folder(item) => directory_of(item),
        Selection::Data(data) => {
            let count = data.count()?;
            if count != 1 {
                return Err(SelectionError::NotSingleSelection(count));
            }
            let item = data.item_at(0)?;
            directory_of(&item)
        }
    }
}

fn directory_of<I: ShellItem>(item: &I) -> Result<PathBuf, SelectionError> {
    match classify(item)? {
        ItemKind::Folder => item.filesystem_path(),
        ItemKind::File => {
            let parent = item.parent().map_err(|_| SelectionError::NoValidParent)?;
            match classify(&parent) {
                Ok(ItemKind::Folder) => parent.filesystem_path(),
                Ok(ItemKind::File) | Err(_) => Err(SelectionError::NoValidParent),
            }
        }
    }
}

fn classify<I: ShellItem>(item: &I) -> Result<ItemKind, SelectionError> {
    item.attributes()?
        .classify()
        .ok_or(SelectionError::NotFilesystemItem)
}

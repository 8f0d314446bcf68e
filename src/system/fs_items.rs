// src/system/fs_items.rs

//! Shell items backed by plain paths, for driving the handler outside of
//! Explorer.

use crate::core::shell_item::{DataSelection, ItemAttributes, SelectionError, ShellItem};
use std::fs;
use std::path::{Path, PathBuf};

/// Extensions Explorer browses into as folders while they remain files.
const BROWSABLE_ARCHIVES: &[&str] = &["zip", "cab"];

/// One path, seen as a shell item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsItem {
    path: PathBuf,
}

impl FsItem {
    /// Wraps `path`. It need not exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path as given.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ShellItem for FsItem {
    fn attributes(&self) -> Result<ItemAttributes, SelectionError> {
        let Ok(metadata) = fs::metadata(&self.path) else {
            log::debug!("'{}' does not exist on disk", self.path.display());
            return Ok(ItemAttributes::NONE);
        };

        if metadata.is_dir() {
            return Ok(ItemAttributes::FILESYSTEM | ItemAttributes::FOLDER);
        }

        let attributes = ItemAttributes::FILESYSTEM | ItemAttributes::STREAM;
        let is_archive = self
            .path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                BROWSABLE_ARCHIVES
                    .iter()
                    .any(|archive| ext.eq_ignore_ascii_case(archive))
            });
        if is_archive {
            Ok(attributes | ItemAttributes::FOLDER)
        } else {
            Ok(attributes)
        }
    }

    fn parent(&self) -> Result<Self, SelectionError> {
        let absolute = self.filesystem_path()?;
        absolute
            .parent()
            .map(Self::new)
            .ok_or(SelectionError::NoValidParent)
    }

    fn filesystem_path(&self) -> Result<PathBuf, SelectionError> {
        std::path::absolute(&self.path)
            .map(|path| dunce::simplified(&path).to_path_buf())
            .map_err(|e| SelectionError::Shell(e.to_string()))
    }
}

/// A multi-item selection of paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FsSelection(pub Vec<PathBuf>);

impl DataSelection for FsSelection {
    type Item = FsItem;

    fn count(&self) -> Result<usize, SelectionError> {
        Ok(self.0.len())
    }

    fn item_at(&self, index: usize) -> Result<FsItem, SelectionError> {
        self.0
            .get(index)
            .map(FsItem::new)
            .ok_or_else(|| SelectionError::Shell(format!("No selected item at index {index}")))
    }
}

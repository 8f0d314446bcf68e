// src/system/fs.rs

//! Existence checks behind a trait.

use std::path::Path;

/// The two existence checks the classification logic needs. Absence is an
/// answer, never an error.
pub trait Filesystem: Send + Sync {
    /// True when `path` is an existing regular file.
    fn file_exists(&self, path: &Path) -> bool;
    /// True when `path` is an existing directory.
    fn dir_exists(&self, path: &Path) -> bool;
}

/// Filesystem capability backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdFilesystem;

impl Filesystem for StdFilesystem {
    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn dir_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_std_filesystem_distinguishes_files_and_dirs() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("composer.json");
        fs::write(&file, "{}").unwrap();

        let fs_cap = StdFilesystem;
        assert!(fs_cap.file_exists(&file));
        assert!(!fs_cap.dir_exists(&file));
        assert!(fs_cap.dir_exists(temp.path()));
        assert!(!fs_cap.file_exists(temp.path()));
        assert!(!fs_cap.file_exists(&temp.path().join("missing")));
    }
}

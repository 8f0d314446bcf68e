// src/core/target_resolver.rs

//! Composer project detection for a directory.

use crate::models::TargetState;
use crate::system::fs::Filesystem;
use std::path::{Component, Path, PathBuf};

/// Classifies a directory for the menu builder.
///
/// A directory below a `vendor` tree that Composer manages (the path before
/// the last `vendor` segment holds `vendor/composer`) is invalid and nothing
/// else is checked. Otherwise `composer.json` marks a project, and
/// `vendor/composer/installed.json` marks it as installed.
pub fn resolve_target(directory: &Path, fs: &dyn Filesystem) -> TargetState {
    let mut state = TargetState {
        directory: directory.to_path_buf(),
        ..Default::default()
    };

    if let Some(prefix) = prefix_before_last_vendor(directory) {
        let managed = prefix.join("vendor").join("composer");
        if fs.dir_exists(&managed) {
            log::debug!(
                "'{}' is inside the managed vendor tree '{}'",
                directory.display(),
                managed.display()
            );
            state.invalid = true;
            return state;
        }
    }

    state.is_composer_project = fs.file_exists(&directory.join("composer.json"));

    if state.is_composer_project {
        state.is_installed = fs.file_exists(
            &directory
                .join("vendor")
                .join("composer")
                .join("installed.json"),
        );
    }

    log::debug!(
        "Target '{}': composer={}, installed={}",
        directory.display(),
        state.is_composer_project,
        state.is_installed
    );

    state
}

/// Returns the path up to (not including) the last `vendor` segment, which
/// may be the directory itself.
fn prefix_before_last_vendor(directory: &Path) -> Option<PathBuf> {
    let components: Vec<Component<'_>> = directory.components().collect();
    let position = components
        .iter()
        .rposition(|component| matches!(component, Component::Normal(name) if *name == "vendor"))?;
    Some(components.iter().take(position).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::fs::StdFilesystem;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "{}").unwrap();
    }

    #[test]
    fn test_plain_directory_is_not_a_project() {
        let temp = TempDir::new().unwrap();

        let state = resolve_target(temp.path(), &StdFilesystem);

        assert!(!state.invalid);
        assert!(!state.is_composer_project);
        assert!(!state.is_installed);
        assert_eq!(state.directory, temp.path());
    }

    #[test]
    fn test_project_without_install() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("composer.json"));

        let state = resolve_target(temp.path(), &StdFilesystem);

        assert!(state.is_composer_project);
        assert!(!state.is_installed);
    }

    #[test]
    fn test_installed_project() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("composer.json"));
        touch(&temp.path().join("vendor/composer/installed.json"));

        let state = resolve_target(temp.path(), &StdFilesystem);

        assert!(!state.invalid);
        assert!(state.is_composer_project);
        assert!(state.is_installed);
    }

    #[test]
    fn test_installed_json_without_composer_json_is_ignored() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("vendor/composer/installed.json"));

        let state = resolve_target(temp.path(), &StdFilesystem);

        assert!(!state.is_composer_project);
        assert!(!state.is_installed);
    }

    #[test]
    fn test_package_inside_managed_vendor_tree_is_invalid() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("vendor/composer")).unwrap();
        let package = temp.path().join("vendor/acme/widgets");
        touch(&package.join("composer.json"));

        let state = resolve_target(&package, &StdFilesystem);

        assert!(state.invalid);
        assert!(!state.is_composer_project);
    }

    #[test]
    fn test_vendor_directory_itself_is_invalid_when_managed() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("vendor/composer")).unwrap();

        let state = resolve_target(&temp.path().join("vendor"), &StdFilesystem);

        assert!(state.invalid);
    }

    #[test]
    fn test_unmanaged_vendor_segment_is_still_valid() {
        let temp = TempDir::new().unwrap();
        let package = temp.path().join("vendor/acme");
        touch(&package.join("composer.json"));

        let state = resolve_target(&package, &StdFilesystem);

        assert!(!state.invalid);
        assert!(state.is_composer_project);
    }

    #[test]
    fn test_only_the_last_vendor_segment_counts() {
        let temp = TempDir::new().unwrap();
        // The outer tree is managed, but the inner `vendor` prefix is not.
        fs::create_dir_all(temp.path().join("vendor/composer")).unwrap();
        let inner = temp.path().join("vendor/acme/vendor/tool");
        fs::create_dir_all(&inner).unwrap();

        let state = resolve_target(&inner, &StdFilesystem);

        assert!(!state.invalid);
    }

    #[test]
    fn test_missing_directory_is_tolerated() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("does/not/exist");

        let state = resolve_target(&missing, &StdFilesystem);

        assert!(!state.invalid);
        assert!(!state.is_composer_project);
    }
}

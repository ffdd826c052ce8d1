//! Locating config files on disk.
//!
//! # Target resolution
//!
//! [`resolve_target`] turns the user's starting point into the one file that
//! acts as the local (writable) document:
//!
//! - no path: the current working directory;
//! - an existing file: used as-is;
//! - an existing directory, or a path with no extension: `<path>/.dotconfig`;
//! - anything else: taken literally as the file path.
//!
//! A path already ending in the config file name is never joined twice, even
//! though `.dotconfig` itself has no extension.
//!
//! # Ancestors
//!
//! [`ancestor_files`] walks from the target's parent directory toward the
//! filesystem root and lists the candidate config file in each directory,
//! **nearest first**. Existence is left to the caller.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Default config file name.
pub const FILE_NAME: &str = ".dotconfig";

/// Resolve a starting path (file or directory) into an absolute target file.
pub fn resolve_target(path: Option<&Path>, file_name: &str) -> Result<PathBuf, ConfigError> {
    let start = match path {
        Some(p) => p.to_path_buf(),
        None => std::env::current_dir().map_err(|e| ConfigError::io(".", e))?,
    };
    let start = std::path::absolute(&start).map_err(|e| ConfigError::io(&start, e))?;

    if start.is_file() || start.file_name() == Some(OsStr::new(file_name)) {
        return Ok(start);
    }
    if start.is_dir() || start.extension().is_none() {
        return Ok(start.join(file_name));
    }
    Ok(start)
}

/// Candidate config files in each directory above `target`'s own, nearest
/// first, ending at the filesystem root.
pub fn ancestor_files(target: &Path, file_name: &str) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let Some(mut current) = target.parent().and_then(Path::parent) else {
        return files;
    };

    loop {
        files.push(current.join(file_name));
        match current.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn existing_file_is_used_as_is() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.ini");
        fs::write(&path, "").unwrap();
        assert_eq!(resolve_target(Some(&path), FILE_NAME).unwrap(), path);
    }

    #[test]
    fn directory_gets_file_name_joined() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            resolve_target(Some(dir.path()), FILE_NAME).unwrap(),
            dir.path().join(FILE_NAME)
        );
    }

    #[test]
    fn missing_path_without_extension_is_a_directory() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("not-yet");
        assert_eq!(
            resolve_target(Some(&missing), FILE_NAME).unwrap(),
            missing.join(FILE_NAME)
        );
    }

    #[test]
    fn missing_path_with_extension_is_literal() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("app.conf");
        assert_eq!(resolve_target(Some(&missing), FILE_NAME).unwrap(), missing);
    }

    #[test]
    fn missing_config_file_is_not_joined_twice() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join(FILE_NAME);
        assert_eq!(resolve_target(Some(&missing), FILE_NAME).unwrap(), missing);
    }

    #[test]
    fn no_path_means_cwd() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(resolve_target(None, FILE_NAME).unwrap(), cwd.join(FILE_NAME));
    }

    #[test]
    fn ancestors_are_nearest_first_and_exclude_own_dir() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("a").join("b").join(FILE_NAME);
        let files = ancestor_files(&target, FILE_NAME);

        assert_eq!(files[0], dir.path().join("a").join(FILE_NAME));
        assert_eq!(files[1], dir.path().join(FILE_NAME));
        assert!(!files.contains(&target));
        for pair in files.windows(2) {
            assert!(pair[0].parent().unwrap().starts_with(pair[1].parent().unwrap()));
        }
    }

    #[cfg(unix)]
    #[test]
    fn ancestors_end_at_root() {
        let files = ancestor_files(Path::new("/a/b/.dotconfig"), FILE_NAME);
        assert_eq!(
            files,
            vec![PathBuf::from("/a/.dotconfig"), PathBuf::from("/.dotconfig")]
        );
    }
}

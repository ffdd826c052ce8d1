//! Disk I/O for config documents.
//!
//! Reading treats a missing file as "no content". Writing renders the full
//! document first and hands it to a single `fs::write`, creating parent
//! directories as needed. There is no locking: the last writer wins.

use std::path::Path;

use tracing::debug;

use crate::error::ConfigError;

/// Read a file, returning `None` if it does not exist.
pub fn read_optional(path: &Path) -> Result<Option<String>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ConfigError::io(path, e)),
    }
}

/// Overwrite `path` with `content`, creating parent directories if needed.
pub fn write(path: &Path, content: &str) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
    }

    std::fs::write(path, content).map_err(|e| ConfigError::io(path, e))?;
    debug!(path = %path.display(), bytes = content.len(), "saved config file");
    Ok(())
}

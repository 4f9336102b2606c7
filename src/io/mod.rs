//! File I/O helpers.
//!
//! Maps filesystem failures onto [`IoError`] with the offending path, and
//! creates parent directories on write.

use crate::error::{IoError, Result};
use serde::Serialize;
use std::path::Path;

/// Reads a UTF-8 file into a string.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] if the path does not exist and
/// [`IoError::ReadFailed`] if it cannot be read or is not valid UTF-8.
///
/// # Examples
///
/// ```no_run
/// use supportbot::io::read_file;
///
/// let catalog = read_file("intents.json").unwrap();
/// ```
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path_ref = path.as_ref();
    let path_str = path_ref.to_string_lossy().to_string();

    if !path_ref.exists() {
        return Err(IoError::FileNotFound { path: path_str }.into());
    }

    std::fs::read_to_string(path_ref).map_err(|e| {
        IoError::ReadFailed {
            path: path_str,
            reason: e.to_string(),
        }
        .into()
    })
}

/// Writes content to a file, creating parent directories if needed.
///
/// # Errors
///
/// Returns an error if directory creation or file writing fails.
pub fn write_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    let path_ref = path.as_ref();
    let path_str = path_ref.to_string_lossy().to_string();

    if let Some(parent) = path_ref.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|e| IoError::DirectoryFailed {
            path: parent.to_string_lossy().to_string(),
            reason: e.to_string(),
        })?;
    }

    std::fs::write(path_ref, content).map_err(|e| IoError::WriteFailed {
        path: path_str,
        reason: e.to_string(),
    })?;

    Ok(())
}

/// Serializes `value` as indented JSON and writes it to `path`.
///
/// Non-ASCII text is written as-is, not escaped.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json<P: AsRef<Path>, T: Serialize + ?Sized>(path: P, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| IoError::SerializeFailed {
        path: path.as_ref().to_string_lossy().to_string(),
        reason: e.to_string(),
    })?;
    write_file(path, &json)
}

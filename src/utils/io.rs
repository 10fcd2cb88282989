//! File I/O primitives with consistent error handling.

use crate::error::{Error, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

fn io_error(path: &Path, err: std::io::Error, operation: &str) -> Error {
    if err.kind() == ErrorKind::NotFound {
        return Error::file_not_found(path.display().to_string());
    }
    Error::internal_io(err.to_string(), Some(operation.to_string()))
}

/// Read a source unit as UTF-8 text.
///
/// A missing path maps to `file.not_found` so callers can report it as a
/// per-unit status; every other failure is `internal.io_error`.
pub fn read_file(path: &Path, operation: &str) -> Result<String> {
    fs::read_to_string(path).map_err(|e| io_error(path, e, operation))
}

/// Write content to file atomically (write to a sibling `.tmp`, then rename).
///
/// Readers see either the old content or the new content, never a partial
/// write. The temp file is removed if the rename fails.
pub fn write_file_atomic(path: &Path, content: &str, operation: &str) -> Result<()> {
    let (Some(parent), Some(filename)) = (path.parent(), path.file_name()) else {
        return Err(Error::internal_io(
            format!("Invalid path: {}", path.display()),
            Some(operation.to_string()),
        ));
    };

    let tmp_path = parent.join(format!(".{}.tmp", filename.to_string_lossy()));

    fs::write(&tmp_path, content).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("{} (write temp)", operation)))
    })?;

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(Error::internal_io(
            e.to_string(),
            Some(format!("{} (rename)", operation)),
        ));
    }

    Ok(())
}

//! Atomic file writes.
//!
//! The checklist, the config, and the active-scope record are rewritten
//! whole. Each write goes to `.{filename}.tmp` in the target's directory, is
//! synced, and is then renamed over the target, so a crash mid-write leaves
//! either the old file or the new one, never a torn mix.
//!
//! Source and destination must be on the same filesystem for the rename to
//! be atomic, which holds because the temp file is a sibling of the target.

use crate::error::{Result, TaskgateError};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Atomically write bytes to a file, creating parent directories.
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| TaskgateError::io(parent, e))?;
    }

    let temp_path = temp_path_for(path)?;
    write_and_sync(&temp_path, content)?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        TaskgateError::io(path, e)
    })?;

    // Persist the directory entry as well.
    if let Some(parent) = path.parent()
        && let Ok(dir) = File::open(parent)
    {
        let _ = dir.sync_all();
    }

    Ok(())
}

/// Atomically write a string to a file.
pub fn atomic_write_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    atomic_write(path, content.as_bytes())
}

fn temp_path_for(target: &Path) -> Result<PathBuf> {
    let filename = target.file_name().and_then(|n| n.to_str()).ok_or_else(|| {
        TaskgateError::UserError(format!("invalid file path '{}'", target.display()))
    })?;
    let parent = target.parent().unwrap_or(Path::new("."));
    Ok(parent.join(format!(".{}.tmp", filename)))
}

fn write_and_sync(path: &Path, content: &[u8]) -> Result<()> {
    let result = File::create(path).and_then(|mut file| {
        file.write_all(content)?;
        file.sync_all()
    });
    result.map_err(|e| {
        let _ = fs::remove_file(path);
        TaskgateError::io(path, e)
    })
}

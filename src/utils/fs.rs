//! File system helpers: atomic writes, directory handling and links.
//!
//! Writes go through a temporary file in the target directory followed by a
//! rename, so readers never observe a partially written file. Two writers
//! racing on the same path each use their own temporary file; the last rename
//! wins, which is harmless for content-addressed files with identical bytes.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Create a directory and all of its parents if missing.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    } else if !path.is_dir() {
        return Err(anyhow::anyhow!("Path exists but is not a directory: {}", path.display()));
    }
    Ok(())
}

/// Atomically write bytes to a file using a write-then-rename strategy.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    ensure_dir(parent)?;

    let mut file = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temp file in: {}", parent.display()))?;
    file.write_all(content)
        .with_context(|| format!("Failed to write temp file for: {}", path.display()))?;
    file.as_file().sync_all().context("Failed to sync file to disk")?;

    file.persist(path)
        .with_context(|| format!("Failed to rename temp file to: {}", path.display()))?;
    Ok(())
}

/// Atomically write a string to a file.
pub fn safe_write(path: &Path, content: &str) -> Result<()> {
    atomic_write(path, content.as_bytes())
}

/// Remove a directory tree, succeeding if it does not exist.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to remove directory: {}", path.display())),
    }
}

/// Link `target` at `link`, falling back to copying where symlinks are unavailable.
pub fn link_or_copy(target: &Path, link: &Path) -> Result<()> {
    if let Some(parent) = link.parent() {
        ensure_dir(parent)?;
    }

    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link).with_context(|| {
            format!("Failed to link {} to {}", link.display(), target.display())
        })
    }

    #[cfg(not(unix))]
    {
        if target.is_dir() {
            copy_dir(target, link)
        } else {
            fs::copy(target, link)
                .map(|_| ())
                .with_context(|| format!("Failed to copy {} to {}", target.display(), link.display()))
        }
    }
}

/// Recursively copy a directory.
#[cfg(not(unix))]
fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    ensure_dir(dst)?;
    for entry in
        fs::read_dir(src).with_context(|| format!("Failed to read directory: {}", src.display()))?
    {
        let entry = entry?;
        let dst_path = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &dst_path)?;
        } else {
            fs::copy(entry.path(), &dst_path)?;
        }
    }
    Ok(())
}

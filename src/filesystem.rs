// src/filesystem.rs

//! Filesystem operations used by the reconciler
//!
//! The reconciler only talks to the disk through the [`Filesystem`] trait.
//! [`LocalFs`] is the real implementation; tests may substitute their own.

use crate::cancel::CancelToken;
use crate::error::{Error, Result};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Result of a recursive copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Completed,
    /// The cancel token fired; the destination may be partially written
    Interrupted,
}

/// Chunk size for file copies
const COPY_CHUNK: usize = 256 * 1024;

/// Filesystem primitives needed for reconciliation
pub trait Filesystem {
    /// Whether any entry (including a dangling symlink) exists at `path`
    fn exists(&self, path: &Path) -> bool;

    /// Names of the entries directly under `path`, sorted
    fn list_dir(&self, path: &Path) -> Result<Vec<String>>;

    /// Recursively copy `src` to `dst`, recreating symlinks rather than
    /// following them. `dst` must not exist.
    ///
    /// Returns [`CopyOutcome::Interrupted`] as soon as `cancel` is seen set;
    /// the caller owns cleanup of the partial destination.
    fn copy_tree(&self, src: &Path, dst: &Path, cancel: &CancelToken) -> Result<CopyOutcome>;

    /// Recursively delete `path`, whether it is a directory, file or symlink
    fn delete_tree(&self, path: &Path) -> Result<()>;
}

/// The host filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl Filesystem for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<String>> {
        let entries = fs::read_dir(path).map_err(|e| Error::io("list", path, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::io("list", path, e))?;
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => warn!(
                    "Ignoring non UTF-8 entry {:?} in {}",
                    raw,
                    path.display()
                ),
            }
        }
        names.sort();
        Ok(names)
    }

    fn copy_tree(&self, src: &Path, dst: &Path, cancel: &CancelToken) -> Result<CopyOutcome> {
        copy_tree_observed(src, dst, cancel, &mut |_| {})
    }

    fn delete_tree(&self, path: &Path) -> Result<()> {
        let meta = fs::symlink_metadata(path).map_err(|e| Error::io("stat", path, e))?;
        if meta.is_dir() {
            fs::remove_dir_all(path).map_err(|e| Error::io("delete", path, e))
        } else {
            fs::remove_file(path).map_err(|e| Error::io("delete", path, e))
        }
    }
}

/// Recursive copy behind [`LocalFs::copy_tree`]
///
/// `on_entry` is called with each destination path right after it has been
/// created. Cancellation is polled before every entry and between chunks of
/// a regular file.
pub(crate) fn copy_tree_observed(
    src: &Path,
    dst: &Path,
    cancel: &CancelToken,
    on_entry: &mut dyn FnMut(&Path),
) -> Result<CopyOutcome> {
    if fs::symlink_metadata(dst).is_ok() {
        return Err(Error::io(
            "copy to",
            dst,
            io::Error::new(io::ErrorKind::AlreadyExists, "destination already exists"),
        ));
    }
    if cancel.is_cancelled() {
        return Ok(CopyOutcome::Interrupted);
    }

    let root_meta = fs::symlink_metadata(src).map_err(|e| Error::io("stat", src, e))?;
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io("create", parent, e))?;
    }
    if !root_meta.is_dir() {
        let outcome = copy_entry(src, dst, &root_meta.file_type(), cancel)?;
        if outcome == CopyOutcome::Completed {
            on_entry(dst);
        }
        return Ok(outcome);
    }

    // Directory modes are applied last so read-only directories can be filled
    let mut dir_modes: Vec<(PathBuf, fs::Permissions)> = Vec::new();

    for entry in WalkDir::new(src).follow_links(false) {
        if cancel.is_cancelled() {
            debug!("Copy of {} interrupted", src.display());
            return Ok(CopyOutcome::Interrupted);
        }

        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            Error::io("walk", path, io::Error::from(e))
        })?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| Error::io("walk", entry.path(), io::Error::other(e)))?;
        let target = dst.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir(&target).map_err(|e| Error::io("create", &target, e))?;
            let meta = entry
                .metadata()
                .map_err(|e| Error::io("stat", entry.path(), io::Error::from(e)))?;
            dir_modes.push((target.clone(), meta.permissions()));
        } else if copy_entry(entry.path(), &target, &file_type, cancel)?
            == CopyOutcome::Interrupted
        {
            debug!("Copy of {} interrupted", src.display());
            return Ok(CopyOutcome::Interrupted);
        }
        on_entry(&target);
    }

    for (dir, perms) in dir_modes.into_iter().rev() {
        fs::set_permissions(&dir, perms).map_err(|e| Error::io("chmod", &dir, e))?;
    }

    Ok(CopyOutcome::Completed)
}

/// Copy a single non-directory entry, recreating symlinks as symlinks
fn copy_entry(
    src: &Path,
    dst: &Path,
    file_type: &fs::FileType,
    cancel: &CancelToken,
) -> Result<CopyOutcome> {
    if file_type.is_symlink() {
        let target = fs::read_link(src).map_err(|e| Error::io("read link", src, e))?;
        make_symlink(&target, dst)?;
        Ok(CopyOutcome::Completed)
    } else {
        copy_file(src, dst, cancel)
    }
}

/// Copy file contents in chunks, then apply the source permissions
fn copy_file(src: &Path, dst: &Path, cancel: &CancelToken) -> Result<CopyOutcome> {
    let mut reader = File::open(src).map_err(|e| Error::io("open", src, e))?;
    let perms = reader
        .metadata()
        .map_err(|e| Error::io("stat", src, e))?
        .permissions();
    let mut writer = File::create_new(dst).map_err(|e| Error::io("create", dst, e))?;

    let mut buf = vec![0u8; COPY_CHUNK];
    loop {
        if cancel.is_cancelled() {
            return Ok(CopyOutcome::Interrupted);
        }
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::io("read", src, e)),
        };
        writer
            .write_all(&buf[..n])
            .map_err(|e| Error::io("write", dst, e))?;
    }

    fs::set_permissions(dst, perms).map_err(|e| Error::io("chmod", dst, e))?;
    Ok(CopyOutcome::Completed)
}

#[cfg(unix)]
fn make_symlink(target: &Path, link: &Path) -> Result<()> {
    std::os::unix::fs::symlink(target, link).map_err(|e| Error::io("symlink", link, e))
}

#[cfg(not(unix))]
fn make_symlink(_target: &Path, link: &Path) -> Result<()> {
    Err(Error::io(
        "symlink",
        link,
        io::Error::new(
            io::ErrorKind::Unsupported,
            "Symlinks not supported on this platform",
        ),
    ))
}

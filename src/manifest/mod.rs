// src/manifest/mod.rs

//! Steam library manifest (`libraryfolders.vdf`)
//!
//! The manifest lists library folders under consecutive numeric keys:
//!
//! ```text
//! "libraryfolders" { "0" { "path" "..." "apps" { "<appid>" "<size>" } } "1" { ... } }
//! ```
//!
//! This module converts the raw KeyValues tree into typed [`LibraryEntry`]
//! values once, up front, so the reconciler never inspects untyped data.

pub mod discover;
pub mod kv;

pub use discover::{discover_manifest, expand_path, MANIFEST_CANDIDATES};
pub use kv::{KvObject, KvValue};

use crate::error::{Error, Result};
use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Top-level key holding the numbered library entries
pub const LIBRARY_FOLDERS_KEY: &str = "libraryfolders";

/// Upper bound on library entries read from a manifest
pub const MAX_LIBRARIES: usize = 100;

/// Directory under a library root that holds per-app compatdata folders
pub const COMPATDATA_SUBDIR: &str = "steamapps/compatdata";

/// A Steam application identifier
///
/// Opaque: compared by exact string match only.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AppId(String);

impl AppId {
    /// The reserved compatdata folder that is never deleted or moved
    pub const RESERVED: &'static str = "0";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_reserved(&self) -> bool {
        self.0 == Self::RESERVED
    }
}

impl Borrow<str> for AppId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for AppId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// One library folder declared in the manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryEntry {
    install_path: PathBuf,
    declared_apps: BTreeSet<AppId>,
}

impl LibraryEntry {
    pub fn new(install_path: impl Into<PathBuf>, declared_apps: BTreeSet<AppId>) -> Self {
        Self {
            install_path: install_path.into(),
            declared_apps,
        }
    }

    pub fn install_path(&self) -> &Path {
        &self.install_path
    }

    pub fn declared_apps(&self) -> &BTreeSet<AppId> {
        &self.declared_apps
    }

    pub fn declares(&self, app: &str) -> bool {
        self.declared_apps.contains(app)
    }

    /// `<install path>/steamapps/compatdata`
    pub fn compatdata_path(&self) -> PathBuf {
        self.install_path.join(COMPATDATA_SUBDIR)
    }

    /// Where the compatdata folder for `app` is expected to live
    pub fn expected_home(&self, app: &AppId) -> PathBuf {
        self.compatdata_path().join(app.as_str())
    }

    fn from_kv(index: usize, obj: &KvObject) -> Result<Self> {
        let install_path = obj
            .get("path")
            .and_then(KvValue::as_str)
            .ok_or_else(|| Error::structure(format!("library {} has no \"path\" string", index)))?;

        let apps = obj
            .get("apps")
            .and_then(KvValue::as_obj)
            .ok_or_else(|| Error::structure(format!("library {} has no \"apps\" mapping", index)))?;

        Ok(Self::new(install_path, apps.keys().map(AppId::from).collect()))
    }
}

/// A parsed library manifest
#[derive(Debug, Clone)]
pub struct Manifest {
    root: KvObject,
}

impl Manifest {
    /// Read and parse a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::io("read", path, e))?;
        let manifest = Self::parse(&text)?;
        debug!("Successfully parsed library manifest {}", path.display());
        Ok(manifest)
    }

    /// Parse manifest text
    pub fn parse(text: &str) -> Result<Self> {
        Ok(Self::from_root(kv::parse(text)?))
    }

    pub fn from_root(root: KvObject) -> Self {
        Self { root }
    }

    /// Iterate the numbered library entries
    ///
    /// Each call returns a fresh iterator starting from entry `"0"`.
    pub fn libraries(&self) -> Result<Libraries<'_>> {
        let folders = self
            .root
            .get(LIBRARY_FOLDERS_KEY)
            .and_then(KvValue::as_obj)
            .ok_or_else(|| {
                Error::structure(format!("missing top-level \"{}\" mapping", LIBRARY_FOLDERS_KEY))
            })?;

        Ok(Libraries {
            folders,
            next: 0,
            done: false,
        })
    }

    /// Read every library entry, failing on the first malformed one
    pub fn library_entries(&self) -> Result<Vec<LibraryEntry>> {
        self.libraries()?.collect()
    }
}

/// Iterator over the library entries of a [`Manifest`]
///
/// Stops at the first missing or non-mapping key, or after
/// [`MAX_LIBRARIES`] entries.
pub struct Libraries<'a> {
    folders: &'a KvObject,
    next: usize,
    done: bool,
}

impl Iterator for Libraries<'_> {
    type Item = Result<LibraryEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.next >= MAX_LIBRARIES {
            return None;
        }

        let index = self.next;
        let Some(obj) = self.folders.get(&index.to_string()).and_then(KvValue::as_obj) else {
            self.done = true;
            return None;
        };
        self.next += 1;

        let entry = LibraryEntry::from_kv(index, obj);
        if entry.is_err() {
            self.done = true;
        }
        Some(entry)
    }
}

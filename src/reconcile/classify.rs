// src/reconcile/classify.rs

//! Read phase: cross-reference declared apps against compatdata folders
//!
//! Produces two maps from a single pass over every library:
//! - [`MissingHomes`]: declared apps whose compatdata folder is absent
//! - [`OrphanIndex`]: compatdata folders not declared by their library
//!
//! Nothing here mutates the filesystem.

use crate::error::Result;
use crate::filesystem::Filesystem;
use crate::manifest::{AppId, LibraryEntry};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Declared apps whose expected compatdata folder does not exist
///
/// When several libraries are missing the same app, the library processed
/// last provides the home.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissingHomes {
    homes: BTreeMap<AppId, PathBuf>,
}

impl MissingHomes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the expected home for `app`, replacing any earlier one
    pub fn insert(&mut self, app: AppId, home: PathBuf) {
        if let Some(previous) = self.homes.get(&app) {
            debug!(
                "App {} is missing in several libraries; home {} replaces {}",
                app,
                home.display(),
                previous.display()
            );
        }
        self.homes.insert(app, home);
    }

    pub fn get(&self, app: &str) -> Option<&Path> {
        self.homes.get(app).map(PathBuf::as_path)
    }

    pub fn contains(&self, app: &str) -> bool {
        self.homes.contains_key(app)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AppId, &Path)> {
        self.homes.iter().map(|(app, home)| (app, home.as_path()))
    }

    pub fn len(&self) -> usize {
        self.homes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.homes.is_empty()
    }
}

/// Undeclared compatdata folders, grouped by folder name
///
/// Folders accumulate across libraries; a set is never cleared once
/// populated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrphanIndex {
    orphans: BTreeMap<AppId, BTreeSet<PathBuf>>,
}

impl OrphanIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `path` to the orphan set for `app`, creating the set if needed
    pub fn add_orphan(&mut self, app: AppId, path: PathBuf) {
        self.orphans.entry(app).or_default().insert(path);
    }

    pub fn get(&self, app: &str) -> Option<&BTreeSet<PathBuf>> {
        self.orphans.get(app)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AppId, &BTreeSet<PathBuf>)> {
        self.orphans.iter()
    }

    /// Number of distinct app ids with orphaned folders
    pub fn len(&self) -> usize {
        self.orphans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orphans.is_empty()
    }

    /// Total number of orphaned folders across all app ids
    pub fn folder_count(&self) -> usize {
        self.orphans.values().map(BTreeSet::len).sum()
    }
}

/// Result of the read phase
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub missing_homes: MissingHomes,
    pub orphans: OrphanIndex,
}

/// Scan every library's compatdata directory
///
/// A library whose compatdata directory cannot be listed aborts the scan.
pub fn classify_libraries<F>(libraries: &[LibraryEntry], fs: &F) -> Result<Classification>
where
    F: Filesystem + ?Sized,
{
    let mut result = Classification::default();

    for library in libraries {
        let compatdata = library.compatdata_path();
        debug!(
            "Found library at {} with {} app(s)",
            library.install_path().display(),
            library.declared_apps().len()
        );

        for app in library.declared_apps() {
            let expected = library.expected_home(app);
            if !fs.exists(&expected) {
                result.missing_homes.insert(app.clone(), expected);
            }
        }

        for name in fs.list_dir(&compatdata)? {
            if !library.declares(&name) {
                let path = compatdata.join(&name);
                result.orphans.add_orphan(AppId::new(name), path);
            }
        }
    }

    debug!(
        "Found {} app(s) missing compatdata and {} orphaned compatdata folder(s)",
        result.missing_homes.len(),
        result.orphans.folder_count()
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::filesystem::LocalFs;
    use std::fs;
    use tempfile::TempDir;

    fn library(root: &Path, apps: &[&str], on_disk: &[&str]) -> LibraryEntry {
        let compatdata = root.join("steamapps/compatdata");
        fs::create_dir_all(&compatdata).unwrap();
        for name in on_disk {
            fs::create_dir_all(compatdata.join(name)).unwrap();
        }
        LibraryEntry::new(root, apps.iter().map(|a| AppId::from(*a)).collect())
    }

    #[test]
    fn test_add_orphan_accumulates() {
        let mut index = OrphanIndex::new();
        index.add_orphan(AppId::from("7"), PathBuf::from("/a/7"));
        index.add_orphan(AppId::from("7"), PathBuf::from("/b/7"));
        index.add_orphan(AppId::from("7"), PathBuf::from("/a/7"));
        index.add_orphan(AppId::from("8"), PathBuf::from("/a/8"));

        assert_eq!(index.len(), 2);
        assert_eq!(index.get("7").unwrap().len(), 2);
        assert_eq!(index.folder_count(), 3);
    }

    #[test]
    fn test_missing_homes_last_write_wins() {
        let mut homes = MissingHomes::new();
        homes.insert(AppId::from("7"), PathBuf::from("/a/7"));
        homes.insert(AppId::from("7"), PathBuf::from("/b/7"));
        assert_eq!(homes.len(), 1);
        assert_eq!(homes.get("7"), Some(Path::new("/b/7")));
    }

    #[test]
    fn test_classify_missing_and_orphans() {
        let temp = TempDir::new().unwrap();
        let lib_a = library(&temp.path().join("a"), &["10", "11"], &["10", "12"]);
        let lib_b = library(&temp.path().join("b"), &["12"], &["11", "0"]);

        let result = classify_libraries(&[lib_a.clone(), lib_b.clone()], &LocalFs).unwrap();

        // "11" declared in a but absent there; "12" declared in b but absent there
        assert_eq!(result.missing_homes.len(), 2);
        assert_eq!(
            result.missing_homes.get("11"),
            Some(lib_a.expected_home(&AppId::from("11")).as_path())
        );
        assert_eq!(
            result.missing_homes.get("12"),
            Some(lib_b.expected_home(&AppId::from("12")).as_path())
        );
        assert!(!result.missing_homes.contains("10"));

        let orphan_names: Vec<&str> = result.orphans.iter().map(|(a, _)| a.as_str()).collect();
        assert_eq!(orphan_names, vec!["0", "11", "12"]);
        assert_eq!(
            result.orphans.get("12").unwrap().iter().next().unwrap(),
            &lib_a.compatdata_path().join("12")
        );
    }

    #[test]
    fn test_declared_folder_is_never_orphan_in_own_library() {
        let temp = TempDir::new().unwrap();
        let lib = library(temp.path(), &["5", "6"], &["5", "6"]);

        let result = classify_libraries(&[lib], &LocalFs).unwrap();
        assert!(result.orphans.is_empty());
        assert!(result.missing_homes.is_empty());
    }

    #[test]
    fn test_orphans_accumulate_across_libraries() {
        let temp = TempDir::new().unwrap();
        let lib_a = library(&temp.path().join("a"), &[], &["9"]);
        let lib_b = library(&temp.path().join("b"), &[], &["9"]);
        let lib_c = library(&temp.path().join("c"), &["9"], &[]);

        let result = classify_libraries(&[lib_a, lib_b, lib_c], &LocalFs).unwrap();
        assert_eq!(result.orphans.get("9").unwrap().len(), 2);
        assert!(result.missing_homes.contains("9"));
    }

    #[test]
    fn test_classification_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let libs = vec![
            library(&temp.path().join("a"), &["1", "2"], &["1", "3"]),
            library(&temp.path().join("b"), &["3"], &["2"]),
        ];

        let first = classify_libraries(&libs, &LocalFs).unwrap();
        let second = classify_libraries(&libs, &LocalFs).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_compatdata_dir_is_fatal() {
        let temp = TempDir::new().unwrap();
        let lib = LibraryEntry::new(temp.path().join("nowhere"), Default::default());

        let err = classify_libraries(&[lib], &LocalFs).unwrap_err();
        assert!(matches!(err, Error::Io { op: "list", .. }));
    }
}

// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use compatfix::{CancelToken, CopyOutcome, Filesystem, LocalFs, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A fake Steam installation with one or more library folders.
///
/// Keep the fixture alive for the duration of the test; dropping it removes
/// everything.
pub struct SteamFixture {
    pub temp: TempDir,
    libraries: Vec<(PathBuf, Vec<String>)>,
}

impl SteamFixture {
    pub fn new() -> Self {
        Self {
            temp: tempfile::tempdir().unwrap(),
            libraries: Vec::new(),
        }
    }

    /// Add a library declaring `apps`; returns its index
    pub fn library(&mut self, name: &str, apps: &[&str]) -> usize {
        let root = self.temp.path().join(name);
        fs::create_dir_all(root.join("steamapps/compatdata")).unwrap();
        self.libraries
            .push((root, apps.iter().map(|a| a.to_string()).collect()));
        self.libraries.len() - 1
    }

    pub fn root(&self, library: usize) -> &Path {
        &self.libraries[library].0
    }

    pub fn compatdata(&self, library: usize, app: &str) -> PathBuf {
        self.root(library).join("steamapps/compatdata").join(app)
    }

    /// Create a compatdata folder with a small Proton prefix inside
    pub fn prefix(&self, library: usize, app: &str) -> PathBuf {
        let dir = self.compatdata(library, app);
        fs::create_dir_all(dir.join("pfx/drive_c/users/steamuser")).unwrap();
        fs::write(dir.join("version"), format!("proton for {app}\n")).unwrap();
        fs::write(dir.join("pfx/drive_c/users/steamuser/save.dat"), app).unwrap();
        std::os::unix::fs::symlink("drive_c", dir.join("pfx/dosdevices_c")).unwrap();
        dir
    }

    /// Write `libraryfolders.vdf` and return its path
    pub fn write_manifest(&self) -> PathBuf {
        let mut text = String::from("\"libraryfolders\"\n{\n");
        for (i, (root, apps)) in self.libraries.iter().enumerate() {
            text.push_str(&format!("\t\"{}\"\n\t{{\n", i));
            text.push_str(&format!("\t\t\"path\"\t\t\"{}\"\n", root.display()));
            text.push_str("\t\t\"label\"\t\t\"\"\n");
            text.push_str("\t\t\"apps\"\n\t\t{\n");
            for app in apps {
                text.push_str(&format!("\t\t\t\"{}\"\t\t\"1024\"\n", app));
            }
            text.push_str("\t\t}\n\t}\n");
        }
        text.push_str("}\n");

        let path = self.temp.path().join("libraryfolders.vdf");
        fs::write(&path, text).unwrap();
        path
    }
}

/// Completes the copy, then reports an interrupt as if SIGINT arrived
/// just before the copy returned.
pub struct InterruptingFs {
    pub token: CancelToken,
}

impl Filesystem for InterruptingFs {
    fn exists(&self, path: &Path) -> bool {
        LocalFs.exists(path)
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<String>> {
        LocalFs.list_dir(path)
    }

    fn copy_tree(&self, src: &Path, dst: &Path, _cancel: &CancelToken) -> Result<CopyOutcome> {
        LocalFs.copy_tree(src, dst, &CancelToken::new())?;
        self.token.cancel();
        Ok(CopyOutcome::Interrupted)
    }

    fn delete_tree(&self, path: &Path) -> Result<()> {
        LocalFs.delete_tree(path)
    }
}

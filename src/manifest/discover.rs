// src/manifest/discover.rs

//! Locating the library manifest on disk
//!
//! Candidates are written with `~` and `$VAR` / `${VAR}` placeholders and
//! expanded at discovery time. A candidate referencing an unset variable
//! (or `~` without a resolvable home directory) is skipped.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Known locations of `libraryfolders.vdf`, checked in order
pub const MANIFEST_CANDIDATES: &[&str] = &[
    "~/.steam/steam/steamapps/libraryfolders.vdf",
    "${XDG_DATA_HOME}/Steam/steamapps/libraryfolders.vdf",
    "~/.local/share/Steam/steamapps/libraryfolders.vdf",
    "~/.var/app/com.valvesoftware.Steam/.local/share/Steam/steamapps/libraryfolders.vdf",
];

/// Find the first existing manifest among the default candidates
pub fn discover_manifest() -> Result<PathBuf> {
    discover_in(MANIFEST_CANDIDATES, dirs::home_dir().as_deref(), |name| {
        std::env::var(name).ok()
    })
}

/// Find the first existing manifest among `candidates`
///
/// `home` and `lookup_var` supply the values used for expansion.
pub fn discover_in<F>(candidates: &[&str], home: Option<&Path>, lookup_var: F) -> Result<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    let mut checked = Vec::new();

    for candidate in candidates {
        let Some(path) = expand_path(candidate, home, &lookup_var) else {
            debug!("Skipping manifest candidate {} (unresolved variable)", candidate);
            continue;
        };
        if path.exists() {
            debug!("Found library manifest at {}", path.display());
            return Ok(path);
        }
        checked.push(path);
    }

    Err(Error::ManifestNotFound { candidates: checked })
}

/// Expand a leading `~` and any `$VAR` / `${VAR}` references
///
/// Returns `None` when a referenced variable (or the home directory) is
/// unavailable or empty.
pub fn expand_path<F>(raw: &str, home: Option<&Path>, lookup_var: F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    let rest = match raw.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => {
            let home = home?.to_str()?;
            format!("{}{}", home, rest)
        }
        _ => raw.to_string(),
    };

    let mut out = String::with_capacity(rest.len());
    let mut chars = rest.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }

        let name: String = if chars.peek() == Some(&'{') {
            chars.next();
            let mut name = String::new();
            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(c) => name.push(c),
                    // Unterminated `${`: keep it literally
                    None => {
                        out.push_str("${");
                        out.push_str(&name);
                        return Some(PathBuf::from(out));
                    }
                }
            }
            name
        } else {
            let mut name = String::new();
            while let Some(&c) = chars.peek() {
                if !(c.is_ascii_alphanumeric() || c == '_') {
                    break;
                }
                name.push(c);
                chars.next();
            }
            name
        };

        if name.is_empty() {
            out.push('$');
            continue;
        }
        let value = lookup_var(&name).filter(|v| !v.is_empty())?;
        out.push_str(&value);
    }

    Some(PathBuf::from(out))
}

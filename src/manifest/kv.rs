// src/manifest/kv.rs

//! KeyValues (VDF) documents
//!
//! Steam stores its library manifest in Valve's KeyValues text format:
//!
//! ```text
//! "libraryfolders"
//! {
//!     "0"
//!     {
//!         "path"    "/home/user/.local/share/Steam"
//!         "apps"
//!         {
//!             "228980"    "412097523"
//!         }
//!     }
//! }
//! ```
//!
//! Parsing is done by `keyvalues-parser`; the borrowed tree it returns is
//! converted into an owned [`KvObject`]. Duplicate keys keep the last value.

use crate::error::{Error, Result};
use keyvalues_parser::{Obj, Value, Vdf};
use std::collections::BTreeMap;

/// A value in a KeyValues document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KvValue {
    Str(String),
    Obj(KvObject),
}

impl KvValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            KvValue::Str(s) => Some(s),
            KvValue::Obj(_) => None,
        }
    }

    pub fn as_obj(&self) -> Option<&KvObject> {
        match self {
            KvValue::Obj(o) => Some(o),
            KvValue::Str(_) => None,
        }
    }
}

/// A string-keyed mapping of KeyValues entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KvObject {
    entries: BTreeMap<String, KvValue>,
}

impl KvObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&KvValue> {
        self.entries.get(key)
    }

    /// Insert an entry, replacing any previous value under the same key
    pub fn insert(&mut self, key: impl Into<String>, value: KvValue) {
        self.entries.insert(key.into(), value);
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// Parse a KeyValues document into an object holding its root pair
pub fn parse(text: &str) -> Result<KvObject> {
    let vdf = Vdf::parse(text).map_err(|e| Error::Parse(e.to_string()))?;

    let mut root = KvObject::new();
    root.insert(vdf.key.into_owned(), convert(&vdf.value));
    Ok(root)
}

fn convert(value: &Value<'_>) -> KvValue {
    match value {
        Value::Str(s) => KvValue::Str(s.to_string()),
        Value::Obj(obj) => KvValue::Obj(convert_obj(obj)),
    }
}

fn convert_obj(obj: &Obj<'_>) -> KvObject {
    let mut out = KvObject::new();
    for (key, values) in obj.iter() {
        if let Some(last) = values.last() {
            out.insert(key.to_string(), convert(last));
        }
    }
    out
}

//! Loot document persistence.
//!
//! The document lives at `<data dir>/loot.json` as `{"loot": [ ... ]}`.
//! Records are addressed by position only. Every mutation reads the whole
//! document, changes the record list and writes it back through a temp file.
//! Records that are not touched keep their keys, unknown ones included, in
//! their original order.
//!
//! There is no locking: two editors saving at once can lose an update.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use crate::entry::LootEntry;
use crate::error::LootError;

pub const LOOT_FILE: &str = "loot.json";

const DEFAULT_LOOT_JSON: &str = include_str!("../resources/loot.json");

type Record = Map<String, Value>;

/// Reads and rewrites the loot document. Holds no cached state.
#[derive(Debug, Clone)]
pub struct LootStore {
    path: PathBuf,
}

impl LootStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(LOOT_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the data folder and the bundled default document if missing.
    pub fn ensure_exists(&self) -> bool {
        if self.path.exists() {
            return true;
        }
        match self.write_text(DEFAULT_LOOT_JSON) {
            Ok(()) => {
                info!("Created default {}", self.path.display());
                true
            }
            Err(e) => {
                error!("Failed to create default loot file: {e}");
                false
            }
        }
    }

    /// All records, parsed fresh. Non-object records are skipped.
    pub fn all_entries(&self) -> Vec<LootEntry> {
        if !self.path.exists() {
            return Vec::new();
        }
        match self.read_document() {
            Ok(document) => records(&document).map(LootEntry::from_record).collect(),
            Err(e) => {
                warn!("Failed to load loot entries: {e}");
                Vec::new()
            }
        }
    }

    pub fn entry(&self, index: usize) -> Option<LootEntry> {
        self.all_entries().into_iter().nth(index)
    }

    /// Replace the record at `index` with the known-key rendering of `entry`.
    /// An out-of-range index changes nothing but still rewrites and succeeds.
    pub fn update_entry(&self, index: usize, entry: &LootEntry) -> bool {
        self.rewrite("update loot entry", |records| {
            if let Some(record) = records.get_mut(index) {
                *record = entry.to_record();
            }
        })
    }

    /// Remove the record at `index`; later records shift down by one.
    pub fn delete_entry(&self, index: usize) -> bool {
        self.rewrite("delete loot entry", |records| {
            if index < records.len() {
                records.remove(index);
            }
        })
    }

    /// Append [`LootEntry::new_default`].
    pub fn add_default_entry(&self) -> bool {
        self.rewrite("add loot entry", |records| {
            records.push(LootEntry::new_default().to_record());
        })
    }

    /// Stable sort by chance, highest first. Every record is rewritten with
    /// known keys only.
    pub fn sort_by_chance_descending(&self) -> bool {
        self.rewrite("sort loot entries", |records| {
            let mut entries: Vec<LootEntry> = records.iter().map(LootEntry::from_record).collect();
            entries.sort_by(|a, b| b.chance.total_cmp(&a.chance));
            *records = entries.iter().map(LootEntry::to_record).collect();
        })
    }

    fn rewrite(&self, action: &str, change: impl FnOnce(&mut Vec<Record>)) -> bool {
        match self.try_rewrite(change) {
            Ok(count) => {
                debug!("{action}: {count} record(s) written to {}", self.path.display());
                true
            }
            Err(e) => {
                error!("Failed to {action}: {e}");
                false
            }
        }
    }

    fn try_rewrite(&self, change: impl FnOnce(&mut Vec<Record>)) -> Result<usize, LootError> {
        let mut document = if self.path.exists() {
            self.read_document()?
        } else {
            Map::new()
        };

        let mut list: Vec<Record> = records(&document).cloned().collect();
        change(&mut list);
        let count = list.len();

        document.insert(
            "loot".into(),
            Value::Array(list.into_iter().map(Value::Object).collect()),
        );
        self.write_document(&document)?;
        Ok(count)
    }

    /// Parse the document. A blank file reads as an empty document.
    pub(crate) fn read_document(&self) -> Result<Record, LootError> {
        let text = fs::read_to_string(&self.path).map_err(|source| LootError::Io {
            path: self.path.clone(),
            source,
        })?;
        if text.trim().is_empty() {
            return Ok(Map::new());
        }
        let value: Value = serde_json::from_str(&text).map_err(|source| LootError::Json {
            path: self.path.clone(),
            source,
        })?;
        match value {
            Value::Object(map) => Ok(map),
            _ => Err(LootError::NotAnObject(self.path.clone())),
        }
    }

    fn write_document(&self, document: &Record) -> Result<(), LootError> {
        let mut text = serde_json::to_string_pretty(document).map_err(|source| LootError::Json {
            path: self.path.clone(),
            source,
        })?;
        text.push('\n');
        self.write_text(&text)
    }

    fn write_text(&self, text: &str) -> Result<(), LootError> {
        let io_err = |source| LootError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(io_err)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, text).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

/// Object records of the `loot` list, in order.
fn records(document: &Record) -> impl Iterator<Item = &Record> {
    document
        .get("loot")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

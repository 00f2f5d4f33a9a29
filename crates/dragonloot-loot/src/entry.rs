//! The persisted loot record, as the editor sees it.

use serde_json::{Map, Value};

/// One record of the loot document, with defaults filled in.
///
/// `amount` stays free text (`"3"` or `"1-5"`) and `material` is not
/// validated here; both are checked when the loot table loads.
#[derive(Debug, Clone, PartialEq)]
pub struct LootEntry {
    pub material: String,
    pub amount: String,
    pub chance: f64,
    /// `&` markup; empty when unset.
    pub custom_name: String,
    pub lore: Vec<String>,
    /// `NAME:LEVEL` tokens.
    pub enchantments: Vec<String>,
}

impl Default for LootEntry {
    fn default() -> Self {
        Self {
            material: "DIAMOND".into(),
            amount: "1".into(),
            chance: 100.0,
            custom_name: String::new(),
            lore: Vec::new(),
            enchantments: Vec::new(),
        }
    }
}

impl LootEntry {
    /// The entry appended by the editor's Add button.
    pub fn new_default() -> Self {
        Self {
            custom_name: "&bNew Loot Item".into(),
            lore: vec!["&7Edit this item".into()],
            ..Self::default()
        }
    }

    /// Read a record, falling back to defaults for missing or mistyped keys.
    pub fn from_record(record: &Map<String, Value>) -> Self {
        let defaults = Self::default();
        Self {
            material: record
                .get("material")
                .and_then(scalar_text)
                .unwrap_or(defaults.material),
            amount: record
                .get("amount")
                .and_then(scalar_text)
                .unwrap_or(defaults.amount),
            chance: record
                .get("chance")
                .and_then(number)
                .unwrap_or(defaults.chance),
            custom_name: record
                .get("name")
                .and_then(scalar_text)
                .unwrap_or(defaults.custom_name),
            lore: record.get("lore").map(text_list).unwrap_or_default(),
            enchantments: record
                .get("enchantments")
                .map(text_list)
                .unwrap_or_default(),
        }
    }

    /// Render as a record with the known keys only. `name`, `lore` and
    /// `enchantments` are written only when non-empty.
    pub fn to_record(&self) -> Map<String, Value> {
        let mut record = Map::new();
        record.insert("material".into(), Value::from(self.material.as_str()));
        record.insert("amount".into(), Value::from(self.amount.as_str()));
        record.insert("chance".into(), Value::from(self.chance));
        if !self.custom_name.is_empty() {
            record.insert("name".into(), Value::from(self.custom_name.as_str()));
        }
        if !self.lore.is_empty() {
            record.insert("lore".into(), Value::from(self.lore.clone()));
        }
        if !self.enchantments.is_empty() {
            record.insert("enchantments".into(), Value::from(self.enchantments.clone()));
        }
        record
    }
}

/// Strings as-is; numbers and booleans rendered as text.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Numbers, or strings holding a number.
pub(crate) fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// A list of scalars as text. Nested values are skipped, a lone scalar is
/// a one-element list.
pub(crate) fn text_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(scalar_text).collect(),
        other => scalar_text(other).into_iter().collect(),
    }
}

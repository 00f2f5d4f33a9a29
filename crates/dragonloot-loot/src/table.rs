//! Loot table: validated items and the per-death drop roll.

use std::path::Path;

use dragonloot_items::{parse_enchantment, ItemBuilder, MaterialInfo, MaterialRegistry};
use dragonloot_plugin_api::{ItemStack, Location, ServerApi};
use rand::Rng;
use serde_json::{Map, Value};
use tracing::{error, info, warn};

use crate::entry::{number, scalar_text, text_list};
use crate::error::{AmountError, LootError};
use crate::store::LootStore;

/// Stack size range for one drop, `min <= max`, both at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountRange {
    pub min: u32,
    pub max: u32,
}

impl AmountRange {
    pub const ONE: AmountRange = AmountRange { min: 1, max: 1 };

    /// Parse `"n"` or `"min-max"`. A reversed range is swapped, a single
    /// value below 1 is raised to 1.
    pub fn parse(text: &str) -> Result<Self, AmountError> {
        let text = text.trim();
        if text.contains('-') {
            let invalid = || AmountError::InvalidRange(text.to_string());
            let mut parts = text.split('-');
            let min: i64 = parts.next().unwrap_or("").trim().parse().map_err(|_| invalid())?;
            let max: i64 = parts.next().unwrap_or("").trim().parse().map_err(|_| invalid())?;
            if min < 1 || max < 1 {
                return Err(AmountError::NotPositive);
            }
            let (min, max) = if min > max { (max, min) } else { (min, max) };
            Ok(Self {
                min: saturate(min),
                max: saturate(max),
            })
        } else {
            let n = text
                .parse::<i64>()
                .ok()
                .or_else(|| {
                    text.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite())
                        .map(|f| f as i64)
                })
                .ok_or_else(|| AmountError::InvalidValue(text.to_string()))?;
            let n = saturate(n.max(1));
            Ok(Self { min: n, max: n })
        }
    }

    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        if self.min == self.max {
            self.min
        } else {
            rng.gen_range(self.min..=self.max)
        }
    }
}

fn saturate(n: i64) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// A validated loot item.
#[derive(Debug, Clone)]
pub struct LootItem {
    pub material: &'static MaterialInfo,
    pub amount: AmountRange,
    /// Drop chance in percent, within [0, 100].
    pub chance: f64,
    pub custom_name: Option<String>,
    pub lore: Vec<String>,
    pub enchantments: Vec<String>,
}

/// The loaded loot table. Reads the same document as [`LootStore`] but
/// keeps its own parsed copy; call [`LootTable::reload`] after editing.
pub struct LootTable {
    store: LootStore,
    registry: &'static MaterialRegistry,
    items: Vec<LootItem>,
}

impl LootTable {
    /// An empty table over `<data_dir>/loot.json`. Call [`LootTable::load`].
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            store: LootStore::new(data_dir),
            registry: MaterialRegistry::vanilla(),
            items: Vec::new(),
        }
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> &[LootItem] {
        &self.items
    }

    pub fn reload(&mut self) -> bool {
        info!("Reloading loot configuration...");
        self.load()
    }

    /// Parse the document into the item cache. Bad records are skipped with
    /// a warning; only an unreadable document or a missing `loot` key fail.
    pub fn load(&mut self) -> bool {
        self.items.clear();

        if !self.store.path().exists() {
            warn!("{} not found, creating default", self.store.path().display());
            self.store.ensure_exists();
        }

        let document = match self.store.read_document() {
            Ok(doc) => doc,
            Err(e) => {
                error!("Failed to load loot table, check the file for syntax errors: {e}");
                return false;
            }
        };

        let Some(loot) = document.get("loot") else {
            error!("{}", LootError::MissingLoot(self.store.path().to_path_buf()));
            return false;
        };

        let records = loot.as_array().map(Vec::as_slice).unwrap_or_default();
        if records.is_empty() {
            warn!("Loot table contains no items, the dragon will drop nothing");
            return true;
        }

        for (i, record) in records.iter().enumerate() {
            let index = i + 1;
            let Some(record) = record.as_object() else {
                warn!("Skipping loot item #{index}: not an object");
                continue;
            };
            if let Some(item) = self.parse_item(record, index) {
                info!(
                    "Loaded loot item #{index}: {} (chance: {}%)",
                    item.material.name, item.chance
                );
                self.items.push(item);
            }
        }

        info!(
            "Loaded {} loot item(s) from {}",
            self.items.len(),
            self.store.path().display()
        );
        true
    }

    fn parse_item(&self, record: &Map<String, Value>, index: usize) -> Option<LootItem> {
        let Some(material) = record.get("material") else {
            warn!("Loot item #{index} missing required field 'material'");
            return None;
        };
        let name = scalar_text(material).unwrap_or_default().to_uppercase();
        let material = match self.registry.get(&name) {
            Some(info) if info.is_item => info,
            Some(_) => {
                warn!("Loot item #{index}: material '{name}' is not an item");
                return None;
            }
            None => {
                warn!("Loot item #{index}: invalid material name '{name}'");
                return None;
            }
        };

        let amount = match record.get("amount").and_then(scalar_text) {
            None => AmountRange::ONE,
            Some(text) => AmountRange::parse(&text).unwrap_or_else(|e| {
                warn!("Loot item #{index}: {e}, using default (1)");
                AmountRange::ONE
            }),
        };

        let mut chance = match record.get("chance") {
            None => 100.0,
            Some(value) => number(value).unwrap_or_else(|| {
                warn!("Loot item #{index}: invalid chance {value}, using 100");
                100.0
            }),
        };
        if !(0.0..=100.0).contains(&chance) {
            warn!("Loot item #{index}: chance {chance} outside 0-100, clamping");
            chance = chance.clamp(0.0, 100.0);
        }

        Some(LootItem {
            material,
            amount,
            chance,
            custom_name: record
                .get("name")
                .and_then(scalar_text)
                .filter(|n| !n.is_empty()),
            lore: record.get("lore").map(text_list).unwrap_or_default(),
            enchantments: record.get("enchantments").map(text_list).unwrap_or_default(),
        })
    }

    /// One resolution pass. Each item drops independently when a draw in
    /// `[0, 100)` falls below its chance.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<ItemStack> {
        self.items
            .iter()
            .filter_map(|item| {
                let draw: f64 = rng.gen_range(0.0..100.0);
                (draw < item.chance).then(|| create_item(item, rng))
            })
            .collect()
    }

    /// Roll and drop the results at `location`. Returns the number dropped.
    pub fn spawn_loot(&self, location: &Location, api: &mut dyn ServerApi) -> usize {
        if self.items.is_empty() {
            info!("No loot items configured, skipping loot drop");
            return 0;
        }

        let drops = self.roll(&mut rand::thread_rng());
        let count = drops.len();
        for stack in drops {
            api.drop_item(location, stack);
        }

        info!("Spawned {count} loot item(s) at {}", format_location(location));
        count
    }
}

fn create_item<R: Rng + ?Sized>(item: &LootItem, rng: &mut R) -> ItemStack {
    let mut builder = ItemBuilder::new(item.material.name.as_str())
        .count(item.amount.roll(rng))
        .name(item.custom_name.as_deref().unwrap_or(""))
        .lore(item.lore.as_slice());

    for token in &item.enchantments {
        match parse_enchantment(token) {
            Ok((enchantment, level)) => builder = builder.enchant(enchantment.key, level),
            Err(e) => warn!("Skipping enchantment '{token}' on {}: {e}", item.material.name),
        }
    }

    builder.build()
}

pub fn format_location(loc: &Location) -> String {
    format!("{}({:.1}, {:.1}, {:.1})", loc.world, loc.x, loc.y, loc.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dragonloot_plugin_api::testing::RecordingApi;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn table_with(doc: Value) -> (TempDir, LootTable) {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("loot.json"), doc.to_string()).unwrap();
        let mut table = LootTable::new(dir.path());
        assert!(table.load());
        (dir, table)
    }

    #[test]
    fn amount_parsing() {
        assert_eq!(AmountRange::parse("1-3"), Ok(AmountRange { min: 1, max: 3 }));
        assert_eq!(AmountRange::parse(" 5 - 2 "), Ok(AmountRange { min: 2, max: 5 }));
        assert_eq!(AmountRange::parse("7"), Ok(AmountRange { min: 7, max: 7 }));
        assert_eq!(AmountRange::parse("0"), Ok(AmountRange::ONE));
        assert_eq!(AmountRange::parse("2.0"), Ok(AmountRange { min: 2, max: 2 }));
        assert_eq!(AmountRange::parse("1-2-3"), Ok(AmountRange { min: 1, max: 2 }));
        assert_eq!(AmountRange::parse("0-3"), Err(AmountError::NotPositive));
        assert_eq!(AmountRange::parse("-5"), Err(AmountError::InvalidRange("-5".into())));
        assert_eq!(AmountRange::parse("lots"), Err(AmountError::InvalidValue("lots".into())));
    }

    #[test]
    fn swapped_range_matches_ordered_range() {
        for (a, b) in [(1u32, 3u32), (10, 4), (6, 6)] {
            let forward = AmountRange::parse(&format!("{a}-{b}")).unwrap();
            let backward = AmountRange::parse(&format!("{b}-{a}")).unwrap();
            assert_eq!(forward, backward);
            assert_eq!(forward.min, a.min(b));
            assert_eq!(forward.max, a.max(b));
        }
    }

    #[test]
    fn invalid_records_are_skipped() {
        let (_dir, table) = table_with(json!({ "loot": [
            { "material": "diamond", "amount": "1-3" },
            { "material": "NOT_A_REAL_ITEM" },
            { "material": "AIR" },
            { "amount": "2" },
            "not an object",
            { "material": "EMERALD", "amount": "bogus" },
        ] }));
        assert_eq!(table.item_count(), 2);
        assert_eq!(table.items()[0].material.name, "DIAMOND");
        assert_eq!(table.items()[1].amount, AmountRange::ONE);
    }

    #[test]
    fn chance_is_clamped() {
        let (_dir, table) = table_with(json!({ "loot": [
            { "material": "DIAMOND", "chance": 150.0 },
            { "material": "DIAMOND", "chance": -5 },
            { "material": "DIAMOND", "chance": "42.5" },
            { "material": "DIAMOND" },
        ] }));
        let chances: Vec<f64> = table.items().iter().map(|i| i.chance).collect();
        assert_eq!(chances, vec![100.0, 0.0, 42.5, 100.0]);
    }

    #[test]
    fn certain_and_impossible_drops() {
        let (_dir, table) = table_with(json!({ "loot": [
            { "material": "DIAMOND", "chance": 100 },
            { "material": "EMERALD", "chance": 0 },
        ] }));
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let drops = table.roll(&mut rng);
            assert_eq!(drops.len(), 1);
            assert_eq!(drops[0].material, "DIAMOND");
        }
    }

    #[test]
    fn range_covers_every_amount() {
        let (_dir, table) = table_with(json!({ "loot": [
            { "material": "DIAMOND", "amount": "1-3", "chance": 100 },
        ] }));
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = HashSet::new();
        for _ in 0..200 {
            let drops = table.roll(&mut rng);
            assert_eq!(drops.len(), 1);
            assert!((1..=3).contains(&drops[0].count));
            seen.insert(drops[0].count);
        }
        assert_eq!(seen, HashSet::from([1, 2, 3]));
    }

    #[test]
    fn unknown_material_drops_nothing() {
        let (_dir, table) = table_with(json!({ "loot": [
            { "material": "NOT_A_REAL_ITEM", "chance": 100 },
        ] }));
        assert_eq!(table.item_count(), 0);
        assert!(table.roll(&mut StdRng::seed_from_u64(1)).is_empty());
    }

    #[test]
    fn ordinary_items_all_load() {
        let names = [
            "GOLDEN_AXE",
            "IRON_HOE",
            "STONE_SWORD",
            "torch",
            "DIAMOND_ORE",
            "OAK_SAPLING",
            "NETHERITE_INGOT",
        ];
        let records: Vec<Value> = names
            .iter()
            .map(|name| json!({ "material": name, "chance": 100 }))
            .collect();
        let (_dir, table) = table_with(json!({ "loot": records }));
        assert_eq!(table.item_count(), names.len());

        let drops = table.roll(&mut StdRng::seed_from_u64(5));
        let materials: Vec<&str> = drops.iter().map(|d| d.material.as_str()).collect();
        assert_eq!(
            materials,
            vec![
                "GOLDEN_AXE",
                "IRON_HOE",
                "STONE_SWORD",
                "TORCH",
                "DIAMOND_ORE",
                "OAK_SAPLING",
                "NETHERITE_INGOT"
            ]
        );
    }

    #[test]
    fn decorations_and_enchantments() {
        let (_dir, table) = table_with(json!({ "loot": [{
            "material": "NETHERITE_SWORD",
            "name": "&cSlayer",
            "lore": ["&7first", "second"],
            "enchantments": ["SHARPNESS:10", "BOGUS:1", "UNBREAKING", "MENDING:0", "looting:3"],
        }] }));
        let drops = table.roll(&mut StdRng::seed_from_u64(3));
        let sword = &drops[0];
        assert_eq!(sword.display_name.as_deref(), Some("§cSlayer"));
        assert_eq!(sword.lore, vec!["§7first", "second"]);
        assert_eq!(
            sword.enchantments,
            vec![("sharpness".to_string(), 10), ("looting".to_string(), 3)]
        );
    }

    #[test]
    fn structural_failures() {
        let (_dir, table) = table_with(json!({ "loot": [] }));
        assert_eq!(table.item_count(), 0);

        let dir = tempdir().unwrap();
        fs::write(dir.path().join("loot.json"), r#"{ "items": [] }"#).unwrap();
        let mut table = LootTable::new(dir.path());
        assert!(!table.load());

        fs::write(dir.path().join("loot.json"), "{ broken").unwrap();
        assert!(!table.load());
        assert_eq!(table.item_count(), 0);
    }

    #[test]
    fn missing_document_creates_default() {
        let dir = tempdir().unwrap();
        let mut table = LootTable::new(dir.path().join("DragonLoot"));
        assert!(table.load());
        assert!(table.item_count() > 0);
        assert!(dir.path().join("DragonLoot").join("loot.json").exists());
    }

    #[test]
    fn reload_sees_store_edits() {
        let (dir, mut table) = table_with(json!({ "loot": [{ "material": "DIAMOND" }] }));
        let store = LootStore::new(dir.path());
        assert!(store.add_default_entry());
        assert_eq!(table.item_count(), 1);
        assert!(table.reload());
        assert_eq!(table.item_count(), 2);
    }

    #[test]
    fn spawn_loot_drops_at_location() {
        let (_dir, table) = table_with(json!({ "loot": [
            { "material": "DIAMOND", "amount": "4", "chance": 100 },
            { "material": "EMERALD", "chance": 100 },
        ] }));
        let mut api = RecordingApi::new();
        let here = Location::new("world_the_end", 0.0, 70.0, 0.0);
        assert_eq!(table.spawn_loot(&here, &mut api), 2);
        assert_eq!(api.dropped.len(), 2);
        assert!(api.dropped.iter().all(|(loc, _)| *loc == here));
        assert_eq!(api.dropped[0].1.count, 4);
        assert_eq!(format_location(&here), "world_the_end(0.0, 70.0, 0.0)");
    }
}

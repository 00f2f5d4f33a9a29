//! Closed catalog of material names.
//!
//! Loaded from the bundled `data/materials.json`. Some materials exist only
//! as world blocks or fluids (`AIR`, `WATER`, `END_PORTAL`) and can never be
//! held, so the catalog keeps an item flag next to each name.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::Deserialize;

const MATERIALS_JSON: &str = include_str!("../data/materials.json");

#[derive(Deserialize)]
struct RawCatalog {
    items: Vec<String>,
    non_items: Vec<String>,
}

/// Properties for a single material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialInfo {
    /// Upper-case identifier, e.g. `"DIAMOND"`.
    pub name: String,
    /// Whether the material can exist as an item stack.
    pub is_item: bool,
    /// Maximum stack size (1, 16, or 64).
    pub max_stack_size: u8,
}

/// Registry of all known materials.
pub struct MaterialRegistry {
    by_name: HashMap<String, MaterialInfo>,
}

impl Default for MaterialRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MaterialRegistry {
    /// Build the registry from the bundled catalog.
    pub fn new() -> Self {
        let raw: RawCatalog =
            serde_json::from_str(MATERIALS_JSON).expect("invalid materials.json");

        let mut by_name = HashMap::with_capacity(raw.items.len() + raw.non_items.len());
        for (names, is_item) in [(raw.items, true), (raw.non_items, false)] {
            for name in names {
                let max_stack_size = if is_item { max_stack_size_for(&name) } else { 0 };
                by_name.insert(
                    name.clone(),
                    MaterialInfo {
                        name,
                        is_item,
                        max_stack_size,
                    },
                );
            }
        }

        Self { by_name }
    }

    /// Shared registry, built on first use.
    pub fn vanilla() -> &'static MaterialRegistry {
        static REGISTRY: OnceLock<MaterialRegistry> = OnceLock::new();
        REGISTRY.get_or_init(MaterialRegistry::new)
    }

    /// Exact lookup by upper-case name.
    pub fn get(&self, name: &str) -> Option<&MaterialInfo> {
        self.by_name.get(name)
    }

    /// Lookup that only accepts materials which can be item stacks.
    pub fn item(&self, name: &str) -> Option<&MaterialInfo> {
        self.get(name).filter(|info| info.is_item)
    }

    /// Max stack size for a material. Returns 64 for unknown names.
    pub fn max_stack_size(&self, name: &str) -> u8 {
        self.get(name)
            .map(|info| info.max_stack_size)
            .unwrap_or(64)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Max stack size from name patterns.
///
/// - Tools, weapons, armor, single-use containers → 1
/// - Pearls, eggs, snowballs, signs, banners, empty buckets → 16
/// - Everything else → 64
fn max_stack_size_for(name: &str) -> u8 {
    if name.ends_with("_SWORD")
        || name.ends_with("_PICKAXE")
        || name.ends_with("_AXE")
        || name.ends_with("_SHOVEL")
        || name.ends_with("_HOE")
        || name.ends_with("_HELMET")
        || name.ends_with("_CHESTPLATE")
        || name.ends_with("_LEGGINGS")
        || name.ends_with("_BOOTS")
        || name.ends_with("_HORSE_ARMOR")
        || name.ends_with("_BUCKET")
        || name.ends_with("POTION")
        || name.ends_with("SHULKER_BOX")
        || name.ends_with("BUNDLE")
        || name.ends_with("_BED")
        || name.ends_with("_BOAT")
        || name.ends_with("_RAFT")
        || name.ends_with("MINECART")
        || name.ends_with("_STEW")
        || name.ends_with("_SOUP")
        || name.ends_with("_BANNER_PATTERN")
        || name.ends_with("_ON_A_STICK")
        || name.starts_with("MUSIC_DISC_")
    {
        return 1;
    }

    if matches!(
        name,
        "BOW"
            | "CROSSBOW"
            | "TRIDENT"
            | "SHIELD"
            | "MACE"
            | "ELYTRA"
            | "FISHING_ROD"
            | "SHEARS"
            | "FLINT_AND_STEEL"
            | "TOTEM_OF_UNDYING"
            | "ENCHANTED_BOOK"
            | "WRITABLE_BOOK"
            | "SADDLE"
            | "CAKE"
            | "SPYGLASS"
            | "BRUSH"
            | "GOAT_HORN"
            | "WOLF_ARMOR"
            | "DEBUG_STICK"
            | "KNOWLEDGE_BOOK"
    ) {
        return 1;
    }

    if name.ends_with("_SIGN")
        || name.ends_with("_BANNER")
        || matches!(
            name,
            "ENDER_PEARL"
                | "SNOWBALL"
                | "EGG"
                | "BUCKET"
                | "HONEY_BOTTLE"
                | "ARMOR_STAND"
                | "WRITTEN_BOOK"
        )
    {
        return 16;
    }

    64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_loads() {
        let reg = MaterialRegistry::new();
        assert!(!reg.is_empty());
        assert!(reg.len() > 1300);
    }

    #[test]
    fn everyday_items_are_known() {
        let reg = MaterialRegistry::vanilla();
        for name in [
            "GOLDEN_AXE",
            "IRON_HOE",
            "STONE_SWORD",
            "TORCH",
            "DIAMOND_ORE",
            "DEEPSLATE_DIAMOND_ORE",
            "OAK_SAPLING",
            "MANGROVE_PROPAGULE",
            "CHERRY_HANGING_SIGN",
            "LIME_SHULKER_BOX",
            "WAXED_WEATHERED_CUT_COPPER_STAIRS",
            "POLISHED_BLACKSTONE_BRICK_WALL",
            "ENDERMAN_SPAWN_EGG",
            "MUSIC_DISC_PIGSTEP",
            "SNOUT_ARMOR_TRIM_SMITHING_TEMPLATE",
            "DEAD_BRAIN_CORAL_FAN",
            "DRAGON_HEAD",
            "ELYTRA",
        ] {
            assert!(reg.item(name).is_some(), "{name} should be an item");
        }
        assert!(reg.item("WALL_TORCH").is_none());
        assert!(reg.item("MELON_STEM").is_none());
    }

    #[test]
    fn items_and_blocks() {
        let reg = MaterialRegistry::vanilla();
        assert!(reg.item("DIAMOND").is_some());
        assert!(reg.get("AIR").is_some());
        assert!(reg.item("AIR").is_none());
        assert!(reg.item("WATER").is_none());
        assert!(reg.get("NOT_A_REAL_ITEM").is_none());
        assert!(reg.get("diamond").is_none());
    }

    #[test]
    fn stack_sizes() {
        let reg = MaterialRegistry::vanilla();
        assert_eq!(reg.max_stack_size("DIAMOND"), 64);
        assert_eq!(reg.max_stack_size("DIAMOND_SWORD"), 1);
        assert_eq!(reg.max_stack_size("NETHERITE_CHESTPLATE"), 1);
        assert_eq!(reg.max_stack_size("ELYTRA"), 1);
        assert_eq!(reg.max_stack_size("ENDER_PEARL"), 16);
        assert_eq!(reg.max_stack_size("OAK_SIGN"), 16);
        assert_eq!(reg.max_stack_size("WATER_BUCKET"), 1);
        assert_eq!(reg.max_stack_size("RED_BED"), 1);
        assert_eq!(reg.max_stack_size("CHERRY_CHEST_BOAT"), 1);
        assert_eq!(reg.max_stack_size("BLUE_SHULKER_BOX"), 1);
        assert_eq!(reg.max_stack_size("RABBIT_STEW"), 1);
        assert_eq!(reg.max_stack_size("TORCH"), 64);
        assert_eq!(reg.max_stack_size("UNKNOWN_THING"), 64);
    }
}

//! Menu rendering. Pure functions from editor state to [`Menu`]s.

use dragonloot_items::{markup, menu_icon, ItemBuilder, MaterialRegistry};
use dragonloot_loot::LootEntry;
use dragonloot_plugin_api::{ItemStack, Menu};

use crate::layout::*;

/// The editor menus, told apart by their plain title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMenu {
    Root,
    LootList,
    ItemEditor,
    Content,
}

impl EditorMenu {
    pub fn title(self) -> &'static str {
        match self {
            EditorMenu::Root => "§0Editor",
            EditorMenu::LootList => "§0Loot Editor",
            EditorMenu::ItemEditor => "§0Item Editor",
            EditorMenu::Content => "§0Content",
        }
    }

    pub fn from_title(title: &str) -> Option<Self> {
        match markup::strip(title).as_str() {
            "Editor" => Some(EditorMenu::Root),
            "Loot Editor" => Some(EditorMenu::LootList),
            "Item Editor" => Some(EditorMenu::ItemEditor),
            "Content" => Some(EditorMenu::Content),
            _ => None,
        }
    }
}

const FALLBACK_MATERIAL: &str = "BARRIER";
const EMPTY_CONTENT_MATERIAL: &str = "LIGHT_GRAY_STAINED_GLASS_PANE";

/// Catalog item for an entry's material, `BARRIER` if it is unknown.
fn display_material(entry: &LootEntry) -> String {
    let name = entry.material.to_uppercase();
    match MaterialRegistry::vanilla().item(&name) {
        Some(info) => info.name.clone(),
        None => FALLBACK_MATERIAL.to_string(),
    }
}

fn has_material(entry: &LootEntry) -> bool {
    !entry.material.is_empty() && !entry.material.eq_ignore_ascii_case("AIR")
}

/// Chance as shown to users: `100.0`, `12.5`.
pub fn format_chance(chance: f64) -> String {
    if chance.fract() == 0.0 {
        format!("{chance:.1}")
    } else {
        chance.to_string()
    }
}

/// Fixed stack size for an entry's amount: a plain integer, else 1.
pub fn fixed_amount(entry: &LootEntry) -> u32 {
    entry
        .amount
        .trim()
        .parse::<i64>()
        .map(|n| u32::try_from(n.max(1)).unwrap_or(u32::MAX))
        .unwrap_or(1)
}

/// A real item for an entry, with its name and lore, for giving or test drops.
pub fn sample_stack(entry: &LootEntry) -> ItemStack {
    ItemBuilder::new(display_material(entry))
        .count(fixed_amount(entry))
        .name(&entry.custom_name)
        .lore(entry.lore.as_slice())
        .build()
}

fn frame(menu: &mut Menu) {
    let border = menu_icon("BLACK_STAINED_GLASS_PANE", "§8 ", &[] as &[&str]);
    let filler = menu_icon("GRAY_STAINED_GLASS_PANE", "§8 ", &[] as &[&str]);
    for slot in 0..menu.size() {
        let pane = if is_border(slot) { &border } else { &filler };
        menu.set(slot, pane.clone());
    }
}

pub fn root(loot_count: usize) -> Menu {
    let mut menu = Menu::new(EditorMenu::Root.title(), 3);
    let count_line = format!("§8Current items: §6{loot_count}");
    menu.set(
        ROOT_RELOAD_SLOT,
        menu_icon(
            "BOOK",
            "§e§lReload Loot",
            &["§7Reload loot.json from disk", "", count_line.as_str()],
        ),
    );
    menu.set(
        ROOT_LOOT_SLOT,
        menu_icon(
            "VAULT",
            "§6§lLoot Editor",
            &["§7Click to edit loot items", "", "§e▶ Open Loot Editor"],
        ),
    );
    menu
}

fn entry_icon(entry: &LootEntry) -> ItemStack {
    let name = if entry.custom_name.is_empty() {
        format!("§f{}", entry.material)
    } else {
        entry.custom_name.clone()
    };
    let material = format!("§7Material: §f{}", entry.material);
    let amount = format!("§7Amount: §f{}", entry.amount);
    let chance = format!("§7Chance: §f{}%", format_chance(entry.chance));
    ItemBuilder::new(display_material(entry))
        .name(&name)
        .lore(&[material.as_str(), amount.as_str(), chance.as_str(), "", "§e▶ Click to edit"])
        .build()
}

/// The loot list at `page`. The caller clamps the page.
pub fn loot_list(entries: &[LootEntry], page: usize) -> Menu {
    let mut menu = Menu::new(EditorMenu::LootList.title(), LARGE_ROWS);
    frame(&mut menu);

    let start = page * PAGE_CAPACITY;
    for (slot, entry) in interior_slots().zip(entries.iter().skip(start)) {
        menu.set(slot, entry_icon(entry));
    }

    let page_line = format!(
        "§7Page: §f{} / {}",
        page + 1,
        page_count(entries.len(), PAGE_CAPACITY)
    );
    menu.set(
        ADD_SLOT,
        menu_icon("EMERALD", "§a§lAdd New Loot", &["§7Click to add a new loot item"]),
    );
    menu.set(
        SORT_SLOT,
        menu_icon(
            "COMPARATOR",
            "§b§lSort by Chance (Desc)",
            &["§7Sort loot entries by chance (high -> low)"],
        ),
    );
    menu.set(
        PREV_PAGE_SLOT,
        menu_icon(
            "ARROW",
            "§e⟵ Previous Page",
            &[page_line.as_str(), "§7Click to go to the previous page"],
        ),
    );
    menu.set(
        BACK_SLOT,
        menu_icon("IRON_DOOR", "§7Back", &["§7Return to Main Editor"]),
    );
    menu.set(
        NEXT_PAGE_SLOT,
        menu_icon(
            "ARROW",
            "§eNext Page ⟶",
            &[page_line.as_str(), "§7Click to go to the next page"],
        ),
    );
    menu.set(
        GET_ALL_SLOT,
        menu_icon(
            "CHEST",
            "§e§lGet All Items",
            &["§7Receive all loot items with their names and lore"],
        ),
    );
    menu
}

pub fn item_editor(entry: &LootEntry) -> Menu {
    let mut menu = Menu::new(EditorMenu::ItemEditor.title(), LARGE_ROWS);
    frame(&mut menu);

    let current = if has_material(entry) {
        let material_line = format!("§7Material: §f{}", entry.material);
        menu_icon(
            &display_material(entry),
            "§e§lCurrent Item",
            &[material_line.as_str(), "", "§7Click to drop a test copy"],
        )
    } else {
        menu_icon(EMPTY_CONTENT_MATERIAL, "§7No item set", &[] as &[&str])
    };
    menu.set(PREVIEW_SLOT, current);

    menu.set(
        SWAP_SLOT,
        menu_icon("BUNDLE", "§a§lSwap Item Here", &["§7Put an item here to set content"]),
    );

    let amount_line = format!("§7Current: §f{}", entry.amount);
    menu.set(
        AMOUNT_SLOT,
        menu_icon("HOPPER", "§a§lAmount", &[amount_line.as_str(), "", "§e▶ Click to edit"]),
    );

    let name_line = if entry.custom_name.is_empty() {
        "§7Current: §8None".to_string()
    } else {
        format!("§7Current: {}", entry.custom_name)
    };
    menu.set(
        NAME_SLOT,
        menu_icon("NAME_TAG", "§b§lCustom Name", &[name_line.as_str(), "", "§e▶ Click to edit"]),
    );

    let chance_line = format!("§7Current: §f{}%", format_chance(entry.chance));
    menu.set(
        CHANCE_SLOT,
        menu_icon("NETHER_STAR", "§d§lChance", &[chance_line.as_str(), "", "§e▶ Click to edit"]),
    );

    let mut lore_lines: Vec<String> = if entry.lore.is_empty() {
        vec!["§7Current: §8None".to_string()]
    } else {
        std::iter::once("§7Current lore:".to_string())
            .chain(entry.lore.iter().map(|line| format!("§8- {line}")))
            .collect()
    };
    lore_lines.push(String::new());
    lore_lines.push("§e▶ Click to edit".to_string());
    menu.set(LORE_SLOT, menu_icon("WRITABLE_BOOK", "§6§lLore", lore_lines.as_slice()));

    menu.set(
        DELETE_SLOT,
        menu_icon(
            "RED_STAINED_GLASS_PANE",
            "§c§lDelete Item",
            &["§7Click to delete this loot item", "§c⚠ This cannot be undone!"],
        ),
    );
    menu.set(
        BACK_SLOT,
        menu_icon("IRON_DOOR", "§7Back", &["§7Return to Loot Editor"]),
    );
    menu.set(
        SAVE_SLOT,
        menu_icon("LIME_STAINED_GLASS_PANE", "§a§lSave Changes", &["§7Click to save all changes"]),
    );
    menu
}

/// What the content slot shows for an entry: the item itself, or a
/// placeholder pane when the entry has no material.
pub fn content_item(entry: &LootEntry) -> ItemStack {
    if has_material(entry) {
        sample_stack(entry)
    } else {
        content_placeholder()
    }
}

pub fn content_placeholder() -> ItemStack {
    menu_icon(
        EMPTY_CONTENT_MATERIAL,
        "§7Place your item here (only slot 22 is active)",
        &[] as &[&str],
    )
}

pub fn content(entry: &LootEntry) -> Menu {
    let mut menu = Menu::new(EditorMenu::Content.title(), LARGE_ROWS);
    frame(&mut menu);
    menu.set(CONTENT_SLOT, content_item(entry));
    menu.set(BACK_SLOT, menu_icon("IRON_DOOR", "§7Back", &[] as &[&str]));
    menu.set(SAVE_SLOT, menu_icon("LIME_STAINED_GLASS_PANE", "§aSave", &[] as &[&str]));
    menu
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(n: usize) -> Vec<LootEntry> {
        (0..n)
            .map(|i| LootEntry {
                material: "DIAMOND".into(),
                amount: (i + 1).to_string(),
                ..LootEntry::default()
            })
            .collect()
    }

    #[test]
    fn titles_round_trip() {
        for menu in [
            EditorMenu::Root,
            EditorMenu::LootList,
            EditorMenu::ItemEditor,
            EditorMenu::Content,
        ] {
            assert_eq!(EditorMenu::from_title(menu.title()), Some(menu));
        }
        assert_eq!(EditorMenu::from_title("Loot Editor"), Some(EditorMenu::LootList));
        assert_eq!(EditorMenu::from_title("§cConfirm Dragon Kill?"), None);
        assert_eq!(EditorMenu::from_title("My Editor"), None);
    }

    #[test]
    fn loot_list_pages() {
        let all = entries(30);
        let first = loot_list(&all, 0);
        assert_eq!(first.size(), 54);
        assert_eq!(first.get(10).unwrap().material, "DIAMOND");
        assert_eq!(first.get(43).unwrap().lore[1], "§7Amount: §f28");
        assert!(first.get(ADD_SLOT).is_some());
        assert_eq!(first.get(NEXT_PAGE_SLOT).unwrap().lore[0], "§7Page: §f1 / 2");

        let second = loot_list(&all, 1);
        assert_eq!(second.get(10).unwrap().lore[1], "§7Amount: §f29");
        assert_eq!(second.get(11).unwrap().lore[1], "§7Amount: §f30");
        // Unused interior slots hold filler
        assert_eq!(second.get(12).unwrap().material, "GRAY_STAINED_GLASS_PANE");
    }

    #[test]
    fn empty_list_shows_one_page() {
        let menu = loot_list(&[], 0);
        assert_eq!(menu.get(PREV_PAGE_SLOT).unwrap().lore[0], "§7Page: §f1 / 1");
    }

    #[test]
    fn unknown_material_shows_barrier() {
        let entry = LootEntry {
            material: "NOT_A_REAL_ITEM".into(),
            ..LootEntry::default()
        };
        assert_eq!(sample_stack(&entry).material, "BARRIER");
        assert_eq!(loot_list(&[entry], 0).get(10).unwrap().material, "BARRIER");
    }

    #[test]
    fn sample_stack_uses_fixed_amount() {
        let mut entry = LootEntry {
            custom_name: "&bShiny".into(),
            lore: vec!["&7line".into()],
            ..LootEntry::default()
        };
        entry.amount = "5".into();
        let stack = sample_stack(&entry);
        assert_eq!(stack.count, 5);
        assert_eq!(stack.display_name.as_deref(), Some("§bShiny"));
        assert_eq!(stack.lore, vec!["§7line"]);

        entry.amount = "1-3".into();
        assert_eq!(sample_stack(&entry).count, 1);
        entry.amount = "-4".into();
        assert_eq!(sample_stack(&entry).count, 1);
    }

    #[test]
    fn item_editor_shows_current_values() {
        let entry = LootEntry {
            chance: 12.5,
            lore: vec!["a".into(), "b".into()],
            ..LootEntry::default()
        };
        let menu = item_editor(&entry);
        assert_eq!(menu.get(CHANCE_SLOT).unwrap().lore[0], "§7Current: §f12.5%");
        assert_eq!(menu.get(NAME_SLOT).unwrap().lore[0], "§7Current: §8None");
        assert_eq!(menu.get(LORE_SLOT).unwrap().lore[..3], ["§7Current lore:", "§8- a", "§8- b"]);
        assert_eq!(menu.get(PREVIEW_SLOT).unwrap().material, "DIAMOND");
    }

    #[test]
    fn content_menu_placeholder_for_air() {
        let entry = LootEntry {
            material: "AIR".into(),
            ..LootEntry::default()
        };
        let menu = content(&entry);
        assert_eq!(menu.get(CONTENT_SLOT), Some(&content_placeholder()));
    }

    #[test]
    fn chance_formatting() {
        assert_eq!(format_chance(100.0), "100.0");
        assert_eq!(format_chance(0.0), "0.0");
        assert_eq!(format_chance(33.3), "33.3");
    }
}

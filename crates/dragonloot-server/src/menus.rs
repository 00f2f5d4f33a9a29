//! The player-facing dragon menu and the kill confirmation.

use std::collections::HashSet;

use dragonloot_items::{markup, menu_icon};
use dragonloot_plugin_api::Menu;

pub const MAIN_TITLE: &str = "§5§lDragonLoot";
pub const CONFIRM_TITLE: &str = "§cConfirm Dragon Kill?";

pub const KILL_SLOT: usize = 11;
pub const SPAWN_SLOT: usize = 13;
pub const LOOT_SLOT: usize = 15;

pub const WARNING_SLOT: usize = 4;
pub const CONFIRM_SLOT: usize = 11;
pub const CANCEL_SLOT: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragonMenu {
    Main,
    KillConfirm,
}

impl DragonMenu {
    pub fn from_title(title: &str) -> Option<Self> {
        let plain = markup::strip(title);
        if plain == markup::strip(MAIN_TITLE) {
            Some(DragonMenu::Main)
        } else if plain.contains("Confirm Dragon Kill") {
            Some(DragonMenu::KillConfirm)
        } else {
            None
        }
    }
}

/// What the spawn button tells a player about the price.
#[derive(Debug, Clone, PartialEq)]
pub enum SpawnPrice {
    /// Free-spawn or admin permission.
    Exempt,
    /// No economy, or no cost.
    Free,
    Paid {
        cost: String,
        balance: String,
        /// Formatted shortfall when the player cannot afford it.
        missing: Option<String>,
    },
}

/// The main menu. Admin buttons only show with `admin`.
pub fn main_menu(price: &SpawnPrice, admin: bool, loot_count: usize) -> Menu {
    let mut menu = Menu::new(MAIN_TITLE, 3);
    if admin {
        menu.set(
            KILL_SLOT,
            menu_icon(
                "NETHERITE_SWORD",
                "§c§lKILL DRAGON",
                &[
                    "§7Instantly kill the Ender Dragon",
                    "",
                    "§cAdmin Only",
                    "§8Requires confirmation",
                    "",
                    "§8Click to continue",
                ],
            ),
        );
    }
    menu.set(SPAWN_SLOT, spawn_button(price));
    if admin {
        let count_line = format!("§7Configured Items: §f{loot_count}");
        menu.set(
            LOOT_SLOT,
            menu_icon(
                "ENDER_CHEST",
                "§d§lLOOT CONFIG",
                &[
                    "§7Configure dragon loot drops",
                    "",
                    count_line.as_str(),
                    "",
                    "§e▶ Click to open the loot editor",
                ],
            ),
        );
    }
    menu
}

fn spawn_button(price: &SpawnPrice) -> dragonloot_plugin_api::ItemStack {
    let mut lore = vec!["§7Respawn the Ender Dragon".to_string(), String::new()];
    match price {
        SpawnPrice::Exempt => lore.push("§aFree spawn (Admin/Bypass)".into()),
        SpawnPrice::Free => lore.push("§aFree (Economy disabled)".into()),
        SpawnPrice::Paid {
            cost,
            balance,
            missing,
        } => {
            lore.push(format!("§6Cost: §f{cost}"));
            lore.push(format!("§6Your Balance: §f{balance}"));
            lore.push(String::new());
            match missing {
                None => lore.push("§aYou can afford this!".into()),
                Some(missing) => lore.push(format!("§cNeed {missing} more")),
            }
        }
    }
    lore.push(String::new());
    lore.push("§8Click to spawn".into());
    menu_icon("DRAGON_EGG", "§a§lSPAWN DRAGON", lore.as_slice())
}

pub fn kill_confirmation() -> Menu {
    let mut menu = Menu::new(CONFIRM_TITLE, 3);
    menu.set(
        WARNING_SLOT,
        menu_icon(
            "BARRIER",
            "§c§lWARNING",
            &["§7This will instantly kill", "§7the Ender Dragon!"],
        ),
    );
    menu.set(
        CONFIRM_SLOT,
        menu_icon(
            "GREEN_WOOL",
            "§a§lCONFIRM",
            &["§7Click to kill the dragon", "§8This action cannot be undone!"],
        ),
    );
    menu.set(
        CANCEL_SLOT,
        menu_icon("RED_WOOL", "§c§lCANCEL", &["§7Click to go back"]),
    );
    menu
}

/// Players with an open kill confirmation, by UUID.
#[derive(Debug, Default)]
pub struct PendingConfirmations {
    pending: HashSet<String>,
}

impl PendingConfirmations {
    pub fn insert(&mut self, uuid: &str) {
        self.pending.insert(uuid.to_string());
    }

    /// Take the pending confirmation, if any.
    pub fn take(&mut self, uuid: &str) -> bool {
        self.pending.remove(uuid)
    }

    pub fn contains(&self, uuid: &str) -> bool {
        self.pending.contains(uuid)
    }
}

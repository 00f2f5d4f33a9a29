//! A `ServerApi` double that records every call, for plugin tests.
//!
//! Unlike the real host, writes are applied immediately so tests can look at
//! the result right after the callback returns.

use std::collections::{HashMap, HashSet};

use crate::{DragonBattle, ItemStack, Location, Menu, PluginPlayer, ServerApi};

/// Sender name that holds every permission.
pub const CONSOLE: &str = "CONSOLE";

/// A `schedule_delayed` / `schedule_repeating` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledCall {
    pub plugin_name: String,
    pub delay_ticks: u64,
    pub interval_ticks: Option<u64>,
    pub task_id: u32,
}

#[derive(Debug, Default)]
pub struct RecordingApi {
    pub players: Vec<PluginPlayer>,
    pub permissions: HashMap<String, HashSet<String>>,
    pub messages: Vec<(String, String)>,
    pub broadcasts: Vec<String>,
    pub open_menus: HashMap<String, Menu>,
    pub menus_opened: Vec<(String, Menu)>,
    pub menus_closed: Vec<String>,
    pub given: Vec<(String, ItemStack)>,
    pub dropped: Vec<(Location, ItemStack)>,
    pub worlds: HashSet<String>,
    pub battles: HashMap<String, DragonBattle>,
    pub portals_generated: Vec<String>,
    pub previously_killed: Vec<(String, bool)>,
    pub respawns_initiated: Vec<String>,
    pub spawned: Vec<(String, Location)>,
    pub health_set: Vec<(u64, f32)>,
    /// Balances per currency provider. A provider is available when present.
    pub economies: HashMap<String, HashMap<String, f64>>,
    pub tick: u64,
    pub scheduled: Vec<ScheduledCall>,
    pub cancelled_tasks: Vec<u32>,
    pub commands: Vec<(String, String)>,
}

impl RecordingApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an online player in the overworld and return it.
    pub fn join(&mut self, name: &str) -> PluginPlayer {
        let player = PluginPlayer {
            name: name.to_string(),
            uuid: format!("uuid-{}", name.to_lowercase()),
            location: Location::new("world", 0.5, 64.0, 0.5),
        };
        self.players.push(player.clone());
        player
    }

    pub fn grant(&mut self, player_name: &str, permission: &str) {
        self.permissions
            .entry(player_name.to_string())
            .or_default()
            .insert(permission.to_string());
    }

    /// Make a currency provider available, with one starting balance.
    pub fn add_economy(&mut self, provider: &str, player_name: &str, balance: f64) {
        self.economies
            .entry(provider.to_string())
            .or_default()
            .insert(player_name.to_string(), balance);
    }

    pub fn messages_to(&self, player_name: &str) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|(to, _)| to == player_name)
            .map(|(_, msg)| msg.as_str())
            .collect()
    }

    pub fn last_message_to(&self, player_name: &str) -> Option<&str> {
        self.messages_to(player_name).last().copied()
    }

    pub fn open_menu_of(&self, player_name: &str) -> Option<&Menu> {
        self.open_menus.get(player_name)
    }

    /// Put an item in a slot of the player's open menu, as the player would.
    pub fn place_in_menu(&mut self, player_name: &str, slot: usize, item: ItemStack) {
        if let Some(menu) = self.open_menus.get_mut(player_name) {
            menu.set(slot, item);
        }
    }
}

impl ServerApi for RecordingApi {
    fn online_players(&self) -> Vec<PluginPlayer> {
        self.players.clone()
    }
    fn get_player(&self, name: &str) -> Option<PluginPlayer> {
        self.players.iter().find(|p| p.name == name).cloned()
    }
    fn has_permission(&self, player_name: &str, permission: &str) -> bool {
        player_name == CONSOLE
            || self
                .permissions
                .get(player_name)
                .is_some_and(|perms| perms.contains(permission))
    }
    fn send_message(&mut self, player_name: &str, message: &str) {
        self.messages
            .push((player_name.to_string(), message.to_string()));
    }
    fn broadcast_message(&mut self, message: &str) {
        self.broadcasts.push(message.to_string());
    }

    fn open_menu(&mut self, player_name: &str, menu: Menu) {
        self.menus_opened
            .push((player_name.to_string(), menu.clone()));
        self.open_menus.insert(player_name.to_string(), menu);
    }
    fn close_menu(&mut self, player_name: &str) {
        self.menus_closed.push(player_name.to_string());
        self.open_menus.remove(player_name);
    }
    fn menu_slot(&self, player_name: &str, slot: usize) -> Option<ItemStack> {
        self.open_menus
            .get(player_name)
            .and_then(|menu| menu.get(slot))
            .cloned()
    }

    fn give_item(&mut self, player_name: &str, item: ItemStack) {
        self.given.push((player_name.to_string(), item));
    }
    fn drop_item(&mut self, location: &Location, item: ItemStack) {
        self.dropped.push((location.clone(), item));
    }

    fn is_world_loaded(&self, world: &str) -> bool {
        self.worlds.contains(world)
    }
    fn dragon_battle(&self, world: &str) -> Option<DragonBattle> {
        self.battles.get(world).cloned()
    }
    fn generate_end_portal(&mut self, world: &str) {
        self.portals_generated.push(world.to_string());
    }
    fn set_previously_killed(&mut self, world: &str, killed: bool) {
        self.previously_killed.push((world.to_string(), killed));
    }
    fn initiate_dragon_respawn(&mut self, world: &str) {
        self.respawns_initiated.push(world.to_string());
    }

    fn spawn_entity(&mut self, entity_type: &str, location: &Location) {
        self.spawned
            .push((entity_type.to_string(), location.clone()));
    }
    fn set_entity_health(&mut self, runtime_id: u64, health: f32) {
        self.health_set.push((runtime_id, health));
    }

    fn economy_available(&self, provider: &str) -> bool {
        self.economies.contains_key(provider)
    }
    fn balance(&self, provider: &str, player_name: &str) -> f64 {
        self.economies
            .get(provider)
            .and_then(|accounts| accounts.get(player_name))
            .copied()
            .unwrap_or(0.0)
    }
    fn withdraw(&mut self, provider: &str, player_name: &str, amount: f64) -> bool {
        let Some(accounts) = self.economies.get_mut(provider) else {
            return false;
        };
        let balance = accounts.entry(player_name.to_string()).or_insert(0.0);
        if *balance < amount {
            return false;
        }
        *balance -= amount;
        true
    }
    fn deposit(&mut self, provider: &str, player_name: &str, amount: f64) -> bool {
        let Some(accounts) = self.economies.get_mut(provider) else {
            return false;
        };
        *accounts.entry(player_name.to_string()).or_insert(0.0) += amount;
        true
    }
    fn format_currency(&self, provider: &str, amount: f64) -> Option<String> {
        self.economies
            .contains_key(provider)
            .then(|| format!("{amount:.2} coins"))
    }

    fn get_tick(&self) -> u64 {
        self.tick
    }

    fn schedule_delayed(&mut self, plugin_name: &str, delay_ticks: u64, task_id: u32) {
        self.scheduled.push(ScheduledCall {
            plugin_name: plugin_name.to_string(),
            delay_ticks,
            interval_ticks: None,
            task_id,
        });
    }
    fn schedule_repeating(
        &mut self,
        plugin_name: &str,
        delay_ticks: u64,
        interval_ticks: u64,
        task_id: u32,
    ) {
        self.scheduled.push(ScheduledCall {
            plugin_name: plugin_name.to_string(),
            delay_ticks,
            interval_ticks: Some(interval_ticks),
            task_id,
        });
    }
    fn cancel_task(&mut self, _plugin_name: &str, task_id: u32) {
        self.cancelled_tasks.push(task_id);
    }

    fn register_command(&mut self, name: &str, description: &str, _plugin_name: &str) {
        self.commands
            .push((name.to_string(), description.to_string()));
    }
}

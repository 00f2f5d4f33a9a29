//! Plugin API: traits, events, and server API for the dragon loot plugin.
//!
//! This crate defines the boundary between the plugin and the host runtime
//! that drives it. It has no dependency on any other dragonloot crate.

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// ─── Types ───────────────────────────────────────────────────────────────────

/// A position in a named world.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub world: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Location {
    pub fn new(world: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        Self {
            world: world.into(),
            x,
            y,
            z,
        }
    }

    /// Copy of this location moved by the given offsets.
    pub fn offset(&self, dx: f64, dy: f64, dz: f64) -> Self {
        Self {
            world: self.world.clone(),
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
        }
    }
}

/// Information about an online player, passed to plugins in events.
#[derive(Debug, Clone)]
pub struct PluginPlayer {
    pub name: String,
    pub uuid: String,
    pub location: Location,
}

/// An item stack as seen by plugins.
///
/// `display_name` and `lore` carry section-sign formatting (`§`), exactly
/// as the client renders them. A stack of `AIR` or with count 0 is empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ItemStack {
    pub material: String,
    pub count: u32,
    pub display_name: Option<String>,
    pub lore: Vec<String>,
    /// Namespaced enchantment key (`sharpness`) and level.
    pub enchantments: Vec<(String, u32)>,
}

impl ItemStack {
    pub fn new(material: impl Into<String>, count: u32) -> Self {
        Self {
            material: material.into(),
            count,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0 || self.material.is_empty() || self.material == "AIR"
    }
}

/// Number of slots in one menu row.
pub const ROW_WIDTH: usize = 9;

/// A chest-style menu: a title and a fixed number of slots.
#[derive(Debug, Clone, PartialEq)]
pub struct Menu {
    pub title: String,
    pub slots: Vec<Option<ItemStack>>,
}

impl Menu {
    pub fn new(title: impl Into<String>, rows: usize) -> Self {
        Self {
            title: title.into(),
            slots: vec![None; rows * ROW_WIDTH],
        }
    }

    pub fn size(&self) -> usize {
        self.slots.len()
    }

    /// Put an item in a slot. Out-of-range slots are ignored.
    pub fn set(&mut self, slot: usize, item: ItemStack) {
        if let Some(s) = self.slots.get_mut(slot) {
            *s = Some(item);
        }
    }

    /// Item in a slot, if any. Empty stacks count as no item.
    pub fn get(&self, slot: usize) -> Option<&ItemStack> {
        self.slots
            .get(slot)
            .and_then(|s| s.as_ref())
            .filter(|item| !item.is_empty())
    }
}

/// Stage of the ender dragon respawn sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RespawnPhase {
    None,
    Start,
    PreparingToSummonPillars,
    SummoningPillars,
    SummoningDragon,
    End,
}

/// The dragon currently alive in a world.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginDragon {
    pub runtime_id: u64,
    pub health: f32,
}

/// Snapshot of the dragon fight state of an end world.
#[derive(Debug, Clone, PartialEq)]
pub struct DragonBattle {
    pub dragon: Option<PluginDragon>,
    pub respawn_phase: RespawnPhase,
    pub portal_location: Option<Location>,
    pub previously_killed: bool,
}

/// Result of dispatching an event to a plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Continue normal handling.
    Continue,
    /// Event was cancelled by this plugin.
    Cancelled,
}

// ─── Events ──────────────────────────────────────────────────────────────────

/// All events the plugin can listen to.
#[derive(Debug, Clone)]
pub enum PluginEvent {
    // --- Player events ---
    PlayerJoin {
        player: PluginPlayer,
    },
    PlayerQuit {
        player: PluginPlayer,
    },
    PlayerChat {
        player: PluginPlayer,
        message: String,
    },

    // --- Menu events ---
    /// A click inside the top (menu) part of an open menu. Clicks in the
    /// player's own inventory are not reported.
    MenuClick {
        player: PluginPlayer,
        title: String,
        slot: usize,
        item: Option<ItemStack>,
    },
    MenuClose {
        player: PluginPlayer,
        title: String,
    },

    // --- Entity events ---
    MobDeath {
        mob_type: String,
        runtime_id: u64,
        location: Location,
        killer_runtime_id: Option<u64>,
    },

    // --- Server events ---
    ServerStarted,
    ServerStopping,
}

impl PluginEvent {
    /// Whether this event type can be cancelled by a plugin.
    pub fn is_cancellable(&self) -> bool {
        matches!(
            self,
            PluginEvent::PlayerChat { .. } | PluginEvent::MenuClick { .. }
        )
    }
}

// ─── Plugin trait ────────────────────────────────────────────────────────────

/// Metadata about a plugin.
#[derive(Debug, Clone)]
pub struct PluginInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: String,
}

/// The Plugin trait, implemented by the plugin and driven by the host.
pub trait Plugin: Send {
    /// Return plugin metadata.
    fn info(&self) -> PluginInfo;

    /// Called when the plugin is loaded. Use `api` to register commands, schedule tasks.
    fn on_enable(&mut self, api: &mut dyn ServerApi);

    /// Called when the plugin is unloaded.
    fn on_disable(&mut self) {}

    /// Called for every dispatched event. Return `Cancelled` to cancel cancellable events.
    fn on_event(&mut self, event: &PluginEvent, api: &mut dyn ServerApi) -> EventResult {
        let _ = (event, api);
        EventResult::Continue
    }

    /// Called when a scheduled task fires.
    fn on_task(&mut self, task_id: u32, api: &mut dyn ServerApi) {
        let _ = (task_id, api);
    }

    /// Called when a plugin-registered command is executed. Return a response message.
    fn on_command(
        &mut self,
        command: &str,
        args: &[String],
        sender: &str,
        api: &mut dyn ServerApi,
    ) -> Option<String> {
        let _ = (command, args, sender, api);
        None
    }

    /// Return a default config as JSON. If `Some`, the plugin gets a config file.
    fn default_config(&self) -> Option<serde_json::Value> {
        None
    }

    /// Called with the loaded config (from `plugins/<name>/config.json`).
    fn load_config(&mut self, _config: serde_json::Value) {}
}

// ─── Server API ──────────────────────────────────────────────────────────────

/// Safe read/write access to server state, passed to plugins during callbacks.
///
/// Read methods return data immediately. Write methods are deferred (applied
/// after the plugin callback returns), except the currency methods, whose
/// result the caller needs at once.
pub trait ServerApi {
    // --- Players ---
    fn online_players(&self) -> Vec<PluginPlayer>;
    fn get_player(&self, name: &str) -> Option<PluginPlayer>;
    /// Permission check. The console sender has every permission.
    fn has_permission(&self, player_name: &str, permission: &str) -> bool;
    fn send_message(&mut self, player_name: &str, message: &str);
    fn broadcast_message(&mut self, message: &str);

    // --- Menus ---
    fn open_menu(&mut self, player_name: &str, menu: Menu);
    fn close_menu(&mut self, player_name: &str);
    /// Current content of a slot of the menu the player has open.
    fn menu_slot(&self, player_name: &str, slot: usize) -> Option<ItemStack>;

    // --- Items ---
    /// Add to the player's inventory; whatever does not fit drops at their feet.
    fn give_item(&mut self, player_name: &str, item: ItemStack);
    fn drop_item(&mut self, location: &Location, item: ItemStack);

    // --- World ---
    fn is_world_loaded(&self, world: &str) -> bool;
    fn dragon_battle(&self, world: &str) -> Option<DragonBattle>;
    fn generate_end_portal(&mut self, world: &str);
    fn set_previously_killed(&mut self, world: &str, killed: bool);
    fn initiate_dragon_respawn(&mut self, world: &str);

    // --- Entities ---
    fn spawn_entity(&mut self, entity_type: &str, location: &Location);
    fn set_entity_health(&mut self, runtime_id: u64, health: f32);

    // --- Currency (immediate) ---
    fn economy_available(&self, provider: &str) -> bool;
    fn balance(&self, provider: &str, player_name: &str) -> f64;
    fn withdraw(&mut self, provider: &str, player_name: &str, amount: f64) -> bool;
    fn deposit(&mut self, provider: &str, player_name: &str, amount: f64) -> bool;
    fn format_currency(&self, provider: &str, amount: f64) -> Option<String>;

    // --- Server ---
    fn get_tick(&self) -> u64;

    // --- Scheduler ---
    fn schedule_delayed(&mut self, plugin_name: &str, delay_ticks: u64, task_id: u32);
    fn schedule_repeating(
        &mut self,
        plugin_name: &str,
        delay_ticks: u64,
        interval_ticks: u64,
        task_id: u32,
    );
    fn cancel_task(&mut self, plugin_name: &str, task_id: u32);

    // --- Commands ---
    fn register_command(&mut self, name: &str, description: &str, plugin_name: &str);
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::testing::RecordingApi;
    use super::*;

    fn steve() -> PluginPlayer {
        PluginPlayer {
            name: "Steve".into(),
            uuid: "00000000-0000-0000-0000-000000000001".into(),
            location: Location::new("world", 0.5, 64.0, 0.5),
        }
    }

    struct EchoPlugin {
        shout: bool,
    }

    impl Plugin for EchoPlugin {
        fn info(&self) -> PluginInfo {
            PluginInfo {
                name: "Echo".into(),
                version: "1.0.0".into(),
                description: "Echoes menu clicks".into(),
                author: "Test".into(),
            }
        }

        fn on_enable(&mut self, api: &mut dyn ServerApi) {
            api.register_command("echo", "Echo a message", "Echo");
        }

        fn on_event(&mut self, event: &PluginEvent, api: &mut dyn ServerApi) -> EventResult {
            match event {
                PluginEvent::MenuClick { player, slot, .. } => {
                    api.send_message(&player.name, &format!("clicked {slot}"));
                    EventResult::Cancelled
                }
                _ => EventResult::Continue,
            }
        }

        fn default_config(&self) -> Option<serde_json::Value> {
            Some(serde_json::json!({ "shout": false }))
        }

        fn load_config(&mut self, config: serde_json::Value) {
            if let Some(v) = config.get("shout").and_then(|v| v.as_bool()) {
                self.shout = v;
            }
        }
    }

    #[test]
    fn empty_item_stacks() {
        assert!(ItemStack::new("AIR", 1).is_empty());
        assert!(ItemStack::new("DIAMOND", 0).is_empty());
        assert!(ItemStack::default().is_empty());
        assert!(!ItemStack::new("DIAMOND", 1).is_empty());
    }

    #[test]
    fn menu_slots() {
        let mut menu = Menu::new("Test", 3);
        assert_eq!(menu.size(), 27);
        menu.set(4, ItemStack::new("STONE", 1));
        menu.set(99, ItemStack::new("STONE", 1));
        menu.set(5, ItemStack::new("AIR", 1));
        assert_eq!(menu.get(4).map(|i| i.material.as_str()), Some("STONE"));
        assert!(menu.get(5).is_none());
        assert!(menu.get(99).is_none());
    }

    #[test]
    fn location_offset() {
        let loc = Location::new("world_the_end", 0.0, 64.0, 0.0);
        let moved = loc.offset(3.5, 1.0, 0.5);
        assert_eq!(moved, Location::new("world_the_end", 3.5, 65.0, 0.5));
    }

    #[test]
    fn plugin_registers_and_cancels_clicks() {
        let mut plugin = EchoPlugin { shout: false };
        let mut api = RecordingApi::new();
        plugin.on_enable(&mut api);
        assert_eq!(api.commands, vec![("echo".to_string(), "Echo a message".to_string())]);

        let event = PluginEvent::MenuClick {
            player: steve(),
            title: "Menu".into(),
            slot: 13,
            item: None,
        };
        assert_eq!(plugin.on_event(&event, &mut api), EventResult::Cancelled);
        assert_eq!(api.messages_to("Steve"), vec!["clicked 13"]);
    }

    #[test]
    fn plugin_config_roundtrip() {
        let mut plugin = EchoPlugin { shout: false };
        plugin.load_config(serde_json::json!({ "shout": true }));
        assert!(plugin.shout);
        assert_eq!(plugin.default_config().unwrap()["shout"], false);
    }

    #[test]
    fn event_cancellable_flags() {
        assert!(PluginEvent::PlayerChat {
            player: steve(),
            message: String::new()
        }
        .is_cancellable());
        assert!(PluginEvent::MenuClick {
            player: steve(),
            title: String::new(),
            slot: 0,
            item: None,
        }
        .is_cancellable());
        assert!(!PluginEvent::MenuClose {
            player: steve(),
            title: String::new()
        }
        .is_cancellable());
        assert!(!PluginEvent::PlayerQuit { player: steve() }.is_cancellable());
        assert!(!PluginEvent::ServerStarted.is_cancellable());
        assert!(!PluginEvent::MobDeath {
            mob_type: "ender_dragon".into(),
            runtime_id: 0,
            location: Location::new("world_the_end", 0.0, 64.0, 0.0),
            killer_runtime_id: None,
        }
        .is_cancellable());
    }
}

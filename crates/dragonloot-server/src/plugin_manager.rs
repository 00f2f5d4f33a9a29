//! Plugin manager: loads, enables, and dispatches events to plugins.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use dragonloot_plugin_api::{
    DragonBattle, EventResult, ItemStack, Location, Menu, Plugin, PluginEvent, PluginPlayer,
    ServerApi,
};
use tracing::{debug, info, warn};

use crate::host::LocalHost;

/// Follow-up events (menu closes, deaths) are settled at most this many rounds deep.
const MAX_SETTLE_ROUNDS: usize = 16;

// ─── Types ───────────────────────────────────────────────────────────────────

/// A scheduled task owned by a plugin.
#[derive(Debug)]
pub struct ScheduledTask {
    pub plugin_name: String,
    pub task_id: u32,
    pub remaining_ticks: u64,
    /// `None` = one-shot, `Some(n)` = repeating every `n` ticks.
    pub interval: Option<u64>,
}

/// Deferred side-effect requested by a plugin during a callback.
#[derive(Debug)]
pub enum PendingAction {
    SendMessage {
        player_name: String,
        message: String,
    },
    BroadcastMessage {
        message: String,
    },
    OpenMenu {
        player_name: String,
        menu: Menu,
    },
    CloseMenu {
        player_name: String,
    },
    GiveItem {
        player_name: String,
        item: ItemStack,
    },
    DropItem {
        location: Location,
        item: ItemStack,
    },
    GenerateEndPortal {
        world: String,
    },
    SetPreviouslyKilled {
        world: String,
        killed: bool,
    },
    InitiateDragonRespawn {
        world: String,
    },
    SpawnEntity {
        entity_type: String,
        location: Location,
    },
    SetEntityHealth {
        runtime_id: u64,
        health: f32,
    },
    RegisterCommand {
        name: String,
        description: String,
        plugin_name: String,
    },
    ScheduleTask {
        task: ScheduledTask,
    },
    CancelTask {
        plugin_name: String,
        task_id: u32,
    },
}

// ─── ServerApiImpl ───────────────────────────────────────────────────────────

/// Implements `ServerApi` over the host: reads and currency go straight to
/// it, every other write is accumulated as a PendingAction.
struct ServerApiImpl<'a> {
    host: &'a mut LocalHost,
    actions: Vec<PendingAction>,
}

impl<'a> ServerApiImpl<'a> {
    fn new(host: &'a mut LocalHost) -> Self {
        Self {
            host,
            actions: Vec::new(),
        }
    }

    fn take_actions(self) -> Vec<PendingAction> {
        self.actions
    }
}

impl ServerApi for ServerApiImpl<'_> {
    fn online_players(&self) -> Vec<PluginPlayer> {
        self.host.players().to_vec()
    }

    fn get_player(&self, name: &str) -> Option<PluginPlayer> {
        self.host.player(name).cloned()
    }

    fn has_permission(&self, player_name: &str, permission: &str) -> bool {
        self.host.has_permission(player_name, permission)
    }

    fn send_message(&mut self, player_name: &str, message: &str) {
        self.actions.push(PendingAction::SendMessage {
            player_name: player_name.to_string(),
            message: message.to_string(),
        });
    }

    fn broadcast_message(&mut self, message: &str) {
        self.actions.push(PendingAction::BroadcastMessage {
            message: message.to_string(),
        });
    }

    fn open_menu(&mut self, player_name: &str, menu: Menu) {
        self.actions.push(PendingAction::OpenMenu {
            player_name: player_name.to_string(),
            menu,
        });
    }

    fn close_menu(&mut self, player_name: &str) {
        self.actions.push(PendingAction::CloseMenu {
            player_name: player_name.to_string(),
        });
    }

    fn menu_slot(&self, player_name: &str, slot: usize) -> Option<ItemStack> {
        self.host
            .open_menu(player_name)
            .and_then(|menu| menu.get(slot))
            .cloned()
    }

    fn give_item(&mut self, player_name: &str, item: ItemStack) {
        self.actions.push(PendingAction::GiveItem {
            player_name: player_name.to_string(),
            item,
        });
    }

    fn drop_item(&mut self, location: &Location, item: ItemStack) {
        self.actions.push(PendingAction::DropItem {
            location: location.clone(),
            item,
        });
    }

    fn is_world_loaded(&self, world: &str) -> bool {
        self.host.is_world_loaded(world)
    }

    fn dragon_battle(&self, world: &str) -> Option<DragonBattle> {
        self.host.dragon_battle(world)
    }

    fn generate_end_portal(&mut self, world: &str) {
        self.actions.push(PendingAction::GenerateEndPortal {
            world: world.to_string(),
        });
    }

    fn set_previously_killed(&mut self, world: &str, killed: bool) {
        self.actions.push(PendingAction::SetPreviouslyKilled {
            world: world.to_string(),
            killed,
        });
    }

    fn initiate_dragon_respawn(&mut self, world: &str) {
        self.actions.push(PendingAction::InitiateDragonRespawn {
            world: world.to_string(),
        });
    }

    fn spawn_entity(&mut self, entity_type: &str, location: &Location) {
        self.actions.push(PendingAction::SpawnEntity {
            entity_type: entity_type.to_string(),
            location: location.clone(),
        });
    }

    fn set_entity_health(&mut self, runtime_id: u64, health: f32) {
        self.actions
            .push(PendingAction::SetEntityHealth { runtime_id, health });
    }

    fn economy_available(&self, provider: &str) -> bool {
        self.host.economy_available(provider)
    }

    fn balance(&self, provider: &str, player_name: &str) -> f64 {
        self.host.balance(provider, player_name)
    }

    fn withdraw(&mut self, provider: &str, player_name: &str, amount: f64) -> bool {
        self.host.withdraw(provider, player_name, amount)
    }

    fn deposit(&mut self, provider: &str, player_name: &str, amount: f64) -> bool {
        self.host.deposit(provider, player_name, amount)
    }

    fn format_currency(&self, _provider: &str, _amount: f64) -> Option<String> {
        None
    }

    fn get_tick(&self) -> u64 {
        self.host.tick()
    }

    fn schedule_delayed(&mut self, plugin_name: &str, delay_ticks: u64, task_id: u32) {
        self.actions.push(PendingAction::ScheduleTask {
            task: ScheduledTask {
                plugin_name: plugin_name.to_string(),
                task_id,
                remaining_ticks: delay_ticks,
                interval: None,
            },
        });
    }

    fn schedule_repeating(
        &mut self,
        plugin_name: &str,
        delay_ticks: u64,
        interval_ticks: u64,
        task_id: u32,
    ) {
        self.actions.push(PendingAction::ScheduleTask {
            task: ScheduledTask {
                plugin_name: plugin_name.to_string(),
                task_id,
                remaining_ticks: delay_ticks,
                interval: Some(interval_ticks),
            },
        });
    }

    fn cancel_task(&mut self, plugin_name: &str, task_id: u32) {
        self.actions.push(PendingAction::CancelTask {
            plugin_name: plugin_name.to_string(),
            task_id,
        });
    }

    fn register_command(&mut self, name: &str, description: &str, plugin_name: &str) {
        self.actions.push(PendingAction::RegisterCommand {
            name: name.to_string(),
            description: description.to_string(),
            plugin_name: plugin_name.to_string(),
        });
    }
}

// ─── PluginManager ───────────────────────────────────────────────────────────

/// Manages all loaded plugins, their scheduled tasks, and command registrations.
pub struct PluginManager {
    plugins: Vec<Box<dyn Plugin>>,
    tasks: Vec<ScheduledTask>,
    /// Commands registered by plugins: command_name → plugin_name.
    pub plugin_commands: HashMap<String, String>,
    plugins_dir: PathBuf,
}

impl PluginManager {
    /// A manager keeping plugin data folders under `plugins_dir`.
    pub fn new(plugins_dir: impl AsRef<Path>) -> Self {
        Self {
            plugins: Vec::new(),
            tasks: Vec::new(),
            plugin_commands: HashMap::new(),
            plugins_dir: plugins_dir.as_ref().to_path_buf(),
        }
    }

    /// Data folder of a plugin: `<plugins_dir>/<name>`.
    pub fn plugin_data_dir(&self, plugin_name: &str) -> PathBuf {
        self.plugins_dir.join(plugin_name)
    }

    /// Register a plugin (call before enable_all).
    pub fn register(&mut self, plugin: Box<dyn Plugin>) {
        info!("Registered plugin: {}", plugin.info().name);
        self.plugins.push(plugin);
    }

    /// Enable all registered plugins and apply what they asked for.
    pub fn enable_all(&mut self, host: &mut LocalHost) {
        let mut all_actions = Vec::new();
        for plugin in &mut self.plugins {
            let mut api = ServerApiImpl::new(host);
            plugin.on_enable(&mut api);
            all_actions.extend(api.take_actions());
        }
        self.settle(all_actions, host);
    }

    /// Disable all registered plugins.
    pub fn disable_all(&mut self) {
        for plugin in &mut self.plugins {
            plugin.on_disable();
        }
    }

    /// Dispatch an event to all plugins. Returns the combined result and pending actions.
    pub fn dispatch(
        &mut self,
        event: &PluginEvent,
        host: &mut LocalHost,
    ) -> (EventResult, Vec<PendingAction>) {
        let cancellable = event.is_cancellable();
        let mut all_actions = Vec::new();
        let mut final_result = EventResult::Continue;

        for plugin in &mut self.plugins {
            let mut api = ServerApiImpl::new(host);
            let result = plugin.on_event(event, &mut api);
            all_actions.extend(api.take_actions());

            if cancellable && result == EventResult::Cancelled {
                final_result = EventResult::Cancelled;
                break; // Stop propagation
            }
        }

        (final_result, all_actions)
    }

    /// Dispatch an event and apply everything it causes, follow-up events included.
    pub fn fire(&mut self, event: &PluginEvent, host: &mut LocalHost) -> EventResult {
        let (result, actions) = self.dispatch(event, host);
        self.settle(actions, host);
        result
    }

    /// Tick the scheduler and apply the actions of fired tasks.
    pub fn tick_scheduler(&mut self, host: &mut LocalHost) {
        let mut all_actions = Vec::new();
        let mut fired: Vec<(String, u32)> = Vec::new();

        // Decrement and collect fired tasks
        for task in &mut self.tasks {
            if task.remaining_ticks > 0 {
                task.remaining_ticks -= 1;
            }
            if task.remaining_ticks == 0 {
                fired.push((task.plugin_name.clone(), task.task_id));
                if let Some(interval) = task.interval {
                    task.remaining_ticks = interval;
                }
            }
        }

        // Remove one-shot tasks that fired
        self.tasks
            .retain(|t| t.remaining_ticks > 0 || t.interval.is_some());

        for (plugin_name, task_id) in fired {
            if let Some(plugin) = self
                .plugins
                .iter_mut()
                .find(|p| p.info().name == plugin_name)
            {
                let mut api = ServerApiImpl::new(host);
                plugin.on_task(task_id, &mut api);
                all_actions.extend(api.take_actions());
            }
        }

        self.settle(all_actions, host);
    }

    /// Run a plugin-registered command and apply its actions. `None` when no
    /// plugin owns the command.
    pub fn handle_command(
        &mut self,
        command: &str,
        args: &[String],
        sender: &str,
        host: &mut LocalHost,
    ) -> Option<Option<String>> {
        let plugin_name = self.plugin_commands.get(command)?.clone();
        let plugin = self
            .plugins
            .iter_mut()
            .find(|p| p.info().name == plugin_name)?;

        let mut api = ServerApiImpl::new(host);
        let response = plugin.on_command(command, args, sender, &mut api);
        let actions = api.take_actions();
        self.settle(actions, host);
        Some(response)
    }

    /// Load configs for all plugins from `<plugins_dir>/<name>/config.json`,
    /// writing the default when the file is missing.
    pub fn load_configs(&mut self) {
        for plugin in &mut self.plugins {
            let info = plugin.info();
            if let Some(default_config) = plugin.default_config() {
                let plugin_dir = self.plugins_dir.join(&info.name);
                let config_path = plugin_dir.join("config.json");

                let config = if config_path.exists() {
                    match std::fs::read_to_string(&config_path) {
                        Ok(data) => match serde_json::from_str(&data) {
                            Ok(v) => v,
                            Err(e) => {
                                warn!("Failed to parse config for {}: {e}", info.name);
                                default_config.clone()
                            }
                        },
                        Err(e) => {
                            warn!("Failed to read config for {}: {e}", info.name);
                            default_config.clone()
                        }
                    }
                } else {
                    if let Err(e) = std::fs::create_dir_all(&plugin_dir) {
                        warn!("Failed to create {}: {e}", plugin_dir.display());
                    }
                    match serde_json::to_string_pretty(&default_config) {
                        Ok(json) => {
                            if let Err(e) = std::fs::write(&config_path, json) {
                                warn!("Failed to write default config for {}: {e}", info.name);
                            }
                        }
                        Err(e) => warn!("Failed to serialize config for {}: {e}", info.name),
                    }
                    default_config
                };

                plugin.load_config(config);
            }
        }
    }

    /// Apply actions to the host, then dispatch the events that caused, until quiet.
    fn settle(&mut self, actions: Vec<PendingAction>, host: &mut LocalHost) {
        let mut pending = self.apply_internal_actions(actions);
        for _ in 0..MAX_SETTLE_ROUNDS {
            if pending.is_empty() {
                return;
            }
            let events = host.apply(std::mem::take(&mut pending));
            for event in &events {
                let (_, actions) = self.dispatch(event, host);
                pending.extend(self.apply_internal_actions(actions));
            }
        }
        if !pending.is_empty() {
            warn!("Dropping {} action(s) from a runaway event chain", pending.len());
        }
    }

    /// Apply internal actions (RegisterCommand, ScheduleTask, CancelTask)
    /// immediately. Returns the actions meant for the world.
    fn apply_internal_actions(&mut self, actions: Vec<PendingAction>) -> Vec<PendingAction> {
        let mut world_actions = Vec::new();
        for action in actions {
            match action {
                PendingAction::RegisterCommand {
                    name, plugin_name, ..
                } => {
                    debug!("{plugin_name} registered /{name}");
                    self.plugin_commands.insert(name, plugin_name);
                }
                PendingAction::ScheduleTask { task } => {
                    self.tasks.push(task);
                }
                PendingAction::CancelTask {
                    plugin_name,
                    task_id,
                } => {
                    self.tasks
                        .retain(|t| !(t.plugin_name == plugin_name && t.task_id == task_id));
                }
                other => world_actions.push(other),
            }
        }
        world_actions
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

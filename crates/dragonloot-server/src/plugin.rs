//! `DragonPlugin`: the dragon loot plugin as the host sees it.

use std::path::{Path, PathBuf};

use dragonloot_command::{
    permissions, unknown_command, CommandRegistry, CommandResult, Subcommand, COMMAND_ALIASES,
    COMMAND_DESCRIPTION, COMMAND_NAME,
};
use dragonloot_economy::EconomyManager;
use dragonloot_editor::LootEditor;
use dragonloot_items::chat::fill;
use dragonloot_items::Messenger;
use dragonloot_loot::{LootStore, LootTable};
use dragonloot_plugin_api::{
    EventResult, ItemStack, Plugin, PluginEvent, PluginInfo, PluginPlayer, ServerApi,
};
use tracing::{debug, error, info, warn};

use crate::config::DragonConfig;
use crate::kill::KillManager;
use crate::menus::{self, DragonMenu, PendingConfirmations, SpawnPrice};
use crate::respawn;

pub const PLUGIN_NAME: &str = "DragonLoot";
pub const TICKS_PER_SECOND: u64 = 20;
pub const CONFIG_FILE: &str = "config.json";

const DRAGON_MOB: &str = "ender_dragon";
/// Repeating task that drops idle editor sessions.
const PRUNE_TASK_ID: u32 = 1;
const PRUNE_INTERVAL_TICKS: u64 = 60 * TICKS_PER_SECOND;

pub struct DragonPlugin {
    data_dir: PathBuf,
    config: DragonConfig,
    messenger: Messenger,
    loot: LootTable,
    editor: LootEditor,
    economy: EconomyManager,
    kills: KillManager,
    confirmations: PendingConfirmations,
    commands: CommandRegistry,
    prune_scheduled: bool,
}

impl DragonPlugin {
    /// A plugin keeping `loot.json` and `config.json` in `data_dir`.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref().to_path_buf();
        let config = DragonConfig::default();
        let messenger = Messenger::new(config.messages.prefix.clone());
        Self {
            loot: LootTable::new(&data_dir),
            editor: LootEditor::new(LootStore::new(&data_dir), PLUGIN_NAME, messenger.clone()),
            economy: EconomyManager::default(),
            kills: KillManager::new(config.dragon_kill.cooldown_secs),
            confirmations: PendingConfirmations::default(),
            commands: CommandRegistry::new(),
            prune_scheduled: false,
            messenger,
            config,
            data_dir,
        }
    }

    pub fn config(&self) -> &DragonConfig {
        &self.config
    }

    pub fn loot(&self) -> &LootTable {
        &self.loot
    }

    pub fn editor(&self) -> &LootEditor {
        &self.editor
    }

    /// Tab completions for `/dragon`.
    pub fn complete(&self, args: &[String], sender: &str, api: &dyn ServerApi) -> Vec<String> {
        self.commands
            .complete(args, |p| api.has_permission(sender, p))
    }

    fn apply_config(&mut self, config: DragonConfig) {
        self.messenger = Messenger::new(config.messages.prefix.clone());
        self.editor.set_messenger(self.messenger.clone());
        let idle_ticks = config
            .editor
            .session_timeout_secs
            .saturating_mul(TICKS_PER_SECOND);
        self.editor.set_idle_timeout_ticks(idle_ticks);
        self.kills.set_cooldown_secs(config.dragon_kill.cooldown_secs);
        self.config = config;
    }

    fn schedule_prune(&mut self, api: &mut dyn ServerApi) {
        if self.prune_scheduled {
            api.cancel_task(PLUGIN_NAME, PRUNE_TASK_ID);
            self.prune_scheduled = false;
        }
        if self.config.editor.session_timeout_secs > 0 {
            api.schedule_repeating(
                PLUGIN_NAME,
                PRUNE_INTERVAL_TICKS,
                PRUNE_INTERVAL_TICKS,
                PRUNE_TASK_ID,
            );
            self.prune_scheduled = true;
        }
    }

    /// Send a command result to the sender, and its broadcast to everyone.
    fn deliver(&self, sender: &str, result: CommandResult, api: &mut dyn ServerApi) {
        for line in &result.messages {
            self.messenger.send(api, sender, line);
        }
        if let Some(broadcast) = &result.broadcast {
            self.messenger.broadcast(api, broadcast);
        }
    }

    // ─── Commands ────────────────────────────────────────────────────────────

    fn run_command(&mut self, args: &[String], sender: &str, api: &mut dyn ServerApi) -> CommandResult {
        let name = match Subcommand::parse(args) {
            Subcommand::Help => return CommandResult::lines(true, self.commands.help_lines()),
            Subcommand::Unknown(_) => return unknown_command(),
            Subcommand::Spawn => "spawn",
            Subcommand::Kill => "kill",
            Subcommand::Reload => "reload",
            Subcommand::Menu => "menu",
            Subcommand::Editor => "editor",
        };
        if !self.commands.permitted(name, |p| api.has_permission(sender, p)) {
            return CommandResult::err(&self.config.messages.no_permission);
        }

        match name {
            "spawn" => respawn::spawn_dragon(sender, &self.config, &self.economy, api),
            "kill" => self.kills.kill_dragon(sender, &self.config, api),
            "reload" => self.reload_command(api),
            _ => {
                let Some(player) = api.get_player(sender) else {
                    return CommandResult::err(&self.config.messages.players_only);
                };
                if name == "menu" {
                    self.open_main_menu(&player, api);
                } else {
                    self.editor.open_root(&player, api, &self.loot);
                }
                CommandResult::lines(true, Vec::new())
            }
        }
    }

    fn reload_command(&mut self, api: &mut dyn ServerApi) -> CommandResult {
        let mut result = CommandResult::ok("&eReloading plugin configuration...");
        if self.reload(api) {
            let messages = &self.config.messages;
            result.push(&messages.reload_success);
            let details = fill(&messages.reload_details, "config", "✓");
            result.push(fill(&details, "loot", &self.loot.item_count().to_string()));
        } else {
            result.success = false;
            result.push(&self.config.messages.reload_failed);
        }
        result
    }

    /// Re-read `config.json` and the loot document; pick the currency provider again.
    pub fn reload(&mut self, api: &mut dyn ServerApi) -> bool {
        let path = self.data_dir.join(CONFIG_FILE);
        if path.exists() {
            match DragonConfig::load(&path) {
                Ok(config) => self.apply_config(config),
                Err(e) => {
                    error!("Failed to reload {}: {e}", path.display());
                    return false;
                }
            }
        }
        let loot_ok = self.loot.reload();
        self.economy.reload(self.config.economy.clone(), api);
        self.schedule_prune(api);
        loot_ok
    }

    // ─── Menus ───────────────────────────────────────────────────────────────

    fn is_exempt(sender: &str, api: &dyn ServerApi) -> bool {
        api.has_permission(sender, permissions::SPAWN_FREE)
            || api.has_permission(sender, permissions::ADMIN_MENU)
    }

    fn spawn_price(&self, player: &PluginPlayer, api: &dyn ServerApi) -> SpawnPrice {
        if Self::is_exempt(&player.name, api) {
            return SpawnPrice::Exempt;
        }
        if !self.economy.is_enabled(api) {
            return SpawnPrice::Free;
        }
        let cost = self.economy.spawn_cost();
        let balance = self.economy.balance(&player.name, api);
        SpawnPrice::Paid {
            cost: self.economy.format(cost, api),
            balance: self.economy.format(balance, api),
            missing: (balance < cost).then(|| self.economy.format(cost - balance, api)),
        }
    }

    fn open_main_menu(&self, player: &PluginPlayer, api: &mut dyn ServerApi) {
        let price = self.spawn_price(player, api);
        let admin = api.has_permission(&player.name, permissions::ADMIN_MENU);
        api.open_menu(
            &player.name,
            menus::main_menu(&price, admin, self.loot.item_count()),
        );
    }

    fn handle_menu_click(
        &mut self,
        menu: DragonMenu,
        player: &PluginPlayer,
        slot: usize,
        item: Option<&ItemStack>,
        api: &mut dyn ServerApi,
    ) {
        if item.map_or(true, ItemStack::is_empty) {
            return;
        }
        let name = player.name.as_str();
        let admin = api.has_permission(name, permissions::ADMIN_MENU);
        match (menu, slot) {
            (DragonMenu::Main, menus::KILL_SLOT) => {
                if !admin {
                    self.messenger
                        .send(api, name, &self.config.messages.no_permission);
                    return;
                }
                self.confirmations.insert(&player.uuid);
                api.open_menu(name, menus::kill_confirmation());
            }
            (DragonMenu::Main, menus::SPAWN_SLOT) => {
                if !admin && !api.has_permission(name, permissions::MENU_USE) {
                    self.messenger
                        .send(api, name, &self.config.messages.no_permission);
                    return;
                }
                api.close_menu(name);
                let result = respawn::spawn_dragon(name, &self.config, &self.economy, api);
                self.deliver(name, result, api);
            }
            (DragonMenu::Main, menus::LOOT_SLOT) => {
                if !admin {
                    self.messenger
                        .send(api, name, &self.config.messages.no_permission);
                    return;
                }
                self.editor.open_root(player, api, &self.loot);
            }
            (DragonMenu::KillConfirm, _) => {
                if !self.confirmations.take(&player.uuid) {
                    api.close_menu(name);
                    return;
                }
                match slot {
                    menus::CONFIRM_SLOT => {
                        api.close_menu(name);
                        let result = self.kills.kill_dragon(name, &self.config, api);
                        self.deliver(name, result, api);
                    }
                    menus::CANCEL_SLOT => {
                        self.messenger.send(api, name, "&7Action cancelled.");
                        self.open_main_menu(player, api);
                    }
                    // Any other click keeps the confirmation open
                    _ => self.confirmations.insert(&player.uuid),
                }
            }
            _ => {}
        }
    }
}

impl Plugin for DragonPlugin {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            name: PLUGIN_NAME.into(),
            version: env!("CARGO_PKG_VERSION").into(),
            description: "Configurable Ender Dragon loot with an in-game editor".into(),
            author: "DragonLoot contributors".into(),
        }
    }

    fn on_enable(&mut self, api: &mut dyn ServerApi) {
        self.loot.load();
        info!("Loot table loaded with {} item(s)", self.loot.item_count());

        for name in std::iter::once(COMMAND_NAME).chain(COMMAND_ALIASES.iter().copied()) {
            api.register_command(name, COMMAND_DESCRIPTION, PLUGIN_NAME);
        }

        self.economy.reload(self.config.economy.clone(), api);
        info!("Economy provider: {}", self.economy.provider_name());

        self.schedule_prune(api);
        info!("{PLUGIN_NAME} enabled");
    }

    fn on_disable(&mut self) {
        info!("{PLUGIN_NAME} disabled");
    }

    fn on_event(&mut self, event: &PluginEvent, api: &mut dyn ServerApi) -> EventResult {
        match event {
            PluginEvent::PlayerChat { player, message } => {
                if self.editor.input_request(&player.uuid).is_none() {
                    return EventResult::Continue;
                }
                self.editor.queue_response(player, message, api);
                EventResult::Cancelled
            }
            PluginEvent::MenuClick {
                player,
                title,
                slot,
                item,
            } => {
                if LootEditor::is_editor_menu(title) {
                    return self.editor.handle_click(
                        player,
                        title,
                        *slot,
                        item.as_ref(),
                        api,
                        &mut self.loot,
                    );
                }
                match DragonMenu::from_title(title) {
                    Some(menu) => {
                        self.handle_menu_click(menu, player, *slot, item.as_ref(), api);
                        EventResult::Cancelled
                    }
                    None => EventResult::Continue,
                }
            }
            PluginEvent::MenuClose { player, title } => {
                if DragonMenu::from_title(title) == Some(DragonMenu::KillConfirm) {
                    self.confirmations.take(&player.uuid);
                }
                EventResult::Continue
            }
            PluginEvent::PlayerQuit { player } => {
                self.editor.forget(&player.uuid);
                self.confirmations.take(&player.uuid);
                EventResult::Continue
            }
            PluginEvent::MobDeath {
                mob_type, location, ..
            } => {
                let kind = mob_type.strip_prefix("minecraft:").unwrap_or(mob_type);
                if kind == DRAGON_MOB {
                    self.loot.spawn_loot(location, api);
                }
                EventResult::Continue
            }
            _ => EventResult::Continue,
        }
    }

    fn on_task(&mut self, task_id: u32, api: &mut dyn ServerApi) {
        if task_id == PRUNE_TASK_ID {
            self.editor.evict_idle(api.get_tick());
        } else if !self.editor.run_task(task_id, api) {
            debug!("Ignoring unknown task {task_id}");
        }
    }

    fn on_command(
        &mut self,
        command: &str,
        args: &[String],
        sender: &str,
        api: &mut dyn ServerApi,
    ) -> Option<String> {
        if command != COMMAND_NAME && !COMMAND_ALIASES.contains(&command) {
            return None;
        }
        let result = self.run_command(args, sender, api);
        self.deliver(sender, result, api);
        None
    }

    fn default_config(&self) -> Option<serde_json::Value> {
        serde_json::to_value(DragonConfig::default()).ok()
    }

    fn load_config(&mut self, config: serde_json::Value) {
        match DragonConfig::from_value(config) {
            Ok(config) => self.apply_config(config),
            Err(e) => warn!("Invalid {PLUGIN_NAME} config, using defaults: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dragonloot_items::markup;
    use dragonloot_plugin_api::testing::{RecordingApi, CONSOLE};
    use dragonloot_plugin_api::{DragonBattle, Location, PluginDragon, RespawnPhase};
    use tempfile::TempDir;

    const END: &str = "world_the_end";

    struct Fixture {
        dir: TempDir,
        plugin: DragonPlugin,
        api: RecordingApi,
        admin: PluginPlayer,
        steve: PluginPlayer,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let mut api = RecordingApi::new();
        api.worlds.insert(END.into());
        api.battles.insert(
            END.into(),
            DragonBattle {
                dragon: Some(PluginDragon {
                    runtime_id: 9,
                    health: 200.0,
                }),
                respawn_phase: RespawnPhase::None,
                portal_location: Some(Location::new(END, 0.0, 64.0, 0.0)),
                previously_killed: true,
            },
        );
        let admin = api.join("Admin");
        for perm in [
            permissions::ADMIN_MENU,
            permissions::ADMIN_KILL,
            permissions::ADMIN_LOOT,
        ] {
            api.grant("Admin", perm);
        }
        let steve = api.join("Steve");
        api.grant("Steve", permissions::MENU_USE);
        api.grant("Steve", permissions::SPAWN);

        std::fs::write(
            dir.path().join("loot.json"),
            r#"{ "loot": [ { "material": "DIAMOND", "amount": "1", "chance": 100.0 } ] }"#,
        )
        .unwrap();
        let mut plugin = DragonPlugin::new(dir.path());
        plugin.on_enable(&mut api);
        Fixture {
            dir,
            plugin,
            api,
            admin,
            steve,
        }
    }

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    fn said(api: &RecordingApi, player: &str, text: &str) -> bool {
        let text = markup::decode(text);
        api.messages_to(player).iter().any(|m| m.contains(&text))
    }

    fn click(f: &mut Fixture, admin: bool, slot: usize) -> EventResult {
        let player = if admin { f.admin.clone() } else { f.steve.clone() };
        let menu = f.api.open_menu_of(&player.name).cloned().unwrap();
        let event = PluginEvent::MenuClick {
            player,
            title: menu.title.clone(),
            slot,
            item: menu.get(slot).cloned(),
        };
        f.plugin.on_event(&event, &mut f.api)
    }

    #[test]
    fn enable_registers_command_and_aliases() {
        let f = fixture();
        let names: Vec<&str> = f.api.commands.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["dragon", "dl", "dragonloot"]);
        assert_eq!(f.plugin.loot().item_count(), 1);
        assert!(f.api.scheduled.is_empty());
    }

    #[test]
    fn enable_creates_the_default_loot_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut api = RecordingApi::new();
        let mut plugin = DragonPlugin::new(dir.path());
        plugin.on_enable(&mut api);
        assert!(dir.path().join("loot.json").exists());
        assert!(plugin.loot().item_count() > 0);
    }

    #[test]
    fn help_and_unknown() {
        let mut f = fixture();
        assert_eq!(f.plugin.on_command("dragon", &[], CONSOLE, &mut f.api), None);
        assert!(said(&f.api, CONSOLE, "&e&lDragonLoot Commands:"));
        assert!(said(&f.api, CONSOLE, "&7/dragon kill &f- Instantly kill the Ender Dragon"));

        f.plugin.on_command("dl", &args("fly"), CONSOLE, &mut f.api);
        assert!(said(&f.api, CONSOLE, "&cUnknown command."));
    }

    #[test]
    fn other_commands_are_ignored() {
        let mut f = fixture();
        assert_eq!(f.plugin.on_command("home", &[], CONSOLE, &mut f.api), None);
        assert!(f.api.messages.is_empty());
    }

    #[test]
    fn permissions_are_checked() {
        let mut f = fixture();
        f.plugin.on_command("dragon", &args("kill"), "Steve", &mut f.api);
        assert!(said(&f.api, "Steve", "&cYou don't have permission to do that!"));
        assert!(f.api.health_set.is_empty());
    }

    #[test]
    fn menu_is_player_only() {
        let mut f = fixture();
        f.plugin.on_command("dragon", &args("menu"), CONSOLE, &mut f.api);
        assert!(said(&f.api, CONSOLE, "&cOnly players can use this command."));

        f.plugin.on_command("dragon", &args("menu"), "Steve", &mut f.api);
        let menu = f.api.open_menu_of("Steve").unwrap();
        assert_eq!(menu.title, menus::MAIN_TITLE);
        assert!(menu.get(menus::KILL_SLOT).is_none());
        assert_eq!(
            menu.get(menus::SPAWN_SLOT).unwrap().lore[2],
            "§aFree (Economy disabled)"
        );
    }

    #[test]
    fn menu_shows_the_price() {
        let mut f = fixture();
        f.api.add_economy("vault", "Steve", 250.0);
        f.plugin.reload(&mut f.api);

        f.plugin.on_command("dragon", &args("menu"), "Steve", &mut f.api);
        let lore = &f.api.open_menu_of("Steve").unwrap().get(menus::SPAWN_SLOT).unwrap().lore;
        assert_eq!(lore[2], "§6Cost: §f1000.00 coins");
        assert_eq!(lore[3], "§6Your Balance: §f250.00 coins");
        assert_eq!(lore[5], "§cNeed 750.00 coins more");
    }

    #[test]
    fn kill_through_the_confirmation() {
        let mut f = fixture();
        f.plugin.on_command("dragon", &args("menu"), "Admin", &mut f.api);
        assert_eq!(click(&mut f, true, menus::KILL_SLOT), EventResult::Cancelled);
        assert_eq!(f.api.open_menu_of("Admin").unwrap().title, menus::CONFIRM_TITLE);

        click(&mut f, true, menus::CONFIRM_SLOT);
        assert_eq!(f.api.health_set, vec![(9, 0.0)]);
        assert!(f.api.open_menu_of("Admin").is_none());
        assert_eq!(f.api.broadcasts.len(), 1);
        assert!(f.api.broadcasts[0].contains("Admin has instantly killed the Ender Dragon!"));
    }

    #[test]
    fn cancel_goes_back_to_the_main_menu() {
        let mut f = fixture();
        f.plugin.on_command("dragon", &args("menu"), "Admin", &mut f.api);
        click(&mut f, true, menus::KILL_SLOT);
        click(&mut f, true, menus::CANCEL_SLOT);
        assert!(said(&f.api, "Admin", "&7Action cancelled."));
        assert_eq!(f.api.open_menu_of("Admin").unwrap().title, menus::MAIN_TITLE);
        assert!(f.api.health_set.is_empty());
    }

    #[test]
    fn stale_confirmation_just_closes() {
        let mut f = fixture();
        f.api.open_menu("Admin", menus::kill_confirmation());
        click(&mut f, true, menus::CONFIRM_SLOT);
        assert!(f.api.health_set.is_empty());
        assert!(f.api.open_menu_of("Admin").is_none());
    }

    #[test]
    fn closing_the_confirmation_forgets_it() {
        let mut f = fixture();
        f.plugin.on_command("dragon", &args("menu"), "Admin", &mut f.api);
        click(&mut f, true, menus::KILL_SLOT);
        let close = PluginEvent::MenuClose {
            player: f.admin.clone(),
            title: menus::CONFIRM_TITLE.into(),
        };
        f.plugin.on_event(&close, &mut f.api);

        f.api.open_menu("Admin", menus::kill_confirmation());
        click(&mut f, true, menus::CONFIRM_SLOT);
        assert!(f.api.health_set.is_empty());
    }

    #[test]
    fn spawn_button_respawns_when_the_dragon_is_dead() {
        let mut f = fixture();
        f.api.battles.get_mut(END).unwrap().dragon = None;
        f.plugin.on_command("dragon", &args("menu"), "Steve", &mut f.api);
        click(&mut f, false, menus::SPAWN_SLOT);
        assert_eq!(f.api.respawns_initiated, vec![END]);
        assert!(said(&f.api, "Steve", "&aEnder Dragon respawn sequence started!"));
    }

    #[test]
    fn loot_button_opens_the_editor() {
        let mut f = fixture();
        f.plugin.on_command("dragon", &args("menu"), "Admin", &mut f.api);
        click(&mut f, true, menus::LOOT_SLOT);
        let title = &f.api.open_menu_of("Admin").unwrap().title;
        assert!(LootEditor::is_editor_menu(title));
    }

    #[test]
    fn dragon_death_drops_loot() {
        let mut f = fixture();
        let at = Location::new(END, 0.0, 70.0, 0.0);
        let death = PluginEvent::MobDeath {
            mob_type: "minecraft:ender_dragon".into(),
            runtime_id: 9,
            location: at.clone(),
            killer_runtime_id: None,
        };
        f.plugin.on_event(&death, &mut f.api);
        assert_eq!(f.api.dropped.len(), 1);
        assert_eq!(f.api.dropped[0].0, at);
        assert_eq!(f.api.dropped[0].1.material, "DIAMOND");

        let zombie = PluginEvent::MobDeath {
            mob_type: "zombie".into(),
            runtime_id: 3,
            location: at,
            killer_runtime_id: None,
        };
        f.plugin.on_event(&zombie, &mut f.api);
        assert_eq!(f.api.dropped.len(), 1);
    }

    #[test]
    fn chat_answers_the_editor_prompt() {
        use dragonloot_editor::layout::{CHANCE_SLOT, ROOT_LOOT_SLOT};

        let mut f = fixture();
        f.plugin.on_command("dragon", &args("editor"), "Admin", &mut f.api);
        click(&mut f, true, ROOT_LOOT_SLOT);
        click(&mut f, true, 10);
        click(&mut f, true, CHANCE_SLOT);
        assert!(f.plugin.editor().input_request(&f.admin.uuid).is_some());

        let before = f.api.scheduled.len();
        let chat = PluginEvent::PlayerChat {
            player: f.admin.clone(),
            message: "40".into(),
        };
        assert_eq!(f.plugin.on_event(&chat, &mut f.api), EventResult::Cancelled);
        let queued: Vec<u32> = f.api.scheduled[before..].iter().map(|c| c.task_id).collect();
        assert!(!queued.is_empty());
        for id in queued {
            f.plugin.on_task(id, &mut f.api);
        }
        let session = f.plugin.editor().session(&f.admin.uuid).unwrap();
        assert_eq!(session.entry.chance, 40.0);

        let quit = PluginEvent::PlayerQuit {
            player: f.admin.clone(),
        };
        f.plugin.on_event(&quit, &mut f.api);
        assert_eq!(f.plugin.editor().session_count(), 0);
    }

    #[test]
    fn chat_passes_through_without_a_prompt() {
        let mut f = fixture();
        let chat = PluginEvent::PlayerChat {
            player: f.steve.clone(),
            message: "hello".into(),
        };
        assert_eq!(f.plugin.on_event(&chat, &mut f.api), EventResult::Continue);
    }

    #[test]
    fn reload_reads_config_and_loot() {
        let mut f = fixture();
        std::fs::write(
            f.dir.path().join(CONFIG_FILE),
            r#"{ "editor": { "session_timeout_secs": 600 }, "messages": { "prefix": "[DL] " } }"#,
        )
        .unwrap();
        f.plugin.on_command("dragon", &args("reload"), CONSOLE, &mut f.api);
        assert!(said(&f.api, CONSOLE, "Configuration reloaded successfully!"));
        assert!(said(&f.api, CONSOLE, "&7Config: ✓ | Loot items: 1"));
        assert_eq!(f.plugin.config().editor.session_timeout_secs, 600);
        assert!(f.api.last_message_to(CONSOLE).unwrap().starts_with("[DL] "));
        assert_eq!(f.api.scheduled.len(), 1);
        assert_eq!(f.api.scheduled[0].interval_ticks, Some(PRUNE_INTERVAL_TICKS));
    }

    #[test]
    fn reload_reports_a_broken_config() {
        let mut f = fixture();
        std::fs::write(f.dir.path().join(CONFIG_FILE), "{ broken").unwrap();
        f.plugin.on_command("dragon", &args("reload"), CONSOLE, &mut f.api);
        assert!(said(&f.api, CONSOLE, "&cFailed to reload configuration!"));
    }

    #[test]
    fn config_loading() {
        let mut plugin = DragonPlugin::new("unused");
        let defaults = plugin.default_config().unwrap();
        assert_eq!(defaults["dragon_kill"]["cooldown_secs"], 300);

        plugin.load_config(serde_json::json!({ "end_world": "the_end" }));
        assert_eq!(plugin.config().end_world, "the_end");

        plugin.load_config(serde_json::json!({ "end_world": 5 }));
        assert_eq!(plugin.config().end_world, "the_end");
    }

    #[test]
    fn huge_timeouts_saturate() {
        let mut f = fixture();
        f.plugin.load_config(serde_json::json!({
            "editor": { "session_timeout_secs": u64::MAX },
            "dragon_kill": { "cooldown_secs": u64::MAX },
        }));
        assert_eq!(f.plugin.config().editor.session_timeout_secs, u64::MAX);

        f.api.tick = 40;
        f.plugin.on_command("dragon", &args("kill"), "Admin", &mut f.api);
        assert_eq!(f.api.health_set, vec![(9, 0.0)]);
        f.api.tick = u64::MAX - 1;
        f.plugin.on_command("dragon", &args("kill"), "Admin", &mut f.api);
        assert_eq!(f.api.health_set.len(), 1);
        assert!(said(&f.api, "Admin", "on cooldown"));

        let admin = f.admin.clone();
        f.plugin.editor.open_item_editor(&admin, 0, &mut f.api);
        assert_eq!(f.plugin.editor().session_count(), 1);
        f.plugin.on_task(PRUNE_TASK_ID, &mut f.api);
        assert_eq!(f.plugin.editor().session_count(), 1);
    }

    #[test]
    fn completion_respects_permissions() {
        let f = fixture();
        assert_eq!(f.plugin.complete(&args("s"), "Steve", &f.api), vec!["spawn"]);
        assert_eq!(
            f.plugin.complete(&[], "Steve", &f.api),
            vec!["spawn", "menu"]
        );
        assert_eq!(f.plugin.complete(&args("k"), "Admin", &f.api), vec!["kill"]);
    }
}

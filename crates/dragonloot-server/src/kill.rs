//! Instant dragon kill with a per-player cooldown.

use std::collections::HashMap;

use dragonloot_command::{permissions, CommandResult};
use dragonloot_items::chat::fill;
use dragonloot_plugin_api::ServerApi;
use tracing::{info, warn};

use crate::config::DragonConfig;
use crate::plugin::TICKS_PER_SECOND;

#[derive(Debug, Default)]
pub struct KillManager {
    cooldown_ticks: u64,
    /// Player UUID to the tick their cooldown ends.
    cooldowns: HashMap<String, u64>,
}

impl KillManager {
    pub fn new(cooldown_secs: u64) -> Self {
        Self {
            cooldown_ticks: cooldown_secs.saturating_mul(TICKS_PER_SECOND),
            cooldowns: HashMap::new(),
        }
    }

    /// Change the cooldown length. Running cooldowns keep their end tick.
    pub fn set_cooldown_secs(&mut self, secs: u64) {
        self.cooldown_ticks = secs.saturating_mul(TICKS_PER_SECOND);
    }

    /// Whole seconds left, rounded up. 0 when none.
    pub fn cooldown_remaining_secs(&self, uuid: &str, now_tick: u64) -> u64 {
        self.cooldowns
            .get(uuid)
            .map(|&end| end.saturating_sub(now_tick).div_ceil(TICKS_PER_SECOND))
            .unwrap_or(0)
    }

    pub fn clear_cooldown(&mut self, uuid: &str) {
        self.cooldowns.remove(uuid);
    }

    /// Kill the dragon of the end world. The console has no cooldown.
    pub fn kill_dragon(
        &mut self,
        sender: &str,
        config: &DragonConfig,
        api: &mut dyn ServerApi,
    ) -> CommandResult {
        let messages = &config.messages;
        if !api.has_permission(sender, permissions::ADMIN_KILL) {
            return CommandResult::err(&messages.no_permission);
        }

        let now = api.get_tick();
        let player = api.get_player(sender);
        if let Some(player) = &player {
            let remaining = self.cooldown_remaining_secs(&player.uuid, now);
            if remaining > 0 {
                return CommandResult::err(fill(
                    &messages.kill_cooldown,
                    "time",
                    &remaining.to_string(),
                ));
            }
        }

        let world = config.end_world.as_str();
        if !api.is_world_loaded(world) {
            warn!("The End world ({world}) is not loaded");
            return CommandResult::err("&cThe End world is not loaded!");
        }
        let Some(battle) = api.dragon_battle(world) else {
            warn!("No dragon battle found in world: {world}");
            return CommandResult::err("&cNo DragonBattle found in The End!");
        };
        let Some(dragon) = battle.dragon.filter(|d| d.health > 0.0) else {
            return CommandResult::err(&messages.kill_no_dragon);
        };

        api.set_entity_health(dragon.runtime_id, 0.0);
        if let Some(player) = &player {
            if self.cooldown_ticks > 0 {
                self.cooldowns
                    .insert(player.uuid.clone(), now.saturating_add(self.cooldown_ticks));
            }
        }
        info!("{sender} killed the Ender Dragon using /dragon kill");

        CommandResult::ok(&messages.kill_success)
            .with_broadcast(fill(&messages.kill_broadcast, "player", sender))
    }
}

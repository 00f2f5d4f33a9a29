//! Dragon respawn: end crystals around the exit portal, paid for up front.

use dragonloot_command::{permissions, CommandResult};
use dragonloot_economy::EconomyManager;
use dragonloot_items::chat::fill;
use dragonloot_plugin_api::{Location, RespawnPhase, ServerApi};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::DragonConfig;

pub const CRYSTAL_ENTITY: &str = "end_crystal";
/// Crystal distance from the portal centre, in blocks.
pub const CRYSTAL_OFFSET: f64 = 3.0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RespawnError {
    #[error("end world {0} is not loaded")]
    WorldNotLoaded(String),
    #[error("no dragon battle in world {0}")]
    NoBattle(String),
    #[error("the dragon is alive")]
    DragonAlive,
    #[error("a respawn is already in progress")]
    InProgress,
    #[error("exit portal location is unknown")]
    NoPortal,
}

/// Crystal spots: north, south, east and west of the portal, block-centred,
/// one block up.
pub fn crystal_positions(center: &Location) -> [Location; 4] {
    let d = CRYSTAL_OFFSET;
    [
        center.offset(d + 0.5, 1.0, 0.5),
        center.offset(-d + 0.5, 1.0, 0.5),
        center.offset(0.5, 1.0, d + 0.5),
        center.offset(0.5, 1.0, -d + 0.5),
    ]
}

/// Start the respawn sequence of the end world's dragon fight.
pub fn respawn_dragon(end_world: &str, api: &mut dyn ServerApi) -> Result<(), RespawnError> {
    if !api.is_world_loaded(end_world) {
        return Err(RespawnError::WorldNotLoaded(end_world.to_string()));
    }
    let battle = api
        .dragon_battle(end_world)
        .ok_or_else(|| RespawnError::NoBattle(end_world.to_string()))?;

    api.generate_end_portal(end_world);
    if !battle.previously_killed {
        api.set_previously_killed(end_world, true);
    }

    if battle.dragon.is_some() {
        return Err(RespawnError::DragonAlive);
    }
    if battle.respawn_phase != RespawnPhase::None {
        return Err(RespawnError::InProgress);
    }
    let center = battle.portal_location.ok_or(RespawnError::NoPortal)?;

    for position in crystal_positions(&center) {
        api.spawn_entity(CRYSTAL_ENTITY, &position);
    }
    api.initiate_dragon_respawn(end_world);
    info!("Dragon respawn started in {end_world}");
    Ok(())
}

/// `/dragon spawn` and the spawn button: permission, payment, respawn, and a
/// refund when the respawn is refused after paying.
pub fn spawn_dragon(
    sender: &str,
    config: &DragonConfig,
    economy: &EconomyManager,
    api: &mut dyn ServerApi,
) -> CommandResult {
    let messages = &config.messages;
    let admin = api.has_permission(sender, permissions::ADMIN_MENU);
    if !api.has_permission(sender, permissions::SPAWN) && !admin {
        return CommandResult::err(&messages.no_permission);
    }

    let mut result = CommandResult::lines(true, Vec::new());
    let mut paid = 0.0;
    if api.get_player(sender).is_some() {
        let exempt = admin || api.has_permission(sender, permissions::SPAWN_FREE);
        let payment = economy.process_spawn_payment(sender, exempt, api);
        if !payment.success {
            return CommandResult::err(format!("&c{}", payment.message));
        }
        paid = payment.amount;
        if paid > 0.0 {
            result.push(fill(
                &messages.payment_success,
                "cost",
                &economy.format(paid, api),
            ));
        } else if exempt {
            result.push(&messages.spawn_free);
        }
    }

    match respawn_dragon(&config.end_world, api) {
        Ok(()) => {
            result.push(&messages.spawn_success);
            result
        }
        Err(e) => {
            warn!("Failed to spawn dragon for {sender}: {e}");
            if paid > 0.0 {
                economy.refund(sender, paid, api);
                result.push(fill(
                    &messages.refund_success,
                    "amount",
                    &economy.format(paid, api),
                ));
            }
            result.success = false;
            result.push(&messages.spawn_failed);
            result
        }
    }
}

//! `LocalHost`: a small in-process world the console drives the plugin with.
//!
//! It keeps just enough state for the plugin to run end to end: players and
//! their permissions, open menus, inventories, items on the ground, end
//! worlds with their dragon fight, entities, and currency ledgers.

use std::collections::{HashMap, HashSet};

use dragonloot_items::markup;
use dragonloot_plugin_api::{
    DragonBattle, ItemStack, Location, Menu, PluginDragon, PluginEvent, PluginPlayer,
    RespawnPhase,
};
use tracing::{debug, info, warn};

use crate::config::{HostConfig, HostSection};
use crate::plugin_manager::PendingAction;
use crate::respawn::CRYSTAL_ENTITY;

/// Sender name of the server console. It holds every permission.
pub const CONSOLE: &str = "CONSOLE";
/// Recipient recorded for broadcasts.
pub const EVERYONE: &str = "*";

pub const DRAGON_ENTITY: &str = "ender_dragon";
pub const DRAGON_MAX_HEALTH: f32 = 200.0;
pub const INVENTORY_SIZE: usize = 36;

const END_SUFFIX: &str = "_the_end";
const PORTAL_HEIGHT: f64 = 64.0;
const DRAGON_SPAWN_HEIGHT: f64 = 128.0;
const CRYSTALS_NEEDED: usize = 4;

#[derive(Debug, Clone)]
struct Entity {
    kind: String,
    location: Location,
    health: f32,
}

#[derive(Debug)]
struct EndFight {
    dragon: Option<u64>,
    phase: RespawnPhase,
    respawn_remaining: u64,
    portal: Option<Location>,
    previously_killed: bool,
}

pub struct LocalHost {
    players: Vec<PluginPlayer>,
    permissions: HashMap<String, HashSet<String>>,
    open_menus: HashMap<String, Menu>,
    inventories: HashMap<String, Vec<Option<ItemStack>>>,
    ground: Vec<(Location, ItemStack)>,
    worlds: HashSet<String>,
    fights: HashMap<String, EndFight>,
    entities: HashMap<u64, Entity>,
    next_runtime_id: u64,
    respawn_ticks: u64,
    /// Provider service name to player balances.
    ledgers: HashMap<String, HashMap<String, f64>>,
    /// Delivered chat, `(recipient, message)`. Broadcasts go to [`EVERYONE`].
    messages: Vec<(String, String)>,
    tick: u64,
}

impl LocalHost {
    /// Load the worlds and currency providers of `section`. End worlds start
    /// with a live dragon.
    pub fn new(section: &HostSection) -> Self {
        let mut host = Self {
            players: Vec::new(),
            permissions: HashMap::new(),
            open_menus: HashMap::new(),
            inventories: HashMap::new(),
            ground: Vec::new(),
            worlds: HashSet::new(),
            fights: HashMap::new(),
            entities: HashMap::new(),
            next_runtime_id: 1,
            respawn_ticks: section.respawn_ticks,
            ledgers: section
                .economy_providers
                .iter()
                .map(|p| (p.to_lowercase(), HashMap::new()))
                .collect(),
            messages: Vec::new(),
            tick: 0,
        };
        for world in &section.worlds {
            host.load_world(world);
        }
        host
    }

    pub fn from_config(config: &HostConfig) -> Self {
        let mut host = Self::new(&config.host);
        for player in &config.players {
            let permissions: Vec<&str> = player.permissions.iter().map(String::as_str).collect();
            host.add_player(&player.name, &permissions, player.balance);
        }
        host
    }

    fn load_world(&mut self, world: &str) {
        self.worlds.insert(world.to_string());
        if !world.ends_with(END_SUFFIX) {
            return;
        }
        let portal = Location::new(world, 0.0, PORTAL_HEIGHT, 0.0);
        let perch = portal.offset(0.0, DRAGON_SPAWN_HEIGHT - PORTAL_HEIGHT, 0.0);
        let dragon = self.spawn(DRAGON_ENTITY, &perch);
        self.fights.insert(
            world.to_string(),
            EndFight {
                dragon: Some(dragon),
                phase: RespawnPhase::None,
                respawn_remaining: 0,
                portal: Some(portal),
                previously_killed: false,
            },
        );
        info!("Loaded end world {world} with a live dragon");
    }

    /// Add an online player in the first loaded world, with a balance in every ledger.
    pub fn add_player(&mut self, name: &str, permissions: &[&str], balance: f64) -> PluginPlayer {
        let world = self
            .worlds
            .iter()
            .find(|w| !w.ends_with(END_SUFFIX))
            .cloned()
            .unwrap_or_else(|| "world".to_string());
        let id: u128 = rand::random();
        let player = PluginPlayer {
            name: name.to_string(),
            uuid: format!("{id:032x}"),
            location: Location::new(world, 0.5, 64.0, 0.5),
        };
        self.permissions.insert(
            name.to_string(),
            permissions.iter().map(|p| p.to_string()).collect(),
        );
        self.inventories
            .insert(name.to_string(), vec![None; INVENTORY_SIZE]);
        for accounts in self.ledgers.values_mut() {
            accounts.insert(name.to_string(), balance);
        }
        self.players.push(player.clone());
        player
    }

    /// Take a player offline. Returns them for the quit event.
    pub fn remove_player(&mut self, name: &str) -> Option<PluginPlayer> {
        let index = self.players.iter().position(|p| p.name == name)?;
        self.open_menus.remove(name);
        Some(self.players.remove(index))
    }

    // ─── Reads ───────────────────────────────────────────────────────────────

    pub fn players(&self) -> &[PluginPlayer] {
        &self.players
    }

    pub fn player(&self, name: &str) -> Option<&PluginPlayer> {
        self.players.iter().find(|p| p.name == name)
    }

    pub fn has_permission(&self, name: &str, permission: &str) -> bool {
        name == CONSOLE
            || self
                .permissions
                .get(name)
                .is_some_and(|perms| perms.contains(permission))
    }

    pub fn open_menu(&self, name: &str) -> Option<&Menu> {
        self.open_menus.get(name)
    }

    pub fn inventory(&self, name: &str) -> Vec<&ItemStack> {
        self.inventories
            .get(name)
            .map(|slots| slots.iter().flatten().collect())
            .unwrap_or_default()
    }

    pub fn ground_items(&self) -> &[(Location, ItemStack)] {
        &self.ground
    }

    pub fn messages_to(&self, recipient: &str) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|(to, _)| to == recipient)
            .map(|(_, msg)| msg.as_str())
            .collect()
    }

    pub fn is_world_loaded(&self, world: &str) -> bool {
        self.worlds.contains(world)
    }

    pub fn dragon_battle(&self, world: &str) -> Option<DragonBattle> {
        let fight = self.fights.get(world)?;
        let dragon = fight.dragon.and_then(|id| {
            self.entities.get(&id).map(|e| PluginDragon {
                runtime_id: id,
                health: e.health,
            })
        });
        Some(DragonBattle {
            dragon,
            respawn_phase: fight.phase,
            portal_location: fight.portal.clone(),
            previously_killed: fight.previously_killed,
        })
    }

    /// Runtime id of the live dragon of a world.
    pub fn dragon_of(&self, world: &str) -> Option<u64> {
        self.fights.get(world).and_then(|f| f.dragon)
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    // ─── Currency ────────────────────────────────────────────────────────────

    pub fn economy_available(&self, provider: &str) -> bool {
        self.ledgers.contains_key(provider)
    }

    pub fn balance(&self, provider: &str, name: &str) -> f64 {
        self.ledgers
            .get(provider)
            .and_then(|accounts| accounts.get(name))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn withdraw(&mut self, provider: &str, name: &str, amount: f64) -> bool {
        let Some(balance) = self
            .ledgers
            .get_mut(provider)
            .and_then(|accounts| accounts.get_mut(name))
        else {
            return false;
        };
        if amount < 0.0 || *balance < amount {
            return false;
        }
        *balance -= amount;
        debug!("Withdrew {amount:.2} from {name} ({provider})");
        true
    }

    pub fn deposit(&mut self, provider: &str, name: &str, amount: f64) -> bool {
        let Some(accounts) = self.ledgers.get_mut(provider) else {
            return false;
        };
        if amount < 0.0 {
            return false;
        }
        *accounts.entry(name.to_string()).or_insert(0.0) += amount;
        debug!("Deposited {amount:.2} to {name} ({provider})");
        true
    }

    // ─── Player input ────────────────────────────────────────────────────────

    /// A click on a slot of the player's open menu.
    pub fn click(&self, name: &str, slot: usize) -> Option<PluginEvent> {
        let player = self.player(name)?.clone();
        let menu = self.open_menus.get(name)?;
        Some(PluginEvent::MenuClick {
            player,
            title: menu.title.clone(),
            slot,
            item: menu.get(slot).cloned(),
        })
    }

    /// Put an item into a slot of the player's open menu, as dragging it there would.
    pub fn place(&mut self, name: &str, slot: usize, item: ItemStack) -> bool {
        match self.open_menus.get_mut(name) {
            Some(menu) if slot < menu.size() => {
                menu.set(slot, item);
                true
            }
            _ => false,
        }
    }

    pub fn chat(&self, name: &str, message: &str) -> Option<PluginEvent> {
        Some(PluginEvent::PlayerChat {
            player: self.player(name)?.clone(),
            message: message.to_string(),
        })
    }

    // ─── Simulation ──────────────────────────────────────────────────────────

    /// Advance one tick. Respawn sequences that finish bring back the dragon.
    pub fn advance_tick(&mut self) {
        self.tick += 1;
        let total = self.respawn_ticks;
        let finished: Vec<String> = self
            .fights
            .iter_mut()
            .filter(|(_, f)| f.phase != RespawnPhase::None)
            .filter_map(|(world, fight)| {
                fight.respawn_remaining = fight.respawn_remaining.saturating_sub(1);
                fight.phase = respawn_phase(fight.respawn_remaining, total);
                (fight.respawn_remaining == 0).then(|| world.clone())
            })
            .collect();
        for world in finished {
            self.finish_respawn(&world);
        }
    }

    fn finish_respawn(&mut self, world: &str) {
        self.entities
            .retain(|_, e| !(e.kind == CRYSTAL_ENTITY && e.location.world == world));
        let Some(portal) = self.fights.get(world).and_then(|f| f.portal.clone()) else {
            return;
        };
        let perch = portal.offset(0.0, DRAGON_SPAWN_HEIGHT - PORTAL_HEIGHT, 0.0);
        let dragon = self.spawn(DRAGON_ENTITY, &perch);
        if let Some(fight) = self.fights.get_mut(world) {
            fight.dragon = Some(dragon);
            fight.phase = RespawnPhase::None;
        }
        info!("The Ender Dragon has respawned in {world}");
    }

    fn spawn(&mut self, kind: &str, location: &Location) -> u64 {
        let id = self.next_runtime_id;
        self.next_runtime_id += 1;
        let health = if kind == DRAGON_ENTITY { DRAGON_MAX_HEALTH } else { 1.0 };
        self.entities.insert(
            id,
            Entity {
                kind: kind.to_string(),
                location: location.clone(),
                health,
            },
        );
        id
    }

    /// Apply deferred plugin actions. Returns the events they caused.
    pub fn apply(&mut self, actions: Vec<PendingAction>) -> Vec<PluginEvent> {
        let mut events = Vec::new();
        for action in actions {
            match action {
                PendingAction::SendMessage {
                    player_name,
                    message,
                } => {
                    info!("[to {player_name}] {}", markup::strip(&message));
                    self.messages.push((player_name, message));
                }
                PendingAction::BroadcastMessage { message } => {
                    info!("[broadcast] {}", markup::strip(&message));
                    self.messages.push((EVERYONE.to_string(), message));
                }
                PendingAction::OpenMenu { player_name, menu } => {
                    debug!("{player_name} opened {}", markup::strip(&menu.title));
                    if let Some(previous) = self.open_menus.insert(player_name.clone(), menu) {
                        events.extend(self.menu_closed(&player_name, previous));
                    }
                }
                PendingAction::CloseMenu { player_name } => {
                    if let Some(previous) = self.open_menus.remove(&player_name) {
                        events.extend(self.menu_closed(&player_name, previous));
                    }
                }
                PendingAction::GiveItem { player_name, item } => self.give(&player_name, item),
                PendingAction::DropItem { location, item } => {
                    debug!("Dropped {}x {} in {}", item.count, item.material, location.world);
                    self.ground.push((location, item));
                }
                PendingAction::GenerateEndPortal { world } => {
                    if let Some(fight) = self.fights.get_mut(&world) {
                        fight
                            .portal
                            .get_or_insert_with(|| Location::new(&world, 0.0, PORTAL_HEIGHT, 0.0));
                    }
                }
                PendingAction::SetPreviouslyKilled { world, killed } => {
                    if let Some(fight) = self.fights.get_mut(&world) {
                        fight.previously_killed = killed;
                    }
                }
                PendingAction::InitiateDragonRespawn { world } => self.start_respawn(&world),
                PendingAction::SpawnEntity {
                    entity_type,
                    location,
                } => {
                    let id = self.spawn(&entity_type, &location);
                    debug!("Spawned {entity_type} #{id} in {}", location.world);
                }
                PendingAction::SetEntityHealth { runtime_id, health } => {
                    events.extend(self.set_health(runtime_id, health));
                }
                PendingAction::RegisterCommand { .. }
                | PendingAction::ScheduleTask { .. }
                | PendingAction::CancelTask { .. } => {
                    warn!("Plugin manager action reached the host, ignoring");
                }
            }
        }
        events
    }

    fn menu_closed(&self, name: &str, menu: Menu) -> Option<PluginEvent> {
        Some(PluginEvent::MenuClose {
            player: self.player(name)?.clone(),
            title: menu.title,
        })
    }

    /// First empty inventory slot, else drop at the player's feet.
    fn give(&mut self, name: &str, item: ItemStack) {
        let Some(location) = self.player(name).map(|p| p.location.clone()) else {
            warn!("Cannot give items to offline player {name}");
            return;
        };
        if let Some(slot) = self
            .inventories
            .get_mut(name)
            .and_then(|slots| slots.iter_mut().find(|s| s.is_none()))
        {
            *slot = Some(item);
        } else {
            debug!("Inventory of {name} is full, dropping {}", item.material);
            self.ground.push((location, item));
        }
    }

    fn start_respawn(&mut self, world: &str) {
        let crystals = self
            .entities
            .values()
            .filter(|e| e.kind == CRYSTAL_ENTITY && e.location.world == world)
            .count();
        let Some(fight) = self.fights.get_mut(world) else {
            warn!("No dragon fight in {world}");
            return;
        };
        if fight.dragon.is_some() || fight.phase != RespawnPhase::None {
            warn!("Respawn in {world} refused: the dragon is alive or already respawning");
            return;
        }
        if crystals < CRYSTALS_NEEDED {
            warn!("Respawn in {world} needs {CRYSTALS_NEEDED} end crystals, found {crystals}");
            return;
        }
        fight.phase = RespawnPhase::Start;
        fight.respawn_remaining = self.respawn_ticks.max(1);
        info!("Dragon respawn sequence started in {world}");
    }

    fn set_health(&mut self, runtime_id: u64, health: f32) -> Option<PluginEvent> {
        let entity = self.entities.get_mut(&runtime_id)?;
        if health > 0.0 {
            entity.health = health;
            return None;
        }
        let entity = self.entities.remove(&runtime_id)?;
        if entity.kind == DRAGON_ENTITY {
            if let Some(fight) = self.fights.get_mut(&entity.location.world) {
                fight.dragon = None;
                fight.previously_killed = true;
            }
            info!("The Ender Dragon has died in {}", entity.location.world);
        }
        Some(PluginEvent::MobDeath {
            mob_type: entity.kind,
            runtime_id,
            location: entity.location,
            killer_runtime_id: None,
        })
    }
}

/// Phase shown while a respawn counts down from `total` ticks.
fn respawn_phase(remaining: u64, total: u64) -> RespawnPhase {
    if remaining == 0 {
        return RespawnPhase::End;
    }
    match remaining.saturating_mul(4) / total.max(1) {
        0 => RespawnPhase::SummoningDragon,
        1 => RespawnPhase::SummoningPillars,
        2 => RespawnPhase::PreparingToSummonPillars,
        _ => RespawnPhase::Start,
    }
}

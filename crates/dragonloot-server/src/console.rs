//! Console commands for driving the local host by hand.

use dragonloot_plugin_api::{EventResult, ItemStack, Location, PluginEvent};
use tracing::{info, warn};

use crate::host::{LocalHost, CONSOLE, DRAGON_ENTITY};
use crate::plugin_manager::{PendingAction, PluginManager};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleOutcome {
    Continue,
    Stop,
}

const HELP: &[&str] = &[
    "<command> [args]              run a plugin command as the console",
    "as <player> <command> [args]  run a plugin command as a player",
    "join <player> [permission..]  bring a player online",
    "quit <player>                 take a player offline",
    "chat <player> <message>       say something in chat",
    "click <player> <slot>         click a slot of the open menu",
    "place <player> <slot> <material> [count]  put an item into the open menu",
    "close <player>                close the open menu",
    "death <x> <y> <z>             report a dragon death at a spot in the end",
    "slay [world]                  kill the dragon without the plugin",
    "inventory <player>            list a player's items",
    "ground                        list items on the ground",
    "stop                          shut down",
];

/// The host, the plugins, and the glue between them.
pub struct Console {
    pub host: LocalHost,
    pub manager: PluginManager,
    end_world: String,
}

impl Console {
    pub fn new(host: LocalHost, manager: PluginManager, end_world: impl Into<String>) -> Self {
        Self {
            host,
            manager,
            end_world: end_world.into(),
        }
    }

    /// One server tick: the world first, then plugin tasks.
    pub fn tick(&mut self) {
        self.host.advance_tick();
        self.manager.tick_scheduler(&mut self.host);
    }

    pub fn fire(&mut self, event: PluginEvent) {
        self.manager.fire(&event, &mut self.host);
    }

    pub fn handle_line(&mut self, line: &str) -> ConsoleOutcome {
        let words: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        let Some((head, rest)) = words.split_first() else {
            return ConsoleOutcome::Continue;
        };

        match head.as_str() {
            "stop" => return ConsoleOutcome::Stop,
            "help" => HELP.iter().for_each(|entry| info!("{entry}")),
            "as" => match rest.split_first() {
                Some((player, command)) if !command.is_empty() => {
                    if self.host.player(player).is_some() {
                        self.run_command(player, command);
                    } else {
                        warn!("{player} is not online");
                    }
                }
                _ => warn!("Usage: as <player> <command> [args]"),
            },
            "join" => match rest.split_first() {
                Some((name, perms)) => {
                    let perms: Vec<&str> = perms.iter().map(String::as_str).collect();
                    let player = self.host.add_player(name, &perms, 0.0);
                    self.fire(PluginEvent::PlayerJoin { player });
                }
                None => warn!("Usage: join <player> [permission..]"),
            },
            "quit" => match rest.first().and_then(|name| self.host.remove_player(name)) {
                Some(player) => self.fire(PluginEvent::PlayerQuit { player }),
                None => warn!("Usage: quit <online player>"),
            },
            "chat" => match rest.split_first() {
                Some((name, message)) if !message.is_empty() => {
                    let text = message.join(" ");
                    match self.host.chat(name, &text) {
                        Some(event) => {
                            if self.manager.fire(&event, &mut self.host) == EventResult::Continue {
                                info!("<{name}> {text}");
                            }
                        }
                        None => warn!("{name} is not online"),
                    }
                }
                _ => warn!("Usage: chat <player> <message>"),
            },
            "click" => match parse_player_slot(rest) {
                Some((name, slot)) => match self.host.click(name, slot) {
                    Some(event) => self.fire(event),
                    None => warn!("{name} has no menu open"),
                },
                None => warn!("Usage: click <player> <slot>"),
            },
            "place" => self.place(rest),
            "close" => match rest.first() {
                Some(name) => self.apply(vec![PendingAction::CloseMenu {
                    player_name: name.clone(),
                }]),
                None => warn!("Usage: close <player>"),
            },
            "death" => match parse_coords(rest) {
                Some((x, y, z)) => self.fire(PluginEvent::MobDeath {
                    mob_type: DRAGON_ENTITY.to_string(),
                    runtime_id: 0,
                    location: Location::new(&self.end_world, x, y, z),
                    killer_runtime_id: None,
                }),
                None => warn!("Usage: death <x> <y> <z>"),
            },
            "slay" => {
                let world = rest.first().cloned().unwrap_or_else(|| self.end_world.clone());
                match self.host.dragon_of(&world) {
                    Some(runtime_id) => self.apply(vec![PendingAction::SetEntityHealth {
                        runtime_id,
                        health: 0.0,
                    }]),
                    None => warn!("No live dragon in {world}"),
                }
            }
            "inventory" => match rest.first() {
                Some(name) => {
                    for item in self.host.inventory(name) {
                        info!("{}x {}", item.count, item.material);
                    }
                }
                None => warn!("Usage: inventory <player>"),
            },
            "ground" => {
                for (location, item) in self.host.ground_items() {
                    info!(
                        "{}x {} at {} {:.1} {:.1} {:.1}",
                        item.count, item.material, location.world, location.x, location.y, location.z
                    );
                }
            }
            _ => self.run_command(CONSOLE, &words),
        }
        ConsoleOutcome::Continue
    }

    fn run_command(&mut self, sender: &str, words: &[String]) {
        let Some((command, args)) = words.split_first() else {
            return;
        };
        let command = command.trim_start_matches('/').to_lowercase();
        match self
            .manager
            .handle_command(&command, args, sender, &mut self.host)
        {
            Some(Some(response)) => info!("{response}"),
            Some(None) => {}
            None => warn!("Unknown command: {command}. Type help for a list."),
        }
    }

    fn place(&mut self, args: &[String]) {
        let (Some((name, slot)), Some(material)) = (parse_player_slot(args), args.get(2)) else {
            warn!("Usage: place <player> <slot> <material> [count]");
            return;
        };
        let count = args.get(3).and_then(|c| c.parse().ok()).unwrap_or(1);
        let item = ItemStack::new(material.to_uppercase(), count);
        if !self.host.place(name, slot, item) {
            warn!("{name} has no menu open with slot {slot}");
        }
    }

    /// Apply host-side actions and let the plugins see what they caused.
    fn apply(&mut self, actions: Vec<PendingAction>) {
        for event in self.host.apply(actions) {
            self.fire(event);
        }
    }
}

fn parse_coords(args: &[String]) -> Option<(f64, f64, f64)> {
    match args {
        [x, y, z] => Some((x.parse().ok()?, y.parse().ok()?, z.parse().ok()?)),
        _ => None,
    }
}

fn parse_player_slot(args: &[String]) -> Option<(&str, usize)> {
    let name = args.first()?;
    let slot = args.get(1)?.parse().ok()?;
    Some((name.as_str(), slot))
}

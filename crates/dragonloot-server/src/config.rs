//! Configuration: the console host's `dragonloot.toml` and the plugin's
//! `config.json`.

use std::path::Path;

use dragonloot_economy::EconomySettings;
use dragonloot_items::chat::DEFAULT_PREFIX;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

// ─── Host config (dragonloot.toml) ───────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct HostConfig {
    #[serde(default)]
    pub host: HostSection,
    pub logging: LoggingSection,
    #[serde(default)]
    pub players: Vec<PlayerSection>,
}

#[derive(Debug, Deserialize)]
pub struct HostSection {
    /// Root of the per-plugin data folders.
    #[serde(default = "default_plugins_dir")]
    pub plugins_dir: String,
    /// Worlds loaded at startup. Names ending in `_the_end` get a dragon fight.
    #[serde(default = "default_worlds")]
    pub worlds: Vec<String>,
    /// Currency provider services the host offers (`vault`, `coinsengine`).
    #[serde(default)]
    pub economy_providers: Vec<String>,
    /// Ticks between starting a respawn and the new dragon appearing.
    #[serde(default = "default_respawn_ticks")]
    pub respawn_ticks: u64,
}

fn default_plugins_dir() -> String {
    "plugins".into()
}

fn default_worlds() -> Vec<String> {
    vec!["world".into(), "world_the_end".into()]
}

fn default_respawn_ticks() -> u64 {
    100
}

impl Default for HostSection {
    fn default() -> Self {
        Self {
            plugins_dir: default_plugins_dir(),
            worlds: default_worlds(),
            economy_providers: Vec::new(),
            respawn_ticks: default_respawn_ticks(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    pub level: String,
}

/// A simulated player for the console host.
#[derive(Debug, Deserialize)]
pub struct PlayerSection {
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Starting balance with every provider.
    #[serde(default)]
    pub balance: f64,
}

impl HostConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }
}

// ─── Plugin config (config.json) ─────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragonConfig {
    /// World holding the dragon fight.
    pub end_world: String,
    pub economy: EconomySettings,
    pub dragon_kill: KillSettings,
    pub editor: EditorSettings,
    pub messages: Messages,
}

impl Default for DragonConfig {
    fn default() -> Self {
        Self {
            end_world: "world_the_end".into(),
            economy: EconomySettings::default(),
            dragon_kill: KillSettings::default(),
            editor: EditorSettings::default(),
            messages: Messages::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KillSettings {
    /// Per-player cooldown of `/dragon kill`. 0 disables it.
    pub cooldown_secs: u64,
}

impl Default for KillSettings {
    fn default() -> Self {
        Self { cooldown_secs: 300 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Editor sessions idle this long are dropped. 0 keeps them.
    pub session_timeout_secs: u64,
}

/// User-facing message templates, `&` markup. Placeholders are noted per field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub prefix: String,
    pub no_permission: String,
    pub players_only: String,
    pub spawn_success: String,
    pub spawn_failed: String,
    /// `%cost%`
    pub payment_success: String,
    pub spawn_free: String,
    /// `%amount%`
    pub refund_success: String,
    pub kill_success: String,
    /// `%player%`
    pub kill_broadcast: String,
    /// `%time%`
    pub kill_cooldown: String,
    pub kill_no_dragon: String,
    pub reload_success: String,
    /// `%config%` and `%loot%`
    pub reload_details: String,
    pub reload_failed: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.into(),
            no_permission: "&cYou don't have permission to do that!".into(),
            players_only: "&cOnly players can use this command.".into(),
            spawn_success: "&aEnder Dragon respawn sequence started!".into(),
            spawn_failed:
                "&cFailed to start dragon respawn. Is the dragon already alive or is the portal missing?"
                    .into(),
            payment_success: "&aYou paid %cost% to spawn the Ender Dragon!".into(),
            spawn_free: "&7Dragon spawn is free for you!".into(),
            refund_success: "&aYou have been refunded %amount% (spawn failed).".into(),
            kill_success: "&a&lDragon killed! &7The Ender Dragon has been slain.".into(),
            kill_broadcast: "&7%player% has instantly killed the Ender Dragon!".into(),
            kill_cooldown: "&cThis command is on cooldown! Wait %time% seconds.".into(),
            kill_no_dragon: "&cNo Ender Dragon is currently alive in The End!".into(),
            reload_success: "&aConfiguration reloaded successfully!".into(),
            reload_details: "&7Config: %config% | Loot items: %loot%".into(),
            reload_failed: "&cFailed to reload configuration! Check console for errors.".into(),
        }
    }
}

impl DragonConfig {
    /// Read `config.json`. Missing fields take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&contents)?;
        config.sanitize();
        Ok(config)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_value(value)?;
        config.sanitize();
        Ok(config)
    }

    /// Replace invalid values with defaults.
    pub fn sanitize(&mut self) {
        self.economy.sanitize();
        if self.end_world.trim().is_empty() {
            warn!("end_world is empty, using world_the_end");
            self.end_world = DragonConfig::default().end_world;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_host_config() {
        let toml_str = r#"
            [host]
            plugins_dir = "data"
            economy_providers = ["vault"]

            [logging]
            level = "debug"

            [[players]]
            name = "Steve"
            permissions = ["dragonloot.spawn"]
            balance = 2500.0

            [[players]]
            name = "Alex"
        "#;
        let config: HostConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.host.plugins_dir, "data");
        assert_eq!(config.host.worlds, vec!["world", "world_the_end"]);
        assert_eq!(config.host.economy_providers, vec!["vault"]);
        assert_eq!(config.host.respawn_ticks, 100);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.players.len(), 2);
        assert_eq!(config.players[0].balance, 2500.0);
        assert!(config.players[1].permissions.is_empty());
    }

    #[test]
    fn host_section_defaults_when_absent() {
        let config: HostConfig = toml::from_str("[logging]\nlevel = \"info\"").unwrap();
        assert_eq!(config.host.plugins_dir, "plugins");
        assert!(config.players.is_empty());
    }

    #[test]
    fn plugin_config_defaults() {
        let config = DragonConfig::from_value(serde_json::json!({
            "dragon_kill": { "cooldown_secs": 60 },
            "messages": { "kill_success": "&aGone." }
        }))
        .unwrap();
        assert_eq!(config.end_world, "world_the_end");
        assert_eq!(config.dragon_kill.cooldown_secs, 60);
        assert_eq!(config.editor.session_timeout_secs, 0);
        assert_eq!(config.economy.spawn_cost, 1000.0);
        assert_eq!(config.messages.kill_success, "&aGone.");
        assert_eq!(config.messages.prefix, DEFAULT_PREFIX);
    }

    #[test]
    fn invalid_values_are_sanitized() {
        let config = DragonConfig::from_value(serde_json::json!({
            "end_world": " ",
            "economy": { "spawn_cost": -10.0 }
        }))
        .unwrap();
        assert_eq!(config.end_world, "world_the_end");
        assert_eq!(config.economy.spawn_cost, 0.0);
    }

    #[test]
    fn wrong_types_are_errors() {
        let result = DragonConfig::from_value(serde_json::json!({ "dragon_kill": { "cooldown_secs": "soon" } }));
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn default_config_round_trips() {
        let value = serde_json::to_value(DragonConfig::default()).unwrap();
        assert_eq!(DragonConfig::from_value(value).unwrap(), DragonConfig::default());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        assert!(matches!(DragonConfig::load(&path), Err(ConfigError::Io(_))));

        std::fs::write(&path, r#"{ "end_world": "the_end" }"#).unwrap();
        assert_eq!(DragonConfig::load(&path).unwrap().end_world, "the_end");

        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(DragonConfig::load(&path), Err(ConfigError::Json(_))));
    }
}

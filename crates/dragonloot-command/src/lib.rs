//! The `/dragon` command: sub-command parsing, registry, help and completion.

/// Permission nodes checked by the plugin.
pub mod permissions {
    pub const SPAWN: &str = "dragonloot.spawn";
    pub const SPAWN_FREE: &str = "dragonloot.spawn.free";
    pub const ADMIN_KILL: &str = "dragonloot.admin.kill";
    pub const ADMIN_LOOT: &str = "dragonloot.admin.loot";
    pub const ADMIN_MENU: &str = "dragonloot.admin.menu";
    pub const MENU_USE: &str = "dragonloot.menu.use";
}

use permissions::*;

pub const COMMAND_NAME: &str = "dragon";
pub const COMMAND_ALIASES: &[&str] = &["dl", "dragonloot"];
pub const COMMAND_DESCRIPTION: &str = "Ender Dragon loot and respawn controls";

/// A parsed `/dragon` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subcommand {
    Help,
    Spawn,
    Kill,
    Reload,
    Menu,
    Editor,
    Unknown(String),
}

impl Subcommand {
    /// Parse from the arguments after the command name. Case-insensitive.
    pub fn parse(args: &[String]) -> Self {
        let Some(first) = args.first() else {
            return Subcommand::Help;
        };
        match first.to_lowercase().as_str() {
            "help" => Subcommand::Help,
            "spawn" => Subcommand::Spawn,
            "kill" => Subcommand::Kill,
            "reload" => Subcommand::Reload,
            "menu" => Subcommand::Menu,
            "editor" => Subcommand::Editor,
            _ => Subcommand::Unknown(first.clone()),
        }
    }
}

/// What a sub-command handler reports back to the sender.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandResult {
    pub success: bool,
    /// Lines for the sender, in `&` markup.
    pub messages: Vec<String>,
    /// Optional line for every player.
    pub broadcast: Option<String>,
}

impl CommandResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            messages: vec![message.into()],
            broadcast: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            messages: vec![message.into()],
            broadcast: None,
        }
    }

    pub fn lines(success: bool, messages: Vec<String>) -> Self {
        Self {
            success,
            messages,
            broadcast: None,
        }
    }

    pub fn with_broadcast(mut self, message: impl Into<String>) -> Self {
        self.broadcast = Some(message.into());
        self
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }
}

/// A registered sub-command.
#[derive(Debug, Clone)]
pub struct SubcommandEntry {
    pub name: &'static str,
    pub description: &'static str,
    /// Holding any one of these permits the sub-command.
    pub permissions: &'static [&'static str],
}

impl SubcommandEntry {
    pub fn permitted(&self, has_permission: impl Fn(&str) -> bool) -> bool {
        self.permissions.iter().any(|p| has_permission(p))
    }
}

/// The `/dragon` sub-commands, in help order.
pub struct CommandRegistry {
    entries: Vec<SubcommandEntry>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            entries: Vec::new(),
        };
        registry.register("spawn", "Spawn the Ender Dragon", &[SPAWN, ADMIN_MENU]);
        registry.register("kill", "Instantly kill the Ender Dragon", &[ADMIN_KILL]);
        registry.register("reload", "Reload plugin configuration", &[ADMIN_LOOT]);
        registry.register("menu", "Open the dragon menu", &[MENU_USE, ADMIN_MENU]);
        registry.register("editor", "Open the loot editor", &[ADMIN_LOOT, ADMIN_MENU]);
        registry
    }

    fn register(
        &mut self,
        name: &'static str,
        description: &'static str,
        permissions: &'static [&'static str],
    ) {
        self.entries.push(SubcommandEntry {
            name,
            description,
            permissions,
        });
    }

    pub fn get(&self, name: &str) -> Option<&SubcommandEntry> {
        self.entries.iter().find(|e| e.name.eq_ignore_ascii_case(name))
    }

    pub fn entries(&self) -> &[SubcommandEntry] {
        &self.entries
    }

    /// Whether the sender may run a sub-command. Unknown names are refused.
    pub fn permitted(&self, name: &str, has_permission: impl Fn(&str) -> bool) -> bool {
        self.get(name).is_some_and(|e| e.permitted(has_permission))
    }

    /// Help text, `&` markup.
    pub fn help_lines(&self) -> Vec<String> {
        std::iter::once("&e&lDragonLoot Commands:".to_string())
            .chain(
                self.entries
                    .iter()
                    .map(|e| format!("&7/{COMMAND_NAME} {} &f- {}", e.name, e.description)),
            )
            .collect()
    }

    /// Completions for the first argument: permitted sub-commands starting
    /// with `partial`, case-insensitive. Later arguments complete to nothing.
    pub fn complete(&self, args: &[String], has_permission: impl Fn(&str) -> bool) -> Vec<String> {
        let partial = match args {
            [] => String::new(),
            [only] => only.to_lowercase(),
            _ => return Vec::new(),
        };
        self.entries
            .iter()
            .filter(|e| e.name.starts_with(&partial) && e.permitted(&has_permission))
            .map(|e| e.name.to_string())
            .collect()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Reply to an unknown sub-command.
pub fn unknown_command() -> CommandResult {
    CommandResult::err(format!("&cUnknown command. Use &e/{COMMAND_NAME} &cfor help."))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_subcommands() {
        assert_eq!(Subcommand::parse(&[]), Subcommand::Help);
        assert_eq!(Subcommand::parse(&args(&["SPAWN"])), Subcommand::Spawn);
        assert_eq!(Subcommand::parse(&args(&["kill", "now"])), Subcommand::Kill);
        assert_eq!(Subcommand::parse(&args(&["reload"])), Subcommand::Reload);
        assert_eq!(Subcommand::parse(&args(&["menu"])), Subcommand::Menu);
        assert_eq!(Subcommand::parse(&args(&["Editor"])), Subcommand::Editor);
        assert_eq!(
            Subcommand::parse(&args(&["fly"])),
            Subcommand::Unknown("fly".into())
        );
    }

    #[test]
    fn help_lists_every_subcommand() {
        let registry = CommandRegistry::new();
        let help = registry.help_lines();
        assert_eq!(help.len(), 1 + registry.entries().len());
        assert_eq!(help[1], "&7/dragon spawn &f- Spawn the Ender Dragon");
    }

    #[test]
    fn completion_respects_prefix_and_permission() {
        let registry = CommandRegistry::new();
        let admin = |_: &str| true;
        let spawner = |p: &str| p == SPAWN;

        assert_eq!(registry.complete(&args(&[""]), admin).len(), 5);
        assert_eq!(registry.complete(&args(&["R"]), admin), vec!["reload"]);
        assert_eq!(registry.complete(&args(&[]), spawner), vec!["spawn"]);
        assert!(registry.complete(&args(&["k"]), spawner).is_empty());
        assert!(registry.complete(&args(&["spawn", ""]), admin).is_empty());
    }

    #[test]
    fn any_listed_permission_is_enough() {
        let registry = CommandRegistry::new();
        assert!(registry.permitted("spawn", |p| p == ADMIN_MENU));
        assert!(registry.permitted("menu", |p| p == MENU_USE));
        assert!(!registry.permitted("kill", |p| p == ADMIN_LOOT));
        assert!(!registry.permitted("fly", |_| true));
    }

    #[test]
    fn results() {
        let mut result = CommandResult::ok("&aDone").with_broadcast("&eEveryone");
        result.push("&7More");
        assert!(result.success);
        assert_eq!(result.messages.len(), 2);
        assert_eq!(result.broadcast.as_deref(), Some("&eEveryone"));
        assert!(!unknown_command().success);
    }
}

//! The DragonLoot plugin and the console host that runs it.

pub mod config;
pub mod console;
pub mod host;
pub mod kill;
pub mod menus;
pub mod plugin;
pub mod plugin_manager;
pub mod respawn;

pub use host::LocalHost;
pub use plugin::DragonPlugin;
pub use plugin_manager::PluginManager;

use std::time::Duration;

use dragonloot_plugin_api::PluginEvent;
use dragonloot_server::config::{DragonConfig, HostConfig};
use dragonloot_server::console::{Console, ConsoleOutcome};
use dragonloot_server::plugin::{CONFIG_FILE, PLUGIN_NAME};
use dragonloot_server::{DragonPlugin, LocalHost, PluginManager};
use tokio::io::AsyncBufReadExt;
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    let config = match HostConfig::load("dragonloot.toml") {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load dragonloot.toml: {e}");
            std::process::exit(1);
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!("DragonLoot console v{} starting", env!("CARGO_PKG_VERSION"));
    info!("Worlds: {}", config.host.worlds.join(", "));
    info!("Players: {}", config.players.len());

    let mut host = LocalHost::from_config(&config);
    let mut manager = PluginManager::new(&config.host.plugins_dir);
    let data_dir = manager.plugin_data_dir(PLUGIN_NAME);
    manager.register(Box::new(DragonPlugin::new(&data_dir)));
    manager.load_configs();
    manager.enable_all(&mut host);

    let end_world = match DragonConfig::load(data_dir.join(CONFIG_FILE)) {
        Ok(c) => c.end_world,
        Err(e) => {
            warn!("Using the default end world: {e}");
            DragonConfig::default().end_world
        }
    };
    let mut console = Console::new(host, manager, end_world);
    console.fire(PluginEvent::ServerStarted);
    let players = console.host.players().to_vec();
    for player in players {
        console.fire(PluginEvent::PlayerJoin { player });
    }

    // Console REPL: read lines from stdin
    let (console_tx, mut console_rx) = tokio::sync::mpsc::channel::<String>(32);
    tokio::spawn(async move {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let line = line.trim().to_string();
            if !line.is_empty() && console_tx.send(line).await.is_err() {
                break;
            }
        }
    });

    info!("Ready. Type help for commands.");
    let mut tick_interval = tokio::time::interval(Duration::from_millis(50));
    loop {
        tokio::select! {
            _ = tick_interval.tick() => console.tick(),
            Some(line) = console_rx.recv() => {
                if console.handle_line(&line) == ConsoleOutcome::Stop {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    console.fire(PluginEvent::ServerStopping);
    console.manager.disable_all();
    info!("Console shut down.");
}

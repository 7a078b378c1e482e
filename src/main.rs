//! Entry point for the **winzo** daemon.
//!
//! Spawns all [`CommandSource`](winzo::traits::CommandSource)s on background
//! threads and processes incoming commands one at a time on the main thread.

use winzo::command::Command;
use winzo::config::Config;
use winzo::controller::Controller;
use winzo::hyprland::events::HyprlandEventSource;
use winzo::hyprland::wm::{HyprlandEnv, SubscriptionTable};
use winzo::ipc::listener::UnixSocketListener;
use winzo::traits::CommandSource;
use log::{error, info};
use std::sync::mpsc;

/// Default socket path for the command listener.
fn default_socket_path() -> String {
    let runtime = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".into());
    format!("{}/winzo.sock", runtime)
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/winzo`).
fn config_dir() -> std::path::PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    std::path::PathBuf::from(base).join("winzo")
}

/// Try to load the config from `$XDG_CONFIG_HOME/winzo/config.json`,
/// falling back to compiled-in defaults.
fn load_config() -> Config {
    let path = config_dir().join("config.json");
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

//  Main

fn main() {
    env_logger::init();

    if std::env::args().any(|a| a == "--print-default-config") {
        match serde_json::to_string_pretty(&Config::default()) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("failed to serialize default config: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    run_daemon();
}

fn run_daemon() {
    let config = load_config();

    let env = HyprlandEnv::new(config.desktop_classes.clone());
    let subscriptions = env.subscriptions();
    let mut controller = Controller::from_config(env, &config);
    info!(
        "presets: {}",
        controller.preset_names().collect::<Vec<_>>().join(", ")
    );

    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
    spawn_command_sources(cmd_tx, subscriptions);

    info!("winzo running ({:?} release)", config.release_policy);
    for cmd in cmd_rx {
        controller.dispatch(cmd);
    }
    info!("all command sources closed, exiting");
}

//  Helpers

fn spawn_command_sources(tx: mpsc::Sender<Command>, subscriptions: SubscriptionTable) {
    {
        let tx = tx.clone();
        let path = default_socket_path();
        std::thread::spawn(move || {
            let mut source = UnixSocketListener::new(&path);
            if let Err(e) = source.run(tx) {
                error!("socket listener error: {}", e);
            }
        });
    }

    {
        let tx = tx.clone();
        std::thread::spawn(move || {
            let mut source = HyprlandEventSource::new(subscriptions);
            if let Err(e) = source.run(tx) {
                error!("hyprland event source error: {}", e);
            }
        });
    }

    drop(tx);
}

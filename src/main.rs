//! Entry point for the **snapnine** daemon.
//!
//! Spawns the command listener on a background thread and processes
//! incoming commands on the main thread.  The main thread also acts as
//! the render driver: after each command it drains the session's render
//! events and renders frames until the state settles (the magnifier
//! capture handshake needs a follow-up frame after each screenshot).

use log::{debug, error, info};
use snapnine::bridge::BridgeDesktop;
use snapnine::command::Command;
use snapnine::config::Config;
use snapnine::ipc::listener::UnixSocketListener;
use snapnine::session::GridSession;
use snapnine::traits::{CommandSource, Desktop, RenderEvent};
use std::sync::mpsc;

/// Default socket path for the command listener.
fn command_socket_path() -> String {
    let runtime = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".into());
    format!("{}/snapnine.sock", runtime)
}

/// Default socket path of the host bridge, overridable with
/// `SNAPNINE_HOST_SOCKET`.
fn host_socket_path() -> String {
    std::env::var("SNAPNINE_HOST_SOCKET").unwrap_or_else(|_| {
        let runtime = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".into());
        format!("{}/snapnine-host.sock", runtime)
    })
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/snapnine`).
fn config_dir() -> std::path::PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    std::path::PathBuf::from(base).join("snapnine")
}

/// Try to load the config from `$XDG_CONFIG_HOME/snapnine/config.json`,
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

fn main() {
    env_logger::init();

    let config = load_config();

    let desktop = BridgeDesktop::new(host_socket_path());
    let mut session = match GridSession::new(desktop, config) {
        Ok(session) => session,
        Err(e) => {
            error!("failed to reach the host bridge: {}", e);
            std::process::exit(1);
        }
    };

    let (render_tx, render_rx) = mpsc::channel::<RenderEvent>();
    session.set_render_channel(render_tx);

    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
    spawn_command_sources(cmd_tx);

    run_event_loop(session, cmd_rx, render_rx);
}

fn run_event_loop<D: Desktop>(
    mut session: GridSession<D>,
    cmd_rx: mpsc::Receiver<Command>,
    render_rx: mpsc::Receiver<RenderEvent>,
) {
    info!("snapnine running");
    for cmd in cmd_rx {
        if let Err(e) = session.handle(cmd) {
            error!("command error: {}", e);
        }
        drain_render_events(&mut session, &render_rx);
    }
    info!("all command sources closed, exiting");
}

/// Render until the session stops asking for frames.
///
/// A capture frame requests its own follow-up, so this loops rather than
/// rendering once per command.
fn drain_render_events<D: Desktop>(
    session: &mut GridSession<D>,
    render_rx: &mpsc::Receiver<RenderEvent>,
) {
    while let Ok(event) = render_rx.try_recv() {
        match event {
            RenderEvent::Refresh => {
                if let Err(e) = session.render_frame() {
                    error!("render error: {}", e);
                }
            }
            RenderEvent::Hide => {
                // The session already cleared the overlay.
                debug!("overlay hidden");
            }
        }
    }
}

fn spawn_command_sources(tx: mpsc::Sender<Command>) {
    {
        let tx = tx.clone();
        let path = command_socket_path();
        std::thread::spawn(move || {
            let mut source = UnixSocketListener::new(&path);
            if let Err(e) = source.run(tx) {
                error!("socket listener error: {}", e);
            }
        });
    }

    drop(tx);
}

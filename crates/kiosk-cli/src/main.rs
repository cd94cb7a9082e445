//! `kiosk-remote`: headless client for a kiosk music backend.
//!
//! `run` keeps a connection open and logs what a kiosk screen would show.
//! The other subcommands connect, perform one action, print the result and
//! exit, which makes them handy for scripting a kiosk.

mod commands;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use kiosk_core::config::{self, KioskConfig};
use kiosk_core::{Hub, transport};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("KIOSK_BUILD"), ")");

#[derive(Parser, Debug)]
#[command(name = "kiosk-remote", version = VERSION)]
struct Args {
    /// Optional config file (TOML). Defaults to config.toml next to the binary.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Backend base URL, e.g. http://volumio.local:3000
    #[arg(long)]
    backend: Option<String>,

    /// Host used to resolve relative album art URLs.
    #[arg(long)]
    asset_host: Option<String>,

    /// Seconds to wait for the backend in one-shot commands.
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Stay connected and log view changes (default).
    Run {
        /// Initial screen size, e.g. 1280x800.
        #[arg(long, value_parser = parse_viewport)]
        viewport: Option<(u32, u32)>,
    },
    /// Print the current player state.
    Status,
    Play,
    Pause,
    Next,
    Prev,
    /// List a browse node; omit the URI to list the browse sources.
    Browse { uri: Option<String> },
    Search { query: String },
    /// Print the play queue.
    Queue,
}

fn parse_viewport(raw: &str) -> Result<(u32, u32), String> {
    let (w, h) = raw
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {raw}"))?;
    let width = w.trim().parse().map_err(|_| format!("invalid width {w}"))?;
    let height = h.trim().parse().map_err(|_| format!("invalid height {h}"))?;
    Ok((width, height))
}

fn load_config(args: &Args) -> Result<KioskConfig> {
    let mut cfg = match args.config.as_ref() {
        Some(path) => KioskConfig::load(path)?,
        None => {
            let auto_path = std::env::current_exe()
                .ok()
                .and_then(|path| path.parent().map(|dir| dir.join("config.toml")));
            match auto_path.as_deref().filter(|path| path.exists()) {
                Some(path) => load_auto(path)?,
                None => KioskConfig::default(),
            }
        }
    };
    if let Some(backend) = args.backend.as_ref() {
        cfg.backend_url = Some(backend.clone());
    }
    if let Some(host) = args.asset_host.as_ref() {
        cfg.asset_host = Some(host.clone());
    }
    Ok(cfg)
}

fn load_auto(path: &Path) -> Result<KioskConfig> {
    tracing::info!(path = ?path, "using config next to binary");
    KioskConfig::load(path)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,kiosk_core=info")),
        )
        .init();

    let cfg = load_config(&args)?;
    let socket_url = config::socket_url_from_config(&cfg)?;
    let assets = config::asset_resolver_from_config(&cfg)?;
    let policy = config::reconnect_policy_from_config(&cfg)?;
    let resize_debounce = config::resize_debounce_from_config(&cfg);
    tracing::info!(url = %socket_url, assets = %assets.host(), "starting kiosk-remote {VERSION}");

    let shutdown = CancellationToken::new();
    let ctrlc_shutdown = shutdown.clone();
    let _ = ctrlc::set_handler(move || {
        ctrlc_shutdown.cancel();
    });

    let (handle, events, transport_task) = transport::connect(socket_url, policy, shutdown.clone());
    let hub = Hub::new(Arc::new(handle), assets, resize_debounce);
    let session = commands::Session {
        stores: hub.stores(),
        connection: hub.connection(),
        view: hub.view(),
        timeout: Duration::from_secs(args.timeout),
        shutdown: shutdown.clone(),
    };
    let hub_task = tokio::spawn(hub.run(events, shutdown.clone()));

    let command = args.command.clone().unwrap_or(Command::Run { viewport: None });
    let result = match command {
        Command::Run { viewport } => commands::run(&session, viewport).await,
        Command::Status => commands::status(&session).await,
        Command::Play => commands::player_action(&session, |s| s.player.play()).await,
        Command::Pause => commands::player_action(&session, |s| s.player.pause()).await,
        Command::Next => commands::player_action(&session, |s| s.player.next()).await,
        Command::Prev => commands::player_action(&session, |s| s.player.prev()).await,
        Command::Browse { uri } => commands::browse(&session, uri.as_deref()).await,
        Command::Search { query } => commands::search(&session, &query).await,
        Command::Queue => commands::queue(&session).await,
    };

    shutdown.cancel();
    if let Err(err) = hub_task.await {
        tracing::warn!("hub task failed: {err}");
    }
    if let Err(err) = transport_task.await {
        tracing::warn!("transport task failed: {err}");
    }
    result
}

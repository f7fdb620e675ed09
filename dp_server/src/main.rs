//! Multi-table draw poker server using the async actor model.
//!
//! Spawns one actor task per table, registered with a shared
//! `TableRegistry`, and serves the HTTP API on top.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Error;
use ctrlc::set_handler;
use draw_poker::table::TableRegistry;
use pico_args::Arguments;
use tracing::{error, info};

use dp_server::{api, config::ServerConfig, logging};

const HELP: &str = "\
Run a multi-table five-card draw poker server

USAGE:
  dp_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8000]
  --tables     N           Number of tables to create  [default: env MAX_TABLES or 1]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8000)
  MAX_TABLES               Number of tables to create on startup
  TABLE_MAX_PLAYERS        Seats per table
  TABLE_DEFAULT_BUY_IN     Chips granted on join without a buy-in
  TABLE_MIN_OPEN_BET       Smallest allowed opening bet
  TABLE_TURN_TIMEOUT_SECS  Auto-fold timeout in seconds (0 disables)
  CHAT_BACKLOG             Chat messages retained in memory
";

struct Args {
    bind: Option<SocketAddr>,
    num_tables: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        bind: pargs.opt_value_from_str("--bind")?,
        num_tables: pargs.opt_value_from_str("--tables")?,
    };

    // Catching signals for exit.
    set_handler(|| std::process::exit(0))?;

    logging::init();

    let config = ServerConfig::from_env(args.bind, args.num_tables)?;
    info!("Starting draw poker server at {}", config.bind);

    let registry = Arc::new(TableRegistry::new());
    for i in 0..config.num_tables {
        let table_config = config.table_config(i);
        let name = table_config.name.clone();
        match registry.create(table_config).await {
            Ok(table_id) => info!("Created table '{name}' with ID {table_id}"),
            Err(e) => error!("Failed to create table '{name}': {e}"),
        }
    }
    info!(
        "Server ready with {} active table(s)",
        registry.table_count().await
    );

    let state = api::AppState {
        registry,
        chat: Arc::new(api::chat::ChatLog::new(config.chat_backlog)),
        defaults: Arc::new(config.table_defaults.clone()),
    };
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {e}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {e}"))?;

    info!("Shutting down server...");

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to install CTRL+C signal handler: {e}");
    }
}

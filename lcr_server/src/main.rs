//! Left-Center-Right game server.
//!
//! Each live game is owned by a session actor managed by the lobby manager;
//! snapshots go to PostgreSQL when `DATABASE_URL` is set and to memory
//! otherwise.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Error;
use ctrlc::set_handler;
use lcr::{
    GameRepository, InMemoryGameRepository, LobbyManager, PgGameRepository,
    auth::JwtVerifier,
    store::Database,
};
use lcr_server::{
    api,
    config::{ServerConfig, StorageConfig},
    logging, metrics,
};
use log::info;
use pico_args::Arguments;
use tokio::sync::watch;

const HELP: &str = "\
Run a Left-Center-Right game server

USAGE:
  lcr_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:3000]
  --db-url     URL         PostgreSQL connection string [default: env DATABASE_URL, in-memory when unset]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  DATABASE_URL             PostgreSQL connection string
  JWT_SECRET               JWT verification secret (required, 32+ characters)
  AUTO_PLAY_ON_START       Play started games to completion [default: true]
  MAX_AUTO_TURNS           Turn cap for auto-play [default: 10000]
  BOTS_MIN, BOTS_MAX       Bots added per addBots call [default: 2, 4]
  METRICS_BIND             Prometheus exporter address (disabled when unset)
  RUST_LOG                 Log filter directives
";

struct Args {
    bind: Option<SocketAddr>,
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        bind: pargs.opt_value_from_str("--bind")?,
        database_url: pargs.opt_value_from_str("--db-url")?,
    };

    logging::init();

    let config = ServerConfig::from_env(args.bind, args.database_url)?;
    config.validate()?;

    // Catching signals for exit.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    set_handler(move || {
        let _ = shutdown_tx.send(true);
    })?;

    if let Some(metrics_bind) = config.metrics_bind {
        metrics::init_metrics(metrics_bind).map_err(Error::msg)?;
        info!("Prometheus metrics exported at http://{metrics_bind}/metrics");
    }

    let (repository, database) = match &config.storage {
        StorageConfig::InMemory => {
            info!("No DATABASE_URL set, keeping games in memory");
            (Arc::new(InMemoryGameRepository::new()) as Arc<dyn GameRepository>, None)
        }
        StorageConfig::Postgres(db_config) => {
            info!("Connecting to database");
            let db = Database::new(db_config)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;
            let repository = PgGameRepository::new(db.pool().clone());
            repository
                .migrate()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to prepare games table: {}", e))?;
            info!("Database connected successfully");
            (Arc::new(repository) as Arc<dyn GameRepository>, Some(db))
        }
    };

    let verifier = JwtVerifier::new(config.security.jwt_secret.clone())?;
    let lobby = Arc::new(LobbyManager::new(repository, config.lobby.clone()));

    let api_state = api::AppState {
        lobby,
        verifier: Arc::new(verifier),
    };
    let app = api::create_router(api_state);

    info!("Starting HTTP server on {}", config.bind);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_rx))
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");
    if let Some(db) = database {
        db.close().await;
        info!("Database pool closed");
    }

    Ok(())
}

/// Resolves once the signal handler flips the flag.
async fn shutdown_signal(mut shutdown: watch::Receiver<bool>) {
    // A dropped sender also ends the wait
    let _ = shutdown.wait_for(|stop| *stop).await;
}

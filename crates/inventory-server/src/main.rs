//! Inventory Server - Item CRUD API with a cache-aside read path

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use config::{Config, LogFormat};
use inventory_api::{AppState, create_router};
use inventory_auth::JwtManager;
use inventory_cache::{CacheStore, MemoryStore, ObservedStore, RedisStore, ResilientCache};
use inventory_core::{ItemCacheConfig, ItemController};
use inventory_db::{Database, DatabaseOptions};

/// Inventory Server - item CRUD API backed by SQLite with a Redis read cache
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "INVENTORY_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "INVENTORY_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(&args.config)?;

    init_logging(&config.logging.level, config.logging.format);

    info!("Starting Inventory Server v{}", env!("CARGO_PKG_VERSION"));
    if Path::new(&args.config).exists() {
        info!("Loaded configuration from {}", args.config);
    } else {
        info!("Config file not found at {}, using defaults", args.config);
    }
    if config.uses_default_jwt_secret() {
        warn!("Using the default JWT secret; set auth.jwt_secret for production");
    }

    // Create data directory
    if let Some(parent) = Path::new(&config.database.path).parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    // Initialize database
    let db_url = format!("sqlite:{}?mode=rwc", config.database.path);
    let db = Database::with_options(
        &db_url,
        &DatabaseOptions {
            max_connections: config.database.max_connections,
            acquire_timeout: Duration::from_secs(config.database.acquire_timeout_secs),
        },
    )
    .await?;

    // Initialize cache store
    let store: Arc<dyn CacheStore> = match &config.cache.redis_url {
        Some(url) => Arc::new(RedisStore::new(url)?),
        None => Arc::new(MemoryStore::new()),
    };
    let cache = ResilientCache::new(
        Arc::new(ObservedStore::new(store)),
        config.cache.operation_timeout(),
    );

    // Initialize item controller
    let items = ItemController::new(
        Arc::new(db.clone()),
        cache,
        ItemCacheConfig {
            ttl: config.cache.ttl(),
            invalidate_item_on_update: config.cache.invalidate_item_on_update,
        },
    );

    // Initialize JWT manager
    let jwt = Arc::new(JwtManager::new(
        &config.auth.jwt_secret,
        chrono::Duration::minutes(config.auth.access_token_minutes),
        chrono::Duration::days(config.auth.refresh_token_days),
    ));

    let state = AppState::new(items, db, jwt);

    let app = create_router(state).layer(TraceLayer::new_for_http());

    // Determine bind address
    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port).parse()?;

    info!("Listening on {}", addr);
    info!("Item cache TTL: {}s", config.cache.ttl_secs);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Initialize logging
fn init_logging(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (pretty, json) = match format {
        LogFormat::Pretty => (Some(fmt::layer().with_span_events(FmtSpan::CLOSE)), None),
        LogFormat::Json => (
            None,
            Some(fmt::layer().json().with_span_events(FmtSpan::CLOSE)),
        ),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(pretty)
        .with(json)
        .init();
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

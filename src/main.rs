//! Furnish API Server
//!
//! Run with: cargo run --bin furnish
//!
//! # Configuration
//!
//! Loaded from furnish.toml (see `furnish-cli config`) with environment
//! overrides:
//! - `FURNISH_DATA_DIR`: Data directory (database + uploads)
//! - `FURNISH_API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `FURNISH_API_PORT`: Port to listen on (default: 5010)
//! - `FURNISH_TOKEN_TTL_HOURS`: Login token lifetime (default: 168)
//! - `FURNISH_ADMIN_EMAIL` / `FURNISH_ADMIN_PASSWORD`: Seed an admin account
//!   on an empty database
//! - `RUST_LOG`: Log level (default: info)

use furnish::api::{serve, ApiConfig, AppState};
use furnish::config::Config;
use furnish::store::{users::NewUser, Role, Store};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_default();

    init_tracing(&config);

    tracing::info!("Starting Furnish API server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Data directory: {:?}", config.store.data_dir);

    // Open the store
    let store = Arc::new(Store::open(&config.store.data_dir)?);
    tracing::info!("Store initialized");

    // Expired tokens accumulate across restarts; sweep them on boot
    match store.prune_sessions() {
        Ok(0) => {}
        Ok(n) => tracing::info!("Pruned {} expired sessions", n),
        Err(e) => tracing::warn!("Failed to prune sessions: {}", e),
    }

    seed_admin(&store)?;

    let api_config = ApiConfig {
        host: config.api.host.clone(),
        port: config.api.port,
        max_upload_bytes: config.api.max_upload_bytes,
        token_ttl_hours: config.auth.token_ttl_hours,
        enable_export: true,
    };

    let state = AppState::new(Arc::clone(&store), api_config.clone());

    tracing::info!("Starting server on {}:{}", api_config.host, api_config.port);
    serve(state, &api_config).await?;

    tracing::info!("Furnish API server stopped");

    Ok(())
}

/// Initialize tracing from the logging config, honoring RUST_LOG
fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "furnish={},tower_http=debug",
            config.logging.level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);

    if config.logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Seed an admin account on an empty database when the environment asks
/// for one. Without it the first registration can bootstrap an admin.
fn seed_admin(store: &Store) -> Result<(), Box<dyn std::error::Error>> {
    let email = std::env::var("FURNISH_ADMIN_EMAIL").ok();
    let password = std::env::var("FURNISH_ADMIN_PASSWORD").ok();

    let (email, password) = match (email, password) {
        (Some(e), Some(p)) => (e, p),
        _ => return Ok(()),
    };

    if store.count_users()? > 0 {
        tracing::debug!("Users already exist, skipping admin seed");
        return Ok(());
    }

    let admin = store.create_user(NewUser {
        name: "Administrator".to_string(),
        email,
        password,
        role: Role::Admin,
    })?;

    tracing::info!(email = %admin.email, "Seeded admin account");
    Ok(())
}

use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

mod config;
mod error;
mod models;
mod repositories;
mod routes;
mod state;

use common::database::{DatabaseConfig, init_pool};
use migrate::engine::Migrator;

use crate::{config::ApiConfig, repositories::UserRepository, state::AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting API service");

    let config = ApiConfig::from_env()?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // Bring the schema up to the chain tip before serving requests
    let migrator = Migrator::shipped(pool.clone())?;
    let applied = migrator.upgrade(None).await?;
    match migrator.current().await? {
        Some(revision) => info!(
            "Schema at revision {} ({} change-set(s) applied)",
            revision, applied
        ),
        None => info!("Schema at base (empty migration chain)"),
    }

    // Initialize repositories
    let user_repository = UserRepository::new(pool.clone());

    let app_state = AppState {
        db_pool: pool,
        user_repository,
        timezone: config.timezone,
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("API service listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

use carlot::{SeedOutcome, Stores, seed_sample_data};
use carlot_server::{
    AppState,
    config::ServerConfig,
    create_router,
    error::{ApiError, Result},
};
use carlot_storage::SqliteStorage;
use std::{net::SocketAddr, path::Path, sync::Arc};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| {
            "carlot_server=debug,carlot=debug,tower_http=debug".to_string()
        }))
        .init();

    // Load configuration
    let config = ServerConfig::from_env()?;
    info!("Starting Carlot Server on {}:{}", config.host, config.port);

    if let Some(dir) = database_dir(&config.database_url) {
        tokio::fs::create_dir_all(dir).await?;
    }
    tokio::fs::create_dir_all(&config.media_dir).await?;

    let storage = Arc::new(SqliteStorage::new(&config.database_url).await?);
    let media = Arc::new(storage.media_storage(&config.media_dir));
    let stores = Stores::new(storage.clone(), storage.clone(), media, storage);

    if config.seed_sample_data {
        match seed_sample_data(&stores).await? {
            SeedOutcome::AlreadySeeded => info!("Sample data already present"),
            SeedOutcome::Seeded { .. } => info!("Sample data seeded"),
        }
    }

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| ApiError::Config(format!("Invalid HOST/PORT: {}", e)))?;

    // Build router
    let app = create_router(AppState::new(stores, config));

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Directory holding the SQLite file named by a `sqlite:` URL
fn database_dir(database_url: &str) -> Option<&Path> {
    let path = database_url
        .strip_prefix("sqlite:")?
        .trim_start_matches("//")
        .split('?')
        .next()?;
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Path::new(path).parent().filter(|p| !p.as_os_str().is_empty())
}

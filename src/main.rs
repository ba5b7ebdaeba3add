use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use kissa::auth::session;
use kissa::config::{Cli, Config};
use kissa::db::{self, SeedAdmin};
use kissa::routes;
use kissa::state::AppState;

const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(10 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse CLI args and load config
    let cli = Cli::parse();
    let data_dir = Config::data_dir(&cli);
    std::fs::create_dir_all(&data_dir)?;
    tracing::info!("Data directory: {}", data_dir.display());

    let config = Config::load(&cli)?;
    if config.uses_default_secret() {
        tracing::warn!("Using the built-in development secret key; set KISSA_SECRET_KEY in production");
    }

    // Ensure uploads directory exists
    std::fs::create_dir_all(config.uploads_path())?;

    // Initialize database
    let pool = db::create_pool(&config.db_path())?;
    let seed_admin = match cli.admin_password.as_deref() {
        Some(password) => Some(SeedAdmin::new(
            &cli.admin_username,
            password,
            config.auth.password_cost,
        )?),
        None => None,
    };
    db::bootstrap(&pool, seed_admin.as_ref())?;

    let state = AppState::new(pool, config.clone())?;
    // First tick runs right away, clearing rows left by the last run
    session::spawn_purge_task(state.sessions.clone(), SESSION_PURGE_INTERVAL);

    if !config.storage.frontend.join("index.html").exists() {
        tracing::warn!(
            "No front-end bundle found at {}",
            config.storage.frontend.display()
        );
    }

    let app = routes::build_router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

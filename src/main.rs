use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dashboard_api::config::{self, Environment};
use dashboard_api::database::DatabaseManager;
use dashboard_api::testing::MemoryStore;
use dashboard_api::{app, AppState, Stores};

#[derive(Parser)]
#[command(name = "dashboard-api")]
#[command(about = "Dashboard storage and access-control API")]
#[command(version)]
struct Args {
    #[arg(long, env = "DASHBOARD_API_BIND", default_value = "0.0.0.0")]
    bind: String,

    #[arg(long, env = "DASHBOARD_API_PORT", default_value_t = 3000)]
    port: u16,

    /// Serve from an in-process store instead of Postgres (development only)
    #[arg(long)]
    memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = config::config().clone();
    tracing::info!("Starting Dashboard API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set outside development");
    }

    let (state, recorder) = if args.memory {
        if config.environment != Environment::Development {
            anyhow::bail!("--memory is only available in development");
        }
        tracing::warn!("using in-memory store, data is lost on exit");
        let store = MemoryStore::new();
        AppState::new(config, Stores::memory(&store), None)
    } else {
        let pool = DatabaseManager::connect(&config.database)
            .await
            .context("failed to connect to database")?;
        if config.database.run_migrations {
            DatabaseManager::migrate(&pool).await.context("failed to run migrations")?;
        }
        AppState::new(config, Stores::postgres(pool.clone()), Some(pool))
    };
    recorder.spawn();

    let bind_addr = format!("{}:{}", args.bind, args.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Dashboard API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

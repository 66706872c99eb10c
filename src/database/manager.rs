use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Postgres error code for unique constraint violations
const UNIQUE_VIOLATION: &str = "23505";

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    #[error("Stored value could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                return DatabaseError::Conflict(constraint);
            }
        }
        DatabaseError::Sqlx(err)
    }
}

/// Connection pool construction and schema management
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open the connection pool described by the configuration
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        if config.url.is_empty() {
            return Err(DatabaseError::ConfigMissing("DATABASE_URL"));
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&config.url)
            .await?;

        info!(max_connections = config.max_connections, "Created database pool");
        Ok(pool)
    }

    /// Apply pending migrations from `migrations/`
    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }
}

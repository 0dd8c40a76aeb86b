pub mod models;
pub mod repository;

use crate::config::Config;
use sqlx::{
    PgPool, Postgres,
    pool::PoolConnection,
    postgres::PgPoolOptions,
};

/// Process-wide connection pool, built once at startup and shared through router state.
///
/// Connections are handed out as [`PoolConnection`] guards. Dropping the guard
/// returns the connection to the pool on every exit path. sqlx flushes any
/// pending rollback and pings the connection before handing it out again.
#[derive(Clone, Debug)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect eagerly and verify the server answers.
    ///
    /// # Errors
    /// Returns error if the database is unreachable or rejects the credentials
    pub async fn connect(config: &Config) -> anyhow::Result<Self> {
        tracing::info!(
            db_host = %config.db_host,
            db_name = %config.db_name,
            min_connections = config.db_min_connections,
            max_connections = config.db_max_connections,
            "Initializing database connection pool"
        );

        let pool = pool_options(config)
            .connect_with(config.connect_options())
            .await?;

        let db = Database { pool };
        db.ping().await?;

        tracing::info!("Database connection pool initialized successfully");

        Ok(db)
    }

    /// Build the pool without opening any connection; failures show up on first use
    pub fn connect_lazy(config: &Config) -> Self {
        Database {
            pool: pool_options(config).connect_lazy_with(config.connect_options()),
        }
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Database { pool }
    }

    /// Check out a connection, waiting at most the configured acquire timeout
    pub async fn acquire(&self) -> Result<PoolConnection<Postgres>, sqlx::Error> {
        self.pool.acquire().await
    }

    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        let mut conn = self.acquire().await?;
        repository::ping(&mut conn).await
    }

    /// Wait for checked-out connections to come back, then close them all
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database connection pool closed");
    }
}

fn pool_options(config: &Config) -> PgPoolOptions {
    PgPoolOptions::new()
        .min_connections(config.db_min_connections)
        .max_connections(config.db_max_connections)
        .acquire_timeout(config.acquire_timeout())
}

//! # Database Store
//!
//! Database connection pool, embedded migrations and repository implementations.

// region: --- Modules
pub mod models;
pub mod user_repository;
pub mod item_repository;
// endregion: --- Modules

// region: --- Re-exports
pub use item_repository::ItemRepository;
pub use user_repository::UserRepository;
// endregion: --- Re-exports

// region: --- Types and Functions
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Type alias for SQLite connection pool.
pub type DbPool = SqlitePool;

/// Schema migrations embedded from the workspace `migrations/` directory.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../../migrations");

/// Create a new SQLite connection pool for `database_url`.
///
/// The database file is created if missing and foreign keys are enforced.
pub async fn create_pool(database_url: &str) -> anyhow::Result<DbPool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePool::connect_with(options).await?;

    Ok(pool)
}

/// Apply all pending migrations.
pub async fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

/// Create a migrated in-memory database.
///
/// Every SQLite `:memory:` connection is a separate database, so the pool is
/// pinned to one connection that never expires.
pub async fn create_memory_pool() -> anyhow::Result<DbPool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}
// endregion: --- Types and Functions

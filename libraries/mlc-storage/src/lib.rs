//! MLC Soundboard Storage
//!
//! `SQLite` persistence for both halves of the soundboard:
//!
//! - **Key-value store**: holds the raw manifest snapshot for the controller
//! - **Asset caches**: named, version-tagged response caches for the offline worker
//!
//! # Example
//!
//! ```rust,no_run
//! use mlc_storage::{create_pool, run_migrations, SqliteKeyValueStore};
//! use mlc_core::{KeyValueStore, SOUND_MAP_KEY};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://soundboard.db").await?;
//! run_migrations(&pool).await?;
//!
//! let store = SqliteKeyValueStore::new(pool);
//! let snapshot = store.get(SOUND_MAP_KEY).await?;
//! # Ok(())
//! # }
//! ```

mod error;

pub mod asset_cache;
pub mod key_value;

pub use asset_cache::SqliteCacheStorage;
pub use error::StorageError;
pub use key_value::SqliteKeyValueStore;
pub use sqlx::sqlite::SqlitePool;

use sqlx::migrate::Migrator;
use tracing::debug;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// Call once at startup before handing the pool to a store.
///
/// # Errors
///
/// Returns an error if migrations fail to run
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `<sqlite://soundboard.db>`)
///
/// In-memory databases are per-connection in `SQLite`, so they get a single
/// connection pool.
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    debug!(url = %database_url, "Creating SQLite pool");

    let in_memory = database_url.contains(":memory:");

    let mut options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(std::time::Duration::from_secs(30));

    if !in_memory {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(if in_memory { 1 } else { 5 })
        .connect_with(options)
        .await?;

    debug!("SQLite pool created");

    Ok(pool)
}

/// Create a pool and bring its schema up to date
///
/// # Errors
///
/// Returns an error if the connection or a migration fails
pub async fn open(database_url: &str) -> Result<SqlitePool, StorageError> {
    let pool = create_pool(database_url).await?;
    run_migrations(&pool)
        .await
        .map_err(|e| StorageError::Migration(e.to_string()))?;
    Ok(pool)
}

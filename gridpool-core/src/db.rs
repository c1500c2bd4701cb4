//! Database handle and embedded migrations.
//!
//! Every component takes a [`Db`] handle at construction; nothing in the
//! crate reaches for a global connection.

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// Shared SQLite pool handle.
pub type Db = SqlitePool;

/// Migrations embedded from the workspace `migrations/` directory.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../migrations");

/// Open the database at `url`, creating the file if missing.
///
/// The pool is capped at one connection: SQLite allows a single writer,
/// and funnelling every transaction through one connection turns write
/// races into plain queueing, so a read-check-write transaction never
/// fails with a stale-snapshot busy error.
pub async fn connect(url: &str) -> Result<Db, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        .foreign_keys(true);
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
}

/// Open an ephemeral in-memory database.
///
/// Each new connection to `sqlite::memory:` gets its own blank database,
/// so this pool is also capped at one connection to keep a single view.
pub async fn connect_memory() -> Result<Db, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
}

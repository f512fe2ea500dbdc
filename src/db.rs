use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PoolError};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use pushkind_common::db::DbPool;
use thiserror::Error;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("connection pool error: {0}")]
    Pool(#[from] PoolError),
    #[error("failed to apply migrations: {0}")]
    Apply(String),
}

/// Per-connection SQLite settings applied whenever the pool hands out a
/// fresh connection.
///
/// Review writes and aggregate write-backs run on different threads, so a
/// writer must wait for the file lock instead of failing with
/// `database is locked`.
#[derive(Debug, Clone, Copy)]
struct SqliteConnectionOptions {
    busy_timeout: Duration,
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqliteConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        // busy_timeout first: switching to WAL itself needs the lock.
        conn.batch_execute(&format!(
            "PRAGMA busy_timeout = {}; PRAGMA journal_mode = WAL;",
            self.busy_timeout.as_millis()
        ))
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Open a pool whose connections wait up to `busy_timeout` for SQLite's
/// write lock.
pub fn create_pool(database_url: &str, busy_timeout: Duration) -> Result<DbPool, PoolError> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Pool::builder()
        .connection_customizer(Box::new(SqliteConnectionOptions { busy_timeout }))
        .build(manager)
}

/// Apply pending schema migrations, returning how many ran.
pub fn run_migrations(pool: &DbPool) -> Result<usize, MigrationError> {
    let mut conn = pool.get()?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| MigrationError::Apply(err.to_string()))?;

    Ok(applied.len())
}

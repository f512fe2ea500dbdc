//! Helpers for integration tests.

use std::time::Duration;

use pushkind_common::db::DbPool;
use pushkind_tours::db::{create_pool, run_migrations};
use tempfile::TempDir;

/// Temporary migrated database used in integration tests.
///
/// The SQLite file and its `-wal`/`-shm` companions live in a private
/// directory that is removed when the value is dropped.
pub struct TestDb {
    pool: DbPool,
    _dir: TempDir,
}

impl TestDb {
    pub fn new(filename: &str) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir.");
        let path = dir.path().join(filename);
        let path = path.to_str().expect("Temp path is not valid UTF-8.");

        let pool = create_pool(path, Duration::from_secs(5))
            .expect("Failed to establish SQLite connection.");
        run_migrations(&pool).expect("Migrations failed");

        TestDb { pool, _dir: dir }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }
}

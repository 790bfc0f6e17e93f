use std::path::PathBuf;

use channel_manager::db::{DbPool, establish_connection_pool, run_migrations};
use tempfile::TempDir;

/// Migrated SQLite database in a temporary directory, removed on drop.
pub struct TestDb {
    pool: DbPool,
    dir: TempDir,
}

impl TestDb {
    pub fn new(name: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join(name);
        let pool = establish_connection_pool(path.to_str().expect("utf-8 path"))
            .expect("create pool");
        run_migrations(&pool).expect("run migrations");
        Self { pool, dir }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    /// Location for a group catalog next to the database.
    #[allow(dead_code)]
    pub fn catalog_path(&self) -> PathBuf {
        self.dir.path().join("unit_meta.json")
    }
}

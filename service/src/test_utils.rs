use std::{ops::Deref, path::Path};

use abi::Config;
use sqlx::Executor;
use sqlx_db_tester::TestDb;

/// A config pointing at a freshly migrated, throwaway database.
pub struct TestConfig {
    tdb: TestDb,
    pub config: Config,
}

impl Deref for TestConfig {
    type Target = Config;

    fn deref(&self) -> &Self::Target {
        &self.config
    }
}

impl TestConfig {
    pub fn new(filename: impl AsRef<Path>) -> Self {
        let mut config = Config::load(filename).unwrap();
        let tdb = TestDb::new(
            &config.db.host,
            config.db.port,
            &config.db.user,
            &config.db.password,
            "../migrations",
        );
        config.db.dbname = tdb.dbname.clone();
        Self { tdb, config }
    }

    /// Trainer 1, class types 1 (8 dogs) and 2 (25 dogs), rooms A:10, B:20, C:15.
    pub async fn seed(&self) {
        let pool = self.tdb.get_pool().await;
        pool.execute(include_str!("../../fixtures/seed.sql")).await.unwrap();
    }
}

impl Default for TestConfig {
    fn default() -> Self {
        Self::new("fixtures/config.yml")
    }
}

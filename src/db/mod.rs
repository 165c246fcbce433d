pub mod schema;
pub mod migrations;
pub mod init;
mod case;
mod tower;
mod cdr;

pub use init::{init_db, get_db_stats, DbStats};
pub use schema::{Case, CallEvent, ExtraFields, NewCallEvent, NewCase, NewTower, TowerLocation};

use sqlx::SqlitePool;

use crate::config::StoreConfig;
use crate::error::Result;

/// Append-only store for cases, towers and call events.
///
/// Each call checks a connection out of the pool for the duration of one
/// statement; callers drive operations strictly one after another.
#[derive(Debug, Clone)]
pub struct RecordStore {
    pool: SqlitePool,
}

impl RecordStore {
    pub async fn open(config: &StoreConfig) -> Result<Self> {
        let pool = init_db(config).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn stats(&self) -> Result<DbStats> {
        get_db_stats(&self.pool).await
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

fn now() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

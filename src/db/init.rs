// Database initialization and migration handling
use std::path::PathBuf;

use sqlx::{Pool, Row, Sqlite};

use crate::config::StoreConfig;
use crate::db::migrations::MIGRATION_001;
use crate::error::{Error, Result};

/// Open the connection pool described by `config` and bring the schema up to date
pub async fn init_db(config: &StoreConfig) -> Result<Pool<Sqlite>> {
    if let Some(path) = config.file_path() {
        if config.reset && path.exists() {
            log::info!("Removing existing database at: {}", path.display());
            std::fs::remove_file(path).map_err(|e| Error::io(path, e))?;
            for suffix in ["-wal", "-shm"] {
                let sidecar = PathBuf::from(format!("{}{}", path.display(), suffix));
                if sidecar.exists() {
                    std::fs::remove_file(&sidecar).map_err(|e| Error::io(&sidecar, e))?;
                }
            }
        }
        log::info!("Initializing database at: {}", path.display());
    } else {
        log::debug!("Initializing in-memory database");
    }

    let pool = config
        .pool_options()
        .connect(&config.database_url())
        .await?;

    if config.file_path().is_some() {
        // WAL only applies to file-backed databases
        sqlx::query("PRAGMA journal_mode=WAL;").execute(&pool).await?;
    }
    sqlx::query("PRAGMA foreign_keys=ON;").execute(&pool).await?;

    run_migrations(&pool).await?;

    log::info!("Database initialization complete");

    Ok(pool)
}

/// Run all pending migrations
async fn run_migrations(pool: &Pool<Sqlite>) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    let applied: bool =
        sqlx::query("SELECT COUNT(*) as count FROM _migrations WHERE name = 'migration_001'")
            .fetch_one(pool)
            .await
            .map(|row| row.get::<i64, _>("count") > 0)?;

    if !applied {
        log::info!("Applying migration_001...");

        // sqlx executes one statement per query
        for statement in MIGRATION_001.split(';') {
            let stmt = strip_leading_comments(statement);
            if !stmt.is_empty() {
                sqlx::query(stmt).execute(pool).await?;
            }
        }

        sqlx::query(
            "INSERT INTO _migrations (name, applied_at) VALUES ('migration_001', datetime('now'))",
        )
        .execute(pool)
        .await?;

        log::info!("Migration 001 applied successfully");
    }

    Ok(())
}

fn strip_leading_comments(statement: &str) -> &str {
    let mut stmt = statement.trim();
    while stmt.starts_with("--") {
        match stmt.find('\n') {
            Some(idx) => stmt = stmt[idx + 1..].trim(),
            None => return "",
        }
    }
    stmt
}

/// Row counts per relation
pub async fn get_db_stats(pool: &Pool<Sqlite>) -> Result<DbStats> {
    let case_count: i64 = sqlx::query("SELECT COUNT(*) as count FROM cases")
        .fetch_one(pool)
        .await
        .map(|row| row.get("count"))?;

    let tower_count: i64 = sqlx::query("SELECT COUNT(*) as count FROM towers")
        .fetch_one(pool)
        .await
        .map(|row| row.get("count"))?;

    let cdr_count: i64 = sqlx::query("SELECT COUNT(*) as count FROM cdrs")
        .fetch_one(pool)
        .await
        .map(|row| row.get("count"))?;

    Ok(DbStats {
        case_count,
        tower_count,
        cdr_count,
    })
}

#[derive(Debug, serde::Serialize)]
pub struct DbStats {
    pub case_count: i64,
    pub tower_count: i64,
    pub cdr_count: i64,
}

//! Persistence module.
//!
//! Records are JSON documents behind the [`DocumentStore`] trait; SQLite is the
//! durable implementation and [`MemoryStore`] the in-process one.

mod memory;
mod query;
mod repository;
mod seed;
mod sqlite;
mod store;

pub use memory::MemoryStore;
pub use query::*;
pub use repository::*;
pub use seed::seed_demo_data;
pub use sqlite::SqliteStore;
pub use store::{Collection, DocumentStore};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            collection TEXT NOT NULL,
            id TEXT NOT NULL,
            body TEXT NOT NULL,
            PRIMARY KEY (collection, id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Indexes for the lookups every dashboard performs
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_documents_auth_id
            ON documents(collection, json_extract(body, '$.authId'));
        CREATE INDEX IF NOT EXISTS idx_documents_assignee
            ON documents(collection, json_extract(body, '$.assigneeId'));
        CREATE INDEX IF NOT EXISTS idx_documents_week
            ON documents(collection, json_extract(body, '$.year'), json_extract(body, '$.weekNumber'));
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

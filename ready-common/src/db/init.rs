//! Database initialization
//!
//! Creates the SQLite database on first run and brings the schema up
//! idempotently: every table is `CREATE TABLE IF NOT EXISTS`, so calling
//! [`init_database`] repeatedly is safe.

use crate::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL mode allows concurrent readers with one writer
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_settings_table(&pool).await?;
    create_users_table(&pool).await?;
    create_assessments_table(&pool).await?;
    create_analytics_events_table(&pool).await?;

    Ok(pool)
}

/// Create the settings table
///
/// Key-value store for service-level configuration (token signing secret).
pub async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the users table
pub async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            guid TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            password_salt TEXT NOT NULL,
            name TEXT,
            organization TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            last_login TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the assessments table
///
/// Program metadata is flat columns; responses and results are JSON-typed
/// TEXT columns holding the nested value types serialized with serde.
/// Assessments are never physically deleted.
pub async fn create_assessments_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS assessments (
            guid TEXT PRIMARY KEY,
            user_guid TEXT NOT NULL REFERENCES users(guid),
            program_name TEXT NOT NULL,
            organization TEXT,
            program_level TEXT NOT NULL,
            target_audience TEXT NOT NULL DEFAULT '[]',
            delivery_format TEXT NOT NULL DEFAULT '[]',
            program_duration TEXT,
            assessor_role TEXT,
            status TEXT NOT NULL DEFAULT 'in_progress'
                CHECK (status IN ('in_progress', 'completed')),
            current_category INTEGER NOT NULL DEFAULT 1,
            responses TEXT NOT NULL DEFAULT '{}',
            overall_score REAL,
            category_scores TEXT,
            recommendations TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            completed_at TIMESTAMP,
            CHECK (overall_score IS NULL OR (overall_score >= 0.0 AND overall_score <= 100.0))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_assessments_user ON assessments(user_guid)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_assessments_updated ON assessments(updated_at)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the analytics_events table (append-only telemetry)
pub async fn create_analytics_events_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS analytics_events (
            guid TEXT PRIMARY KEY,
            event_type TEXT NOT NULL,
            user_guid TEXT,
            assessment_guid TEXT,
            event_data TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_analytics_events_type ON analytics_events(event_type)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

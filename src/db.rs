//! Database connection and pool management.
//!
//! This module initializes the SeaORM connection pool (PostgreSQL in
//! production, SQLite locally and in tests), applies migrations and reports
//! basic information about the schema contents.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{Context, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, EntityTrait,
    PaginatorTrait, Statement,
};
use serde::Serialize;
use tokio::time::sleep;

use crate::config::AppConfig;
use crate::models::{
    Camera, CameraHealth, CameraUseCase, Event, ProcessingStat, Project, SystemPerformance, User,
};

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {source}")]
    ConnectionFailed {
        #[from]
        source: sea_orm::DbErr,
    },
    #[error("Database connection timeout after {timeout_ms}ms")]
    ConnectionTimeout { timeout_ms: u64 },
    #[error("Invalid database configuration: {message}")]
    InvalidConfiguration { message: String },
}

const MAX_CONNECT_ATTEMPTS: u32 = 5;

/// Initializes a database connection pool with the given configuration.
///
/// Transient connection failures are retried with exponential backoff,
/// starting at 100ms, for up to five attempts.
///
/// # Examples
///
/// ```no_run
/// use dcwatch::{config::AppConfig, db::init_pool};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = AppConfig::default();
///     let db = init_pool(&config).await?;
///     dcwatch::db::health_check(&db).await?;
///     Ok(())
/// }
/// ```
pub async fn init_pool(cfg: &AppConfig) -> Result<DatabaseConnection> {
    if cfg.database_url.trim().is_empty() {
        return Err(DatabaseError::InvalidConfiguration {
            message: "Database URL cannot be empty".to_string(),
        }
        .into());
    }

    let mut opt = ConnectOptions::new(&cfg.database_url);
    opt.max_connections(cfg.db_max_connections)
        .acquire_timeout(Duration::from_millis(cfg.db_acquire_timeout_ms))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    let mut retry_delay = Duration::from_millis(100);

    for attempt in 1..=MAX_CONNECT_ATTEMPTS {
        match Database::connect(opt.clone()).await {
            Ok(conn) => {
                log::info!("Successfully connected to database (attempt {})", attempt);
                enable_foreign_keys(&conn).await?;
                return Ok(conn);
            }
            Err(e) => {
                if attempt == MAX_CONNECT_ATTEMPTS {
                    log::error!(
                        "Failed to connect to database after {} attempts: {}",
                        MAX_CONNECT_ATTEMPTS,
                        e
                    );
                    return Err(DatabaseError::ConnectionFailed { source: e }.into());
                }

                log::warn!(
                    "Database connection attempt {} failed: {}, retrying in {:?}",
                    attempt,
                    e,
                    retry_delay
                );

                sleep(retry_delay).await;
                retry_delay *= 2;
            }
        }
    }

    Err(DatabaseError::ConnectionTimeout {
        timeout_ms: cfg.db_acquire_timeout_ms,
    }
    .into())
}

/// Cascades rely on foreign key enforcement, which SQLite only applies
/// when asked to.
pub async fn enable_foreign_keys(db: &DatabaseConnection) -> Result<()> {
    if db.get_database_backend() == DatabaseBackend::Sqlite {
        db.execute_unprepared("PRAGMA foreign_keys = ON")
            .await
            .context("Failed to enable SQLite foreign keys")?;
    }
    Ok(())
}

/// Health check for the database connection.
///
/// Returns `Ok(())` if a trivial query succeeds.
pub async fn health_check(db: &DatabaseConnection) -> Result<()> {
    let stmt = Statement::from_string(db.get_database_backend(), "SELECT 1".to_string());

    db.query_one(stmt)
        .await
        .context("Database health check failed")?;

    Ok(())
}

/// Applies every pending migration and returns how many were applied.
pub async fn run_migrations(db: &DatabaseConnection) -> Result<usize> {
    let pending = Migrator::get_pending_migrations(db)
        .await
        .context("Failed to list pending migrations")?
        .len();

    Migrator::up(db, None)
        .await
        .context("Failed to apply migrations")?;

    tracing::info!(applied = pending, "Migrations applied");
    Ok(pending)
}

/// Reverts the last `steps` applied migrations.
pub async fn rollback_migrations(db: &DatabaseConnection, steps: u32) -> Result<()> {
    Migrator::down(db, Some(steps))
        .await
        .context("Failed to roll back migrations")?;

    tracing::info!(steps, "Migrations rolled back");
    Ok(())
}

/// Backend name and row count of every table.
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseInfo {
    pub backend: String,
    pub applied_migrations: usize,
    pub pending_migrations: usize,
    pub tables: BTreeMap<String, u64>,
}

/// Collects [`DatabaseInfo`]. The schema must already be migrated.
pub async fn database_info(db: &DatabaseConnection) -> Result<DatabaseInfo> {
    let backend = match db.get_database_backend() {
        DatabaseBackend::Postgres => "postgres",
        DatabaseBackend::Sqlite => "sqlite",
        DatabaseBackend::MySql => "mysql",
    };

    let applied_migrations = Migrator::get_applied_migrations(db)
        .await
        .context("Failed to list applied migrations")?
        .len();
    let pending_migrations = Migrator::get_pending_migrations(db)
        .await
        .context("Failed to list pending migrations")?
        .len();

    let mut tables = BTreeMap::new();
    tables.insert("users".to_string(), User::find().count(db).await?);
    tables.insert("projects".to_string(), Project::find().count(db).await?);
    tables.insert("cameras".to_string(), Camera::find().count(db).await?);
    tables.insert(
        "camera_use_cases".to_string(),
        CameraUseCase::find().count(db).await?,
    );
    tables.insert("events".to_string(), Event::find().count(db).await?);
    tables.insert(
        "processing_stats".to_string(),
        ProcessingStat::find().count(db).await?,
    );
    tables.insert(
        "camera_health".to_string(),
        CameraHealth::find().count(db).await?,
    );
    tables.insert(
        "system_performance".to_string(),
        SystemPerformance::find().count(db).await?,
    );

    Ok(DatabaseInfo {
        backend: backend.to_string(),
        applied_migrations,
        pending_migrations,
        tables,
    })
}

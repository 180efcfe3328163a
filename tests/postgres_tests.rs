//! PostgreSQL integration tests.
//!
//! These tests use testcontainers to spin up a real Postgres instance and
//! need a running Docker daemon, so they are ignored by default:
//!
//!     cargo test --test postgres_tests -- --ignored

use std::time::Duration;

use anyhow::Result;
use dcwatch::error::RepositoryError;
use dcwatch::models::camera::ConnectionStatus;
use dcwatch::models::event::EventSeverity;
use dcwatch::procedures::{self, CameraHealthReport};
use dcwatch::repositories::event::{EventFilter, SaveEventRequest};
use dcwatch::repositories::{CameraUseCaseRepository, EventRepository, ViewRepository};
use dcwatch::{config::AppConfig, db, seeds};
use sea_orm::{ConnectionTrait, DatabaseConnection};
use testcontainers_modules::postgres::Postgres;
use testcontainers_modules::testcontainers::{ContainerAsync, runners::AsyncRunner};

async fn start_postgres() -> Result<(ContainerAsync<Postgres>, DatabaseConnection)> {
    let container = Postgres::default().start().await?;
    let host = container.get_host().await?;
    let port = container.get_host_port_ipv4(5432).await?;

    // Wait for Postgres to be ready
    tokio::time::sleep(Duration::from_secs(2)).await;

    let config = AppConfig {
        database_url: format!("postgres://postgres:postgres@{host}:{port}/postgres"),
        db_max_connections: 5,
        ..AppConfig::default()
    };

    let db = db::init_pool(&config).await?;
    db::run_migrations(&db).await?;
    Ok((container, db))
}

#[tokio::test]
#[ignore = "requires docker"]
async fn migrations_apply_and_roll_back() -> Result<()> {
    let (_container, db) = start_postgres().await?;

    let info = db::database_info(&db).await?;
    assert_eq!(info.backend, "postgres");
    assert_eq!(info.applied_migrations, 9);
    assert_eq!(info.pending_migrations, 0);

    db::rollback_migrations(&db, 9).await?;
    assert_eq!(db::run_migrations(&db).await?, 9);
    db::health_check(&db).await?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires docker"]
async fn procedures_and_views_on_postgres() -> Result<()> {
    let (_container, db) = start_postgres().await?;
    seeds::seed_sample_data(&db).await?;

    CameraUseCaseRepository::new(&db)
        .add_use_case("cam1", "tailgating", None, true)
        .await?;
    procedures::update_camera_health(
        &db,
        CameraHealthReport {
            camera_id: "cam1".to_string(),
            connection_status: ConnectionStatus::Connected,
            fps: 25.0,
            ..Default::default()
        },
    )
    .await?;

    let events = EventRepository::new(&db);
    events
        .save_event(SaveEventRequest {
            camera_id: "cam1".to_string(),
            event_type: "tailgating".to_string(),
            severity: EventSeverity::Critical,
            confidence_score: Some(0.87),
            ..Default::default()
        })
        .await?;

    let configurations = procedures::get_camera_configurations(&db).await?;
    assert_eq!(configurations.len(), 2);
    assert_eq!(
        configurations[0].enabled_use_cases,
        vec!["people_counting", "tailgating"]
    );

    let views = ViewRepository::new(&db);
    let status = views.camera_status(None).await?;
    assert_eq!(status[0].connection_status, "connected");
    assert_eq!(status[0].total_events, 1);

    let health = views.system_health().await?;
    assert_eq!(health.len(), 1);
    assert_eq!(health[0].critical_open_events, 1);

    assert_eq!(views.recent_events(1, 10, None).await?.len(), 1);

    let stats = events.event_statistics(EventFilter::default()).await?;
    assert_eq!(stats.total, 1);
    assert_eq!(stats.average_confidence, Some(0.87));
    Ok(())
}

#[tokio::test]
#[ignore = "requires docker"]
async fn check_constraints_reject_unknown_enum_values() -> Result<()> {
    let (_container, db) = start_postgres().await?;
    seeds::seed_sample_data(&db).await?;

    let err = db
        .execute_unprepared(
            "INSERT INTO events (event_id, camera_id, project_id, event_type, severity) \
             VALUES ('evt-bad', 'cam1', 'flexible-multi-camera-project', 'intrusion', 'fatal')",
        )
        .await
        .expect_err("severity outside the enum must be rejected");

    assert!(matches!(
        RepositoryError::database_error(err),
        RepositoryError::ConstraintViolation(_)
    ));
    Ok(())
}

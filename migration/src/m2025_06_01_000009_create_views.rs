//! Migration to create the read-only reporting views.
//!
//! The view bodies only use SQL understood by both PostgreSQL and SQLite;
//! time windows are applied by the queries that read them.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

#[derive(DeriveMigrationName)]
pub struct Migration;

const ACTIVE_CAMERAS_VIEW: &str = r#"
CREATE VIEW active_cameras_view AS
SELECT
    c.camera_id,
    c.name AS camera_name,
    c.stream_url,
    c.location,
    c.primary_use_case,
    c.connection_status,
    c.last_seen,
    p.project_id,
    p.name AS project_name,
    p.location AS project_location
FROM cameras c
JOIN projects p ON p.project_id = c.project_id
WHERE c.status = 'active' AND p.status = 'active'
"#;

const CAMERA_STATUS_VIEW: &str = r#"
CREATE VIEW camera_status_view AS
SELECT
    c.camera_id,
    c.name AS camera_name,
    c.project_id,
    c.status,
    c.connection_status,
    c.last_seen,
    (SELECT COUNT(*) FROM events e WHERE e.camera_id = c.camera_id) AS total_events,
    (SELECT COUNT(*) FROM events e
        WHERE e.camera_id = c.camera_id AND e.status = 'new') AS new_events,
    (SELECT MAX(e."timestamp") FROM events e WHERE e.camera_id = c.camera_id) AS last_event_at,
    (SELECT COUNT(*) FROM camera_use_cases u
        WHERE u.camera_id = c.camera_id AND u.is_enabled) AS enabled_use_cases
FROM cameras c
"#;

const RECENT_EVENTS_VIEW: &str = r#"
CREATE VIEW recent_events_view AS
SELECT
    e.event_id,
    e.event_type,
    e.severity,
    e.status,
    e.confidence_score,
    e."timestamp",
    e.camera_id,
    c.name AS camera_name,
    e.project_id,
    p.name AS project_name
FROM events e
JOIN cameras c ON c.camera_id = e.camera_id
JOIN projects p ON p.project_id = e.project_id
"#;

const SYSTEM_HEALTH_VIEW: &str = r#"
CREATE VIEW system_health_view AS
SELECT
    p.project_id,
    p.name AS project_name,
    COUNT(c.camera_id) AS total_cameras,
    COALESCE(SUM(CASE WHEN c.status = 'active' THEN 1 ELSE 0 END), 0) AS active_cameras,
    COALESCE(SUM(CASE WHEN c.connection_status = 'connected' THEN 1 ELSE 0 END), 0)
        AS connected_cameras,
    COALESCE(SUM(CASE WHEN c.connection_status = 'error' THEN 1 ELSE 0 END), 0)
        AS error_cameras,
    (SELECT COUNT(*) FROM events e
        WHERE e.project_id = p.project_id AND e.status <> 'resolved') AS open_events,
    (SELECT COUNT(*) FROM events e
        WHERE e.project_id = p.project_id AND e.status <> 'resolved'
          AND e.severity = 'critical') AS critical_open_events
FROM projects p
LEFT JOIN cameras c ON c.project_id = p.project_id
GROUP BY p.project_id, p.name
"#;

const VIEW_NAMES: [&str; 4] = [
    "system_health_view",
    "recent_events_view",
    "camera_status_view",
    "active_cameras_view",
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        for definition in [
            ACTIVE_CAMERAS_VIEW,
            CAMERA_STATUS_VIEW,
            RECENT_EVENTS_VIEW,
            SYSTEM_HEALTH_VIEW,
        ] {
            db.execute_unprepared(definition).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        for name in VIEW_NAMES {
            db.execute_unprepared(&format!("DROP VIEW IF EXISTS {name}"))
                .await?;
        }

        Ok(())
    }
}

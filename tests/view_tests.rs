//! Integration tests for the reporting views.

use anyhow::Result;
use chrono::{Duration, Utc};
use dcwatch::models::camera::{CameraStatus, ConnectionStatus};
use dcwatch::models::event::{EventSeverity, EventStatus};
use dcwatch::models::project::ProjectStatus;
use dcwatch::repositories::event::SaveEventRequest;
use dcwatch::repositories::{
    CameraRepository, CameraUseCaseRepository, EventRepository, ProjectRepository, ViewRepository,
};

#[path = "test_utils/mod.rs"]
mod test_utils;
use test_utils::{
    add_test_camera, create_test_project, create_test_user, setup_project_with_camera,
    setup_test_db,
};

fn event(camera_id: &str, event_type: &str, severity: EventSeverity) -> SaveEventRequest {
    SaveEventRequest {
        camera_id: camera_id.to_string(),
        event_type: event_type.to_string(),
        severity,
        confidence_score: Some(0.9),
        ..Default::default()
    }
}

#[tokio::test]
async fn active_cameras_view_hides_inactive_cameras_and_projects() -> Result<()> {
    let db = setup_test_db().await?;
    let project_id = setup_project_with_camera(&db).await?;
    add_test_camera(&db, &project_id, "cam2", "aisle").await?;
    CameraRepository::new(&db)
        .update_status("cam2", Some(CameraStatus::Inactive), None)
        .await?;

    let user_id = create_test_user(&db, "second").await?;
    let paused = create_test_project(&db, &user_id, "Paused site").await?;
    add_test_camera(&db, &paused, "cam9", "gate").await?;
    ProjectRepository::new(&db)
        .update_status(&paused, ProjectStatus::Maintenance)
        .await?;

    let rows = ViewRepository::new(&db).active_cameras(None).await?;

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].camera_id, "cam1");
    assert_eq!(rows[0].project_name, "Hall A");
    assert_eq!(rows[0].primary_use_case, "people_counting");
    Ok(())
}

#[tokio::test]
async fn camera_status_view_counts_events_and_use_cases() -> Result<()> {
    let db = setup_test_db().await?;
    let project_id = setup_project_with_camera(&db).await?;
    add_test_camera(&db, &project_id, "cam2", "reception").await?;

    let events = EventRepository::new(&db);
    let first = events
        .save_event(event("cam1", "people_counting", EventSeverity::Info))
        .await?;
    events
        .save_event(event("cam1", "tailgating", EventSeverity::Warning))
        .await?;
    events
        .update_status(&first.event_id, EventStatus::Acknowledged)
        .await?;

    CameraUseCaseRepository::new(&db)
        .add_use_case("cam1", "tailgating", None, true)
        .await?;
    CameraRepository::new(&db)
        .update_status("cam1", None, Some(ConnectionStatus::Connected))
        .await?;

    let rows = ViewRepository::new(&db).camera_status(Some(&project_id)).await?;
    assert_eq!(rows.len(), 2);

    let cam1 = &rows[0];
    assert_eq!(cam1.camera_id, "cam1");
    assert_eq!(cam1.connection_status, "connected");
    assert_eq!(cam1.total_events, 2);
    assert_eq!(cam1.new_events, 1);
    assert_eq!(cam1.enabled_use_cases, 2);
    assert!(cam1.last_event_at.is_some());

    let cam2 = &rows[1];
    assert_eq!(cam2.total_events, 0);
    assert_eq!(cam2.last_event_at, None);
    assert_eq!(cam2.enabled_use_cases, 1);
    Ok(())
}

#[tokio::test]
async fn recent_events_view_applies_window_and_limit() -> Result<()> {
    let db = setup_test_db().await?;
    setup_project_with_camera(&db).await?;
    let events = EventRepository::new(&db);

    for minutes_ago in [1, 2, 3] {
        events
            .save_event(SaveEventRequest {
                timestamp: Some(Utc::now() - Duration::minutes(minutes_ago)),
                ..event("cam1", "intrusion", EventSeverity::Critical)
            })
            .await?;
    }
    events
        .save_event(SaveEventRequest {
            timestamp: Some(Utc::now() - Duration::hours(48)),
            ..event("cam1", "intrusion", EventSeverity::Critical)
        })
        .await?;

    let views = ViewRepository::new(&db);

    let recent = views.recent_events(24, 100, None).await?;
    assert_eq!(recent.len(), 3);
    assert!(recent.windows(2).all(|pair| pair[0].timestamp >= pair[1].timestamp));
    assert_eq!(recent[0].camera_name, "main entrance");
    assert_eq!(recent[0].project_name, "Hall A");
    assert_eq!(recent[0].severity, "critical");

    assert_eq!(views.recent_events(24, 2, None).await?.len(), 2);
    assert_eq!(views.recent_events(72, 100, None).await?.len(), 4);
    assert!(views.recent_events(0, 100, None).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn system_health_view_rolls_up_per_project() -> Result<()> {
    let db = setup_test_db().await?;
    let project_id = setup_project_with_camera(&db).await?;
    add_test_camera(&db, &project_id, "cam2", "reception").await?;

    let user_id = create_test_user(&db, "empty-owner").await?;
    let empty_project = create_test_project(&db, &user_id, "Annex").await?;

    let cameras = CameraRepository::new(&db);
    cameras
        .update_status("cam1", None, Some(ConnectionStatus::Connected))
        .await?;
    cameras
        .update_status("cam2", Some(CameraStatus::Maintenance), Some(ConnectionStatus::Error))
        .await?;

    let events = EventRepository::new(&db);
    events
        .save_event(event("cam1", "intrusion", EventSeverity::Critical))
        .await?;
    let resolved = events
        .save_event(event("cam2", "intrusion", EventSeverity::Critical))
        .await?;
    events
        .update_status(&resolved.event_id, EventStatus::Resolved)
        .await?;
    events
        .save_event(event("cam2", "loitering", EventSeverity::Warning))
        .await?;

    let rows = ViewRepository::new(&db).system_health().await?;
    assert_eq!(rows.len(), 2);

    let annex = rows.iter().find(|row| row.project_id == empty_project).unwrap();
    assert_eq!(annex.total_cameras, 0);
    assert_eq!(annex.active_cameras, 0);
    assert_eq!(annex.open_events, 0);

    let hall = rows.iter().find(|row| row.project_id == project_id).unwrap();
    assert_eq!(hall.total_cameras, 2);
    assert_eq!(hall.active_cameras, 1);
    assert_eq!(hall.connected_cameras, 1);
    assert_eq!(hall.error_cameras, 1);
    assert_eq!(hall.open_events, 2);
    assert_eq!(hall.critical_open_events, 1);
    Ok(())
}

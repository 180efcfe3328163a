//! Tests for sample data seeding.

use anyhow::Result;
use dcwatch::models::{Camera, CameraUseCase, Project, User};
use dcwatch::repositories::camera::CameraFilter;
use dcwatch::repositories::{CameraRepository, CameraUseCaseRepository, UserRepository};
use dcwatch::seeds::seed_sample_data;
use dcwatch::seeds::sample::{ADMIN_USER_ID, DEFAULT_PROJECT_ID};
use sea_orm::{EntityTrait, PaginatorTrait};

#[path = "test_utils/mod.rs"]
mod test_utils;
use test_utils::setup_test_db;

#[tokio::test]
async fn seed_sample_data_populates_expected_rows() -> Result<()> {
    let db = setup_test_db().await?;
    let report = seed_sample_data(&db).await?;

    assert_eq!(report.users, vec![ADMIN_USER_ID]);
    assert_eq!(report.projects, vec![DEFAULT_PROJECT_ID]);
    assert_eq!(report.cameras, vec!["cam1", "cam2"]);

    let admin = UserRepository::new(&db)
        .get_user_by_username("admin")
        .await?
        .unwrap();
    assert_eq!(admin.user_id, ADMIN_USER_ID);
    assert!(admin.password_hash.starts_with("$2b$"));

    let cameras = CameraRepository::new(&db)
        .list_cameras(CameraFilter {
            project_id: Some(DEFAULT_PROJECT_ID.to_string()),
            active_only: true,
        })
        .await?;
    assert_eq!(cameras.len(), 2);
    assert!(cameras.iter().all(|c| c.primary_use_case == "people_counting"));
    assert!(
        cameras
            .iter()
            .all(|c| !c.stream_url.contains('@')),
        "sample stream URLs carry no credentials"
    );

    let use_cases = CameraUseCaseRepository::new(&db).list_use_cases("cam2").await?;
    assert_eq!(use_cases.len(), 1);
    assert!(use_cases[0].is_primary);
    Ok(())
}

#[tokio::test]
async fn seeding_is_idempotent() -> Result<()> {
    let db = setup_test_db().await?;
    seed_sample_data(&db).await?;
    let second = seed_sample_data(&db).await?;

    assert!(second.is_empty());
    assert_eq!(User::find().count(&db).await?, 1);
    assert_eq!(Project::find().count(&db).await?, 1);
    assert_eq!(Camera::find().count(&db).await?, 2);
    assert_eq!(CameraUseCase::find().count(&db).await?, 2);
    Ok(())
}

#[tokio::test]
async fn seeding_fills_in_missing_cameras_only() -> Result<()> {
    let db = setup_test_db().await?;
    seed_sample_data(&db).await?;
    CameraRepository::new(&db).delete_camera("cam2").await?;

    let report = seed_sample_data(&db).await?;

    assert!(report.users.is_empty());
    assert!(report.projects.is_empty());
    assert_eq!(report.cameras, vec!["cam2"]);
    Ok(())
}

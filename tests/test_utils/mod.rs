//! Test utilities for database testing.
//!
//! Sets up in-memory SQLite databases with every migration applied and
//! foreign keys enforced, plus small fixture builders.

use anyhow::Result;
use dcwatch::config::AppConfig;
use dcwatch::db;
use dcwatch::repositories::camera::AddCameraRequest;
use dcwatch::repositories::project::CreateProjectRequest;
use dcwatch::repositories::user::CreateUserRequest;
use dcwatch::repositories::{CameraRepository, ProjectRepository, UserRepository};
use dcwatch::models::user::UserRole;
use migration::{Migrator, MigratorTrait};
use sea_orm::DatabaseConnection;

/// Sets up an in-memory SQLite database with all migrations applied.
///
/// The pool is limited to one connection since every SQLite in-memory
/// connection opens its own database.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let config = AppConfig {
        profile: "test".to_string(),
        database_url: "sqlite::memory:".to_string(),
        db_max_connections: 1,
        ..AppConfig::default()
    };

    let db = db::init_pool(&config).await?;
    Migrator::up(&db, None).await?;

    Ok(db)
}

/// Creates a user with a cheap bcrypt cost and returns its id.
#[allow(dead_code)]
pub async fn create_test_user(db: &DatabaseConnection, username: &str) -> Result<String> {
    let user = UserRepository::new(db)
        .with_hash_cost(4)
        .create_user(CreateUserRequest {
            user_id: None,
            username: username.to_string(),
            email: format!("{username}@dcwatch.test"),
            password: "correct-horse-battery".to_string(),
            full_name: None,
            role: UserRole::Operator,
        })
        .await?;

    Ok(user.user_id)
}

/// Creates a project owned by `user_id` and returns its id.
#[allow(dead_code)]
pub async fn create_test_project(
    db: &DatabaseConnection,
    user_id: &str,
    name: &str,
) -> Result<String> {
    let project = ProjectRepository::new(db)
        .create_project(CreateProjectRequest {
            user_id: user_id.to_string(),
            name: name.to_string(),
            ..Default::default()
        })
        .await?;

    Ok(project.project_id)
}

/// Adds a camera with `people_counting` as primary use case.
#[allow(dead_code)]
pub async fn add_test_camera(
    db: &DatabaseConnection,
    project_id: &str,
    camera_id: &str,
    name: &str,
) -> Result<()> {
    CameraRepository::new(db)
        .add_camera(AddCameraRequest {
            camera_id: camera_id.to_string(),
            project_id: project_id.to_string(),
            name: name.to_string(),
            stream_url: format!("rtsp://10.0.0.10:554/{camera_id}"),
            ..Default::default()
        })
        .await?;

    Ok(())
}

/// User, project and one camera (`cam1`); returns the project id.
#[allow(dead_code)]
pub async fn setup_project_with_camera(db: &DatabaseConnection) -> Result<String> {
    let user_id = create_test_user(db, "operator").await?;
    let project_id = create_test_project(db, &user_id, "Hall A").await?;
    add_test_camera(db, &project_id, "cam1", "main entrance").await?;
    Ok(project_id)
}

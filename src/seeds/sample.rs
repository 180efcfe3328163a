//! Sample data seeding
//!
//! Inserts the default administrator, the default monitoring project and
//! its two entrance cameras. Rows that already exist are left untouched,
//! so seeding can run on every start.

use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde::Serialize;
use serde_json::json;

use crate::models::camera_use_case::UseCase;
use crate::models::user::{self, UserRole, UserStatus};
use crate::models::{Camera, Project, User};
use crate::repositories::camera::AddCameraRequest;
use crate::repositories::project::CreateProjectRequest;
use crate::repositories::{CameraRepository, ProjectRepository};

pub const ADMIN_USER_ID: &str = "admin-user-001";
pub const DEFAULT_PROJECT_ID: &str = "flexible-multi-camera-project";

/// bcrypt hash of the initial administrator password; rotate after setup.
const ADMIN_PASSWORD_HASH: &str = "$2b$12$LQv3c1yqBWVHxkd0LHAkCOYz6TtxMQJqhN8/LewYW0.WaW7.0.tKS";

const SAMPLE_STREAM_URL: &str = "rtsp://192.168.29.213:554/ch0_0.264";

/// Identifiers of the rows a seeding run inserted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub users: Vec<String>,
    pub projects: Vec<String>,
    pub cameras: Vec<String>,
}

impl SeedReport {
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.projects.is_empty() && self.cameras.is_empty()
    }
}

/// Seeds the sample user, project and cameras if they are missing.
pub async fn seed_sample_data(db: &DatabaseConnection) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    if User::find_by_id(ADMIN_USER_ID.to_string())
        .one(db)
        .await?
        .is_some()
    {
        log::info!("User '{}' already exists, skipping", ADMIN_USER_ID);
    } else {
        log::info!("Creating user: {}", ADMIN_USER_ID);
        user::ActiveModel {
            user_id: Set(ADMIN_USER_ID.to_string()),
            username: Set("admin".to_string()),
            email: Set("admin@datacenter.local".to_string()),
            password_hash: Set(ADMIN_PASSWORD_HASH.to_string()),
            full_name: Set(Some("System Administrator".to_string())),
            role: Set(UserRole::Admin),
            status: Set(UserStatus::Active),
            last_login: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await
        .with_context(|| format!("Failed to create user '{ADMIN_USER_ID}'"))?;
        report.users.push(ADMIN_USER_ID.to_string());
    }

    if Project::find_by_id(DEFAULT_PROJECT_ID.to_string())
        .one(db)
        .await?
        .is_some()
    {
        log::info!("Project '{}' already exists, skipping", DEFAULT_PROJECT_ID);
    } else {
        log::info!("Creating project: {}", DEFAULT_PROJECT_ID);
        ProjectRepository::new(db)
            .create_project(CreateProjectRequest {
                project_id: Some(DEFAULT_PROJECT_ID.to_string()),
                user_id: ADMIN_USER_ID.to_string(),
                name: "Main Datacenter Monitoring".to_string(),
                description: Some(
                    "Production multi-camera system with flexible use cases per camera"
                        .to_string(),
                ),
                project_type: Some("multi_camera_production".to_string()),
                location: Some("Main Facility".to_string()),
                metadata: None,
            })
            .await
            .with_context(|| format!("Failed to create project '{DEFAULT_PROJECT_ID}'"))?;
        report.projects.push(DEFAULT_PROJECT_ID.to_string());
    }

    let available_use_cases: Vec<&str> = UseCase::ALL.iter().map(UseCase::as_str).collect();
    let cameras = CameraRepository::new(db);

    for (camera_id, name) in [("cam1", "main entrance"), ("cam2", "reception")] {
        if Camera::find_by_id(camera_id.to_string())
            .one(db)
            .await?
            .is_some()
        {
            log::info!("Camera '{}' already exists, skipping", camera_id);
            continue;
        }

        log::info!("Creating camera: {}", camera_id);
        cameras
            .add_camera(AddCameraRequest {
                camera_id: camera_id.to_string(),
                project_id: DEFAULT_PROJECT_ID.to_string(),
                name: name.to_string(),
                stream_url: SAMPLE_STREAM_URL.to_string(),
                primary_use_case: Some(UseCase::PeopleCounting.to_string()),
                metadata: Some(json!({ "available_use_cases": available_use_cases })),
                ..Default::default()
            })
            .await
            .with_context(|| format!("Failed to create camera '{camera_id}'"))?;
        report.cameras.push(camera_id.to_string());
    }

    log::info!("Sample data seeding completed successfully");
    Ok(report)
}

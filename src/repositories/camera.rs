//! # Camera Repository
//!
//! Camera inventory operations. Adding a camera also assigns its primary
//! use case so `cameras.primary_use_case` always has a matching
//! `camera_use_cases` row.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde_json::Value;

use crate::error::RepositoryError;
use crate::models::Project;
use crate::models::camera::{
    ActiveModel as CameraActiveModel, CameraStatus, Column as CameraColumn, ConnectionStatus,
    Entity as Camera, Model as CameraModel,
};
use crate::models::camera_use_case::{ActiveModel as UseCaseActiveModel, UseCase};
use crate::repositories::camera_use_case::validate_use_case_name;

/// Request data for registering a camera
#[derive(Debug, Clone, Default)]
pub struct AddCameraRequest {
    pub camera_id: String,
    pub project_id: String,
    pub name: String,
    pub stream_url: String,
    pub location: Option<String>,
    /// Defaults to `people_counting`
    pub primary_use_case: Option<String>,
    pub zone_configuration: Option<Value>,
    pub processing_rules: Option<Value>,
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Default)]
pub struct CameraFilter {
    pub project_id: Option<String>,
    pub active_only: bool,
}

/// Replacement configuration documents; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct CameraConfigurationUpdate {
    pub zone_configuration: Option<Value>,
    pub processing_rules: Option<Value>,
    pub metadata: Option<Value>,
}

/// Repository for Camera database operations
pub struct CameraRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> CameraRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Register a camera and its primary use case in one transaction
    pub async fn add_camera(&self, request: AddCameraRequest) -> Result<CameraModel, RepositoryError> {
        validate_camera_id(&request.camera_id)?;
        if request.name.trim().is_empty() {
            return Err(RepositoryError::validation_error(
                "Camera name cannot be empty",
            ));
        }
        validate_stream_url(&request.stream_url)?;

        let primary_use_case = request
            .primary_use_case
            .filter(|use_case| !use_case.trim().is_empty())
            .unwrap_or_else(|| UseCase::PeopleCounting.to_string());
        validate_use_case_name(&primary_use_case)?;

        let project = Project::find_by_id(request.project_id.clone())
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;
        if project.is_none() {
            return Err(RepositoryError::NotFound(format!(
                "Project {} not found",
                request.project_id
            )));
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(RepositoryError::database_error)?;

        let camera = CameraActiveModel {
            camera_id: Set(request.camera_id),
            project_id: Set(request.project_id),
            name: Set(request.name),
            stream_url: Set(request.stream_url),
            location: Set(request.location),
            primary_use_case: Set(primary_use_case.clone()),
            zone_configuration: Set(request.zone_configuration),
            processing_rules: Set(request.processing_rules),
            connection_status: Set(ConnectionStatus::Disconnected),
            status: Set(CameraStatus::Active),
            metadata: Set(request.metadata),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(RepositoryError::database_error)?;

        UseCaseActiveModel {
            camera_id: Set(camera.camera_id.clone()),
            use_case: Set(primary_use_case),
            is_primary: Set(true),
            is_enabled: Set(true),
            configuration: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(RepositoryError::database_error)?;

        txn.commit()
            .await
            .map_err(RepositoryError::database_error)?;

        tracing::info!(camera_id = %camera.camera_id, project_id = %camera.project_id, "Camera added");
        Ok(camera)
    }

    pub async fn get_camera(&self, camera_id: &str) -> Result<Option<CameraModel>, RepositoryError> {
        Camera::find_by_id(camera_id.to_string())
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// List cameras ordered by name
    pub async fn list_cameras(
        &self,
        filter: CameraFilter,
    ) -> Result<Vec<CameraModel>, RepositoryError> {
        let mut query = Camera::find();

        if let Some(project_id) = filter.project_id {
            query = query.filter(CameraColumn::ProjectId.eq(project_id));
        }
        if filter.active_only {
            query = query.filter(CameraColumn::Status.eq(CameraStatus::Active));
        }

        query
            .order_by_asc(CameraColumn::Name)
            .order_by_asc(CameraColumn::CameraId)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Update lifecycle and/or connection status; `last_seen` is refreshed
    /// either way.
    pub async fn update_status(
        &self,
        camera_id: &str,
        status: Option<CameraStatus>,
        connection_status: Option<ConnectionStatus>,
    ) -> Result<CameraModel, RepositoryError> {
        let mut camera = self.require(camera_id).await?.into_active_model();

        if let Some(status) = status {
            camera.status = Set(status);
        }
        if let Some(connection_status) = connection_status {
            camera.connection_status = Set(connection_status);
        }
        camera.last_seen = Set(Utc::now().into());

        camera
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn update_configuration(
        &self,
        camera_id: &str,
        update: CameraConfigurationUpdate,
    ) -> Result<CameraModel, RepositoryError> {
        let mut camera = self.require(camera_id).await?.into_active_model();

        if let Some(zones) = update.zone_configuration {
            camera.zone_configuration = Set(Some(zones));
        }
        if let Some(rules) = update.processing_rules {
            camera.processing_rules = Set(Some(rules));
        }
        if let Some(metadata) = update.metadata {
            camera.metadata = Set(Some(metadata));
        }

        camera
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Delete a camera with its use cases, events and telemetry
    pub async fn delete_camera(&self, camera_id: &str) -> Result<(), RepositoryError> {
        let camera = self.require(camera_id).await?;

        camera
            .delete(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        tracing::info!(camera_id, "Camera deleted");
        Ok(())
    }

    async fn require(&self, camera_id: &str) -> Result<CameraModel, RepositoryError> {
        self.get_camera(camera_id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("Camera {camera_id} not found")))
    }
}

fn validate_camera_id(camera_id: &str) -> Result<(), RepositoryError> {
    if camera_id.is_empty() || camera_id.len() > 50 {
        return Err(RepositoryError::validation_error(
            "Camera id must be between 1 and 50 characters",
        ));
    }

    if !camera_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(RepositoryError::validation_error(
            "Camera id can only contain letters, numbers, hyphens, and underscores",
        ));
    }

    Ok(())
}

fn validate_stream_url(stream_url: &str) -> Result<(), RepositoryError> {
    if stream_url.len() > 500 {
        return Err(RepositoryError::validation_error(
            "Stream URL cannot exceed 500 characters",
        ));
    }

    match stream_url.split_once("://") {
        Some((scheme, rest)) if !scheme.is_empty() && !rest.is_empty() => Ok(()),
        _ => Err(RepositoryError::validation_error(format!(
            "Invalid stream URL '{stream_url}'"
        ))),
    }
}

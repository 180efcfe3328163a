//! # Project Repository
//!
//! Projects group the cameras of one monitored site and belong to a user.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    QueryFilter, QueryOrder, Set,
};
use serde_json::Value;

use super::generate_id;
use crate::error::RepositoryError;
use crate::models::User;
use crate::models::project::{
    ActiveModel as ProjectActiveModel, Column as ProjectColumn, Entity as Project,
    Model as ProjectModel, ProjectStatus,
};

pub const DEFAULT_PROJECT_TYPE: &str = "datacenter_monitoring";

/// Request data for creating a project
#[derive(Debug, Clone, Default)]
pub struct CreateProjectRequest {
    /// Explicit identifier; generated as `proj-<12 hex>` when absent
    pub project_id: Option<String>,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    /// Defaults to `datacenter_monitoring`
    pub project_type: Option<String>,
    pub location: Option<String>,
    pub metadata: Option<Value>,
}

/// Filter for [`ProjectRepository::list_projects`]
#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    pub user_id: Option<String>,
    pub active_only: bool,
}

/// Repository for Project database operations
pub struct ProjectRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ProjectRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a project for an existing user
    pub async fn create_project(
        &self,
        request: CreateProjectRequest,
    ) -> Result<ProjectModel, RepositoryError> {
        if request.name.trim().is_empty() {
            return Err(RepositoryError::validation_error(
                "Project name cannot be empty",
            ));
        }
        if request.name.len() > 255 {
            return Err(RepositoryError::validation_error(
                "Project name cannot exceed 255 characters",
            ));
        }

        let owner = User::find_by_id(request.user_id.clone())
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?;
        if owner.is_none() {
            return Err(RepositoryError::NotFound(format!(
                "User {} not found",
                request.user_id
            )));
        }

        let project = ProjectActiveModel {
            project_id: Set(request.project_id.unwrap_or_else(|| generate_id("proj"))),
            user_id: Set(request.user_id),
            name: Set(request.name),
            description: Set(request.description),
            project_type: Set(request
                .project_type
                .unwrap_or_else(|| DEFAULT_PROJECT_TYPE.to_string())),
            location: Set(request.location),
            status: Set(ProjectStatus::Active),
            metadata: Set(request.metadata),
            ..Default::default()
        };

        let result = project
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        tracing::info!(project_id = %result.project_id, user_id = %result.user_id, "Project created");
        Ok(result)
    }

    pub async fn get_project(
        &self,
        project_id: &str,
    ) -> Result<Option<ProjectModel>, RepositoryError> {
        Project::find_by_id(project_id.to_string())
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// List projects, newest first
    pub async fn list_projects(
        &self,
        filter: ProjectFilter,
    ) -> Result<Vec<ProjectModel>, RepositoryError> {
        let mut query = Project::find();

        if let Some(user_id) = filter.user_id {
            query = query.filter(ProjectColumn::UserId.eq(user_id));
        }
        if filter.active_only {
            query = query.filter(ProjectColumn::Status.eq(ProjectStatus::Active));
        }

        query
            .order_by_desc(ProjectColumn::CreatedAt)
            .order_by_asc(ProjectColumn::ProjectId)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn update_status(
        &self,
        project_id: &str,
        status: ProjectStatus,
    ) -> Result<ProjectModel, RepositoryError> {
        let mut project = self.require(project_id).await?.into_active_model();
        project.status = Set(status);

        project
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Replace the free-form metadata document
    pub async fn update_metadata(
        &self,
        project_id: &str,
        metadata: Option<Value>,
    ) -> Result<ProjectModel, RepositoryError> {
        let mut project = self.require(project_id).await?.into_active_model();
        project.metadata = Set(metadata);

        project
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Delete a project together with its cameras and events
    pub async fn delete_project(&self, project_id: &str) -> Result<(), RepositoryError> {
        let project = self.require(project_id).await?;

        project
            .delete(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        tracing::info!(project_id, "Project deleted");
        Ok(())
    }

    async fn require(&self, project_id: &str) -> Result<ProjectModel, RepositoryError> {
        self.get_project(project_id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("Project {project_id} not found")))
    }
}

//! # Camera Use Case Repository
//!
//! Assignment of detection capabilities to cameras. The schema only
//! enforces uniqueness of `(camera_id, use_case)`; this repository keeps
//! exactly one enabled primary per camera and mirrors it into
//! `cameras.primary_use_case`.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, ModelTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde_json::Value;

use crate::error::RepositoryError;
use crate::models::Camera;
use crate::models::camera_use_case::{
    ActiveModel as UseCaseActiveModel, Column as UseCaseColumn, Entity as CameraUseCase,
    Model as UseCaseModel,
};

/// Repository for CameraUseCase database operations
pub struct CameraUseCaseRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> CameraUseCaseRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Assign a new, non-primary use case. An existing assignment is a
    /// `Conflict`.
    pub async fn add_use_case(
        &self,
        camera_id: &str,
        use_case: &str,
        configuration: Option<Value>,
        is_enabled: bool,
    ) -> Result<UseCaseModel, RepositoryError> {
        validate_use_case_name(use_case)?;
        self.require_camera(self.db, camera_id).await?;

        let result = UseCaseActiveModel {
            camera_id: Set(camera_id.to_string()),
            use_case: Set(use_case.to_string()),
            is_primary: Set(false),
            is_enabled: Set(is_enabled),
            configuration: Set(configuration),
            ..Default::default()
        }
        .insert(self.db)
        .await
        .map_err(|err| match RepositoryError::database_error(err) {
            RepositoryError::Conflict(_) => RepositoryError::Conflict(format!(
                "Use case {use_case} is already assigned to camera {camera_id}"
            )),
            other => other,
        })?;

        tracing::info!(camera_id, use_case, "Use case assigned");
        Ok(result)
    }

    /// Insert the assignment or replace the configuration and enabled flag
    /// of an existing one. The primary flag is left untouched.
    pub async fn upsert_use_case(
        &self,
        camera_id: &str,
        use_case: &str,
        configuration: Option<Value>,
        is_enabled: bool,
    ) -> Result<UseCaseModel, RepositoryError> {
        match self.find(self.db, camera_id, use_case).await? {
            Some(existing) => {
                if existing.is_primary && !is_enabled {
                    return Err(primary_cannot_be_disabled(camera_id, use_case));
                }

                let mut active = existing.into_active_model();
                active.configuration = Set(configuration);
                active.is_enabled = Set(is_enabled);

                active
                    .update(self.db)
                    .await
                    .map_err(RepositoryError::database_error)
            }
            None => {
                self.add_use_case(camera_id, use_case, configuration, is_enabled)
                    .await
            }
        }
    }

    /// Use cases of a camera, primary first, then by name
    pub async fn list_use_cases(
        &self,
        camera_id: &str,
    ) -> Result<Vec<UseCaseModel>, RepositoryError> {
        CameraUseCase::find()
            .filter(UseCaseColumn::CameraId.eq(camera_id))
            .order_by_desc(UseCaseColumn::IsPrimary)
            .order_by_asc(UseCaseColumn::UseCase)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Enable or disable a use case. The primary use case stays enabled.
    pub async fn set_enabled(
        &self,
        camera_id: &str,
        use_case: &str,
        is_enabled: bool,
    ) -> Result<UseCaseModel, RepositoryError> {
        let existing = self.require(self.db, camera_id, use_case).await?;
        if existing.is_primary && !is_enabled {
            return Err(primary_cannot_be_disabled(camera_id, use_case));
        }

        let mut active = existing.into_active_model();
        active.is_enabled = Set(is_enabled);

        active
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Make `use_case` the only primary of the camera.
    ///
    /// Demotes every other assignment, enables the new primary and updates
    /// `cameras.primary_use_case`, all in one transaction.
    pub async fn set_primary(
        &self,
        camera_id: &str,
        use_case: &str,
    ) -> Result<UseCaseModel, RepositoryError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(RepositoryError::database_error)?;

        let camera = self.require_camera(&txn, camera_id).await?;
        let target = self.require(&txn, camera_id, use_case).await?;
        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();

        CameraUseCase::update_many()
            .col_expr(UseCaseColumn::IsPrimary, Expr::value(false))
            .col_expr(UseCaseColumn::UpdatedAt, Expr::value(now))
            .filter(UseCaseColumn::CameraId.eq(camera_id))
            .filter(UseCaseColumn::Id.ne(target.id))
            .filter(UseCaseColumn::IsPrimary.eq(true))
            .exec(&txn)
            .await
            .map_err(RepositoryError::database_error)?;

        let mut active = target.into_active_model();
        active.is_primary = Set(true);
        active.is_enabled = Set(true);
        let promoted = active
            .update(&txn)
            .await
            .map_err(RepositoryError::database_error)?;

        let mut camera = camera.into_active_model();
        camera.primary_use_case = Set(use_case.to_string());
        camera
            .update(&txn)
            .await
            .map_err(RepositoryError::database_error)?;

        txn.commit()
            .await
            .map_err(RepositoryError::database_error)?;

        tracing::info!(camera_id, use_case, "Primary use case switched");
        Ok(promoted)
    }

    /// Remove an assignment. The primary use case cannot be removed; switch
    /// the primary first.
    pub async fn remove_use_case(
        &self,
        camera_id: &str,
        use_case: &str,
    ) -> Result<(), RepositoryError> {
        let existing = self.require(self.db, camera_id, use_case).await?;
        if existing.is_primary {
            return Err(RepositoryError::validation_error(format!(
                "Use case {use_case} is the primary of camera {camera_id} and cannot be removed"
            )));
        }

        existing
            .delete(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        tracing::info!(camera_id, use_case, "Use case removed");
        Ok(())
    }

    async fn find<C: ConnectionTrait>(
        &self,
        conn: &C,
        camera_id: &str,
        use_case: &str,
    ) -> Result<Option<UseCaseModel>, RepositoryError> {
        CameraUseCase::find()
            .filter(UseCaseColumn::CameraId.eq(camera_id))
            .filter(UseCaseColumn::UseCase.eq(use_case))
            .one(conn)
            .await
            .map_err(RepositoryError::database_error)
    }

    async fn require<C: ConnectionTrait>(
        &self,
        conn: &C,
        camera_id: &str,
        use_case: &str,
    ) -> Result<UseCaseModel, RepositoryError> {
        self.find(conn, camera_id, use_case).await?.ok_or_else(|| {
            RepositoryError::NotFound(format!(
                "Use case {use_case} is not assigned to camera {camera_id}"
            ))
        })
    }

    async fn require_camera<C: ConnectionTrait>(
        &self,
        conn: &C,
        camera_id: &str,
    ) -> Result<crate::models::camera::Model, RepositoryError> {
        Camera::find_by_id(camera_id.to_string())
            .one(conn)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| RepositoryError::NotFound(format!("Camera {camera_id} not found")))
    }
}

pub(crate) fn validate_use_case_name(use_case: &str) -> Result<(), RepositoryError> {
    if use_case.is_empty() || use_case.len() > 100 {
        return Err(RepositoryError::validation_error(
            "Use case name must be between 1 and 100 characters",
        ));
    }

    if !use_case
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(RepositoryError::validation_error(format!(
            "Use case name '{use_case}' must be snake_case"
        )));
    }

    Ok(())
}

fn primary_cannot_be_disabled(camera_id: &str, use_case: &str) -> RepositoryError {
    RepositoryError::validation_error(format!(
        "Use case {use_case} is the primary of camera {camera_id} and cannot be disabled"
    ))
}

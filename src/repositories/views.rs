//! # View Repository
//!
//! Read access to the reporting views created by the migrator. Queries are
//! built with sea-query so placeholders match the connected backend.

use sea_orm::sea_query::{Alias, Asterisk, Expr, Order, Query, SelectStatement};
use sea_orm::{ConnectionTrait, DatabaseConnection, FromQueryResult};

use super::hours_ago;
use crate::error::RepositoryError;
use crate::models::views::{
    ACTIVE_CAMERAS_VIEW, ActiveCameraRow, CAMERA_STATUS_VIEW, CameraStatusRow,
    RECENT_EVENTS_VIEW, RecentEventRow, SYSTEM_HEALTH_VIEW, SystemHealthRow,
};

/// Repository over the reporting views
pub struct ViewRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ViewRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Active cameras of active projects, by camera name
    pub async fn active_cameras(
        &self,
        project_id: Option<&str>,
    ) -> Result<Vec<ActiveCameraRow>, RepositoryError> {
        let mut query = select_all(ACTIVE_CAMERAS_VIEW);
        if let Some(project_id) = project_id {
            query.and_where(Expr::col(Alias::new("project_id")).eq(project_id));
        }
        query
            .order_by(Alias::new("camera_name"), Order::Asc)
            .order_by(Alias::new("camera_id"), Order::Asc);

        self.fetch(&query).await
    }

    /// Status and event counters of every camera, by camera id
    pub async fn camera_status(
        &self,
        project_id: Option<&str>,
    ) -> Result<Vec<CameraStatusRow>, RepositoryError> {
        let mut query = select_all(CAMERA_STATUS_VIEW);
        if let Some(project_id) = project_id {
            query.and_where(Expr::col(Alias::new("project_id")).eq(project_id));
        }
        query.order_by(Alias::new("camera_id"), Order::Asc);

        self.fetch(&query).await
    }

    /// Events of the last `hours` hours, newest first, at most `limit` rows.
    pub async fn recent_events(
        &self,
        hours: i64,
        limit: u64,
        project_id: Option<&str>,
    ) -> Result<Vec<RecentEventRow>, RepositoryError> {
        if hours <= 0 || limit == 0 {
            return Ok(Vec::new());
        }

        let mut query = select_all(RECENT_EVENTS_VIEW);
        query.and_where(Expr::col(Alias::new("timestamp")).gte(hours_ago(hours)));
        if let Some(project_id) = project_id {
            query.and_where(Expr::col(Alias::new("project_id")).eq(project_id));
        }
        query
            .order_by(Alias::new("timestamp"), Order::Desc)
            .order_by(Alias::new("event_id"), Order::Asc)
            .limit(limit);

        self.fetch(&query).await
    }

    /// Per project health rollup, by project name
    pub async fn system_health(&self) -> Result<Vec<SystemHealthRow>, RepositoryError> {
        let mut query = select_all(SYSTEM_HEALTH_VIEW);
        query
            .order_by(Alias::new("project_name"), Order::Asc)
            .order_by(Alias::new("project_id"), Order::Asc);

        self.fetch(&query).await
    }

    async fn fetch<T: FromQueryResult>(
        &self,
        query: &SelectStatement,
    ) -> Result<Vec<T>, RepositoryError> {
        let statement = self.db.get_database_backend().build(query);

        T::find_by_statement(statement)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }
}

fn select_all(view: &str) -> SelectStatement {
    Query::select()
        .column(Asterisk)
        .from(Alias::new(view))
        .to_owned()
}

//! # Event Repository
//!
//! Storage of detection events. The project and camera name of an event
//! are always taken from its camera, never from the caller.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use serde::Serialize;
use serde_json::Value;

use super::{generate_id, hours_ago};
use crate::error::RepositoryError;
use crate::models::Camera;
use crate::models::event::{
    ActiveModel as EventActiveModel, Column as EventColumn, Entity as Event, EventSeverity,
    EventStatus, Model as EventModel,
};

/// Request data for recording a detection event
#[derive(Debug, Clone, Default)]
pub struct SaveEventRequest {
    pub camera_id: String,
    pub event_type: String,
    pub severity: EventSeverity,
    pub detection_data: Option<Value>,
    pub local_image_path: Option<String>,
    pub gcp_image_path: Option<String>,
    /// Detector confidence in `0.0..=1.0`
    pub confidence_score: Option<f64>,
    pub processing_time_ms: Option<i32>,
    pub model_version: Option<String>,
    /// Detection time; now when absent
    pub timestamp: Option<DateTime<Utc>>,
}

/// Filter shared by [`EventRepository::list_events`] and
/// [`EventRepository::event_statistics`]
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub camera_id: Option<String>,
    pub project_id: Option<String>,
    pub event_type: Option<String>,
    pub status: Option<EventStatus>,
    /// Only events from the last `n` hours
    pub since_hours: Option<i64>,
    /// Maximum number of rows returned by `list_events`
    pub limit: Option<u64>,
}

/// Aggregates over the events matching a filter
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventStatistics {
    pub total: u64,
    pub by_type: BTreeMap<String, u64>,
    pub by_severity: BTreeMap<String, u64>,
    pub average_confidence: Option<f64>,
    pub latest_event_at: Option<DateTime<FixedOffset>>,
}

/// Repository for Event database operations
pub struct EventRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> EventRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Record a new event with status `new`
    pub async fn save_event(&self, request: SaveEventRequest) -> Result<EventModel, RepositoryError> {
        if request.event_type.trim().is_empty() {
            return Err(RepositoryError::validation_error(
                "Event type cannot be empty",
            ));
        }
        if let Some(score) = request.confidence_score
            && !(0.0..=1.0).contains(&score)
        {
            return Err(RepositoryError::validation_error(format!(
                "Confidence score must be between 0 and 1, got {score}"
            )));
        }

        let camera = Camera::find_by_id(request.camera_id.clone())
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| {
                RepositoryError::NotFound(format!("Camera {} not found", request.camera_id))
            })?;

        let timestamp = request.timestamp.unwrap_or_else(Utc::now);

        let event = EventActiveModel {
            event_id: Set(generate_id("evt")),
            camera_id: Set(camera.camera_id),
            project_id: Set(camera.project_id),
            event_type: Set(request.event_type),
            severity: Set(request.severity),
            detection_data: Set(request.detection_data),
            local_image_path: Set(request.local_image_path),
            gcp_image_path: Set(request.gcp_image_path),
            confidence_score: Set(request.confidence_score),
            status: Set(EventStatus::New),
            camera_name: Set(Some(camera.name)),
            processing_time_ms: Set(request.processing_time_ms),
            model_version: Set(request.model_version),
            timestamp: Set(timestamp.into()),
            ..Default::default()
        };

        let result = event
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        tracing::debug!(
            event_id = %result.event_id,
            camera_id = %result.camera_id,
            event_type = %result.event_type,
            "Event saved"
        );
        Ok(result)
    }

    pub async fn get_event(&self, event_id: &str) -> Result<Option<EventModel>, RepositoryError> {
        Event::find_by_id(event_id.to_string())
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Events matching `filter`, newest first
    pub async fn list_events(&self, filter: EventFilter) -> Result<Vec<EventModel>, RepositoryError> {
        let mut query = apply_filter(Event::find(), &filter)
            .order_by_desc(EventColumn::Timestamp)
            .order_by_asc(EventColumn::EventId);

        if let Some(limit) = filter.limit {
            query = query.limit(limit);
        }

        query
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn update_status(
        &self,
        event_id: &str,
        status: EventStatus,
    ) -> Result<EventModel, RepositoryError> {
        let event = self
            .get_event(event_id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("Event {event_id} not found")))?;

        let mut active = event.into_active_model();
        active.status = Set(status);

        active
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Totals per type and severity, average confidence and latest event
    /// time. `filter.limit` is ignored.
    pub async fn event_statistics(
        &self,
        filter: EventFilter,
    ) -> Result<EventStatistics, RepositoryError> {
        let total = apply_filter(Event::find(), &filter)
            .count(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        if total == 0 {
            return Ok(EventStatistics::default());
        }

        let by_type = self
            .count_grouped(&filter, EventColumn::EventType)
            .await?;
        let by_severity = self
            .count_grouped(&filter, EventColumn::Severity)
            .await?;

        let average_confidence = apply_filter(Event::find(), &filter)
            .select_only()
            .column_as(
                SimpleExpr::from(Func::avg(Expr::col(EventColumn::ConfidenceScore))),
                "average_confidence",
            )
            .into_tuple::<Option<f64>>()
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?
            .flatten();

        let latest_event_at = apply_filter(Event::find(), &filter)
            .order_by_desc(EventColumn::Timestamp)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?
            .map(|event| event.timestamp);

        Ok(EventStatistics {
            total,
            by_type,
            by_severity,
            average_confidence,
            latest_event_at,
        })
    }

    async fn count_grouped(
        &self,
        filter: &EventFilter,
        column: EventColumn,
    ) -> Result<BTreeMap<String, u64>, RepositoryError> {
        let rows = apply_filter(Event::find(), filter)
            .select_only()
            .column(column)
            .column_as(Expr::col(EventColumn::EventId).count(), "event_count")
            .group_by(column)
            .into_tuple::<(String, i64)>()
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(rows
            .into_iter()
            .map(|(key, count)| (key, count.max(0) as u64))
            .collect())
    }
}

fn apply_filter(mut query: Select<Event>, filter: &EventFilter) -> Select<Event> {
    if let Some(camera_id) = &filter.camera_id {
        query = query.filter(EventColumn::CameraId.eq(camera_id.as_str()));
    }
    if let Some(project_id) = &filter.project_id {
        query = query.filter(EventColumn::ProjectId.eq(project_id.as_str()));
    }
    if let Some(event_type) = &filter.event_type {
        query = query.filter(EventColumn::EventType.eq(event_type.as_str()));
    }
    if let Some(status) = filter.status {
        query = query.filter(EventColumn::Status.eq(status));
    }
    if let Some(hours) = filter.since_hours {
        query = query.filter(EventColumn::Timestamp.gte(hours_ago(hours)));
    }
    query
}

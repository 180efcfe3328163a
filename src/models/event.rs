//! Event entity model
//!
//! Detection events raised by the processing workers. Each event carries
//! both its camera and its project so either parent can cascade it away.

use chrono::Utc;
use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "events")]
pub struct Model {
    /// Unique identifier (`evt-<12 hex>`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub event_id: String,

    pub camera_id: String,

    pub project_id: String,

    /// Kind of detection, usually a use case name
    pub event_type: String,

    pub severity: EventSeverity,

    /// Raw detector output
    #[sea_orm(column_type = "JsonBinary")]
    pub detection_data: Option<Json>,

    pub local_image_path: Option<String>,

    pub gcp_image_path: Option<String>,

    #[sea_orm(column_type = "Double")]
    pub confidence_score: Option<f64>,

    pub status: EventStatus,

    /// Camera name at the time the event was saved
    pub camera_name: Option<String>,

    pub processing_time_ms: Option<i32>,

    pub model_version: Option<String>,

    /// When the detection happened
    pub timestamp: DateTimeWithTimeZone,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

/// How urgent an event is
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum EventSeverity {
    #[sea_orm(string_value = "info")]
    #[default]
    Info,
    #[sea_orm(string_value = "warning")]
    Warning,
    #[sea_orm(string_value = "critical")]
    Critical,
}

/// Resolution workflow of an event
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    #[sea_orm(string_value = "new")]
    #[default]
    New,
    #[sea_orm(string_value = "acknowledged")]
    Acknowledged,
    #[sea_orm(string_value = "resolved")]
    Resolved,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::camera::Entity",
        from = "Column::CameraId",
        to = "super::camera::Column::CameraId",
        on_delete = "Cascade"
    )]
    Camera,

    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::ProjectId",
        on_delete = "Cascade"
    )]
    Project,
}

impl Related<super::camera::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Camera.def()
    }
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let now: DateTimeWithTimeZone = Utc::now().into();
        if insert {
            if matches!(self.created_at, ActiveValue::NotSet) {
                self.created_at = Set(now);
            }
            if matches!(self.timestamp, ActiveValue::NotSet) {
                self.timestamp = Set(now);
            }
        }
        self.updated_at = Set(now);
        Ok(self)
    }
}

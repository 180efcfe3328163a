//! Camera entity model
//!
//! This module contains the SeaORM entity model for the cameras table,
//! which stores the camera inventory of every project.

use chrono::Utc;
use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};

/// Camera entity; `camera_id` is assigned by the operator (e.g. `cam1`)
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cameras")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub camera_id: String,

    /// Project this camera belongs to
    pub project_id: String,

    pub name: String,

    /// Stream address, usually `rtsp://`
    pub stream_url: String,

    pub location: Option<String>,

    /// Mirrors the use case flagged primary in `camera_use_cases`
    pub primary_use_case: String,

    /// Detection zones keyed by use case
    #[sea_orm(column_type = "JsonBinary")]
    pub zone_configuration: Option<Json>,

    /// Rule thresholds keyed by use case
    #[sea_orm(column_type = "JsonBinary")]
    pub processing_rules: Option<Json>,

    pub connection_status: ConnectionStatus,

    /// Last time the camera reported a status
    pub last_seen: DateTimeWithTimeZone,

    pub status: CameraStatus,

    #[sea_orm(column_type = "JsonBinary")]
    pub metadata: Option<Json>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

/// Stream connection state, shared with `camera_health`
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    #[sea_orm(string_value = "connected")]
    Connected,
    #[sea_orm(string_value = "disconnected")]
    #[default]
    Disconnected,
    #[sea_orm(string_value = "error")]
    Error,
}

impl std::str::FromStr for ConnectionStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "connected" => Ok(Self::Connected),
            "disconnected" => Ok(Self::Disconnected),
            "error" => Ok(Self::Error),
            other => Err(format!(
                "unknown connection status '{other}' (expected connected, disconnected or error)"
            )),
        }
    }
}

/// Lifecycle status of a camera
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum CameraStatus {
    #[sea_orm(string_value = "active")]
    #[default]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
    #[sea_orm(string_value = "maintenance")]
    Maintenance,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::ProjectId",
        on_delete = "Cascade"
    )]
    Project,

    #[sea_orm(has_many = "super::camera_use_case::Entity")]
    CameraUseCase,

    #[sea_orm(has_many = "super::event::Entity")]
    Event,

    #[sea_orm(has_many = "super::processing_stat::Entity")]
    ProcessingStat,

    #[sea_orm(has_many = "super::camera_health::Entity")]
    CameraHealth,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl Related<super::camera_use_case::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CameraUseCase.def()
    }
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl Related<super::processing_stat::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProcessingStat.def()
    }
}

impl Related<super::camera_health::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CameraHealth.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let now: DateTimeWithTimeZone = Utc::now().into();
        if insert && matches!(self.created_at, ActiveValue::NotSet) {
            self.created_at = Set(now);
        }
        if insert && matches!(self.last_seen, ActiveValue::NotSet) {
            self.last_seen = Set(now);
        }
        self.updated_at = Set(now);
        Ok(self)
    }
}

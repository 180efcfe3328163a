//! Camera health entity model

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::camera::ConnectionStatus;

/// One health sample for a camera; rows are never updated
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "camera_health")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub health_id: i32,
    pub camera_id: String,
    pub timestamp: DateTimeWithTimeZone,
    pub connection_status: ConnectionStatus,
    #[sea_orm(column_type = "Double")]
    pub fps: f64,
    pub frames_processed: i32,
    pub events_detected: i32,
    #[sea_orm(column_type = "Double")]
    pub cpu_usage: f64,
    #[sea_orm(column_type = "Double")]
    pub memory_usage: f64,
    pub error_message: Option<String>,
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
}

impl Related<super::camera::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Camera.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

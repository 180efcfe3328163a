//! Processing statistics entity model
//!
//! Append-only counters reported periodically for each camera.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::camera_use_case::UseCase;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "processing_stats")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub stat_id: i32,
    pub camera_id: String,
    pub timestamp: DateTimeWithTimeZone,
    pub frames_processed: i32,
    pub total_detections: i32,
    pub people_counting_events: i32,
    pub ppe_detection_events: i32,
    pub tailgating_events: i32,
    pub intrusion_events: i32,
    pub loitering_events: i32,
    pub processing_time_ms: i64,
    #[sea_orm(column_type = "Double")]
    pub fps_average: f64,
    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// Event counter recorded for the given use case
    pub fn events_for(&self, use_case: UseCase) -> i32 {
        match use_case {
            UseCase::PeopleCounting => self.people_counting_events,
            UseCase::PpeDetection => self.ppe_detection_events,
            UseCase::Tailgating => self.tailgating_events,
            UseCase::Intrusion => self.intrusion_events,
            UseCase::Loitering => self.loitering_events,
        }
    }
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

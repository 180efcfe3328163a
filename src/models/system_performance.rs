//! System performance entity model
//!
//! Global samples of the monitoring host, not tied to a camera.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "system_performance")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub perf_id: i32,
    pub timestamp: DateTimeWithTimeZone,
    pub total_cameras: i32,
    pub active_cameras: i32,
    #[sea_orm(column_type = "Double")]
    pub total_fps: f64,
    pub total_events_per_minute: i32,
    #[sea_orm(column_type = "Double")]
    pub cpu_usage_percent: f64,
    #[sea_orm(column_type = "Double")]
    pub memory_usage_percent: f64,
    #[sea_orm(column_type = "Double")]
    pub disk_usage_percent: f64,
    #[sea_orm(column_type = "Double")]
    pub gpu_usage_percent: f64,
    pub pending_uploads: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

//! Row types for the reporting views.
//!
//! The views are created by the migrator; these structs only read them.
//! Enum-like columns are kept as plain strings since the views are
//! projections meant for reporting.

use chrono::{DateTime, FixedOffset};
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

pub const ACTIVE_CAMERAS_VIEW: &str = "active_cameras_view";
pub const CAMERA_STATUS_VIEW: &str = "camera_status_view";
pub const RECENT_EVENTS_VIEW: &str = "recent_events_view";
pub const SYSTEM_HEALTH_VIEW: &str = "system_health_view";

/// Active cameras of active projects
#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize, Deserialize)]
pub struct ActiveCameraRow {
    pub camera_id: String,
    pub camera_name: String,
    pub stream_url: String,
    pub location: Option<String>,
    pub primary_use_case: String,
    pub connection_status: String,
    pub last_seen: DateTime<FixedOffset>,
    pub project_id: String,
    pub project_name: String,
    pub project_location: Option<String>,
}

/// Per camera status with event and use case counts
#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize, Deserialize)]
pub struct CameraStatusRow {
    pub camera_id: String,
    pub camera_name: String,
    pub project_id: String,
    pub status: String,
    pub connection_status: String,
    pub last_seen: DateTime<FixedOffset>,
    pub total_events: i64,
    pub new_events: i64,
    pub last_event_at: Option<DateTime<FixedOffset>>,
    pub enabled_use_cases: i64,
}

#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize, Deserialize)]
pub struct RecentEventRow {
    pub event_id: String,
    pub event_type: String,
    pub severity: String,
    pub status: String,
    pub confidence_score: Option<f64>,
    pub timestamp: DateTime<FixedOffset>,
    pub camera_id: String,
    pub camera_name: String,
    pub project_id: String,
    pub project_name: String,
}

/// Per project rollup of camera states and unresolved events
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize, Deserialize)]
pub struct SystemHealthRow {
    pub project_id: String,
    pub project_name: String,
    pub total_cameras: i64,
    pub active_cameras: i64,
    pub connected_cameras: i64,
    pub error_cameras: i64,
    pub open_events: i64,
    pub critical_open_events: i64,
}

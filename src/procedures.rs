//! # Procedures
//!
//! The three operations the processing workers and dashboards call by
//! name: loading camera configurations, reporting camera health and
//! summarizing system performance per hour.

use std::collections::BTreeMap;

use chrono::{DateTime, DurationRound, FixedOffset, TimeDelta, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use serde_json::Value;

use crate::error::RepositoryError;
use crate::models::camera::{CameraStatus, Column as CameraColumn, ConnectionStatus};
use crate::models::camera_health::Model as HealthModel;
use crate::models::system_performance::Model as PerfModel;
use crate::models::{Camera, CameraUseCase};
use crate::repositories::TelemetryRepository;
use crate::repositories::telemetry::{health_row, validate_health_report};

pub use crate::repositories::telemetry::CameraHealthReport;

/// Configuration handed to a processing worker for one camera
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CameraConfiguration {
    pub camera_id: String,
    pub name: String,
    pub stream_url: String,
    pub location: Option<String>,
    pub primary_use_case: String,
    pub zone_configuration: Option<Value>,
    pub processing_rules: Option<Value>,
    pub metadata: Option<Value>,
    pub connection_status: ConnectionStatus,
    /// Enabled use cases, primary first
    pub enabled_use_cases: Vec<String>,
}

/// Aggregated `system_performance` samples of one UTC hour
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyPerformance {
    pub hour: DateTime<Utc>,
    pub samples: u64,
    pub avg_total_fps: f64,
    pub avg_events_per_minute: f64,
    pub avg_cpu_usage_percent: f64,
    pub avg_memory_usage_percent: f64,
    pub avg_disk_usage_percent: f64,
    pub avg_gpu_usage_percent: f64,
    pub max_total_cameras: i32,
    pub max_active_cameras: i32,
    pub max_pending_uploads: i32,
}

/// Configuration of every active camera, ordered by camera id.
pub async fn get_camera_configurations(
    db: &DatabaseConnection,
) -> Result<Vec<CameraConfiguration>, RepositoryError> {
    let cameras = Camera::find()
        .filter(CameraColumn::Status.eq(CameraStatus::Active))
        .order_by_asc(CameraColumn::CameraId)
        .find_with_related(CameraUseCase)
        .all(db)
        .await
        .map_err(RepositoryError::database_error)?;

    let configurations = cameras
        .into_iter()
        .map(|(camera, mut use_cases)| {
            use_cases.retain(|use_case| use_case.is_enabled);
            use_cases.sort_by(|a, b| {
                b.is_primary
                    .cmp(&a.is_primary)
                    .then_with(|| a.use_case.cmp(&b.use_case))
            });

            CameraConfiguration {
                camera_id: camera.camera_id,
                name: camera.name,
                stream_url: camera.stream_url,
                location: camera.location,
                primary_use_case: camera.primary_use_case,
                zone_configuration: camera.zone_configuration,
                processing_rules: camera.processing_rules,
                metadata: camera.metadata,
                connection_status: camera.connection_status,
                enabled_use_cases: use_cases.into_iter().map(|u| u.use_case).collect(),
            }
        })
        .collect();

    Ok(configurations)
}

/// Record a health report: set the camera's connection status and
/// `last_seen`, then append a `camera_health` row. Both writes commit
/// together; an unknown camera writes nothing.
pub async fn update_camera_health(
    db: &DatabaseConnection,
    report: CameraHealthReport,
) -> Result<HealthModel, RepositoryError> {
    validate_health_report(&report)?;

    let txn = db.begin().await.map_err(RepositoryError::database_error)?;

    let camera = Camera::find_by_id(report.camera_id.clone())
        .one(&txn)
        .await
        .map_err(RepositoryError::database_error)?
        .ok_or_else(|| {
            RepositoryError::NotFound(format!("Camera {} not found", report.camera_id))
        })?;

    let seen_at: DateTime<FixedOffset> = report.timestamp.unwrap_or_else(Utc::now).into();
    let report = CameraHealthReport {
        timestamp: Some(seen_at.with_timezone(&Utc)),
        ..report
    };

    let mut camera = camera.into_active_model();
    camera.connection_status = Set(report.connection_status);
    camera.last_seen = Set(seen_at);
    camera
        .update(&txn)
        .await
        .map_err(RepositoryError::database_error)?;

    let health = health_row(report)
        .insert(&txn)
        .await
        .map_err(RepositoryError::database_error)?;

    txn.commit().await.map_err(RepositoryError::database_error)?;

    tracing::debug!(
        camera_id = %health.camera_id,
        connection_status = ?health.connection_status,
        "Camera health updated"
    );
    Ok(health)
}

/// Hourly performance summary over the last `hours` hours, newest hour
/// first. A non-positive window yields no rows.
pub async fn get_system_performance_stats(
    db: &DatabaseConnection,
    hours: i64,
) -> Result<Vec<HourlyPerformance>, RepositoryError> {
    if hours <= 0 {
        return Ok(Vec::new());
    }

    let samples = TelemetryRepository::new(db)
        .list_system_performance(hours)
        .await?;

    Ok(bucket_by_hour(&samples))
}

#[derive(Default)]
struct HourAccumulator {
    samples: u64,
    total_fps: f64,
    events_per_minute: f64,
    cpu: f64,
    memory: f64,
    disk: f64,
    gpu: f64,
    max_total_cameras: i32,
    max_active_cameras: i32,
    max_pending_uploads: i32,
}

fn bucket_by_hour(samples: &[PerfModel]) -> Vec<HourlyPerformance> {
    let mut buckets: BTreeMap<DateTime<Utc>, HourAccumulator> = BTreeMap::new();

    for sample in samples {
        let timestamp = sample.timestamp.with_timezone(&Utc);
        let hour = timestamp
            .duration_trunc(TimeDelta::hours(1))
            .unwrap_or(timestamp);
        let bucket = buckets.entry(hour).or_default();

        bucket.samples += 1;
        bucket.total_fps += sample.total_fps;
        bucket.events_per_minute += f64::from(sample.total_events_per_minute);
        bucket.cpu += sample.cpu_usage_percent;
        bucket.memory += sample.memory_usage_percent;
        bucket.disk += sample.disk_usage_percent;
        bucket.gpu += sample.gpu_usage_percent;
        bucket.max_total_cameras = bucket.max_total_cameras.max(sample.total_cameras);
        bucket.max_active_cameras = bucket.max_active_cameras.max(sample.active_cameras);
        bucket.max_pending_uploads = bucket.max_pending_uploads.max(sample.pending_uploads);
    }

    buckets
        .into_iter()
        .rev()
        .map(|(hour, bucket)| {
            let n = bucket.samples as f64;
            HourlyPerformance {
                hour,
                samples: bucket.samples,
                avg_total_fps: bucket.total_fps / n,
                avg_events_per_minute: bucket.events_per_minute / n,
                avg_cpu_usage_percent: bucket.cpu / n,
                avg_memory_usage_percent: bucket.memory / n,
                avg_disk_usage_percent: bucket.disk / n,
                avg_gpu_usage_percent: bucket.gpu / n,
                max_total_cameras: bucket.max_total_cameras,
                max_active_cameras: bucket.max_active_cameras,
                max_pending_uploads: bucket.max_pending_uploads,
            }
        })
        .collect()
}

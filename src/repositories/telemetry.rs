//! # Telemetry Repository
//!
//! Insert-only storage for processing statistics, camera health samples and
//! system performance samples, plus the retention purge that is the only
//! way rows leave these tables (events are purged alongside).

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeDelta, TimeZone, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};

use crate::error::RepositoryError;
use crate::models::camera::ConnectionStatus;
use crate::models::camera_health::{
    ActiveModel as HealthActiveModel, Column as HealthColumn, Entity as CameraHealth,
    Model as HealthModel,
};
use crate::models::camera_use_case::UseCase;
use crate::models::event::{Column as EventColumn, Entity as Event};
use crate::models::processing_stat::{
    ActiveModel as StatActiveModel, Column as StatColumn, Entity as ProcessingStat,
    Model as StatModel,
};
use crate::models::system_performance::{
    ActiveModel as PerfActiveModel, Column as PerfColumn, Entity as SystemPerformance,
    Model as PerfModel,
};
use crate::models::Camera;
use crate::repositories::{days_ago, hours_ago};

/// One processing report from a worker
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingStatsReport {
    pub camera_id: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub frames_processed: i32,
    pub total_detections: i32,
    /// Event counts per use case; missing use cases count as zero
    pub use_case_events: Vec<(UseCase, i32)>,
    pub processing_time_ms: i64,
    pub fps_average: f64,
}

/// One health sample for a camera
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CameraHealthReport {
    pub camera_id: String,
    pub connection_status: ConnectionStatus,
    pub fps: f64,
    pub frames_processed: i32,
    pub events_detected: i32,
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub error_message: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// One sample of the monitoring host
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemPerformanceSample {
    pub timestamp: Option<DateTime<Utc>>,
    pub total_cameras: i32,
    pub active_cameras: i32,
    pub total_fps: f64,
    pub total_events_per_minute: i32,
    pub cpu_usage_percent: f64,
    pub memory_usage_percent: f64,
    pub disk_usage_percent: f64,
    pub gpu_usage_percent: f64,
    pub pending_uploads: i32,
}

/// Processing totals of one camera over one UTC day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyProcessingSummary {
    pub camera_id: String,
    pub day: NaiveDate,
    pub samples: u64,
    pub frames_processed: i64,
    pub total_detections: i64,
    pub events_by_use_case: BTreeMap<String, i64>,
    pub processing_time_ms: i64,
    pub average_fps: Option<f64>,
}

/// Rows removed by [`TelemetryRepository::purge_older_than`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PurgeSummary {
    pub events: u64,
    pub camera_health: u64,
    pub system_performance: u64,
}

/// Repository for the telemetry tables
pub struct TelemetryRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> TelemetryRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn record_processing_stats(
        &self,
        report: ProcessingStatsReport,
    ) -> Result<StatModel, RepositoryError> {
        if report.frames_processed < 0 || report.total_detections < 0 {
            return Err(RepositoryError::validation_error(
                "Processing counters cannot be negative",
            ));
        }
        if !report.fps_average.is_finite() || report.fps_average < 0.0 {
            return Err(RepositoryError::validation_error(format!(
                "Average fps must be a non-negative number, got {}",
                report.fps_average
            )));
        }
        self.require_camera(&report.camera_id).await?;

        let mut people_counting = 0i32;
        let mut ppe_detection = 0i32;
        let mut tailgating = 0i32;
        let mut intrusion = 0i32;
        let mut loitering = 0i32;
        for (use_case, count) in report.use_case_events {
            if count < 0 {
                return Err(RepositoryError::validation_error(format!(
                    "Event count for {use_case} cannot be negative"
                )));
            }
            let counter = match use_case {
                UseCase::PeopleCounting => &mut people_counting,
                UseCase::PpeDetection => &mut ppe_detection,
                UseCase::Tailgating => &mut tailgating,
                UseCase::Intrusion => &mut intrusion,
                UseCase::Loitering => &mut loitering,
            };
            *counter = counter.saturating_add(count);
        }

        let now = Utc::now();
        let stat = StatActiveModel {
            camera_id: Set(report.camera_id),
            timestamp: Set(report.timestamp.unwrap_or(now).into()),
            frames_processed: Set(report.frames_processed),
            total_detections: Set(report.total_detections),
            people_counting_events: Set(people_counting),
            ppe_detection_events: Set(ppe_detection),
            tailgating_events: Set(tailgating),
            intrusion_events: Set(intrusion),
            loitering_events: Set(loitering),
            processing_time_ms: Set(report.processing_time_ms),
            fps_average: Set(report.fps_average),
            created_at: Set(now.into()),
            ..Default::default()
        };

        stat.insert(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Append a row counting `events` detections of a single use case.
    pub async fn record_use_case_events(
        &self,
        camera_id: &str,
        use_case: UseCase,
        events: i32,
    ) -> Result<StatModel, RepositoryError> {
        self.record_processing_stats(ProcessingStatsReport {
            camera_id: camera_id.to_string(),
            total_detections: events.max(0),
            use_case_events: vec![(use_case, events)],
            ..Default::default()
        })
        .await
    }

    /// Processing rows of a camera, newest first
    pub async fn list_processing_stats(
        &self,
        camera_id: &str,
        since_hours: Option<i64>,
        limit: Option<u64>,
    ) -> Result<Vec<StatModel>, RepositoryError> {
        let mut query = ProcessingStat::find().filter(StatColumn::CameraId.eq(camera_id));

        if let Some(hours) = since_hours {
            query = query.filter(StatColumn::Timestamp.gte(hours_ago(hours)));
        }
        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        query
            .order_by_desc(StatColumn::Timestamp)
            .order_by_desc(StatColumn::StatId)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Sum the processing rows of one camera within one UTC day.
    pub async fn daily_processing_summary(
        &self,
        camera_id: &str,
        day: NaiveDate,
    ) -> Result<DailyProcessingSummary, RepositoryError> {
        let start = Utc.from_utc_datetime(&day.and_time(chrono::NaiveTime::MIN));
        let end = start + TimeDelta::days(1);
        let start: DateTime<FixedOffset> = start.into();
        let end: DateTime<FixedOffset> = end.into();

        let rows = ProcessingStat::find()
            .filter(StatColumn::CameraId.eq(camera_id))
            .filter(StatColumn::Timestamp.gte(start))
            .filter(StatColumn::Timestamp.lt(end))
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(summarize_processing(camera_id, day, &rows))
    }

    /// Insert one health sample. Use
    /// [`crate::procedures::update_camera_health`] to also update the camera.
    pub async fn record_camera_health(
        &self,
        report: CameraHealthReport,
    ) -> Result<HealthModel, RepositoryError> {
        validate_health_report(&report)?;
        self.require_camera(&report.camera_id).await?;

        health_row(report)
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Health samples of a camera, newest first
    pub async fn list_camera_health(
        &self,
        camera_id: &str,
        since_hours: Option<i64>,
        limit: Option<u64>,
    ) -> Result<Vec<HealthModel>, RepositoryError> {
        let mut query = CameraHealth::find().filter(HealthColumn::CameraId.eq(camera_id));

        if let Some(hours) = since_hours {
            query = query.filter(HealthColumn::Timestamp.gte(hours_ago(hours)));
        }
        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        query
            .order_by_desc(HealthColumn::Timestamp)
            .order_by_desc(HealthColumn::HealthId)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn latest_camera_health(
        &self,
        camera_id: &str,
    ) -> Result<Option<HealthModel>, RepositoryError> {
        CameraHealth::find()
            .filter(HealthColumn::CameraId.eq(camera_id))
            .order_by_desc(HealthColumn::Timestamp)
            .order_by_desc(HealthColumn::HealthId)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn record_system_performance(
        &self,
        sample: SystemPerformanceSample,
    ) -> Result<PerfModel, RepositoryError> {
        for (field, value) in [
            ("cpu_usage_percent", sample.cpu_usage_percent),
            ("memory_usage_percent", sample.memory_usage_percent),
            ("disk_usage_percent", sample.disk_usage_percent),
            ("gpu_usage_percent", sample.gpu_usage_percent),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(RepositoryError::validation_error(format!(
                    "{field} must be between 0 and 100, got {value}"
                )));
            }
        }
        if !sample.total_fps.is_finite() || sample.total_fps < 0.0 {
            return Err(RepositoryError::validation_error(format!(
                "total_fps must be a non-negative number, got {}",
                sample.total_fps
            )));
        }
        if sample.active_cameras > sample.total_cameras {
            return Err(RepositoryError::validation_error(format!(
                "active cameras ({}) cannot exceed total cameras ({})",
                sample.active_cameras, sample.total_cameras
            )));
        }

        PerfActiveModel {
            timestamp: Set(sample.timestamp.unwrap_or_else(Utc::now).into()),
            total_cameras: Set(sample.total_cameras),
            active_cameras: Set(sample.active_cameras),
            total_fps: Set(sample.total_fps),
            total_events_per_minute: Set(sample.total_events_per_minute),
            cpu_usage_percent: Set(sample.cpu_usage_percent),
            memory_usage_percent: Set(sample.memory_usage_percent),
            disk_usage_percent: Set(sample.disk_usage_percent),
            gpu_usage_percent: Set(sample.gpu_usage_percent),
            pending_uploads: Set(sample.pending_uploads),
            ..Default::default()
        }
        .insert(self.db)
        .await
        .map_err(RepositoryError::database_error)
    }

    /// Performance samples of the last `hours` hours, newest first
    pub async fn list_system_performance(
        &self,
        hours: i64,
    ) -> Result<Vec<PerfModel>, RepositoryError> {
        SystemPerformance::find()
            .filter(PerfColumn::Timestamp.gte(hours_ago(hours)))
            .order_by_desc(PerfColumn::Timestamp)
            .order_by_desc(PerfColumn::PerfId)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Delete events, camera health and system performance rows older than
    /// `days` days, in one transaction.
    pub async fn purge_older_than(&self, days: i64) -> Result<PurgeSummary, RepositoryError> {
        if days <= 0 {
            return Err(RepositoryError::validation_error(format!(
                "Retention must be a positive number of days, got {days}"
            )));
        }

        let cutoff = days_ago(days);
        let txn = self
            .db
            .begin()
            .await
            .map_err(RepositoryError::database_error)?;

        let events = Event::delete_many()
            .filter(EventColumn::Timestamp.lt(cutoff))
            .exec(&txn)
            .await
            .map_err(RepositoryError::database_error)?
            .rows_affected;
        let camera_health = CameraHealth::delete_many()
            .filter(HealthColumn::Timestamp.lt(cutoff))
            .exec(&txn)
            .await
            .map_err(RepositoryError::database_error)?
            .rows_affected;
        let system_performance = SystemPerformance::delete_many()
            .filter(PerfColumn::Timestamp.lt(cutoff))
            .exec(&txn)
            .await
            .map_err(RepositoryError::database_error)?
            .rows_affected;

        txn.commit()
            .await
            .map_err(RepositoryError::database_error)?;

        let summary = PurgeSummary {
            events,
            camera_health,
            system_performance,
        };
        tracing::info!(days, ?summary, "Retention purge completed");
        Ok(summary)
    }

    async fn require_camera(&self, camera_id: &str) -> Result<(), RepositoryError> {
        let exists = Camera::find_by_id(camera_id.to_string())
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?
            .is_some();

        if exists {
            Ok(())
        } else {
            Err(RepositoryError::NotFound(format!(
                "Camera {camera_id} not found"
            )))
        }
    }
}

pub(crate) fn validate_health_report(report: &CameraHealthReport) -> Result<(), RepositoryError> {
    for (field, value) in [
        ("fps", report.fps),
        ("cpu_usage", report.cpu_usage),
        ("memory_usage", report.memory_usage),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(RepositoryError::validation_error(format!(
                "{field} must be a non-negative number, got {value}"
            )));
        }
    }
    if report.frames_processed < 0 || report.events_detected < 0 {
        return Err(RepositoryError::validation_error(
            "Health counters cannot be negative",
        ));
    }
    Ok(())
}

/// Unsaved `camera_health` row for a report
pub(crate) fn health_row(report: CameraHealthReport) -> HealthActiveModel {
    HealthActiveModel {
        camera_id: Set(report.camera_id),
        timestamp: Set(report.timestamp.unwrap_or_else(Utc::now).into()),
        connection_status: Set(report.connection_status),
        fps: Set(report.fps),
        frames_processed: Set(report.frames_processed),
        events_detected: Set(report.events_detected),
        cpu_usage: Set(report.cpu_usage),
        memory_usage: Set(report.memory_usage),
        error_message: Set(report.error_message),
        ..Default::default()
    }
}

fn summarize_processing(camera_id: &str, day: NaiveDate, rows: &[StatModel]) -> DailyProcessingSummary {
    let mut events_by_use_case: BTreeMap<String, i64> = UseCase::ALL
        .iter()
        .map(|use_case| (use_case.to_string(), 0))
        .collect();
    let mut frames_processed = 0i64;
    let mut total_detections = 0i64;
    let mut processing_time_ms = 0i64;
    let mut fps_total = 0.0;

    for row in rows {
        frames_processed += i64::from(row.frames_processed);
        total_detections += i64::from(row.total_detections);
        processing_time_ms += row.processing_time_ms;
        fps_total += row.fps_average;
        for use_case in UseCase::ALL {
            *events_by_use_case.entry(use_case.to_string()).or_default() +=
                i64::from(row.events_for(use_case));
        }
    }

    DailyProcessingSummary {
        camera_id: camera_id.to_string(),
        day,
        samples: rows.len() as u64,
        frames_processed,
        total_detections,
        events_by_use_case,
        processing_time_ms,
        average_fps: (!rows.is_empty()).then(|| fps_total / rows.len() as f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(frames: i32, people: i32, tailgating: i32, fps: f64) -> StatModel {
        let now: DateTime<FixedOffset> = Utc::now().into();
        StatModel {
            stat_id: 1,
            camera_id: "cam1".to_string(),
            timestamp: now,
            frames_processed: frames,
            total_detections: people + tailgating,
            people_counting_events: people,
            ppe_detection_events: 0,
            tailgating_events: tailgating,
            intrusion_events: 0,
            loitering_events: 0,
            processing_time_ms: 40,
            fps_average: fps,
            created_at: now,
        }
    }

    #[test]
    fn test_summary_adds_counters() {
        let day = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let summary =
            summarize_processing("cam1", day, &[stat(100, 3, 0, 10.0), stat(50, 1, 2, 20.0)]);

        assert_eq!(summary.samples, 2);
        assert_eq!(summary.frames_processed, 150);
        assert_eq!(summary.total_detections, 6);
        assert_eq!(summary.events_by_use_case["people_counting"], 4);
        assert_eq!(summary.events_by_use_case["tailgating"], 2);
        assert_eq!(summary.events_by_use_case["loitering"], 0);
        assert_eq!(summary.processing_time_ms, 80);
        assert_eq!(summary.average_fps, Some(15.0));
    }

    #[test]
    fn test_empty_summary_has_no_average() {
        let day = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let summary = summarize_processing("cam1", day, &[]);
        assert_eq!(summary.samples, 0);
        assert_eq!(summary.average_fps, None);
        assert_eq!(summary.events_by_use_case.len(), UseCase::ALL.len());
    }

    #[test]
    fn test_health_report_validation() {
        let report = CameraHealthReport {
            camera_id: "cam1".to_string(),
            fps: 12.5,
            ..Default::default()
        };
        assert!(validate_health_report(&report).is_ok());

        let negative = CameraHealthReport {
            cpu_usage: -1.0,
            ..report.clone()
        };
        assert!(validate_health_report(&negative).is_err());

        let nan = CameraHealthReport {
            fps: f64::NAN,
            ..report
        };
        assert!(validate_health_report(&nan).is_err());
    }
}

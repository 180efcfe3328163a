//! # Repository Layer
//!
//! Repositories encapsulate the SeaORM operations of each table group.
//! They borrow a `DatabaseConnection`; operations that touch more than one
//! row open their own transaction.

pub mod camera;
pub mod camera_use_case;
pub mod event;
pub mod project;
pub mod telemetry;
pub mod user;
pub mod views;

pub use camera::CameraRepository;
pub use camera_use_case::CameraUseCaseRepository;
pub use event::EventRepository;
pub use project::ProjectRepository;
pub use telemetry::TelemetryRepository;
pub use user::UserRepository;
pub use views::ViewRepository;

use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use uuid::Uuid;

/// 0001-01-01T00:00:00Z, the oldest cutoff bound into a query
const EARLIEST_CUTOFF_SECS: i64 = -62_135_596_800;

/// Builds a `<prefix>-<12 hex>` identifier.
pub(crate) fn generate_id(prefix: &str) -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{prefix}-{}", &hex[..12])
}

/// Cutoff `hours` hours before now.
pub(crate) fn hours_ago(hours: i64) -> DateTime<FixedOffset> {
    cutoff_before_now(hours, TimeDelta::try_hours(hours))
}

/// Cutoff `days` days before now.
pub(crate) fn days_ago(days: i64) -> DateTime<FixedOffset> {
    cutoff_before_now(days, TimeDelta::try_days(days))
}

/// Non-positive windows end at now. Windows reaching past year 1, or past
/// what `TimeDelta` can hold, are floored there and so cover every row.
fn cutoff_before_now(amount: i64, window: Option<TimeDelta>) -> DateTime<FixedOffset> {
    let now = Utc::now();
    if amount <= 0 {
        return now.into();
    }

    let floor = DateTime::from_timestamp(EARLIEST_CUTOFF_SECS, 0).unwrap_or_default();
    window
        .and_then(|window| now.checked_sub_signed(window))
        .filter(|cutoff| *cutoff > floor)
        .unwrap_or(floor)
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn oversized_windows_floor_at_year_one() {
        for cutoff in [hours_ago(10_000_000_000), days_ago(200_000_000), hours_ago(i64::MAX)] {
            assert_eq!(cutoff.year(), 1);
            assert_eq!(cutoff.ordinal(), 1);
        }
    }

    #[test]
    fn ordinary_windows_count_back_from_now() {
        let cutoff = hours_ago(2).with_timezone(&Utc);
        let elapsed = Utc::now() - cutoff;
        assert!(elapsed >= TimeDelta::hours(2));
        assert!(elapsed < TimeDelta::hours(2) + TimeDelta::minutes(1));
    }

    #[test]
    fn non_positive_windows_end_now() {
        let before = Utc::now();
        assert!(hours_ago(-5).with_timezone(&Utc) >= before);
        assert!(days_ago(0).with_timezone(&Utc) >= before);
    }

    #[test]
    fn generated_ids_carry_prefix_and_twelve_hex_digits() {
        let id = generate_id("evt");
        let (prefix, hex) = id.split_once('-').unwrap();
        assert_eq!(prefix, "evt");
        assert_eq!(hex.len(), 12);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(generate_id("evt"), id);
    }
}

//! Camera use case entity model
//!
//! Assigns detection capabilities to cameras. `(camera_id, use_case)` is
//! unique; the repository keeps at most one row per camera flagged primary.

use chrono::Utc;
use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "camera_use_cases")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub camera_id: String,

    /// Use case name, see [`UseCase`] for the known ones
    pub use_case: String,

    pub is_primary: bool,

    pub is_enabled: bool,

    /// Per use case overrides (zones, thresholds)
    #[sea_orm(column_type = "JsonBinary")]
    pub configuration: Option<Json>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

/// Detection capabilities the processing workers know about.
///
/// The column itself is free text so new capabilities can be assigned
/// before this list learns about them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UseCase {
    PeopleCounting,
    PpeDetection,
    Tailgating,
    Intrusion,
    Loitering,
}

impl UseCase {
    pub const ALL: [UseCase; 5] = [
        UseCase::PeopleCounting,
        UseCase::PpeDetection,
        UseCase::Tailgating,
        UseCase::Intrusion,
        UseCase::Loitering,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UseCase::PeopleCounting => "people_counting",
            UseCase::PpeDetection => "ppe_detection",
            UseCase::Tailgating => "tailgating",
            UseCase::Intrusion => "intrusion",
            UseCase::Loitering => "loitering",
        }
    }
}

impl std::fmt::Display for UseCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UseCase {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        UseCase::ALL
            .into_iter()
            .find(|use_case| use_case.as_str() == value)
            .ok_or_else(|| format!("unknown use case '{value}'"))
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
        self.updated_at = Set(now);
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn use_case_names_round_trip_through_from_str() {
        for use_case in UseCase::ALL {
            assert_eq!(use_case.as_str().parse::<UseCase>(), Ok(use_case));
        }
        assert!("face_recognition".parse::<UseCase>().is_err());
    }
}

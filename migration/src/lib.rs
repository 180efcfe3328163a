//! Database migrations for the datacenter monitoring schema.
//!
//! Tables are created parent first so foreign keys always resolve; the
//! reporting views come last.

pub use sea_orm_migration::prelude::*;

mod m2025_06_01_000001_create_users;
mod m2025_06_01_000002_create_projects;
mod m2025_06_01_000003_create_cameras;
mod m2025_06_01_000004_create_camera_use_cases;
mod m2025_06_01_000005_create_events;
mod m2025_06_01_000006_create_processing_stats;
mod m2025_06_01_000007_create_camera_health;
mod m2025_06_01_000008_create_system_performance;
mod m2025_06_01_000009_create_views;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2025_06_01_000001_create_users::Migration),
            Box::new(m2025_06_01_000002_create_projects::Migration),
            Box::new(m2025_06_01_000003_create_cameras::Migration),
            Box::new(m2025_06_01_000004_create_camera_use_cases::Migration),
            Box::new(m2025_06_01_000005_create_events::Migration),
            Box::new(m2025_06_01_000006_create_processing_stats::Migration),
            Box::new(m2025_06_01_000007_create_camera_health::Migration),
            Box::new(m2025_06_01_000008_create_system_performance::Migration),
            Box::new(m2025_06_01_000009_create_views::Migration),
        ]
    }
}

//! # Data Models
//!
//! SeaORM entities for the monitoring schema plus row types for the
//! reporting views.

pub mod camera;
pub mod camera_health;
pub mod camera_use_case;
pub mod event;
pub mod processing_stat;
pub mod project;
pub mod system_performance;
pub mod user;
pub mod views;

pub use camera::Entity as Camera;
pub use camera_health::Entity as CameraHealth;
pub use camera_use_case::Entity as CameraUseCase;
pub use event::Entity as Event;
pub use processing_stat::Entity as ProcessingStat;
pub use project::Entity as Project;
pub use system_performance::Entity as SystemPerformance;
pub use user::Entity as User;

//! Database seeding functionality
//!
//! Sample data for a fresh installation: the administrator, the default
//! monitoring project and its cameras.

pub mod sample;

pub use sample::{SeedReport, seed_sample_data};

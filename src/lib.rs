//! # dcwatch
//!
//! Storage layer of a multi-camera datacenter monitoring system: schema
//! migrations, SeaORM entities, repositories, the reporting views and the
//! procedures used by the processing workers.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod procedures;
pub mod repositories;
pub mod seeds;
pub mod telemetry;
pub use migration;

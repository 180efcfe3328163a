//! # dcwatch operator CLI
//!
//! Runs migrations, seeds sample data and calls the procedures against the
//! configured database. Results are printed to stdout as JSON; logs go to
//! stderr.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;

use dcwatch::config::ConfigLoader;
use dcwatch::error::RepositoryError;
use dcwatch::models::camera::ConnectionStatus;
use dcwatch::procedures::{self, CameraHealthReport};
use dcwatch::repositories::{TelemetryRepository, ViewRepository};
use dcwatch::{db, seeds, telemetry};

#[derive(Debug, Parser)]
#[command(name = "dcwatch", version, about = "Datacenter camera monitoring storage")]
struct Cli {
    /// Overrides DCWATCH_DATABASE_URL
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending migrations
    Migrate,
    /// Revert applied migrations
    Rollback {
        #[arg(long, default_value_t = 1)]
        steps: u32,
    },
    /// Insert the sample user, project and cameras if missing
    Seed,
    /// Show backend, migration state and row counts
    Status,
    /// Print the configuration of every active camera
    Cameras,
    /// Record a health report for a camera
    Health {
        camera_id: String,
        /// connected, disconnected or error
        status: ConnectionStatus,
        #[arg(long, default_value_t = 0.0)]
        fps: f64,
        #[arg(long, default_value_t = 0)]
        frames: i32,
        #[arg(long, default_value_t = 0)]
        events: i32,
        #[arg(long, default_value_t = 0.0)]
        cpu: f64,
        #[arg(long, default_value_t = 0.0)]
        memory: f64,
        #[arg(long)]
        error: Option<String>,
    },
    /// Recent events, newest first
    Events {
        /// Defaults to DCWATCH_EVENT_LOOKBACK_HOURS
        #[arg(long)]
        hours: Option<i64>,
        /// Defaults to DCWATCH_EVENT_QUERY_LIMIT
        #[arg(long)]
        limit: Option<u64>,
        #[arg(long)]
        project: Option<String>,
    },
    /// Hourly system performance summary
    Performance {
        /// Defaults to DCWATCH_PERFORMANCE_LOOKBACK_HOURS
        #[arg(long, allow_negative_numbers = true)]
        hours: Option<i64>,
    },
    /// Delete events and telemetry older than the retention window
    Purge {
        /// Defaults to DCWATCH_RETENTION_DAYS
        #[arg(long)]
        days: Option<i64>,
    },
}

/// Exit status for errors caused by the caller's input
const EXIT_CLIENT_ERROR: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            let client_error = err
                .downcast_ref::<RepositoryError>()
                .is_some_and(RepositoryError::is_client_error);
            if client_error {
                ExitCode::from(EXIT_CLIENT_ERROR)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = ConfigLoader::new()
        .load()
        .context("Failed to load configuration")?;
    if let Some(database_url) = cli.database_url {
        config.database_url = database_url;
    }

    telemetry::init_tracing(&config).context("Failed to initialize tracing")?;
    let redacted = config
        .redacted_json()
        .context("Failed to serialize configuration")?;
    tracing::debug!(profile = %config.profile, config = %redacted, "Configuration loaded");

    let conn = db::init_pool(&config).await?;

    match cli.command {
        Command::Migrate => {
            let applied = db::run_migrations(&conn).await?;
            print_json(&json!({ "applied": applied }))?;
        }
        Command::Rollback { steps } => {
            db::rollback_migrations(&conn, steps).await?;
            print_json(&json!({ "rolled_back": steps }))?;
        }
        Command::Seed => {
            let report = seeds::seed_sample_data(&conn).await?;
            print_json(&report)?;
        }
        Command::Status => {
            let info = db::database_info(&conn).await?;
            print_json(&info)?;
        }
        Command::Cameras => {
            let cameras = procedures::get_camera_configurations(&conn).await?;
            print_json(&cameras)?;
        }
        Command::Health {
            camera_id,
            status,
            fps,
            frames,
            events,
            cpu,
            memory,
            error,
        } => {
            let health = procedures::update_camera_health(
                &conn,
                CameraHealthReport {
                    camera_id,
                    connection_status: status,
                    fps,
                    frames_processed: frames,
                    events_detected: events,
                    cpu_usage: cpu,
                    memory_usage: memory,
                    error_message: error,
                    timestamp: None,
                },
            )
            .await?;
            print_json(&health)?;
        }
        Command::Events {
            hours,
            limit,
            project,
        } => {
            let mut query = config.query.clone();
            query.event_lookback_hours = hours.unwrap_or(query.event_lookback_hours);
            query.event_query_limit = limit.unwrap_or(query.event_query_limit);
            query.validate().context("Invalid event query")?;

            let events = ViewRepository::new(&conn)
                .recent_events(
                    query.event_lookback_hours,
                    query.event_query_limit,
                    project.as_deref(),
                )
                .await?;
            print_json(&events)?;
        }
        Command::Performance { hours } => {
            let mut query = config.query.clone();
            query.performance_lookback_hours = hours.unwrap_or(query.performance_lookback_hours);
            query.validate().context("Invalid performance window")?;

            let stats =
                procedures::get_system_performance_stats(&conn, query.performance_lookback_hours)
                    .await?;
            print_json(&stats)?;
        }
        Command::Purge { days } => {
            let mut retention = config.retention.clone();
            retention.days = days.unwrap_or(retention.days);
            retention.validate().context("Invalid retention window")?;

            let summary = TelemetryRepository::new(&conn)
                .purge_older_than(retention.days)
                .await?;
            print_json(&summary)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

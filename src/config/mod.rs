//! Configuration loading for dcwatch.
//!
//! Loads layered `.env` files and environment variables prefixed with
//! `DCWATCH_`, producing a typed [`AppConfig`].

use std::{collections::BTreeMap, env, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const ENV_PREFIX: &str = "DCWATCH_";

/// Application configuration derived from `DCWATCH_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AppConfig {
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
    #[serde(default = "default_db_acquire_timeout_ms")]
    pub db_acquire_timeout_ms: u64,
    #[serde(default)]
    pub retention: RetentionConfig,
    #[serde(default)]
    pub query: QueryConfig,
}

/// How long telemetry and events are kept before `purge` removes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct RetentionConfig {
    #[serde(default = "default_retention_days")]
    pub days: i64,
}

/// Defaults applied to reporting queries when the caller passes none.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct QueryConfig {
    #[serde(default = "default_event_lookback_hours")]
    pub event_lookback_hours: i64,
    #[serde(default = "default_event_query_limit")]
    pub event_query_limit: u64,
    #[serde(default = "default_performance_lookback_hours")]
    pub performance_lookback_hours: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            database_url: default_database_url(),
            db_max_connections: default_db_max_connections(),
            db_acquire_timeout_ms: default_db_acquire_timeout_ms(),
            retention: RetentionConfig::default(),
            query: QueryConfig::default(),
        }
    }
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            days: default_retention_days(),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            event_lookback_hours: default_event_lookback_hours(),
            event_query_limit: default_event_query_limit(),
            performance_lookback_hours: default_performance_lookback_hours(),
        }
    }
}

impl AppConfig {
    /// Returns a redacted JSON representation (the database password is hidden).
    pub fn redacted_json(&self) -> serde_json::Result<String> {
        let mut config = self.clone();
        config.database_url = redact_database_url(&config.database_url);
        serde_json::to_string_pretty(&config)
    }

    /// Validates the configuration bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::MissingDatabaseUrl);
        }

        if self.db_max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections {
                value: self.db_max_connections,
            });
        }

        if !matches!(self.log_format.as_str(), "json" | "pretty") {
            return Err(ConfigError::InvalidLogFormat {
                value: self.log_format.clone(),
            });
        }

        self.retention.validate()?;
        self.query.validate()?;

        Ok(())
    }
}

impl RetentionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=3650).contains(&self.days) {
            return Err(ConfigError::InvalidRetentionDays { value: self.days });
        }
        Ok(())
    }
}

impl QueryConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("EVENT_LOOKBACK_HOURS", self.event_lookback_hours),
            ("PERFORMANCE_LOOKBACK_HOURS", self.performance_lookback_hours),
        ] {
            if !(1..=8760).contains(&value) {
                return Err(ConfigError::InvalidLookback {
                    field: field.to_string(),
                    value,
                });
            }
        }

        if !(1..=10_000).contains(&self.event_query_limit) {
            return Err(ConfigError::InvalidQueryLimit {
                value: self.event_query_limit,
            });
        }

        Ok(())
    }
}

/// Replace the password of a connection URL with `[REDACTED]`.
///
/// Values that do not parse as URLs (e.g. `sqlite::memory:`) are returned
/// unchanged since they cannot carry credentials.
pub fn redact_database_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut parsed) if parsed.password().is_some() => {
            if parsed.set_password(Some("[REDACTED]")).is_err() {
                return "[REDACTED]".to_string();
            }
            parsed.to_string()
        }
        _ => raw.to_string(),
    }
}

fn default_profile() -> String {
    "local".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_database_url() -> String {
    "sqlite://dcwatch.db?mode=rwc".to_string()
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_db_acquire_timeout_ms() -> u64 {
    5000
}

fn default_retention_days() -> i64 {
    30
}

fn default_event_lookback_hours() -> i64 {
    24
}

fn default_event_query_limit() -> u64 {
    100
}

fn default_performance_lookback_hours() -> i64 {
    24
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load environment file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        source: dotenvy::Error,
    },
    #[error("database URL is missing; set DCWATCH_DATABASE_URL")]
    MissingDatabaseUrl,
    #[error("{key} must be a number, got '{value}'")]
    InvalidNumber { key: String, value: String },
    #[error("database max connections must be positive, got {value}")]
    InvalidMaxConnections { value: u32 },
    #[error("log format must be 'json' or 'pretty', got '{value}'")]
    InvalidLogFormat { value: String },
    #[error("retention must be between 1 and 3650 days, got {value}")]
    InvalidRetentionDays { value: i64 },
    #[error("{field} must be between 1 and 8760 hours, got {value}")]
    InvalidLookback { field: String, value: i64 },
    #[error("event query limit must be between 1 and 10000, got {value}")]
    InvalidQueryLimit { value: u64 },
}

/// Loads configuration using layered `.env` files and `DCWATCH_*` env vars.
pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    /// Creates a new loader rooted at the current working directory.
    pub fn new() -> Self {
        Self {
            base_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Creates a loader rooted at the provided directory (useful for tests).
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Loads `.env`, `.env.local`, `.env.<profile>`, `.env.<profile>.local`
    /// and finally the process environment, later layers winning.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let (mut layered, profile_hint) = self.collect_layered_env()?;

        // Overlay process environment last so it wins.
        for (key, value) in env::vars() {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                layered.insert(stripped.to_string(), value);
            }
        }

        let profile = take_string(&mut layered, "PROFILE").unwrap_or(profile_hint);
        let log_level = take_string(&mut layered, "LOG_LEVEL").unwrap_or_else(default_log_level);
        let log_format =
            take_string(&mut layered, "LOG_FORMAT").unwrap_or_else(default_log_format);
        let database_url =
            take_string(&mut layered, "DATABASE_URL").unwrap_or_else(default_database_url);
        let db_max_connections = take_parsed(&mut layered, "DB_MAX_CONNECTIONS")?
            .unwrap_or_else(default_db_max_connections);
        let db_acquire_timeout_ms = take_parsed(&mut layered, "DB_ACQUIRE_TIMEOUT_MS")?
            .unwrap_or_else(default_db_acquire_timeout_ms);

        let retention = RetentionConfig {
            days: take_parsed(&mut layered, "RETENTION_DAYS")?
                .unwrap_or_else(default_retention_days),
        };

        let query = QueryConfig {
            event_lookback_hours: take_parsed(&mut layered, "EVENT_LOOKBACK_HOURS")?
                .unwrap_or_else(default_event_lookback_hours),
            event_query_limit: take_parsed(&mut layered, "EVENT_QUERY_LIMIT")?
                .unwrap_or_else(default_event_query_limit),
            performance_lookback_hours: take_parsed(&mut layered, "PERFORMANCE_LOOKBACK_HOURS")?
                .unwrap_or_else(default_performance_lookback_hours),
        };

        let config = AppConfig {
            profile,
            log_level,
            log_format,
            database_url,
            db_max_connections,
            db_acquire_timeout_ms,
            retention,
            query,
        };

        config.validate()?;

        Ok(config)
    }

    fn collect_layered_env(&self) -> Result<(BTreeMap<String, String>, String), ConfigError> {
        let mut values = BTreeMap::new();

        self.merge_dotenv(self.base_dir.join(".env"), &mut values)?;
        self.merge_dotenv(self.base_dir.join(".env.local"), &mut values)?;

        let profile = env::var(format!("{ENV_PREFIX}PROFILE"))
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| values.get("PROFILE").cloned())
            .unwrap_or_else(default_profile);

        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}", &profile)),
            &mut values,
        )?;
        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}.local", &profile)),
            &mut values,
        )?;

        Ok((values, profile))
    }

    fn merge_dotenv(
        &self,
        path: PathBuf,
        values: &mut BTreeMap<String, String>,
    ) -> Result<(), ConfigError> {
        match dotenvy::from_path_iter(&path) {
            Ok(iter) => {
                for item in iter {
                    let (key, value) = item.map_err(|source| ConfigError::EnvFile {
                        path: path.clone(),
                        source,
                    })?;
                    if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                        values.insert(stripped.to_string(), value);
                    }
                }
                Ok(())
            }
            Err(dotenvy::Error::Io(ref io_err))
                if io_err.kind() == std::io::ErrorKind::NotFound =>
            {
                Ok(())
            }
            Err(err) => Err(ConfigError::EnvFile { path, source: err }),
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn take_string(layered: &mut BTreeMap<String, String>, key: &str) -> Option<String> {
    layered.remove(key).filter(|v| !v.is_empty())
}

fn take_parsed<T: std::str::FromStr>(
    layered: &mut BTreeMap<String, String>,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    match take_string(layered, key) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber {
                key: format!("{ENV_PREFIX}{key}"),
                value,
            }),
        None => Ok(None),
    }
}

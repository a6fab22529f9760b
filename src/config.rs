use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "Peakflow";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;
/// One year. Keeps `chrono::Duration::hours` far from overflow.
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 366;
pub const DEFAULT_AUDIT_RETENTION_DAYS: u32 = 365;

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "peakflow_lib=info,peakflow=info,tower_http=warn"
}

/// Get the application data directory.
/// Falls back to the working directory when the platform has no data dir.
pub fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default SQLite database file.
pub fn default_db_path() -> PathBuf {
    app_data_dir().join("peakflow.db")
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime configuration, read from `PEAKFLOW_*` environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind: SocketAddr,
    pub db_path: PathBuf,
    pub token_ttl_hours: i64,
    /// Doctors may only read records of patients linked to them.
    pub require_care_link: bool,
    pub password_iterations: u32,
    pub audit_retention_days: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind: SocketAddr = parse_or(&lookup, "PEAKFLOW_BIND", || {
            DEFAULT_BIND
                .parse::<SocketAddr>()
                .map_err(|e| e.to_string())
        })?;
        let db_path = lookup("PEAKFLOW_DB_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);
        let token_ttl_hours: i64 =
            parse_or(&lookup, "PEAKFLOW_TOKEN_TTL_HOURS", || Ok(DEFAULT_TOKEN_TTL_HOURS))?;
        if token_ttl_hours <= 0 {
            return Err(invalid("PEAKFLOW_TOKEN_TTL_HOURS", token_ttl_hours, "must be positive"));
        }
        if token_ttl_hours > MAX_TOKEN_TTL_HOURS {
            return Err(invalid(
                "PEAKFLOW_TOKEN_TTL_HOURS",
                token_ttl_hours,
                format!("must be at most {MAX_TOKEN_TTL_HOURS}"),
            ));
        }
        let require_care_link = match lookup("PEAKFLOW_REQUIRE_CARE_LINK") {
            None => true,
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                invalid("PEAKFLOW_REQUIRE_CARE_LINK", &raw, "expected true or false")
            })?,
        };
        let password_iterations: u32 = parse_or(&lookup, "PEAKFLOW_PBKDF2_ITERATIONS", || {
            Ok(crate::crypto::PBKDF2_ITERATIONS)
        })?;
        if password_iterations == 0 {
            return Err(invalid("PEAKFLOW_PBKDF2_ITERATIONS", 0, "must be positive"));
        }
        let audit_retention_days: u32 = parse_or(&lookup, "PEAKFLOW_AUDIT_RETENTION_DAYS", || {
            Ok(DEFAULT_AUDIT_RETENTION_DAYS)
        })?;

        Ok(Self {
            bind,
            db_path,
            token_ttl_hours,
            require_care_link,
            password_iterations,
            audit_retention_days,
        })
    }
}

fn parse_or<T, F, D>(lookup: &F, key: &'static str, default: D) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
    D: FnOnce() -> Result<T, String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| invalid(key, &raw, e)),
        None => default().map_err(|reason| invalid(key, "<default>", reason)),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn invalid(key: &'static str, value: impl ToString, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

use std::str::FromStr;

use crate::app_config::{AppConfig, Environment};
use crate::search::PriceMatch;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Stores file used when the command line names none.
pub const DEFAULT_STORES_PATH: &str = "./config/stores.yaml";

/// Resolve the stores file path from `WASHBAY_STORES_PATH` alone.
///
/// Commands that never connect to the database use this instead of
/// [`load_app_config`], which requires `DATABASE_URL`.
pub fn stores_path_from_env() -> std::path::PathBuf {
    dotenvy::dotenv().ok();
    resolve_stores_path(|key| std::env::var(key))
}

fn resolve_stores_path<F>(lookup: F) -> std::path::PathBuf
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    std::path::PathBuf::from(
        lookup("WASHBAY_STORES_PATH").unwrap_or_else(|_| DEFAULT_STORES_PATH.to_string()),
    )
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can use a `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("WASHBAY_ENV", "development"));

    let bind_addr: SocketAddr =
        parse_value("WASHBAY_BIND_ADDR", &or_default("WASHBAY_BIND_ADDR", "0.0.0.0:3000"))?;
    let log_level = or_default("WASHBAY_LOG_LEVEL", "info");
    let stores_path = resolve_stores_path(&lookup);

    let db_max_connections: u32 = parse_value(
        "WASHBAY_DB_MAX_CONNECTIONS",
        &or_default("WASHBAY_DB_MAX_CONNECTIONS", "10"),
    )?;
    let db_min_connections: u32 = parse_value(
        "WASHBAY_DB_MIN_CONNECTIONS",
        &or_default("WASHBAY_DB_MIN_CONNECTIONS", "1"),
    )?;
    let db_acquire_timeout_secs: u64 = parse_value(
        "WASHBAY_DB_ACQUIRE_TIMEOUT_SECS",
        &or_default("WASHBAY_DB_ACQUIRE_TIMEOUT_SECS", "10"),
    )?;

    let store_query_timeout_ms: u64 = parse_value(
        "WASHBAY_STORE_QUERY_TIMEOUT_MS",
        &or_default("WASHBAY_STORE_QUERY_TIMEOUT_MS", "5000"),
    )?;
    if store_query_timeout_ms == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "WASHBAY_STORE_QUERY_TIMEOUT_MS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    let eta_speed_km_per_min: f64 = parse_value(
        "WASHBAY_ETA_SPEED_KM_PER_MIN",
        &or_default("WASHBAY_ETA_SPEED_KM_PER_MIN", "2"),
    )?;
    if !eta_speed_km_per_min.is_finite() || eta_speed_km_per_min <= 0.0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "WASHBAY_ETA_SPEED_KM_PER_MIN".to_string(),
            reason: "must be a positive number".to_string(),
        });
    }
    let eta_fixed_wait_minutes: u32 = parse_value(
        "WASHBAY_ETA_FIXED_WAIT_MINUTES",
        &or_default("WASHBAY_ETA_FIXED_WAIT_MINUTES", "5"),
    )?;

    let price_match: PriceMatch =
        parse_value("WASHBAY_PRICE_MATCH", &or_default("WASHBAY_PRICE_MATCH", "any"))?;
    let rate_limit_per_minute: usize = parse_value(
        "WASHBAY_RATE_LIMIT_PER_MINUTE",
        &or_default("WASHBAY_RATE_LIMIT_PER_MINUTE", "120"),
    )?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        stores_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        store_query_timeout_ms,
        eta_speed_km_per_min,
        eta_fixed_wait_minutes,
        price_match,
        rate_limit_per_minute,
    })
}

fn parse_value<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

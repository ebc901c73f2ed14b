use std::path::PathBuf;
use std::str::FromStr;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files; useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can pass a `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let database_url = lookup("DATABASE_URL").ok().filter(|s| !s.is_empty());
    let env = parse_environment(&or_default("PETPRICE_ENV", "development"))?;
    let log_level = or_default("PETPRICE_LOG_LEVEL", "info");
    let sources_path = PathBuf::from(or_default(
        "PETPRICE_SOURCES_PATH",
        "./config/sources.yaml",
    ));

    let db_max_connections: u32 =
        parse_var("PETPRICE_DB_MAX_CONNECTIONS", &or_default("PETPRICE_DB_MAX_CONNECTIONS", "10"))?;
    let db_min_connections: u32 =
        parse_var("PETPRICE_DB_MIN_CONNECTIONS", &or_default("PETPRICE_DB_MIN_CONNECTIONS", "1"))?;
    let db_acquire_timeout_secs: u64 = parse_var(
        "PETPRICE_DB_ACQUIRE_TIMEOUT_SECS",
        &or_default("PETPRICE_DB_ACQUIRE_TIMEOUT_SECS", "10"),
    )?;

    let llm_base_url = or_default("PETPRICE_LLM_BASE_URL", "http://127.0.0.1:11434");
    let llm_model = or_default("PETPRICE_LLM_MODEL", "qwen2.5:latest");
    let llm_timeout_secs: u64 = parse_var(
        "PETPRICE_LLM_TIMEOUT_SECS",
        &or_default("PETPRICE_LLM_TIMEOUT_SECS", "20"),
    )?;
    let llm_temperature: f32 = parse_var(
        "PETPRICE_LLM_TEMPERATURE",
        &or_default("PETPRICE_LLM_TEMPERATURE", "0.1"),
    )?;

    let pacing_min_ms: u64 =
        parse_var("PETPRICE_PACING_MIN_MS", &or_default("PETPRICE_PACING_MIN_MS", "1000"))?;
    let pacing_max_ms: u64 =
        parse_var("PETPRICE_PACING_MAX_MS", &or_default("PETPRICE_PACING_MAX_MS", "4000"))?;
    if pacing_min_ms > pacing_max_ms {
        return Err(ConfigError::InvalidEnvVar {
            var: "PETPRICE_PACING_MAX_MS".to_string(),
            reason: format!("{pacing_max_ms} is below PETPRICE_PACING_MIN_MS ({pacing_min_ms})"),
        });
    }

    if llm_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "PETPRICE_LLM_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        sources_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        llm_base_url,
        llm_model,
        llm_timeout_secs,
        llm_temperature,
        pacing_min_ms,
        pacing_max_ms,
    })
}

fn parse_var<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: e.to_string(),
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PETPRICE_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

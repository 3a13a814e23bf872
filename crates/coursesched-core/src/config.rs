use std::path::PathBuf;

use crate::app_config::{AppConfig, Environment, UpstreamScheme};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but holds an invalid value.
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
/// Returns `ConfigError` if a variable is present but holds an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_positive_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        let value = raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })?;
        if value == 0 {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(value)
    };

    let parse_positive_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        let value = raw
            .parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })?;
        if value == 0 {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(value)
    };

    let env = parse_environment(&or_default("COURSESCHED_ENV", "development"))?;
    let log_level = or_default("COURSESCHED_LOG_LEVEL", "info");
    let registration_host = or_default("COURSESCHED_REGISTRATION_HOST", "ssbp.mycampus.ca");
    let catalog_host = or_default("COURSESCHED_CATALOG_HOST", "catalog.uoit.ca");
    let upstream_scheme = parse_scheme(&or_default("COURSESCHED_UPSTREAM_SCHEME", "http"))?;
    let request_timeout_secs = parse_positive_u64("COURSESCHED_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default(
        "COURSESCHED_USER_AGENT",
        "coursesched/0.1 (schedule-builder)",
    );
    let max_concurrent_queries =
        parse_positive_usize("COURSESCHED_MAX_CONCURRENT_QUERIES", "4")?;
    let markers_path = lookup("COURSESCHED_MARKERS_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    Ok(AppConfig {
        env,
        log_level,
        registration_host,
        catalog_host,
        upstream_scheme,
        request_timeout_secs,
        user_agent,
        max_concurrent_queries,
        markers_path,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "COURSESCHED_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

fn parse_scheme(s: &str) -> Result<UpstreamScheme, ConfigError> {
    match s.to_ascii_lowercase().as_str() {
        "http" => Ok(UpstreamScheme::Http),
        "https" => Ok(UpstreamScheme::Https),
        other => Err(ConfigError::InvalidEnvVar {
            var: "COURSESCHED_UPSTREAM_SCHEME".to_string(),
            reason: format!("expected http or https, got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use crate::app_config::AppConfig;
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
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can use a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let stackex_api_key = lookup("STACKEX_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty());
    let stackex_site = or_default("TESTBED_STACKEX_SITE", "stackoverflow");
    if stackex_site.trim().is_empty() {
        return Err(invalid(
            "TESTBED_STACKEX_SITE",
            "site must be non-empty".to_string(),
        ));
    }
    let stackex_base_url = or_default(
        "TESTBED_STACKEX_BASE_URL",
        "https://api.stackexchange.com/2.3",
    );

    let log_level = or_default("TESTBED_LOG_LEVEL", "info");
    let categories_path = PathBuf::from(or_default(
        "TESTBED_CATEGORIES_PATH",
        "./config/categories.yaml",
    ));
    let snapshot_path = PathBuf::from(or_default(
        "TESTBED_SNAPSHOT_PATH",
        "./stackoverflow_questions.json",
    ));

    let request_timeout_secs = parse_u64("TESTBED_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("TESTBED_USER_AGENT", "testbed/0.1 (question-harvester)");
    let inter_request_delay_ms = parse_u64("TESTBED_INTER_REQUEST_DELAY_MS", "500")?;
    let category_delay_ms = parse_u64("TESTBED_CATEGORY_DELAY_MS", "2000")?;
    let quota_low_water = parse_u32("TESTBED_QUOTA_LOW_WATER", "10")?;
    let quota_cooldown_secs = parse_u64("TESTBED_QUOTA_COOLDOWN_SECS", "60")?;
    let max_retries = parse_u32("TESTBED_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("TESTBED_RETRY_BACKOFF_BASE_MS", "1000")?;

    let enrich_concurrency = parse_usize("TESTBED_ENRICH_CONCURRENCY", "1")?;
    if enrich_concurrency == 0 {
        return Err(invalid(
            "TESTBED_ENRICH_CONCURRENCY",
            "must be at least 1".to_string(),
        ));
    }

    Ok(AppConfig {
        stackex_api_key,
        stackex_site,
        stackex_base_url,
        log_level,
        categories_path,
        snapshot_path,
        request_timeout_secs,
        user_agent,
        inter_request_delay_ms,
        category_delay_ms,
        quota_low_water,
        quota_cooldown_secs,
        max_retries,
        retry_backoff_base_ms,
        enrich_concurrency,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn build_app_config_uses_defaults_for_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).expect("defaults should be valid");
    assert!(cfg.stackex_api_key.is_none());
    assert_eq!(cfg.stackex_site, "stackoverflow");
    assert_eq!(cfg.stackex_base_url, "https://api.stackexchange.com/2.3");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(
        cfg.categories_path.to_str(),
        Some("./config/categories.yaml")
    );
    assert_eq!(
        cfg.snapshot_path.to_str(),
        Some("./stackoverflow_questions.json")
    );
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.user_agent, "testbed/0.1 (question-harvester)");
    assert_eq!(cfg.inter_request_delay_ms, 500);
    assert_eq!(cfg.category_delay_ms, 2000);
    assert_eq!(cfg.quota_low_water, 10);
    assert_eq!(cfg.quota_cooldown_secs, 60);
    assert_eq!(cfg.max_retries, 2);
    assert_eq!(cfg.retry_backoff_base_ms, 1000);
    assert_eq!(cfg.enrich_concurrency, 1);
}

#[test]
fn api_key_is_read_when_present() {
    let mut map = HashMap::new();
    map.insert("STACKEX_API_KEY", "abc123");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.stackex_api_key.as_deref(), Some("abc123"));
}

#[test]
fn blank_api_key_is_treated_as_absent() {
    let mut map = HashMap::new();
    map.insert("STACKEX_API_KEY", "   ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.stackex_api_key.is_none());
}

#[test]
fn debug_output_redacts_api_key() {
    let mut map = HashMap::new();
    map.insert("STACKEX_API_KEY", "super-secret");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("super-secret"), "leaked key: {rendered}");
    assert!(rendered.contains("[redacted]"));
}

#[test]
fn blank_site_is_rejected() {
    let mut map = HashMap::new();
    map.insert("TESTBED_STACKEX_SITE", "");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TESTBED_STACKEX_SITE"),
        "expected InvalidEnvVar(TESTBED_STACKEX_SITE), got: {result:?}"
    );
}

#[test]
fn inter_request_delay_override() {
    let mut map = HashMap::new();
    map.insert("TESTBED_INTER_REQUEST_DELAY_MS", "750");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.inter_request_delay_ms, 750);
}

#[test]
fn inter_request_delay_invalid() {
    let mut map = HashMap::new();
    map.insert("TESTBED_INTER_REQUEST_DELAY_MS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TESTBED_INTER_REQUEST_DELAY_MS"),
        "expected InvalidEnvVar(TESTBED_INTER_REQUEST_DELAY_MS), got: {result:?}"
    );
}

#[test]
fn quota_low_water_override() {
    let mut map = HashMap::new();
    map.insert("TESTBED_QUOTA_LOW_WATER", "25");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.quota_low_water, 25);
}

#[test]
fn quota_low_water_rejects_negative() {
    let mut map = HashMap::new();
    map.insert("TESTBED_QUOTA_LOW_WATER", "-1");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TESTBED_QUOTA_LOW_WATER"),
        "expected InvalidEnvVar(TESTBED_QUOTA_LOW_WATER), got: {result:?}"
    );
}

#[test]
fn max_retries_invalid() {
    let mut map = HashMap::new();
    map.insert("TESTBED_MAX_RETRIES", "many");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TESTBED_MAX_RETRIES"),
        "expected InvalidEnvVar(TESTBED_MAX_RETRIES), got: {result:?}"
    );
}

#[test]
fn enrich_concurrency_zero_is_rejected() {
    let mut map = HashMap::new();
    map.insert("TESTBED_ENRICH_CONCURRENCY", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TESTBED_ENRICH_CONCURRENCY"),
        "expected InvalidEnvVar(TESTBED_ENRICH_CONCURRENCY), got: {result:?}"
    );
}

#[test]
fn paths_can_be_overridden() {
    let mut map = HashMap::new();
    map.insert("TESTBED_CATEGORIES_PATH", "/etc/testbed/categories.yaml");
    map.insert("TESTBED_SNAPSHOT_PATH", "/var/lib/testbed/out.json");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(
        cfg.categories_path.to_str(),
        Some("/etc/testbed/categories.yaml")
    );
    assert_eq!(cfg.snapshot_path.to_str(), Some("/var/lib/testbed/out.json"));
}

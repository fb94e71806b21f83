use std::path::PathBuf;

#[derive(Clone)]
pub struct AppConfig {
    pub stackex_api_key: Option<String>,
    pub stackex_site: String,
    pub stackex_base_url: String,
    pub log_level: String,
    pub categories_path: PathBuf,
    pub snapshot_path: PathBuf,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub inter_request_delay_ms: u64,
    pub category_delay_ms: u64,
    pub quota_low_water: u32,
    pub quota_cooldown_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub enrich_concurrency: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field(
                "stackex_api_key",
                &self.stackex_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("stackex_site", &self.stackex_site)
            .field("stackex_base_url", &self.stackex_base_url)
            .field("log_level", &self.log_level)
            .field("categories_path", &self.categories_path)
            .field("snapshot_path", &self.snapshot_path)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("inter_request_delay_ms", &self.inter_request_delay_ms)
            .field("category_delay_ms", &self.category_delay_ms)
            .field("quota_low_water", &self.quota_low_water)
            .field("quota_cooldown_secs", &self.quota_cooldown_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("enrich_concurrency", &self.enrich_concurrency)
            .finish()
    }
}

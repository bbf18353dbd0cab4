use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub classifier: ClassifierConfig,
    pub curation: CurationConfig,
    pub dispatch: DispatchConfig,
    pub archive: ArchiveConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Shared secret the scheduler presents when hitting the run triggers
    pub trigger_token: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClassifierConfig {
    pub url: String,
    pub api_key: String,
    #[serde(default = "default_classifier_timeout")]
    pub timeout_seconds: u64,
}

fn default_classifier_timeout() -> u64 {
    20
}

#[derive(Debug, Deserialize, Clone)]
pub struct CurationConfig {
    #[serde(default = "default_min_score")]
    pub min_score: u8,
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
}

fn default_min_score() -> u8 {
    55
}

fn default_max_candidates() -> usize {
    15
}

#[derive(Debug, Deserialize, Clone)]
pub struct DispatchConfig {
    pub notifier_url: String,
    #[serde(default = "default_notifier_timeout")]
    pub notifier_timeout_seconds: u64,
    /// Delay between successive sends, for the collaborator's rate limits
    #[serde(default = "default_send_delay")]
    pub send_delay_ms: u64,
    /// How far back the feed query looks for fresh observations
    #[serde(default = "default_feed_freshness")]
    pub feed_freshness_hours: i32,
}

fn default_notifier_timeout() -> u64 {
    10
}

fn default_send_delay() -> u64 {
    150
}

fn default_feed_freshness() -> i32 {
    24
}

#[derive(Debug, Deserialize, Clone)]
pub struct ArchiveConfig {
    #[serde(default = "default_delay_hours")]
    pub delay_hours: i64,
    #[serde(default = "default_publish_percentage")]
    pub publish_percentage: f64,
    #[serde(default = "default_min_per_week")]
    pub min_deals_per_locale_per_week: u64,
}

fn default_delay_hours() -> i64 {
    48
}

fn default_publish_percentage() -> f64 {
    0.10
}

fn default_min_per_week() -> u64 {
    3
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Layer the current environment file on top (optional)
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Environment variables win, e.g. FAREWATCH__SERVER__PORT=9000
            .add_source(config::Environment::with_prefix("FAREWATCH").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

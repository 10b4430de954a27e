use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub business_rules: BusinessRules,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Postgres URL for the booking ledger; in-memory ledger when absent
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { url: None, max_connections: default_max_connections() }
    }
}

fn default_max_connections() -> u32 { 5 }

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    pub seat_hold_seconds: u64,
    #[serde(default = "default_sweep")]
    pub hold_sweep_seconds: u64,
}

fn default_sweep() -> u64 { 30 }

impl BusinessRules {
    /// Hold time-to-live, rejected if it cannot be added to a timestamp
    pub fn seat_hold_ttl(&self) -> Result<chrono::Duration, config::ConfigError> {
        i64::try_from(self.seat_hold_seconds)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .filter(|ttl| chrono::Utc::now().checked_add_signed(*ttl).is_some())
            .ok_or_else(|| {
                config::ConfigError::Message(format!(
                    "business_rules.seat_hold_seconds {} is out of range",
                    self.seat_hold_seconds
                ))
            })
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    #[serde(default)]
    pub seed_demo: bool,
    /// Upper bound on seats per event
    #[serde(default = "default_max_seats")]
    pub max_seats: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self { seed_demo: false, max_seats: default_max_seats() }
    }
}

fn default_max_seats() -> u32 { 10_000 }

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Developer overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `EVENTWAVE__SERVER__PORT=9000`
            .add_source(config::Environment::with_prefix("EVENTWAVE").prefix_separator("__").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    pub fn from_toml(source: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

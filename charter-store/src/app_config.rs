use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub cron: CronConfig,
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Unset means the service runs on the in-memory store
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
            acquire_timeout_seconds: default_acquire_timeout(),
        }
    }
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout() -> u64 {
    3
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CronConfig {
    /// Shared secret expected from the external scheduler
    pub secret: Option<String>,
}

impl CronConfig {
    pub fn configured_secret(&self) -> Option<&str> {
        self.secret.as_deref().filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    /// How long a pending booking waits for captain approval
    pub pending_hold_hours: i64,
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
}

fn default_sweep_interval() -> u64 {
    300
}

impl BusinessRules {
    /// Approval window for new bookings; at least one hour and representable.
    pub fn pending_hold(&self) -> Result<chrono::Duration, config::ConfigError> {
        if self.pending_hold_hours < 1 {
            return Err(config::ConfigError::Message(format!(
                "business_rules.pending_hold_hours must be at least 1, got {}",
                self.pending_hold_hours
            )));
        }
        chrono::TimeDelta::try_hours(self.pending_hold_hours).ok_or_else(|| {
            config::ConfigError::Message(format!(
                "business_rules.pending_hold_hours is out of range: {}",
                self.pending_hold_hours
            ))
        })
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds.max(1))
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, never checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `CHARTER__CRON__SECRET=...` sets `cron.secret`
            .add_source(config::Environment::with_prefix("CHARTER").separator("__"))
            .build()?;

        let config: Config = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), config::ConfigError> {
        self.business_rules.pending_hold()?;
        Ok(())
    }
}

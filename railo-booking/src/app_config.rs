use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub service: ServiceConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub booking: BookingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_timeout() -> u64 { 10 }

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AuthConfig {
    pub access_token: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BookingConfig {
    /// Active holds closer than this to `expiresAt` are flagged as expiring soon
    pub hold_warning_minutes: i64,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self { hold_warning_minutes: 3 }
    }
}

impl BookingConfig {
    pub fn hold_warning(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.hold_warning_minutes.max(0))
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `RAILO__SERVICE__BASE_URL=https://...`
            .add_source(config::Environment::with_prefix("RAILO").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

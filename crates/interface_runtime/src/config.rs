//! Engine configuration

use serde::{Deserialize, Serialize};

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Log level filter (tracing syntax)
    pub log_level: String,
    /// Hard deadline for a single sweep run, in seconds
    pub job_timeout_secs: u64,
    /// Entity lease time-to-live, in seconds
    pub lease_ttl_secs: i64,
    /// Master-data cache time-to-live, in seconds
    pub membership_cache_ttl_secs: i64,
    /// Base delay between side-effect redelivery attempts, in seconds
    pub dispatch_retry_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            job_timeout_secs: 600,
            lease_ttl_secs: 300,
            membership_cache_ttl_secs: 60,
            dispatch_retry_secs: 5,
        }
    }
}

impl EngineConfig {
    /// Loads configuration from `ENGINE_`-prefixed environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Config::try_from(&EngineConfig::default())?)
            .add_source(config::Environment::with_prefix("ENGINE"))
            .build()?
            .try_deserialize()
    }
}

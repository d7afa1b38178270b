use std::time::Duration;

use serde::Deserialize;

use amora_core::config::Config;

/// Social service configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct SocialConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret shared with the auth service. Also signs service-to-service tokens.
    pub jwt_secret: String,
    /// TCP port for the HTTP server (default 8080). Env var: `SOCIAL_PORT`.
    #[serde(default = "default_port")]
    pub social_port: u16,
    /// Conversation/messaging service base URL.
    #[serde(default = "default_messaging_url")]
    pub messaging_service_url: String,
    /// Matching service base URL.
    #[serde(default = "default_match_url")]
    pub match_service_url: String,
    /// AMQP broker URL. Lifecycle delivery is disabled when unset.
    pub rabbitmq_url: Option<String>,
    /// Topic exchange for lifecycle events.
    #[serde(default = "default_lifecycle_exchange")]
    pub lifecycle_exchange: String,
    #[serde(default = "default_poll_interval_secs")]
    pub outbox_poll_interval_secs: u64,
    #[serde(default = "default_conversation_batch")]
    pub outbox_conversation_batch: u64,
    #[serde(default = "default_profile_batch")]
    pub outbox_profile_batch: u64,
    #[serde(default = "default_lifecycle_batch")]
    pub outbox_lifecycle_batch: u64,
    /// Stop polling a row once it has failed this many times. Unset retries forever.
    pub outbox_max_attempts: Option<i32>,
    /// Per-call timeout for conversation and broker delivery.
    #[serde(default = "default_delivery_timeout_secs")]
    pub delivery_timeout_secs: u64,
    #[serde(default = "default_match_timeout_secs")]
    pub match_service_timeout_secs: u64,
}

impl Config for SocialConfig {}

impl SocialConfig {
    /// Never shorter than one second; a zero period is not a valid tick.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.outbox_poll_interval_secs.max(1))
    }

    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_secs(self.delivery_timeout_secs)
    }

    pub fn match_service_timeout(&self) -> Duration {
        Duration::from_secs(self.match_service_timeout_secs)
    }
}

fn default_port() -> u16 {
    8080
}

fn default_messaging_url() -> String {
    "http://localhost:8082".to_owned()
}

fn default_match_url() -> String {
    "http://localhost:8003".to_owned()
}

fn default_lifecycle_exchange() -> String {
    "user.lifecycle".to_owned()
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_conversation_batch() -> u64 {
    10
}

fn default_profile_batch() -> u64 {
    10
}

fn default_lifecycle_batch() -> u64 {
    25
}

fn default_delivery_timeout_secs() -> u64 {
    5
}

fn default_match_timeout_secs() -> u64 {
    10
}

//! Client configuration
//!
//! Loaded from an optional file (any format the `config` crate knows) and
//! `RX_REMINDER_*` environment variables, e.g.
//! `RX_REMINDER_EMAIL__SERVICE_ID=service_abc`. Every field has a default.

use crate::RxError;
use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

pub const ENV_PREFIX: &str = "RX_REMINDER";

/// Default REST endpoint of the transactional email service
pub const DEFAULT_EMAIL_ENDPOINT: &str = "https://api.emailjs.com/api/v1.0/email/send";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    pub gateway: GatewayConfig,
    pub email: EmailConfig,
    pub session: SessionConfig,
    /// `tracing` filter directive, overridden by `RUST_LOG`
    pub log_filter: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            email: EmailConfig::default(),
            session: SessionConfig::default(),
            log_filter: "info".to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GatewayConfig {
    /// Contract build artifact holding the ABI and per-network deployments
    pub artifact_path: Option<PathBuf>,
    /// Headroom added on top of every gas estimate, in percent
    pub gas_buffer_percent: u32,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            artifact_path: None,
            gas_buffer_percent: 20,
        }
    }
}

impl GatewayConfig {
    pub const MAX_GAS_BUFFER_PERCENT: u32 = 500;
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmailConfig {
    pub endpoint: String,
    pub service_id: String,
    /// Public key of the email account, sent as `user_id`
    pub public_key: String,
    pub welcome_template: String,
    pub reminder_template: String,
    pub timeout_secs: u64,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_EMAIL_ENDPOINT.to_string(),
            service_id: String::new(),
            public_key: String::new(),
            welcome_template: String::new(),
            reminder_template: String::new(),
            timeout_secs: 10,
        }
    }
}

impl EmailConfig {
    /// Email is only dispatched when an account is configured
    pub fn is_enabled(&self) -> bool {
        !self.service_id.is_empty() && !self.public_key.is_empty()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct SessionConfig {
    /// Where the remembered account and role live; in memory when unset
    pub store_path: Option<PathBuf>,
}

impl ClientConfig {
    /// Load configuration from `path` (if it exists) and the environment
    pub fn load(path: Option<&Path>) -> Result<Self, RxError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        );

        let config: ClientConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RxError> {
        if self.gateway.gas_buffer_percent > GatewayConfig::MAX_GAS_BUFFER_PERCENT {
            return Err(RxError::Config(format!(
                "gas_buffer_percent cannot exceed {}",
                GatewayConfig::MAX_GAS_BUFFER_PERCENT
            )));
        }
        if self.email.is_enabled() && self.email.endpoint.is_empty() {
            return Err(RxError::Config("email endpoint is required".to_string()));
        }
        if let Err(e) = EnvFilter::try_new(&self.log_filter) {
            return Err(RxError::Config(format!("invalid log_filter: {}", e)));
        }
        Ok(())
    }

    /// Install the global subscriber using `log_filter`
    pub fn init_logging(&self) -> bool {
        crate::logging::init_tracing(&self.log_filter)
    }
}

//! Client-wide error taxonomy
//!
//! Every external call is wrapped where it is made and converted into an
//! [`RxError`]. Nothing propagates past the user action that started it;
//! the action turns the error into a transient message with
//! [`RxError::user_message`].

use crate::validation::ValidationFailure;
use crate::NetworkId;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static REVERT_REASON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"reason: '(.*?)'").expect("valid revert reason pattern"));

static REVERT_TRAILER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"revert(?:ed)?:?\s+(.+)$").expect("valid revert trailer pattern"));

/// Raw failure reported by the wallet provider or the contract call layer
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Error)]
#[error("provider error{}: {message}", .code.map(|c| format!(" {}", c)).unwrap_or_default())]
pub struct ProviderError {
    /// EIP-1193 style numeric code, when the provider sends one
    pub code: Option<i64>,
    pub message: String,
    /// Decoded revert reason, when the provider already extracted it
    pub reason: Option<String>,
}

impl ProviderError {
    /// Code sent by the wallet when the user dismisses a prompt
    pub const USER_REJECTED: i64 = 4001;

    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            reason: None,
        }
    }

    pub fn with_code(code: i64, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
            reason: None,
        }
    }

    pub fn revert(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            code: None,
            message: format!("execution reverted: {}", reason),
            reason: Some(reason),
        }
    }

    pub fn user_rejected() -> Self {
        Self::with_code(Self::USER_REJECTED, "User denied transaction signature")
    }

    pub fn is_revert(&self) -> bool {
        self.reason.is_some() || self.message.contains("revert")
    }
}

/// Best-effort extraction of a human-readable revert reason
pub fn parse_revert_reason(message: &str) -> Option<String> {
    if let Some(caps) = REVERT_REASON.captures(message) {
        return caps.get(1).map(|m| m.as_str().to_string()).filter(|r| !r.is_empty());
    }
    REVERT_TRAILER
        .captures(message)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|r| !r.is_empty())
}

/// Every failure a user action can end with
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RxError {
    /// No wallet provider injected
    #[error("No wallet provider available, install a wallet extension and retry")]
    ProviderMissing,

    #[error("The wallet returned no account")]
    NoAccounts,

    /// Contract not deployed on the wallet's current network
    #[error("Contract is not deployed on network {network_id}")]
    DeploymentMissing { network_id: NetworkId },

    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    #[error("Account {0} is not registered")]
    NotRegistered(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is not registered as a doctor")]
    NotDoctor,

    #[error("Prescription {0} not found")]
    PrescriptionNotFound(u64),

    /// The contract rejected the call
    #[error("Contract error: {}", .reason.as_deref().unwrap_or("unspecified reason"))]
    ContractRevert { reason: Option<String> },

    #[error("Transaction cancelled by the user")]
    UserRejected,

    #[error("Gas price too low, please retry")]
    GasUnderpriced,

    #[error("Gas limit exceeded")]
    OutOfGas,

    #[error("Network error: {0}")]
    Transport(String),

    /// Operation not allowed in the current session state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl RxError {
    /// Message suitable for a transient notification
    pub fn user_message(&self) -> String {
        match self {
            RxError::Transport(_) => "Network error, please retry".to_string(),
            other => other.to_string(),
        }
    }

    /// Whether the failure happened before anything was sent to the chain
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            RxError::Validation(_)
                | RxError::InvalidState(_)
                | RxError::ProviderMissing
                | RxError::Config(_)
        )
    }
}

impl From<ProviderError> for RxError {
    fn from(err: ProviderError) -> Self {
        if err.code == Some(ProviderError::USER_REJECTED) {
            return RxError::UserRejected;
        }
        if err.is_revert() {
            let reason = err.reason.clone().or_else(|| parse_revert_reason(&err.message));
            return RxError::ContractRevert { reason };
        }
        if err.message.contains("underpriced") {
            return RxError::GasUnderpriced;
        }
        if err.message.contains("out of gas") {
            return RxError::OutOfGas;
        }
        RxError::Transport(err.message)
    }
}

impl From<::config::ConfigError> for RxError {
    fn from(err: ::config::ConfigError) -> Self {
        RxError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for RxError {
    fn from(err: serde_json::Error) -> Self {
        RxError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for RxError {
    fn from(err: std::io::Error) -> Self {
        RxError::Storage(err.to_string())
    }
}

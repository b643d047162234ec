//! Seams to the wallet and the chain client.
//!
//! Both are external collaborators. They are always handed in explicitly;
//! nothing in this workspace reaches for an ambient provider.

use async_trait::async_trait;
use rx_reminder_shared::{Address, NetworkId, ProviderError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Account source and network information from the user's wallet
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the wallet for its accounts, prompting the user if needed
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// Chain the wallet is currently connected to
    async fn network_id(&self) -> Result<NetworkId, ProviderError>;
}

/// One invocation of a contract method
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ContractCall {
    pub contract: Address,
    pub method: String,
    pub args: Vec<Value>,
    pub from: Option<Address>,
}

/// Result of a mined transaction
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TxReceipt {
    pub transaction_hash: String,
    /// False when the transaction was mined but reverted
    pub status: bool,
    pub gas_used: Option<u64>,
}

/// Read/estimate/send access to a deployed contract.
///
/// Results come back as untyped JSON; shaping them is the gateway's job.
#[async_trait]
pub trait ContractTransport: Send + Sync {
    async fn call(&self, call: &ContractCall) -> Result<Value, ProviderError>;

    async fn estimate_gas(&self, call: &ContractCall) -> Result<u64, ProviderError>;

    /// Sign (through the wallet) and submit, waiting for the receipt
    async fn send(&self, call: &ContractCall, gas: u64) -> Result<TxReceipt, ProviderError>;
}

//! Active account from the injected wallet provider.

use rx_reminder_gateway::WalletProvider;
use rx_reminder_shared::{Address, RxError};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone, Default)]
pub struct SessionAdapter {
    provider: Option<Arc<dyn WalletProvider>>,
    account: Option<Address>,
}

impl std::fmt::Debug for SessionAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionAdapter")
            .field("has_provider", &self.provider.is_some())
            .field("account", &self.account)
            .finish()
    }
}

impl SessionAdapter {
    /// `None` stands for a browser without a wallet extension
    pub fn new(provider: Option<Arc<dyn WalletProvider>>) -> Self {
        Self {
            provider,
            account: None,
        }
    }

    pub fn provider(&self) -> Result<&Arc<dyn WalletProvider>, RxError> {
        self.provider.as_ref().ok_or(RxError::ProviderMissing)
    }

    /// Ask the wallet for its accounts and keep the first one
    pub async fn connect(&mut self) -> Result<Address, RxError> {
        let provider = self.provider()?;
        let accounts = provider.request_accounts().await?;
        debug!(count = accounts.len(), "wallet returned accounts");

        let account = accounts.into_iter().next().ok_or(RxError::NoAccounts)?;
        info!(account = %account, "wallet connected");
        self.account = Some(account.clone());
        Ok(account)
    }

    pub fn current_account(&self) -> Option<&Address> {
        self.account.as_ref()
    }

    pub fn disconnect(&mut self) {
        self.account = None;
    }
}

//! Authentication and registration state machine
//!
//! ```text
//! Disconnected ── connect ──▶ Connected ──┬── authenticate ──▶ Authenticating ──┬─▶ AuthenticatedAsPatient
//!                                ▲        │                                      └─▶ AuthenticatedAsDoctor
//!                                │        └── begin_registration ──▶ Registering ── register ──▶ (same)
//!                                └──────────── cancel_registration ◀─────┘
//! ```
//!
//! A failed authentication falls back to `Connected`; a failed
//! registration stays in `Registering` so the form can be resubmitted.

use crate::session::SessionAdapter;
use crate::store::{RememberedSession, SessionStore};
use rx_reminder_gateway::{
    ContractGateway, ContractTransport, Deployments, WalletProvider, DEFAULT_GAS_BUFFER_PERCENT,
};
use rx_reminder_notifications::Notifier;
use rx_reminder_shared::{
    validate_email, validate_required, Address, ClientConfig, PasswordHash, Role, RxError,
    ValidationResult,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthState {
    Disconnected,
    Connected { account: Address },
    Authenticating { account: Address },
    Registering { account: Address },
    AuthenticatedAsPatient { account: Address },
    AuthenticatedAsDoctor { account: Address },
}

impl AuthState {
    fn authenticated(account: Address, role: Role) -> Self {
        match role {
            Role::Patient => AuthState::AuthenticatedAsPatient { account },
            Role::Doctor => AuthState::AuthenticatedAsDoctor { account },
        }
    }

    pub fn account(&self) -> Option<&Address> {
        match self {
            AuthState::Disconnected => None,
            AuthState::Connected { account }
            | AuthState::Authenticating { account }
            | AuthState::Registering { account }
            | AuthState::AuthenticatedAsPatient { account }
            | AuthState::AuthenticatedAsDoctor { account } => Some(account),
        }
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            AuthState::AuthenticatedAsPatient { .. } => Some(Role::Patient),
            AuthState::AuthenticatedAsDoctor { .. } => Some(Role::Doctor),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AuthState::Disconnected => "disconnected",
            AuthState::Connected { .. } => "connected",
            AuthState::Authenticating { .. } => "authenticating",
            AuthState::Registering { .. } => "registering",
            AuthState::AuthenticatedAsPatient { .. } => "authenticated_patient",
            AuthState::AuthenticatedAsDoctor { .. } => "authenticated_doctor",
        }
    }
}

/// Where a signed-in user lands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dashboard {
    Patient,
    Doctor,
}

impl From<Role> for Dashboard {
    fn from(role: Role) -> Self {
        match role {
            Role::Patient => Dashboard::Patient,
            Role::Doctor => Dashboard::Doctor,
        }
    }
}

pub struct AuthFlow {
    session: SessionAdapter,
    transport: Arc<dyn ContractTransport>,
    deployments: Deployments,
    store: Box<dyn SessionStore>,
    notifier: Notifier,
    gas_buffer_percent: u32,
    gateway: Option<ContractGateway>,
    state: AuthState,
}

impl AuthFlow {
    pub fn new(
        session: SessionAdapter,
        transport: Arc<dyn ContractTransport>,
        deployments: Deployments,
        store: Box<dyn SessionStore>,
        notifier: Notifier,
    ) -> Self {
        Self {
            session,
            transport,
            deployments,
            store,
            notifier,
            gas_buffer_percent: DEFAULT_GAS_BUFFER_PERCENT,
            gateway: None,
            state: AuthState::Disconnected,
        }
    }

    /// Wire a flow from client configuration.
    ///
    /// Without an artifact path no network has a deployment, so sign-in
    /// fails with [`RxError::DeploymentMissing`].
    pub fn from_config(
        config: &ClientConfig,
        provider: Option<Arc<dyn WalletProvider>>,
        transport: Arc<dyn ContractTransport>,
    ) -> Result<Self, RxError> {
        let deployments = match &config.gateway.artifact_path {
            Some(path) => Deployments::from_artifact_file(path)?,
            None => Deployments::new(),
        };
        Ok(Self::new(
            SessionAdapter::new(provider),
            transport,
            deployments,
            crate::store_from_config(&config.session),
            Notifier::from_config(&config.email),
        )
        .with_gas_buffer(config.gateway.gas_buffer_percent))
    }

    pub fn with_gas_buffer(mut self, percent: u32) -> Self {
        self.gas_buffer_percent = percent;
        self
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    /// Gateway resolved during the last successful sign-in
    pub fn gateway(&self) -> Option<&ContractGateway> {
        self.gateway.as_ref()
    }

    pub fn dashboard(&self) -> Option<Dashboard> {
        self.state.role().map(Dashboard::from)
    }

    fn transition(&mut self, next: AuthState) {
        debug!(from = self.state.name(), to = next.name(), "auth state change");
        self.state = next;
    }

    fn connected_account(&self) -> Result<Address, RxError> {
        match &self.state {
            AuthState::Connected { account } => Ok(account.clone()),
            other => Err(RxError::InvalidState(format!(
                "expected a connected wallet, session is {}",
                other.name()
            ))),
        }
    }

    async fn resolve_gateway(&self) -> Result<ContractGateway, RxError> {
        let provider = self.session.provider()?;
        let gateway =
            ContractGateway::connect(provider.as_ref(), self.transport.clone(), &self.deployments)
                .await?;
        Ok(gateway.with_gas_buffer(self.gas_buffer_percent))
    }

    fn remember(&mut self, account: &Address, role: Role) {
        if let Err(e) = RememberedSession::new(account.clone(), role).save(self.store.as_mut()) {
            warn!(error = %e, "could not remember session");
        }
    }

    /// Connect the wallet. Stays `Disconnected` on failure.
    pub async fn connect(&mut self) -> Result<Address, RxError> {
        let account = self.session.connect().await?;
        self.transition(AuthState::Connected {
            account: account.clone(),
        });
        Ok(account)
    }

    pub fn begin_registration(&mut self) -> Result<(), RxError> {
        let account = self.connected_account()?;
        self.transition(AuthState::Registering { account });
        Ok(())
    }

    pub fn cancel_registration(&mut self) -> Result<(), RxError> {
        match &self.state {
            AuthState::Registering { account } => {
                let account = account.clone();
                self.transition(AuthState::Connected { account });
                Ok(())
            }
            other => Err(RxError::InvalidState(format!(
                "no registration in progress, session is {}",
                other.name()
            ))),
        }
    }

    /// Sign in with the account's password and email.
    ///
    /// Only the password hash is sent. Falls back to `Connected` on failure.
    pub async fn authenticate(
        &mut self,
        password: &str,
        email: &str,
    ) -> Result<Dashboard, RxError> {
        let account = self.connected_account()?;
        validate_required(password, "password").into_result()?;

        self.transition(AuthState::Authenticating {
            account: account.clone(),
        });
        match self.verify_credentials(&account, password, email).await {
            Ok((gateway, role)) => {
                self.remember(&account, role);
                self.gateway = Some(gateway);
                info!(account = %account, role = %role, "signed in");
                self.transition(AuthState::authenticated(account, role));
                Ok(Dashboard::from(role))
            }
            Err(e) => {
                warn!(account = %account, error = %e, "sign-in failed");
                self.transition(AuthState::Connected { account });
                Err(e)
            }
        }
    }

    async fn verify_credentials(
        &self,
        account: &Address,
        password: &str,
        email: &str,
    ) -> Result<(ContractGateway, Role), RxError> {
        let gateway = self.resolve_gateway().await?;

        if !gateway.is_user_registered(account).await? {
            return Err(RxError::NotRegistered(account.to_string()));
        }

        let hash = PasswordHash::from_password(password);
        if !gateway.verify_user(account, &hash, email.trim()).await? {
            return Err(RxError::InvalidCredentials);
        }

        let role = Role::from_is_doctor(gateway.is_doctor(account).await?);
        Ok((gateway, role))
    }

    /// Register the connected account, then send a best-effort welcome email.
    ///
    /// Stays in `Registering` on failure.
    pub async fn register(
        &mut self,
        password: &str,
        email: &str,
        role: Role,
    ) -> Result<Dashboard, RxError> {
        let account = match &self.state {
            AuthState::Registering { account } => account.clone(),
            other => {
                return Err(RxError::InvalidState(format!(
                    "registration not started, session is {}",
                    other.name()
                )))
            }
        };

        let mut validation = ValidationResult::new();
        validation.merge(validate_required(password, "password"));
        validation.merge(validate_email(email.trim()));
        validation.into_result()?;

        let gateway = self.resolve_gateway().await?;
        let hash = PasswordHash::from_password(password);
        let receipt = gateway.register_user(&account, &hash, email.trim(), role).await?;
        info!(
            account = %account,
            role = %role,
            tx = %receipt.transaction_hash,
            "account registered"
        );

        let report = self.notifier.send_welcome(email, &account).await;
        debug!(sent = report.sent, failed = report.failed, "welcome email dispatched");

        self.remember(&account, role);
        self.gateway = Some(gateway);
        self.transition(AuthState::authenticated(account, role));
        Ok(Dashboard::from(role))
    }

    /// The remembered account and role, if any. A display hint, not a sign-in.
    pub fn restore(&self) -> Option<RememberedSession> {
        match RememberedSession::load(self.store.as_ref()) {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "could not read remembered session");
                None
            }
        }
    }

    /// Forget the remembered session and the connected account
    pub fn logout(&mut self) -> Result<(), RxError> {
        RememberedSession::clear(self.store.as_mut())?;
        self.gateway = None;
        self.session.disconnect();
        self.transition(AuthState::Disconnected);
        Ok(())
    }
}

impl std::fmt::Debug for AuthFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthFlow")
            .field("state", &self.state)
            .field("session", &self.session)
            .field("gateway", &self.gateway)
            .finish_non_exhaustive()
    }
}

//! Typed access to the prescription contract.
//!
//! Reads go through [`ContractTransport::call`]; writes estimate gas, add
//! the configured buffer and send. Every provider failure is converted into
//! an [`RxError`] here, so callers never see a raw [`ProviderError`].

use crate::deployment::Deployments;
use crate::normalize::{
    as_text, map_prescriptions, truthy, MappingContext, DOCTOR_LISTING, PATIENT_LISTING,
};
use crate::provider::{ContractCall, ContractTransport, TxReceipt, WalletProvider};
use prescriptions_integrity::{Prescription, PrescriptionStatus, PrescriptionSubmission};
use rx_reminder_shared::{
    Address, GatewayConfig, NetworkId, PasswordHash, ProviderError, Role, RxError,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Contract method names
pub mod methods {
    pub const GET_USER_EMAIL: &str = "getUserEmail";
    pub const IS_USER_REGISTERED: &str = "isUserRegistered";
    pub const IS_DOCTOR: &str = "isDoctor";
    pub const VERIFY_USER: &str = "verifyUser";
    pub const REGISTER_USER: &str = "registerUser";
    pub const GET_PATIENT_PRESCRIPTIONS: &str = "getPatientPrescriptions";
    pub const GET_DOCTOR_PRESCRIPTIONS: &str = "getDoctorPrescriptions";
    pub const ADD_PRESCRIPTION: &str = "addPrescription";
    pub const MODIFY_PRESCRIPTION: &str = "modifyPrescription";
    pub const REMOVE_PRESCRIPTION: &str = "removePrescription";
    pub const UPDATE_PRESCRIPTION_STATUS: &str = "updatePrescriptionStatus";
}

/// Default percentage added on top of a gas estimate
pub const DEFAULT_GAS_BUFFER_PERCENT: u32 = 20;

/// Apply a percentage buffer to a gas estimate, saturating
pub fn buffered_gas(estimate: u64, buffer_percent: u32) -> u64 {
    let buffered = u128::from(estimate) * (100 + u128::from(buffer_percent)) / 100;
    u64::try_from(buffered).unwrap_or(u64::MAX)
}

/// Gateway bound to one deployed contract
#[derive(Clone)]
pub struct ContractGateway {
    transport: Arc<dyn ContractTransport>,
    contract: Address,
    network_id: NetworkId,
    gas_buffer_percent: u32,
}

impl std::fmt::Debug for ContractGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractGateway")
            .field("contract", &self.contract)
            .field("network_id", &self.network_id)
            .field("gas_buffer_percent", &self.gas_buffer_percent)
            .finish_non_exhaustive()
    }
}

impl ContractGateway {
    pub fn new(
        transport: Arc<dyn ContractTransport>,
        contract: Address,
        network_id: NetworkId,
    ) -> Self {
        Self {
            transport,
            contract,
            network_id,
            gas_buffer_percent: DEFAULT_GAS_BUFFER_PERCENT,
        }
    }

    pub fn with_gas_buffer(mut self, percent: u32) -> Self {
        self.gas_buffer_percent = percent;
        self
    }

    pub fn with_config(self, config: &GatewayConfig) -> Self {
        self.with_gas_buffer(config.gas_buffer_percent)
    }

    /// Resolve the contract for the wallet's current network.
    ///
    /// Fails with [`RxError::DeploymentMissing`] when the contract is not
    /// deployed there.
    pub async fn connect(
        provider: &dyn WalletProvider,
        transport: Arc<dyn ContractTransport>,
        deployments: &Deployments,
    ) -> Result<Self, RxError> {
        let network_id = provider.network_id().await?;
        let contract = deployments.address_for(network_id)?.clone();
        debug!(network_id, contract = %contract, "contract resolved");
        Ok(Self::new(transport, contract, network_id))
    }

    pub fn contract(&self) -> &Address {
        &self.contract
    }

    pub fn network_id(&self) -> NetworkId {
        self.network_id
    }

    pub fn gas_buffer_percent(&self) -> u32 {
        self.gas_buffer_percent
    }

    fn call_for(&self, method: &str, args: Vec<Value>, from: Option<&Address>) -> ContractCall {
        ContractCall {
            contract: self.contract.clone(),
            method: method.to_string(),
            args,
            from: from.cloned(),
        }
    }

    async fn read(&self, call: ContractCall) -> Result<Value, RxError> {
        debug!(method = %call.method, "contract read");
        self.transport.call(&call).await.map_err(|e| {
            warn!(method = %call.method, error = %e, "contract read failed");
            RxError::from(e)
        })
    }

    /// Estimate, buffer, send. A mined but failed transaction counts as a revert.
    async fn transact(&self, call: ContractCall) -> Result<TxReceipt, RxError> {
        let estimate = self.transport.estimate_gas(&call).await.map_err(|e| {
            warn!(method = %call.method, error = %e, "gas estimation failed");
            RxError::from(e)
        })?;
        let gas = buffered_gas(estimate, self.gas_buffer_percent);
        debug!(method = %call.method, estimate, gas, "sending transaction");

        let receipt = self.transport.send(&call, gas).await.map_err(|e| {
            warn!(method = %call.method, error = %e, "transaction failed");
            RxError::from(e)
        })?;

        if !receipt.status {
            warn!(method = %call.method, tx = %receipt.transaction_hash, "transaction reverted");
            return Err(RxError::from(ProviderError::new(format!(
                "transaction {} reverted",
                receipt.transaction_hash
            ))));
        }
        Ok(receipt)
    }

    // ========== READS ==========

    pub async fn get_user_email(&self, account: &Address) -> Result<String, RxError> {
        let value = self
            .read(self.call_for(methods::GET_USER_EMAIL, vec![json!(account.as_str())], None))
            .await?;
        Ok(as_text(&value))
    }

    pub async fn is_user_registered(&self, account: &Address) -> Result<bool, RxError> {
        let value = self
            .read(self.call_for(methods::IS_USER_REGISTERED, vec![json!(account.as_str())], None))
            .await?;
        Ok(truthy(&value))
    }

    pub async fn is_doctor(&self, account: &Address) -> Result<bool, RxError> {
        let value = self
            .read(self.call_for(methods::IS_DOCTOR, vec![json!(account.as_str())], None))
            .await?;
        Ok(truthy(&value))
    }

    /// Check credentials of `from`. Only the hash leaves the client.
    pub async fn verify_user(
        &self,
        from: &Address,
        hash: &PasswordHash,
        email: &str,
    ) -> Result<bool, RxError> {
        let value = self
            .read(self.call_for(
                methods::VERIFY_USER,
                vec![json!(hash.as_str()), json!(email)],
                Some(from),
            ))
            .await?;
        Ok(truthy(&value))
    }

    pub async fn get_patient_prescriptions(
        &self,
        patient: &Address,
    ) -> Result<Vec<Prescription>, RxError> {
        let raw = self
            .read(self.call_for(
                methods::GET_PATIENT_PRESCRIPTIONS,
                vec![json!(patient.as_str())],
                None,
            ))
            .await?;
        let context = MappingContext {
            patient: Some(patient.clone()),
            doctor: None,
        };
        Ok(map_prescriptions(&raw, &PATIENT_LISTING, &context))
    }

    /// Every prescription the doctor wrote, removed ones included
    pub async fn get_doctor_prescriptions(
        &self,
        doctor: &Address,
    ) -> Result<Vec<Prescription>, RxError> {
        let raw = self
            .read(self.call_for(
                methods::GET_DOCTOR_PRESCRIPTIONS,
                vec![json!(doctor.as_str())],
                None,
            ))
            .await?;
        let context = MappingContext {
            patient: None,
            doctor: Some(doctor.clone()),
        };
        Ok(map_prescriptions(&raw, &DOCTOR_LISTING, &context))
    }

    // ========== WRITES ==========

    pub async fn register_user(
        &self,
        from: &Address,
        hash: &PasswordHash,
        email: &str,
        role: Role,
    ) -> Result<TxReceipt, RxError> {
        self.transact(self.call_for(
            methods::REGISTER_USER,
            vec![json!(hash.as_str()), json!(email), json!(role.as_wire())],
            Some(from),
        ))
        .await
    }

    pub async fn add_prescription(
        &self,
        from: &Address,
        patient: &Address,
        submission: &PrescriptionSubmission,
    ) -> Result<TxReceipt, RxError> {
        let mut args = vec![json!(patient.as_str())];
        args.extend(submission_args(submission));
        self.transact(self.call_for(methods::ADD_PRESCRIPTION, args, Some(from)))
            .await
    }

    pub async fn modify_prescription(
        &self,
        from: &Address,
        id: u64,
        submission: &PrescriptionSubmission,
    ) -> Result<TxReceipt, RxError> {
        let mut args = vec![json!(id)];
        args.extend(submission_args(submission));
        self.transact(self.call_for(methods::MODIFY_PRESCRIPTION, args, Some(from)))
            .await
    }

    /// Soft delete; the record stays on chain with `is_active = false`
    pub async fn remove_prescription(&self, from: &Address, id: u64) -> Result<TxReceipt, RxError> {
        self.transact(self.call_for(methods::REMOVE_PRESCRIPTION, vec![json!(id)], Some(from)))
            .await
    }

    pub async fn update_prescription_status(
        &self,
        from: &Address,
        id: u64,
        status: PrescriptionStatus,
    ) -> Result<TxReceipt, RxError> {
        self.transact(self.call_for(
            methods::UPDATE_PRESCRIPTION_STATUS,
            vec![json!(id), json!(status.as_wire())],
            Some(from),
        ))
        .await
    }
}

fn submission_args(submission: &PrescriptionSubmission) -> Vec<Value> {
    vec![
        json!(submission.medicine),
        json!(submission.dosage),
        json!(submission.frequency),
        json!(submission.duration_days),
        json!(submission.reminder_times),
    ]
}

//! Patient dashboard: own prescriptions and their status.

use crate::command::StatusUpdate;
use crate::notice::Notice;
use prescriptions_integrity::{Prescription, PrescriptionStatus};
use rx_reminder_gateway::ContractGateway;
use rx_reminder_shared::{Address, RxError};
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct PatientDashboard {
    gateway: ContractGateway,
    account: Address,
    email: String,
    prescriptions: Vec<Prescription>,
    notice: Option<Notice>,
}

impl PatientDashboard {
    pub fn new(gateway: ContractGateway, account: Address) -> Self {
        Self {
            gateway,
            account,
            email: String::new(),
            prescriptions: Vec::new(),
            notice: None,
        }
    }

    pub fn account(&self) -> &Address {
        &self.account
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn prescriptions(&self) -> &[Prescription] {
        &self.prescriptions
    }

    /// Last message raised by an action, cleared on read
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    fn fail<T>(&mut self, err: RxError) -> Result<T, RxError> {
        self.notice = Some(Notice::from(&err));
        Err(err)
    }

    /// Load the account email and the listing
    pub async fn open(&mut self) -> Result<(), RxError> {
        match self.gateway.get_user_email(&self.account).await {
            Ok(email) => self.email = email,
            Err(e) => return self.fail(e),
        }
        self.load_prescriptions().await
    }

    /// Replace the listing with what the contract holds. Cleared on failure.
    pub async fn load_prescriptions(&mut self) -> Result<(), RxError> {
        match self.gateway.get_patient_prescriptions(&self.account).await {
            Ok(prescriptions) => {
                debug!(count = prescriptions.len(), "patient prescriptions loaded");
                self.prescriptions = prescriptions;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "could not load patient prescriptions");
                self.prescriptions.clear();
                self.fail(e)
            }
        }
    }

    /// Set the status of one prescription.
    ///
    /// The listing shows the new status immediately. On failure it is
    /// replaced with a fresh read, or restored when the read fails too.
    pub async fn update_status(
        &mut self,
        id: u64,
        status: PrescriptionStatus,
    ) -> Result<(), RxError> {
        let mut update = StatusUpdate::new(id, status);
        if let Err(e) = update.project(&mut self.prescriptions) {
            return self.fail(e);
        }

        match self
            .gateway
            .update_prescription_status(&self.account, id, status)
            .await
        {
            Ok(receipt) => {
                info!(id, status = %status, tx = %receipt.transaction_hash, "status updated");
                match self.gateway.get_patient_prescriptions(&self.account).await {
                    Ok(fresh) => self.prescriptions = fresh,
                    Err(e) => {
                        warn!(error = %e, "refresh after status update failed, keeping projection")
                    }
                }
                self.notice = Some(Notice::success(format!("Status set to {}", status)));
                Ok(())
            }
            Err(e) => {
                warn!(id, error = %e, "status update failed, reconciling");
                match self.gateway.get_patient_prescriptions(&self.account).await {
                    Ok(fresh) => self.prescriptions = fresh,
                    Err(read_err) => {
                        debug!(error = %read_err, "reconciling read failed, restoring snapshot");
                        update.restore(&mut self.prescriptions);
                    }
                }
                self.fail(e)
            }
        }
    }

    pub async fn mark_as_taken(&mut self, id: u64) -> Result<(), RxError> {
        self.update_status(id, PrescriptionStatus::Taken).await
    }
}

//! Doctor dashboard: own prescriptions, patient lookup and the
//! add/modify/remove writes.

use crate::form::PrescriptionForm;
use crate::notice::Notice;
use prescriptions_integrity::{Prescription, PrescriptionSubmission};
use rx_reminder_gateway::{ContractGateway, TxReceipt};
use rx_reminder_notifications::{DispatchReport, Notifier, ReminderRequest};
use rx_reminder_shared::{Address, RxError};
use tracing::{debug, info, warn};

/// Shown instead of the contract error when the doctor has nothing listed
pub const NO_PRESCRIPTIONS_MESSAGE: &str = "You have no prescriptions yet";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitKind {
    Added,
    Modified { id: u64 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct SubmitOutcome {
    pub kind: SubmitKind,
    pub receipt: TxReceipt,
    /// Reminder emails; only sent for new prescriptions
    pub emails: Option<DispatchReport>,
}

#[derive(Debug)]
pub struct DoctorDashboard {
    gateway: ContractGateway,
    account: Address,
    notifier: Notifier,
    email: String,
    prescriptions: Vec<Prescription>,
    patient_address: String,
    patient_prescriptions: Vec<Prescription>,
    form: PrescriptionForm,
    editing: Option<u64>,
    notice: Option<Notice>,
}

impl DoctorDashboard {
    pub fn new(gateway: ContractGateway, account: Address, notifier: Notifier) -> Self {
        Self {
            gateway,
            account,
            notifier,
            email: String::new(),
            prescriptions: Vec::new(),
            patient_address: String::new(),
            patient_prescriptions: Vec::new(),
            form: PrescriptionForm::new(),
            editing: None,
            notice: None,
        }
    }

    pub fn account(&self) -> &Address {
        &self.account
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Active prescriptions written by this doctor
    pub fn prescriptions(&self) -> &[Prescription] {
        &self.prescriptions
    }

    /// Result of the last patient search
    pub fn patient_prescriptions(&self) -> &[Prescription] {
        &self.patient_prescriptions
    }

    pub fn form(&self) -> &PrescriptionForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut PrescriptionForm {
        &mut self.form
    }

    pub fn patient_address(&self) -> &str {
        &self.patient_address
    }

    /// Target patient of the next submission, as typed
    pub fn set_patient_address(&mut self, address: &str) {
        self.patient_address = address.to_string();
    }

    pub fn editing(&self) -> Option<u64> {
        self.editing
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    fn fail<T>(&mut self, err: RxError) -> Result<T, RxError> {
        self.notice = Some(Notice::from(&err));
        Err(err)
    }

    pub async fn open(&mut self) -> Result<(), RxError> {
        match self.gateway.get_user_email(&self.account).await {
            Ok(email) => self.email = email,
            Err(e) => return self.fail(e),
        }
        self.load_own_prescriptions().await
    }

    /// Reload the doctor's listing, keeping active prescriptions only.
    ///
    /// The listing is cleared on failure.
    pub async fn load_own_prescriptions(&mut self) -> Result<(), RxError> {
        match self.gateway.get_doctor_prescriptions(&self.account).await {
            Ok(prescriptions) => {
                self.prescriptions = prescriptions.into_iter().filter(|p| p.is_active).collect();
                debug!(count = self.prescriptions.len(), "doctor prescriptions loaded");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "could not load doctor prescriptions");
                self.prescriptions.clear();
                self.notice = Some(match &e {
                    RxError::ContractRevert { .. } => Notice::error(NO_PRESCRIPTIONS_MESSAGE),
                    other => Notice::from(other),
                });
                Err(e)
            }
        }
    }

    /// Look up a registered patient's prescriptions.
    ///
    /// The address also becomes the target of the next submission.
    pub async fn search_patient(&mut self, address: &str) -> Result<&[Prescription], RxError> {
        let patient = match Address::parse(address) {
            Ok(patient) => patient,
            Err(e) => return self.fail(e.into()),
        };
        self.patient_address = patient.to_string();

        match self.gateway.is_user_registered(&patient).await {
            Ok(true) => {}
            Ok(false) => return self.fail(RxError::NotRegistered(patient.to_string())),
            Err(e) => return self.fail(e),
        }

        match self.gateway.get_patient_prescriptions(&patient).await {
            Ok(prescriptions) => {
                self.patient_prescriptions = prescriptions;
                Ok(&self.patient_prescriptions)
            }
            Err(e) => {
                self.patient_prescriptions.clear();
                self.fail(e)
            }
        }
    }

    /// Prefill the form from an existing prescription
    pub fn begin_edit(&mut self, prescription: &Prescription) {
        self.form = PrescriptionForm::from_prescription(prescription);
        self.editing = Some(prescription.id);
        if let Some(patient) = &prescription.patient_address {
            self.patient_address = patient.to_string();
        }
    }

    pub fn cancel_edit(&mut self) {
        self.form.reset();
        self.editing = None;
    }

    /// Add a new prescription, or modify the one being edited.
    ///
    /// Validation and the permission checks run first; nothing is written
    /// and the listing is untouched if any of them fails. After the write
    /// the listing is refreshed, then reminder emails go out for a new
    /// prescription. They never fail the submission.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, RxError> {
        let prepared = self.prepare_submission().await;
        let (patient, submission) = match prepared {
            Ok(prepared) => prepared,
            Err(e) => return self.fail(e),
        };

        let (kind, written) = match self.editing {
            Some(id) => (
                SubmitKind::Modified { id },
                self.gateway.modify_prescription(&self.account, id, &submission).await,
            ),
            None => (
                SubmitKind::Added,
                self.gateway.add_prescription(&self.account, &patient, &submission).await,
            ),
        };
        let receipt = match written {
            Ok(receipt) => receipt,
            Err(e) => return self.fail(e),
        };
        info!(
            kind = ?kind,
            patient = %patient,
            tx = %receipt.transaction_hash,
            "prescription written"
        );

        let duration_text = self.form.duration_text();
        self.form.reset();
        self.editing = None;
        if let Err(e) = self.load_own_prescriptions().await {
            warn!(error = %e, "refresh after write failed");
        }

        let emails = match kind {
            SubmitKind::Added => Some(self.send_reminders(&submission, duration_text).await),
            SubmitKind::Modified { .. } => None,
        };

        self.notice = Some(Notice::success(match kind {
            SubmitKind::Added => "Prescription added",
            SubmitKind::Modified { .. } => "Prescription updated",
        }));
        Ok(SubmitOutcome { kind, receipt, emails })
    }

    async fn prepare_submission(&self) -> Result<(Address, PrescriptionSubmission), RxError> {
        let patient = Address::parse(&self.patient_address)?;
        let submission = self.form.to_submission()?;

        if !self.gateway.is_doctor(&self.account).await? {
            return Err(RxError::NotDoctor);
        }
        if !self.gateway.is_user_registered(&patient).await? {
            return Err(RxError::NotRegistered(patient.to_string()));
        }
        Ok((patient, submission))
    }

    // Reminders go to the signed-in doctor's own address
    async fn send_reminders(
        &self,
        submission: &PrescriptionSubmission,
        duration_text: String,
    ) -> DispatchReport {
        self.notifier
            .send_prescription_reminders(&ReminderRequest {
                recipient_email: self.email.clone(),
                recipient: self.account.clone(),
                medicine: submission.medicine.clone(),
                dosage: submission.dosage.clone(),
                duration_text,
                duration_days: submission.duration_days,
                reminder_times: submission.reminder_times.clone(),
            })
            .await
    }

    /// Soft-delete one of the listed prescriptions, then reload
    pub async fn remove(&mut self, id: u64) -> Result<TxReceipt, RxError> {
        if !self.prescriptions.iter().any(|p| p.id == id) {
            return self.fail(RxError::PrescriptionNotFound(id));
        }

        let receipt = match self.gateway.remove_prescription(&self.account, id).await {
            Ok(receipt) => receipt,
            Err(e) => return self.fail(e),
        };
        info!(id, tx = %receipt.transaction_hash, "prescription removed");

        if self.editing == Some(id) {
            self.cancel_edit();
        }
        if let Err(e) = self.load_own_prescriptions().await {
            warn!(error = %e, "refresh after removal failed");
        }
        self.notice = Some(Notice::success("Prescription removed"));
        Ok(receipt)
    }
}

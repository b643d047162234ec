//! Prescription form state for the doctor dashboard.

use prescriptions_integrity::{
    format_dosage, largest_unit, split_dosage, to_days, validate_submission, DosageUnit,
    DurationUnit, Prescription, PrescriptionSubmission,
};
use rx_reminder_shared::{
    validate_positive_integer, validate_reminder_time, validate_required, RxError,
    ValidationFailure, ValidationResult,
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionForm {
    pub medicine: String,
    /// Quantity only; the unit is kept apart until submission
    pub dosage: String,
    pub dosage_unit: DosageUnit,
    pub frequency: String,
    /// Quantity of `duration_unit`, as typed
    pub duration: String,
    pub duration_unit: DurationUnit,
    pub reminder_times: Vec<String>,
}

impl PrescriptionForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefill for editing. The duration is shown in its largest whole unit,
    /// so 400 days reads back as 1 year.
    pub fn from_prescription(prescription: &Prescription) -> Self {
        let (quantity, duration_unit) = largest_unit(prescription.duration_days);
        let (dosage, dosage_unit) = split_dosage(&prescription.dosage);
        Self {
            medicine: prescription.medicine.clone(),
            dosage,
            dosage_unit,
            frequency: prescription.frequency.clone(),
            duration: quantity.to_string(),
            duration_unit,
            reminder_times: prescription.reminder_times.clone(),
        }
    }

    /// Append a reminder time. Only the `HH:mm` shape is checked.
    pub fn add_time(&mut self, time: &str) -> Result<(), ValidationFailure> {
        let time = time.trim();
        validate_reminder_time(time).into_result()?;
        self.reminder_times.push(time.to_string());
        Ok(())
    }

    /// Out-of-range indexes are ignored
    pub fn remove_time(&mut self, index: usize) {
        if index < self.reminder_times.len() {
            self.reminder_times.remove(index);
        }
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        result.merge(validate_required(&self.medicine, "medicine"));
        result.merge(validate_required(&self.dosage, "dosage"));
        result.merge(validate_required(&self.frequency, "frequency"));
        result.merge(validate_positive_integer(&self.duration, "duration"));
        result
    }

    /// Duration converted to days, when it parses
    pub fn duration_days(&self) -> Option<u64> {
        let quantity: u64 = self.duration.trim().parse().ok()?;
        Some(to_days(quantity, self.duration_unit))
    }

    /// The duration as typed, e.g. "2 week(s)"
    pub fn duration_text(&self) -> String {
        format!("{} {}", self.duration.trim(), self.duration_unit.label())
    }

    pub fn to_submission(&self) -> Result<PrescriptionSubmission, RxError> {
        self.validate().into_result()?;

        let submission = PrescriptionSubmission {
            medicine: self.medicine.trim().to_string(),
            dosage: format_dosage(&self.dosage, self.dosage_unit),
            frequency: self.frequency.trim().to_string(),
            duration_days: self.duration_days().unwrap_or(0),
            reminder_times: self.reminder_times.clone(),
        };
        validate_submission(&submission).into_result()?;
        Ok(submission)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

//! Prescription Integrity
//!
//! Defines the prescription record the client works with, its status and
//! the units used to display dosage and duration, together with the
//! client-side checks a prescription must pass before it is written.

use rx_reminder_shared::{
    validate_reminder_time, validate_required, Address, ValidationErrorCode, ValidationResult,
};
use serde::{Deserialize, Serialize};

pub mod duration;

pub use duration::*;

/// Prescription as read back from the contract
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Prescription {
    /// Assigned by the contract; reconciliation key for edit/delete
    pub id: u64,
    pub medicine: String,
    /// Quantity and unit, e.g. "5 mg"
    pub dosage: String,
    pub frequency: String,
    pub duration_days: u64,
    pub status: PrescriptionStatus,
    /// `HH:mm` strings in the order they were entered
    pub reminder_times: Vec<String>,
    pub patient_address: Option<Address>,
    pub doctor_address: Option<Address>,
    /// False once the prescribing doctor removed it
    pub is_active: bool,
}

impl Prescription {
    /// Human-readable duration, e.g. "2 weeks"
    pub fn formatted_duration(&self) -> String {
        format_duration(self.duration_days)
    }

    pub fn is_taken(&self) -> bool {
        self.status == PrescriptionStatus::Taken
    }
}

/// Whether the patient acknowledged the prescription.
///
/// Encoded as `0` / `1` on the wire. Readers also accept `"0"` / `"1"` and
/// booleans, since different call paths return different shapes.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum PrescriptionStatus {
    #[default]
    NotTaken,
    Taken,
}

impl PrescriptionStatus {
    pub fn as_wire(&self) -> u8 {
        match self {
            PrescriptionStatus::NotTaken => 0,
            PrescriptionStatus::Taken => 1,
        }
    }

    /// Anything other than 1 reads as `NotTaken`
    pub fn from_wire(value: u64) -> Self {
        if value == 1 {
            PrescriptionStatus::Taken
        } else {
            PrescriptionStatus::NotTaken
        }
    }

    /// Decode the status from whatever shape the call layer produced
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Number(n) => Self::from_wire(n.as_u64().unwrap_or(0)),
            serde_json::Value::String(s) => Self::from_wire(s.trim().parse().unwrap_or(0)),
            serde_json::Value::Bool(b) => Self::from_wire(u64::from(*b)),
            _ => PrescriptionStatus::NotTaken,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            PrescriptionStatus::NotTaken => PrescriptionStatus::Taken,
            PrescriptionStatus::Taken => PrescriptionStatus::NotTaken,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PrescriptionStatus::NotTaken => "Not taken",
            PrescriptionStatus::Taken => "Taken",
        }
    }
}

impl std::fmt::Display for PrescriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Units a dosage can be prescribed in
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum DosageUnit {
    #[default]
    Capsule,
    Tablet,
    Drop,
    Milligram,
    Millilitre,
    Spoon,
}

impl DosageUnit {
    pub const ALL: [DosageUnit; 6] = [
        DosageUnit::Capsule,
        DosageUnit::Tablet,
        DosageUnit::Drop,
        DosageUnit::Milligram,
        DosageUnit::Millilitre,
        DosageUnit::Spoon,
    ];

    /// Label stored inside the dosage string on chain
    pub fn label(&self) -> &'static str {
        match self {
            DosageUnit::Capsule => "gélule(s)",
            DosageUnit::Tablet => "comprimé(s)",
            DosageUnit::Drop => "goutte(s)",
            DosageUnit::Milligram => "mg",
            DosageUnit::Millilitre => "ml",
            DosageUnit::Spoon => "cuillère(s)",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.iter().copied().find(|unit| unit.label() == label)
    }
}

impl std::fmt::Display for DosageUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Join a dosage quantity and its unit the way it is stored on chain
pub fn format_dosage(quantity: &str, unit: DosageUnit) -> String {
    format!("{} {}", quantity.trim(), unit.label())
}

/// Split a stored dosage back into quantity and unit.
///
/// Unknown or missing units fall back to the default unit.
pub fn split_dosage(dosage: &str) -> (String, DosageUnit) {
    let dosage = dosage.trim();
    match dosage.split_once(' ') {
        Some((quantity, unit)) => (
            quantity.to_string(),
            DosageUnit::from_label(unit).unwrap_or_default(),
        ),
        None => (dosage.to_string(), DosageUnit::default()),
    }
}

/// Fields a doctor submits when creating or modifying a prescription
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PrescriptionSubmission {
    pub medicine: String,
    pub dosage: String,
    pub frequency: String,
    pub duration_days: u64,
    pub reminder_times: Vec<String>,
}

/// Check a submission before anything is sent
pub fn validate_submission(submission: &PrescriptionSubmission) -> ValidationResult {
    let mut result = ValidationResult::new();

    result.merge(validate_required(&submission.medicine, "medicine"));
    result.merge(validate_required(&submission.dosage, "dosage"));
    result.merge(validate_required(&submission.frequency, "frequency"));

    if submission.duration_days == 0 {
        result.add_error(
            "duration",
            "Duration must be at least one day",
            ValidationErrorCode::OutOfRange,
        );
    }

    for (i, time) in submission.reminder_times.iter().enumerate() {
        if !validate_reminder_time(time).is_valid() {
            result.add_error(
                &format!("reminder_times[{}]", i),
                &format!("'{}' is not in HH:mm format", time),
                ValidationErrorCode::InvalidFormat,
            );
        }
    }

    result
}

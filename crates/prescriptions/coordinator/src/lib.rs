//! Prescriptions Coordinator
//!
//! Role-specific prescription workflows on top of the contract gateway:
//! - Doctor: own listing, patient lookup, add/modify/remove with reminder emails
//! - Patient: own listing and optimistic status updates
//!
//! Each action runs its steps in order and stops at the first failure.
//! Failures end in a transient [`Notice`]; nothing propagates past the
//! action that caused it.

pub mod command;
pub mod doctor;
pub mod form;
pub mod notice;
pub mod patient;

pub use command::StatusUpdate;
pub use doctor::{DoctorDashboard, SubmitKind, SubmitOutcome, NO_PRESCRIPTIONS_MESSAGE};
pub use form::PrescriptionForm;
pub use notice::{Notice, NoticeLevel};
pub use patient::PatientDashboard;

//! Prescription Reminder Notifications
//!
//! Best-effort transactional email:
//! - Welcome email after registration
//! - One reminder per reminder time after a prescription is written
//!
//! A failed email never fails the write that triggered it.

use thiserror::Error;

pub mod notifier;
pub mod transport;

pub use notifier::{DispatchReport, Notifier, ReminderRequest};
pub use transport::{EmailJsTransport, EmailMessage, EmailTransport};

/// Why an email was not delivered. Logged, never surfaced to the user.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NotifyError {
    #[error("email is not configured")]
    Disabled,

    #[error("email request failed: {0}")]
    Http(String),

    #[error("email service rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },
}

//! Welcome and reminder dispatch.
//!
//! Every failure ends here: it is logged and counted in the
//! [`DispatchReport`], never returned to the action that triggered it.

use crate::transport::{EmailJsTransport, EmailMessage, EmailTransport};
use prescriptions_integrity::format_duration;
use rx_reminder_shared::{Address, EmailConfig};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of one best-effort dispatch
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub sent: usize,
    pub failed: usize,
    /// Why nothing was attempted, if so
    pub skipped: Option<String>,
}

impl DispatchReport {
    fn skipped(reason: impl Into<String>) -> Self {
        Self {
            skipped: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn attempted(&self) -> usize {
        self.sent + self.failed
    }

    pub fn all_sent(&self) -> bool {
        self.skipped.is_none() && self.failed == 0
    }
}

/// Everything a reminder email mentions
#[derive(Clone, Debug, PartialEq)]
pub struct ReminderRequest {
    pub recipient_email: String,
    pub recipient: Address,
    pub medicine: String,
    pub dosage: String,
    /// Duration as the doctor typed it, e.g. "2 week(s)"
    pub duration_text: String,
    pub duration_days: u64,
    pub reminder_times: Vec<String>,
}

/// Sends templated emails through an optional transport
#[derive(Clone)]
pub struct Notifier {
    transport: Option<Arc<dyn EmailTransport>>,
    welcome_template: String,
    reminder_template: String,
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("enabled", &self.is_enabled())
            .field("welcome_template", &self.welcome_template)
            .field("reminder_template", &self.reminder_template)
            .finish()
    }
}

impl Notifier {
    pub fn new(
        transport: Arc<dyn EmailTransport>,
        welcome_template: impl Into<String>,
        reminder_template: impl Into<String>,
    ) -> Self {
        Self {
            transport: Some(transport),
            welcome_template: welcome_template.into(),
            reminder_template: reminder_template.into(),
        }
    }

    /// A notifier that skips every dispatch
    pub fn disabled() -> Self {
        Self {
            transport: None,
            welcome_template: String::new(),
            reminder_template: String::new(),
        }
    }

    /// REST-backed notifier, or a disabled one when no account is configured
    pub fn from_config(config: &EmailConfig) -> Self {
        match EmailJsTransport::new(config) {
            Ok(transport) => Self::new(
                Arc::new(transport),
                config.welcome_template.clone(),
                config.reminder_template.clone(),
            ),
            Err(e) => {
                info!(reason = %e, "email notifications disabled");
                Self::disabled()
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    /// Greet a freshly registered account. Skipped unless the address looks like an email.
    pub async fn send_welcome(&self, email: &str, account: &Address) -> DispatchReport {
        let email = email.trim();
        if !email.contains('@') {
            warn!("welcome email skipped: invalid email address");
            return DispatchReport::skipped("invalid email address");
        }
        let message = EmailMessage::new(self.welcome_template.clone())
            .param("email", email)
            .param("name", account.as_str());
        self.dispatch(vec![message]).await
    }

    /// One reminder per reminder time
    pub async fn send_prescription_reminders(&self, request: &ReminderRequest) -> DispatchReport {
        if request.reminder_times.is_empty() {
            return DispatchReport::skipped("no reminder times");
        }
        if !request.recipient_email.contains('@') {
            warn!(
                recipient = %request.recipient,
                "reminder emails skipped: recipient has no email address"
            );
            return DispatchReport::skipped("recipient has no email address");
        }

        let formatted_duration = format_duration(request.duration_days);
        let messages = request
            .reminder_times
            .iter()
            .map(|time| {
                EmailMessage::new(self.reminder_template.clone())
                    .param("email", request.recipient_email.trim())
                    .param("user_name", request.recipient.as_str())
                    .param("medicine", request.medicine.as_str())
                    .param("dosage", request.dosage.as_str())
                    .param("duration", request.duration_text.as_str())
                    .param("formatted_duration", formatted_duration.as_str())
                    .param("time", time.as_str())
            })
            .collect();
        self.dispatch(messages).await
    }

    async fn dispatch(&self, messages: Vec<EmailMessage>) -> DispatchReport {
        let Some(transport) = &self.transport else {
            debug!(count = messages.len(), "email disabled, nothing sent");
            return DispatchReport::skipped("email disabled");
        };

        let mut report = DispatchReport::default();
        for message in &messages {
            match transport.send(message).await {
                Ok(()) => report.sent += 1,
                Err(e) => {
                    warn!(template = %message.template_id, error = %e, "email dispatch failed");
                    report.failed += 1;
                }
            }
        }
        debug!(sent = report.sent, failed = report.failed, "email dispatch finished");
        report
    }
}

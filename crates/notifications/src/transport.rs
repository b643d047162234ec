//! Email delivery seam and its REST implementation.

use crate::NotifyError;
use async_trait::async_trait;
use rx_reminder_shared::EmailConfig;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// One templated email
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EmailMessage {
    pub template_id: String,
    /// Values substituted into the template; the recipient is one of them
    pub params: BTreeMap<String, String>,
}

impl EmailMessage {
    pub fn new(template_id: impl Into<String>) -> Self {
        Self {
            template_id: template_id.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }
}

#[async_trait]
pub trait EmailTransport: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError>;
}

/// Request body of the email service's send endpoint
#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: &'a BTreeMap<String, String>,
}

/// Sends through the hosted email service's REST API
#[derive(Clone, Debug)]
pub struct EmailJsTransport {
    client: reqwest::Client,
    endpoint: String,
    service_id: String,
    public_key: String,
}

impl EmailJsTransport {
    pub fn new(config: &EmailConfig) -> Result<Self, NotifyError> {
        if !config.is_enabled() {
            return Err(NotifyError::Disabled);
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| NotifyError::Http(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            service_id: config.service_id.clone(),
            public_key: config.public_key.clone(),
        })
    }

    fn request_body<'a>(&'a self, message: &'a EmailMessage) -> SendRequest<'a> {
        SendRequest {
            service_id: &self.service_id,
            template_id: &message.template_id,
            user_id: &self.public_key,
            template_params: &message.params,
        }
    }
}

#[async_trait]
impl EmailTransport for EmailJsTransport {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&self.request_body(message))
            .send()
            .await
            .map_err(|e| NotifyError::Http(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(NotifyError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

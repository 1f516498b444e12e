//! Mail provider trait — the abstraction over the transactional email API.
//!
//! The contact-form pathway shares no logic with the chat pipeline; it
//! only needs a way to hand a validated contact request to an email
//! relay.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::MailError;

/// A normalized contact-form submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub phone: String,
    /// Optional sender email; used as reply-to when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub insurance_type: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<ContactAttachment>,
}

/// A single base64-encoded attachment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactAttachment {
    pub filename: String,
    pub content_type: String,
    /// Base64-encoded payload, passed through to the email relay as-is.
    pub data: String,
}

/// The outbound seam to the email relay.
#[async_trait]
pub trait MailProvider: Send + Sync {
    /// Whether all delivery settings (credential, addresses) are present.
    fn is_configured(&self) -> bool;

    /// Format and deliver one contact email.
    async fn send_contact(&self, request: &ContactRequest) -> Result<(), MailError>;
}

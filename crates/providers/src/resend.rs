//! Resend email provider for the contact-form pathway.
//!
//! Formats a validated contact request into a fixed plain-text email and
//! posts it to the Resend API. Attachments arrive base64-encoded from the
//! browser and are passed through as-is.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use sumarelay_core::error::MailError;
use sumarelay_core::mail::{ContactRequest, MailProvider};

const RESEND_URL: &str = "https://api.resend.com/emails";

const MISSING_SETTINGS: &str =
    "Falta configurar RESEND_API_KEY, CONTACT_TO_EMAIL o CONTACT_FROM_EMAIL.";

const DELIVERY_FALLBACK: &str = "No se pudo enviar el correo.";

const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Mail provider backed by the Resend transactional email API.
pub struct ResendMailer {
    api_key: Option<String>,
    to_email: Option<String>,
    from_email: Option<String>,
    client: reqwest::Client,
}

impl ResendMailer {
    pub fn new(
        api_key: Option<String>,
        to_email: Option<String>,
        from_email: Option<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_key,
            to_email,
            from_email,
            client,
        }
    }

    pub fn from_config(config: &sumarelay_config::AppConfig) -> Self {
        Self::new(
            config.contact.resend_api_key.clone(),
            config.contact.to_email.clone(),
            config.contact.from_email.clone(),
        )
    }
}

/// Fixed plain-text body for the contact email.
fn contact_text(request: &ContactRequest) -> String {
    let email = request.email.as_deref().unwrap_or("No compartido");
    [
        "Nuevo formulario de contacto directo".to_string(),
        String::new(),
        format!("Nombre: {}", request.name),
        format!("Telefono: {}", request.phone),
        format!("Correo: {email}"),
        format!("Tipo de seguro: {}", request.insurance_type),
        String::new(),
        "Detalle del caso:".to_string(),
        request.message.clone(),
    ]
    .join("\n")
}

fn contact_subject(request: &ContactRequest) -> String {
    format!("Nuevo contacto SUMA - {}", request.insurance_type)
}

#[async_trait]
impl MailProvider for ResendMailer {
    fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.to_email.is_some() && self.from_email.is_some()
    }

    async fn send_contact(&self, request: &ContactRequest) -> Result<(), MailError> {
        let (Some(api_key), Some(to), Some(from)) =
            (&self.api_key, &self.to_email, &self.from_email)
        else {
            return Err(MailError::NotConfigured(MISSING_SETTINGS.into()));
        };

        let payload = EmailPayload {
            from,
            to: vec![to.as_str()],
            subject: contact_subject(request),
            text: contact_text(request),
            attachments: request
                .attachments
                .iter()
                .map(|file| EmailAttachment {
                    filename: &file.filename,
                    content: &file.data,
                })
                .collect(),
            reply_to: request.email.as_deref(),
        };

        debug!(
            insurance_type = %request.insurance_type,
            attachments = request.attachments.len(),
            "Sending contact email"
        );

        let response = self
            .client
            .post(RESEND_URL)
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&payload)
            .send()
            .await
            .map_err(|e| MailError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let error_body: ResendErrorBody = response.json().await.unwrap_or_default();
            let message = error_body
                .message
                .or(error_body.error)
                .unwrap_or_else(|| DELIVERY_FALLBACK.into());
            warn!(status, message = %message, "Email relay returned error");
            return Err(MailError::Delivery(message));
        }

        Ok(())
    }
}

// --- Wire types ---

#[derive(Serialize)]
struct EmailPayload<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: String,
    text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<EmailAttachment<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

#[derive(Serialize)]
struct EmailAttachment<'a> {
    filename: &'a str,
    content: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct ResendErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

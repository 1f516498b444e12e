//! Contact-form endpoint — normalization, validation, and relay handoff.
//!
//! The browser posts the form as JSON with base64 attachments. This
//! module bounds and normalizes that input, then hands the validated
//! request to the configured mail provider. It shares no logic with the
//! chat pipeline.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{Json, Response};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use tracing::info;

use sumarelay_core::Error;
use sumarelay_core::mail::{ContactAttachment, ContactRequest};

use crate::{SharedState, domain_error_response, error_json, json_no_store, rejection_response};

/// Attachments beyond this count are silently dropped, as the widget does.
const MAX_ATTACHMENTS: usize = 3;
/// Decoded size limit per attachment.
const MAX_ATTACHMENT_BYTES: usize = 5 * 1024 * 1024;

const MISSING_FIELDS: &str = "Faltan campos obligatorios.";
const ATTACHMENT_TOO_LARGE: &str = "Uno de los archivos supera el limite permitido (5 MB).";
const ATTACHMENT_INVALID: &str = "Archivo adjunto invalido.";

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Raw contact-form submission as sent by the browser.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ContactBody {
    #[serde(default)]
    name: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    insurance_type: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    attachments: Vec<AttachmentBody>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttachmentBody {
    #[serde(default)]
    filename: String,
    #[serde(default)]
    content_type: String,
    #[serde(default)]
    data: String,
}

/// Trim, bound, and validate the raw body into a [`ContactRequest`].
fn normalize(body: ContactBody) -> Result<ContactRequest, &'static str> {
    let name = body.name.trim().to_string();
    let phone = body.phone.trim().to_string();
    let email = body.email.trim().to_string();
    let insurance_type = body.insurance_type.trim().to_string();
    let message = body.message.trim().to_string();

    if name.is_empty() || phone.is_empty() || insurance_type.is_empty() || message.is_empty() {
        return Err(MISSING_FIELDS);
    }

    let mut attachments = Vec::new();
    for item in body.attachments.into_iter().take(MAX_ATTACHMENTS) {
        let filename = item.filename.trim().to_string();
        let data = item.data.trim().to_string();
        if filename.is_empty() || data.is_empty() {
            continue;
        }

        let decoded = BASE64.decode(&data).map_err(|_| ATTACHMENT_INVALID)?;
        if decoded.len() > MAX_ATTACHMENT_BYTES {
            return Err(ATTACHMENT_TOO_LARGE);
        }

        let content_type = item.content_type.trim();
        attachments.push(ContactAttachment {
            filename,
            content_type: if content_type.is_empty() {
                DEFAULT_CONTENT_TYPE.to_string()
            } else {
                content_type.to_string()
            },
            data,
        });
    }

    Ok(ContactRequest {
        name,
        phone,
        email: (!email.is_empty()).then_some(email),
        insurance_type,
        message,
        attachments,
    })
}

#[derive(Serialize)]
struct ContactResponse {
    ok: bool,
}

pub(crate) async fn contact_handler(
    State(state): State<SharedState>,
    payload: Result<Json<ContactBody>, JsonRejection>,
) -> Response {
    let Json(body) = match payload {
        Ok(json) => json,
        Err(rejection) => return rejection_response(rejection),
    };

    let request = match normalize(body) {
        Ok(request) => request,
        Err(message) => return error_json(StatusCode::BAD_REQUEST, message),
    };

    match state.mailer.send_contact(&request).await {
        Ok(()) => {
            info!(insurance_type = %request.insurance_type, "Contact request relayed");
            json_no_store(StatusCode::OK, &ContactResponse { ok: true })
        }
        Err(e) => domain_error_response(Error::Mail(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body() -> ContactBody {
        ContactBody {
            name: "  Ana Perez  ".into(),
            phone: "7777-0000".into(),
            email: "".into(),
            insurance_type: "vehiculo".into(),
            message: "Necesito revisar mi poliza.".into(),
            attachments: vec![],
        }
    }

    #[test]
    fn normalization_trims_and_drops_empty_email() {
        let request = normalize(body()).unwrap();
        assert_eq!(request.name, "Ana Perez");
        assert_eq!(request.email, None);
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let mut missing = body();
        missing.phone = "   ".into();
        assert_eq!(normalize(missing).unwrap_err(), MISSING_FIELDS);
    }

    #[test]
    fn attachments_are_capped_and_filtered() {
        let mut with_files = body();
        with_files.attachments = (0..5)
            .map(|i| AttachmentBody {
                filename: format!("f{i}.pdf"),
                content_type: String::new(),
                data: "aGVsbG8=".into(),
            })
            .collect();
        with_files.attachments[1].filename = String::new();

        let request = normalize(with_files).unwrap();
        // 3 considered, one dropped for the empty filename
        assert_eq!(request.attachments.len(), 2);
        assert_eq!(request.attachments[0].content_type, DEFAULT_CONTENT_TYPE);
    }

    #[test]
    fn oversize_attachment_is_rejected() {
        let mut with_file = body();
        let big = BASE64.encode(vec![0u8; MAX_ATTACHMENT_BYTES + 1]);
        with_file.attachments = vec![AttachmentBody {
            filename: "grande.pdf".into(),
            content_type: "application/pdf".into(),
            data: big,
        }];
        assert_eq!(normalize(with_file).unwrap_err(), ATTACHMENT_TOO_LARGE);
    }

    #[test]
    fn invalid_base64_is_rejected() {
        let mut with_file = body();
        with_file.attachments = vec![AttachmentBody {
            filename: "raro.bin".into(),
            content_type: String::new(),
            data: "!!not-base64!!".into(),
        }];
        assert_eq!(normalize(with_file).unwrap_err(), ATTACHMENT_INVALID);
    }

    mod endpoint {
        use super::*;
        use crate::tests::StubMailer;
        use crate::{GatewayState, build_router};
        use axum::body::Body;
        use axum::http::{Request, header};
        use http_body_util::BodyExt;
        use std::path::Path;
        use std::sync::Arc;
        use sumarelay_core::error::{MailError, ProviderError};
        use sumarelay_core::{CompletionProvider, Turn};
        use tower::ServiceExt;

        struct NoProvider;

        #[async_trait::async_trait]
        impl CompletionProvider for NoProvider {
            fn model(&self) -> &str {
                "gpt-test"
            }

            fn is_configured(&self) -> bool {
                false
            }

            async fn complete(&self, _messages: &[Turn]) -> Result<String, ProviderError> {
                Err(ProviderError::NotConfigured("sin clave".into()))
            }
        }

        fn app_with_mailer(mailer: Arc<StubMailer>) -> axum::Router {
            let engine = sumarelay_chat::ChatEngine::new(
                sumarelay_chat::PromptAssembler::new(Arc::from("Dato.")),
                Arc::new(NoProvider),
            );
            build_router(
                Arc::new(GatewayState { engine, mailer }),
                Path::new("public"),
            )
        }

        fn post_contact(json: &str) -> Request<Body> {
            Request::builder()
                .method("POST")
                .uri("/api/contact")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap()
        }

        #[tokio::test]
        async fn valid_submission_relays_and_acks() {
            let mailer = Arc::new(StubMailer::ok());
            let app = app_with_mailer(mailer.clone());

            let response = app
                .oneshot(post_contact(
                    r#"{
                        "name": "Ana",
                        "phone": "7777-0000",
                        "email": "ana@example.com",
                        "insuranceType": "vehiculo",
                        "message": "Revisar poliza"
                    }"#,
                ))
                .await
                .unwrap();

            assert_eq!(response.status(), axum::http::StatusCode::OK);
            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(json["ok"], true);

            let sent = mailer.sent.lock().unwrap();
            assert_eq!(sent.len(), 1);
            assert_eq!(sent[0].insurance_type, "vehiculo");
        }

        #[tokio::test]
        async fn missing_fields_are_400() {
            let app = app_with_mailer(Arc::new(StubMailer::ok()));
            let response = app
                .oneshot(post_contact(r#"{"name": "Ana"}"#))
                .await
                .unwrap();
            assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
        }

        #[tokio::test]
        async fn relay_failure_surfaces_as_500() {
            let mailer = Arc::new(StubMailer {
                result: Err(MailError::Delivery("Invalid from address".into())),
                sent: std::sync::Mutex::new(Vec::new()),
            });
            let app = app_with_mailer(mailer);

            let response = app
                .oneshot(post_contact(
                    r#"{
                        "name": "Ana",
                        "phone": "7777-0000",
                        "insuranceType": "vida",
                        "message": "Consulta"
                    }"#,
                ))
                .await
                .unwrap();

            assert_eq!(
                response.status(),
                axum::http::StatusCode::INTERNAL_SERVER_ERROR
            );
            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(json["error"], "Invalid from address");
        }
    }
}

//! HTTP gateway for the SUMA chat relay.
//!
//! Exposes the chat endpoints consumed by the website widget, the
//! contact-form endpoint, and a health check; every other GET falls back
//! to static site files. JSON in, JSON out, `Cache-Control: no-store` on
//! all API responses, errors as `{ "error": message }` with no stack
//! traces.
//!
//! Built on Axum; request logging via tower-http's `TraceLayer`.

pub mod contact;

use std::path::Path;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::services::ServeDir;
use tracing::{error, info};

use sumarelay_chat::{ChatEngine, PromptAssembler};
use sumarelay_core::{ChatError, Error, MailProvider};
use sumarelay_providers::{OpenAiResponsesProvider, ResendMailer};

/// Matches what the contact form may upload (base64 inflates ~4/3).
const MAX_BODY_BYTES: usize = 12 * 1024 * 1024;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub engine: ChatEngine,
    pub mailer: Arc<dyn MailProvider>,
}

pub type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState, site_root: &Path) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/chat/session", post(create_session_handler))
        .route("/api/chat/message", post(message_handler))
        .route("/api/contact", post(contact::contact_handler))
        .fallback_service(ServeDir::new(site_root).append_index_html_on_directories(true))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server.
pub async fn start(config: sumarelay_config::AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let knowledge = sumarelay_chat::knowledge::load(&config.knowledge_path).await;
    let provider = Arc::new(OpenAiResponsesProvider::from_config(&config));
    let mailer = Arc::new(ResendMailer::from_config(&config));
    let engine = ChatEngine::new(PromptAssembler::new(knowledge), provider);

    let state = Arc::new(GatewayState { engine, mailer });
    let app = build_router(state, &config.gateway.site_root);

    info!(
        addr = %addr,
        model = %config.openai.model,
        has_api_key = config.has_api_key(),
        contact_relay = config.contact_relay_ready(),
        "Gateway starting"
    );
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Response plumbing ---

/// JSON response with the fixed no-store cache policy.
pub(crate) fn json_no_store<T: Serialize>(status: StatusCode, body: &T) -> Response {
    (
        status,
        [(header::CACHE_CONTROL, "no-store")],
        Json(body),
    )
        .into_response()
}

#[derive(Serialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

pub(crate) fn error_json(status: StatusCode, message: impl Into<String>) -> Response {
    json_no_store(
        status,
        &ErrorBody {
            error: message.into(),
        },
    )
}

/// Map domain errors to HTTP statuses. Inner messages surface verbatim;
/// the top-level wrapper prefixes are for logs, not clients.
pub(crate) fn domain_error_response(err: Error) -> Response {
    match err {
        Error::Chat(ChatError::MissingSession) => {
            error_json(StatusCode::BAD_REQUEST, ChatError::MissingSession.to_string())
        }
        Error::Provider(e) => {
            error!(error = %e, "Completion call failed");
            error_json(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
        Error::Mail(e) => {
            error!(error = %e, "Contact relay failed");
            error_json(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
        other => {
            error!(error = %other, "Request failed");
            error_json(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
        }
    }
}

// JsonRejection carries its own status, but clients of this API expect a
// uniform 400 + JSON error shape for any unparseable body.
pub(crate) fn rejection_response(_rejection: JsonRejection) -> Response {
    error_json(StatusCode::BAD_REQUEST, "JSON invalido.")
}

// --- Handlers ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    ok: bool,
    model: String,
    has_api_key: bool,
}

async fn health_handler(State(state): State<SharedState>) -> Response {
    let provider = state.engine.provider();
    json_no_store(
        StatusCode::OK,
        &HealthResponse {
            ok: true,
            model: provider.model().to_string(),
            has_api_key: provider.is_configured(),
        },
    )
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    session_id: String,
}

async fn create_session_handler(State(state): State<SharedState>) -> Response {
    let session_id = state.engine.create_session().await;
    json_no_store(StatusCode::OK, &SessionResponse { session_id })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageRequest {
    /// Absent id behaves like an empty one: rejected by the turn engine.
    #[serde(default)]
    session_id: String,
    #[serde(default)]
    message: String,
    #[serde(default = "default_intent")]
    intent: String,
}

fn default_intent() -> String {
    "general".into()
}

#[derive(Serialize)]
struct MessageResponse {
    reply: String,
    escalate: bool,
}

async fn message_handler(
    State(state): State<SharedState>,
    payload: Result<Json<MessageRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => return rejection_response(rejection),
    };

    match state
        .engine
        .handle_turn(&request.session_id, &request.message, &request.intent)
        .await
    {
        Ok(outcome) => json_no_store(
            StatusCode::OK,
            &MessageResponse {
                reply: outcome.reply,
                escalate: outcome.escalate,
            },
        ),
        Err(err) => domain_error_response(err),
    }
}

//! OpenAI Responses API provider.
//!
//! Serializes the assembled message list into the Responses request shape
//! (each message's text wrapped in a typed content part — `output_text`
//! for assistant turns, `input_text` otherwise) and extracts plain text
//! from either response shape the API produces: a flattened `output_text`
//! field or a nested list of output items.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use sumarelay_core::error::ProviderError;
use sumarelay_core::message::{Role, Turn};
use sumarelay_core::provider::{CompletionProvider, FALLBACK_REPLY};

/// Upstream error message used when the error body is unparseable.
const UNKNOWN_UPSTREAM_ERROR: &str = "Error desconocido al consultar OpenAI.";

/// Raised before any network I/O when no credential is configured.
const MISSING_KEY: &str = "OPENAI_API_KEY no configurada en el servidor.";

/// The completion API call is the only potentially slow step in a turn.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Completion provider backed by the OpenAI Responses endpoint.
pub struct OpenAiResponsesProvider {
    model: String,
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl OpenAiResponsesProvider {
    pub fn new(
        model: impl Into<String>,
        base_url: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            client,
        }
    }

    pub fn from_config(config: &sumarelay_config::AppConfig) -> Self {
        Self::new(
            config.openai.model.clone(),
            config.openai.base_url.clone(),
            config.openai.api_key.clone(),
        )
    }

    /// Convert our turns to the Responses API input format.
    fn to_api_input(messages: &[Turn]) -> Vec<ApiInputMessage> {
        messages
            .iter()
            .map(|m| {
                let is_assistant = m.role == Role::Assistant;
                ApiInputMessage {
                    role: match m.role {
                        Role::System => "system",
                        Role::User => "user",
                        Role::Assistant => "assistant",
                    },
                    content: vec![ApiContentPart {
                        r#type: if is_assistant {
                            "output_text"
                        } else {
                            "input_text"
                        },
                        text: m.content.clone(),
                    }],
                }
            })
            .collect()
    }
}

#[async_trait]
impl CompletionProvider for OpenAiResponsesProvider {
    fn model(&self) -> &str {
        &self.model
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(&self, messages: &[Turn]) -> Result<String, ProviderError> {
        let Some(api_key) = &self.api_key else {
            return Err(ProviderError::NotConfigured(MISSING_KEY.into()));
        };

        let url = format!("{}/responses", self.base_url);
        let body = ApiRequest {
            model: &self.model,
            input: Self::to_api_input(messages),
        };

        debug!(model = %self.model, messages = messages.len(), "Sending completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(e.to_string())
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let error_body: ApiErrorBody = response.json().await.unwrap_or_default();
            let message = error_body
                .error
                .and_then(|e| e.message)
                .unwrap_or_else(|| UNKNOWN_UPSTREAM_ERROR.into());
            warn!(status, message = %message, "Completion API returned error");
            return Err(ProviderError::Api {
                status_code: status,
                message,
            });
        }

        let api_response: ApiResponse =
            response.json().await.map_err(|e| ProviderError::Api {
                status_code: status,
                message: format!("Failed to parse response: {e}"),
            })?;

        Ok(extract_text(&api_response))
    }
}

/// Text extraction, in priority order: the flattened `output_text` field
/// (trimmed), else every textual fragment in the nested `output` list
/// joined with newlines, else the fixed fallback sentence. The fallback
/// is a degraded-but-successful result, never an error.
fn extract_text(response: &ApiResponse) -> String {
    if let Some(text) = &response.output_text
        && !text.trim().is_empty()
    {
        return text.trim().to_string();
    }

    let Some(output) = &response.output else {
        return FALLBACK_REPLY.into();
    };

    let mut parts: Vec<&str> = Vec::new();
    for item in output {
        let Some(content) = &item.content else {
            continue;
        };
        for part in content {
            if matches!(part.r#type.as_str(), "output_text" | "text")
                && let Some(text) = &part.text
                && !text.is_empty()
            {
                parts.push(text);
            }
        }
    }

    let joined = parts.join("\n");
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        FALLBACK_REPLY.into()
    } else {
        trimmed.to_string()
    }
}

// --- Wire types ---

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    input: Vec<ApiInputMessage>,
}

#[derive(Serialize)]
struct ApiInputMessage {
    role: &'static str,
    content: Vec<ApiContentPart>,
}

#[derive(Serialize)]
struct ApiContentPart {
    r#type: &'static str,
    text: String,
}

#[derive(Debug, Default, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    output_text: Option<String>,
    #[serde(default)]
    output: Option<Vec<OutputItem>>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Option<Vec<OutputContentPart>>,
}

#[derive(Debug, Deserialize)]
struct OutputContentPart {
    #[serde(default)]
    r#type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

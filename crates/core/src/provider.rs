//! Completion provider trait — the abstraction over the hosted LLM API.
//!
//! A provider knows how to send an ordered message list to a completion
//! API and hand back plain assistant text. The single production
//! implementation lives in `sumarelay-providers`; tests use stubs.

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::message::Turn;

/// Fixed sentence returned when the upstream response carries no usable
/// text. A degraded-but-successful result, not an error.
pub const FALLBACK_REPLY: &str = "No se pudo generar una respuesta en este momento.";

/// The outbound seam to the completion API.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// The model identifier requests are issued against.
    fn model(&self) -> &str;

    /// Whether a credential is available. Reported by the health endpoint.
    fn is_configured(&self) -> bool;

    /// Send the ordered message list and extract plain assistant text.
    ///
    /// Fails with [`ProviderError::NotConfigured`] before any network
    /// call when no credential is set, and with [`ProviderError::Api`]
    /// carrying the upstream message on a non-success status. An upstream
    /// response with no extractable text is **not** an error: it yields
    /// [`FALLBACK_REPLY`].
    async fn complete(&self, messages: &[Turn]) -> Result<String, ProviderError>;
}

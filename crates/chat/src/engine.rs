//! Turn engine — one request/response cycle per incoming chat message.
//!
//! Composes the session store, prompt assembler, completion provider, and
//! reply shaper. Steps run sequentially with no retries. The user turn
//! and the assistant turn are committed to history together, only after
//! the upstream call succeeds; a failed call leaves the session exactly
//! as it was.

use std::sync::Arc;

use tracing::{debug, info};

use sumarelay_core::{ChatError, CompletionProvider, Error, FALLBACK_REPLY, SessionId, Turn};

use crate::prompt::{PromptAssembler, intent_prompt};
use crate::shape;
use crate::store::{MAX_TURNS, SessionStore};

/// The result of one handled turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub reply: String,
    pub escalate: bool,
}

/// Orchestrates the conversational pipeline for all sessions.
pub struct ChatEngine {
    store: SessionStore,
    assembler: PromptAssembler,
    provider: Arc<dyn CompletionProvider>,
}

impl ChatEngine {
    pub fn new(assembler: PromptAssembler, provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            store: SessionStore::new(),
            assembler,
            provider,
        }
    }

    /// Generate a fresh session id and register its empty history.
    pub async fn create_session(&self) -> String {
        let id = SessionId::new().to_string();
        self.store.create(&id).await;
        debug!(session = %id, "Session created");
        id
    }

    /// The completion provider backing this engine (model name and key
    /// presence feed the health endpoint).
    pub fn provider(&self) -> &dyn CompletionProvider {
        self.provider.as_ref()
    }

    /// The session store backing this engine.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Handle one chat message for `session_id`.
    ///
    /// An empty `message` falls back to the canned opener for `intent`.
    /// Fails with [`ChatError::MissingSession`] on a blank session id
    /// before any store mutation or network call.
    pub async fn handle_turn(
        &self,
        session_id: &str,
        message: &str,
        intent: &str,
    ) -> Result<TurnOutcome, Error> {
        if session_id.trim().is_empty() {
            return Err(ChatError::MissingSession.into());
        }

        let message = message.trim();
        let user_message = if message.is_empty() {
            intent_prompt(intent)
        } else {
            message
        };
        let user_turn = Turn::user(user_message);

        // The prompt sees the history as it will be stored: pending user
        // turn included, cap applied.
        let mut pending = self.store.ensure(session_id).await;
        pending.push(user_turn.clone());
        if pending.len() > MAX_TURNS {
            let excess = pending.len() - MAX_TURNS;
            pending.drain(..excess);
        }

        let prompt = self.assembler.assemble(&pending);
        let raw = self.provider.complete(&prompt).await?;

        let shaped = shape::shape(&raw, user_message);
        let reply = if !shaped.text.is_empty() {
            shaped.text
        } else if !raw.trim().is_empty() {
            raw.trim().to_string()
        } else {
            FALLBACK_REPLY.to_string()
        };

        self.store
            .append_exchange(session_id, user_turn, Turn::assistant(reply.clone()))
            .await;

        if shaped.escalate {
            info!(session = %session_id, "Escalation marker detected");
        }
        debug!(
            session = %session_id,
            reply_chars = reply.chars().count(),
            escalate = shaped.escalate,
            "Turn completed"
        );

        Ok(TurnOutcome {
            reply,
            escalate: shaped.escalate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use sumarelay_core::ProviderError;

    /// Records every prompt it receives and replies with a fixed script.
    struct StubProvider {
        reply: Result<String, ProviderError>,
        prompts: Mutex<Vec<Vec<Turn>>>,
    }

    impl StubProvider {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing(err: ProviderError) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(err),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }

        fn last_prompt(&self) -> Vec<Turn> {
            self.prompts.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl CompletionProvider for StubProvider {
        fn model(&self) -> &str {
            "stub-model"
        }

        fn is_configured(&self) -> bool {
            true
        }

        async fn complete(&self, messages: &[Turn]) -> Result<String, ProviderError> {
            self.prompts.lock().unwrap().push(messages.to_vec());
            self.reply.clone()
        }
    }

    fn engine_with(provider: Arc<StubProvider>) -> ChatEngine {
        let assembler = PromptAssembler::new(Arc::from("Dato de prueba."));
        ChatEngine::new(assembler, provider)
    }

    #[tokio::test]
    async fn blank_session_id_fails_before_any_call() {
        let provider = StubProvider::replying("hola");
        let engine = engine_with(provider.clone());

        let err = engine.handle_turn("", "hola", "general").await.unwrap_err();
        assert!(matches!(err, Error::Chat(ChatError::MissingSession)));
        assert_eq!(provider.calls(), 0);
        assert!(!engine.store().contains("").await);

        let err = engine
            .handle_turn("   ", "hola", "general")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Chat(ChatError::MissingSession)));
    }

    #[tokio::test]
    async fn successful_turn_commits_both_turns() {
        let provider = StubProvider::replying("Con gusto te oriento.");
        let engine = engine_with(provider.clone());

        let session = engine.create_session().await;
        let outcome = engine
            .handle_turn(&session, "necesito un seguro", "general")
            .await
            .unwrap();

        assert_eq!(outcome.reply, "Con gusto te oriento.");
        assert!(!outcome.escalate);

        let history = engine.store().ensure(&session).await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "necesito un seguro");
        assert_eq!(history[1].content, "Con gusto te oriento.");
    }

    #[tokio::test]
    async fn empty_message_uses_intent_opener() {
        let provider = StubProvider::replying("Claro.");
        let engine = engine_with(provider.clone());
        let session = engine.create_session().await;

        engine.handle_turn(&session, "   ", "vehiculo").await.unwrap();

        let prompt = provider.last_prompt();
        let user = prompt.last().unwrap();
        assert_eq!(user.content, intent_prompt("vehiculo"));
    }

    #[tokio::test]
    async fn unknown_intent_falls_back_to_general() {
        let provider = StubProvider::replying("Claro.");
        let engine = engine_with(provider.clone());
        let session = engine.create_session().await;

        engine.handle_turn(&session, "", "marciano").await.unwrap();

        let prompt = provider.last_prompt();
        assert_eq!(prompt.last().unwrap().content, intent_prompt("general"));
    }

    #[tokio::test]
    async fn prompt_leads_with_system_turn() {
        let provider = StubProvider::replying("Claro.");
        let engine = engine_with(provider.clone());
        let session = engine.create_session().await;

        engine.handle_turn(&session, "hola", "general").await.unwrap();

        let prompt = provider.last_prompt();
        assert_eq!(prompt[0].role, sumarelay_core::Role::System);
        assert!(prompt[0].content.contains("Dato de prueba."));
        assert_eq!(prompt.len(), 2);
    }

    #[tokio::test]
    async fn provider_failure_leaves_history_untouched() {
        let provider = StubProvider::failing(ProviderError::Api {
            status_code: 500,
            message: "upstream down".into(),
        });
        let engine = engine_with(provider.clone());
        let session = engine.create_session().await;

        let err = engine
            .handle_turn(&session, "hola", "general")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Provider(ProviderError::Api { .. })));
        assert!(engine.store().is_empty(&session).await);
    }

    #[tokio::test]
    async fn escalation_is_propagated_and_stripped() {
        let provider =
            StubProvider::replying("[ESCALAR_A_SOFIA] Este caso requiere revisión legal.");
        let engine = engine_with(provider.clone());
        let session = engine.create_session().await;

        let outcome = engine.handle_turn(&session, "hola", "general").await.unwrap();
        assert!(outcome.escalate);
        assert_eq!(outcome.reply, "Este caso requiere revisión legal.");

        let history = engine.store().ensure(&session).await;
        assert_eq!(history[1].content, outcome.reply);
    }

    #[tokio::test]
    async fn empty_upstream_reply_degrades_to_fallback() {
        let provider = StubProvider::replying("");
        let engine = engine_with(provider.clone());
        let session = engine.create_session().await;

        let outcome = engine.handle_turn(&session, "hola", "general").await.unwrap();
        assert_eq!(outcome.reply, FALLBACK_REPLY);

        let history = engine.store().ensure(&session).await;
        assert_eq!(history[1].content, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn marker_only_reply_degrades_to_raw_then_fallback() {
        let provider = StubProvider::replying("[ESCALAR_A_SOFIA]");
        let engine = engine_with(provider.clone());
        let session = engine.create_session().await;

        let outcome = engine.handle_turn(&session, "hola", "general").await.unwrap();
        assert!(outcome.escalate);
        // Shaping stripped everything; the raw reply is the marker itself.
        assert_eq!(outcome.reply, "[ESCALAR_A_SOFIA]");
    }

    #[tokio::test]
    async fn long_conversation_respects_cap_in_prompt_and_store() {
        let provider = StubProvider::replying("Claro.");
        let engine = engine_with(provider.clone());
        let session = engine.create_session().await;

        for i in 0..10 {
            engine
                .handle_turn(&session, &format!("mensaje {i}"), "general")
                .await
                .unwrap();
        }

        let history = engine.store().ensure(&session).await;
        assert_eq!(history.len(), MAX_TURNS);

        // Prompt = system turn + capped history including the pending user turn.
        let prompt = provider.last_prompt();
        assert_eq!(prompt.len(), 1 + MAX_TURNS);
    }
}

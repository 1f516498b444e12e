//! Session store — process-wide bounded conversation histories.
//!
//! Maps an opaque session id to an ordered turn sequence. Histories are
//! memory-only: created on first reference, never persisted, and retained
//! until process exit (a known resource-growth limitation of this relay).
//!
//! The length cap is enforced on every append: oldest entries are dropped
//! first, preserving recency. Session-level mutation happens under one
//! write lock so a concurrent append cannot observe an untrimmed history.

use std::collections::HashMap;

use tokio::sync::RwLock;

use sumarelay_core::Turn;

/// Maximum number of role-tagged entries retained per session.
pub const MAX_TURNS: usize = 12;

/// Concurrency-safe keyed mapping from session id to turn history.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Vec<Turn>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an empty history for a freshly created session id.
    pub async fn create(&self, session_id: &str) {
        let mut sessions = self.sessions.write().await;
        sessions.entry(session_id.to_string()).or_default();
    }

    /// Snapshot of a session's history, creating an empty one if absent.
    /// Never fails.
    pub async fn ensure(&self, session_id: &str) -> Vec<Turn> {
        let mut sessions = self.sessions.write().await;
        sessions.entry(session_id.to_string()).or_default().clone()
    }

    /// Append one turn, then trim from the front until the cap holds.
    pub async fn append(&self, session_id: &str, turn: Turn) {
        let mut sessions = self.sessions.write().await;
        let history = sessions.entry(session_id.to_string()).or_default();
        history.push(turn);
        trim(history);
    }

    /// Commit a completed exchange — user turn and assistant turn — as one
    /// atomic unit. A turn whose upstream call failed is never committed,
    /// so no half-turns linger in history.
    pub async fn append_exchange(&self, session_id: &str, user: Turn, assistant: Turn) {
        let mut sessions = self.sessions.write().await;
        let history = sessions.entry(session_id.to_string()).or_default();
        history.push(user);
        history.push(assistant);
        trim(history);
    }

    /// Number of turns currently held for a session (0 if unknown).
    pub async fn len(&self, session_id: &str) -> usize {
        let sessions = self.sessions.read().await;
        sessions.get(session_id).map_or(0, Vec::len)
    }

    pub async fn is_empty(&self, session_id: &str) -> bool {
        self.len(session_id).await == 0
    }

    /// Whether a session id has ever been referenced.
    pub async fn contains(&self, session_id: &str) -> bool {
        let sessions = self.sessions.read().await;
        sessions.contains_key(session_id)
    }
}

fn trim(history: &mut Vec<Turn>) {
    if history.len() > MAX_TURNS {
        let excess = history.len() - MAX_TURNS;
        history.drain(..excess);
    }
}

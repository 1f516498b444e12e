//! # SUMA Relay Core
//!
//! Domain types, traits, and error definitions for the SUMA chat relay.
//! This crate has **zero framework dependencies** — it defines the domain
//! model that all other crates implement against.
//!
//! The two outbound seams — the completion API and the transactional
//! email API — are defined as traits here so the turn engine and the
//! gateway can be exercised with stub implementations in tests.

pub mod error;
pub mod mail;
pub mod message;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use error::{ChatError, Error, MailError, ProviderError, Result};
pub use mail::{ContactAttachment, ContactRequest, MailProvider};
pub use message::{Role, SessionId, Turn};
pub use provider::{CompletionProvider, FALLBACK_REPLY};

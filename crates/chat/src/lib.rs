//! Conversational turn pipeline for the SUMA chat relay.
//!
//! One request/response cycle per incoming chat message:
//! session history lookup → prompt assembly → completion call →
//! reply shaping → history commit. The modules mirror those steps:
//!
//! - [`store`]     — bounded per-session FIFO turn history
//! - [`knowledge`] — one-time load of the reference knowledge text
//! - [`prompt`]    — system prompt and intent openers
//! - [`shape`]     — escalation detection and brevity shaping
//! - [`engine`]    — the orchestrator composing the above

pub mod engine;
pub mod knowledge;
pub mod prompt;
pub mod shape;
pub mod store;

pub use engine::{ChatEngine, TurnOutcome};
pub use prompt::PromptAssembler;
pub use shape::{ESCALATION_MARKER, ShapedReply, shape};
pub use store::{MAX_TURNS, SessionStore};

//! Reply shaping — escalation detection and brevity heuristics.
//!
//! The model is instructed to prefix complex legal/contractual cases with
//! a literal sentinel tag; detecting it is a plain substring check, not
//! NLP. The brevity pass collapses whitespace and truncates long replies
//! into a bounded conversational snippet, unless the user explicitly
//! asked for detail.
//!
//! All limits are in characters, not bytes — replies are Spanish text.

/// Sentinel tag in raw model output signaling human follow-up is needed.
pub const ESCALATION_MARKER: &str = "[ESCALAR_A_SOFIA]";

/// Fixed follow-up appended to truncated replies.
const FOLLOW_UP: &str = "¿Te parece si avanzamos con el siguiente dato clave?";

/// Replies whose collapsed length fits here are returned untouched.
const MAX_COMPACT_CHARS: usize = 420;
/// Hard truncation point for longer replies.
const HARD_LIMIT_CHARS: usize = 300;
/// Only backtrack to a space boundary beyond this point.
const MIN_BOUNDARY_CHARS: usize = 180;

/// Substrings (lowercased) that mean "please elaborate" — they disable
/// truncation for that turn.
const DETAIL_TRIGGERS: &[&str] = &[
    "detalle",
    "detall",
    "explica",
    "paso a paso",
    "profund",
    "amplia",
    "completo",
];

/// The outcome of shaping one raw model reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapedReply {
    pub text: String,
    pub escalate: bool,
}

/// Detect and strip the escalation marker, then apply the brevity policy.
pub fn shape(raw: &str, user_message: &str) -> ShapedReply {
    let (stripped, escalate) = split_escalation(raw);
    let text = brief_reply(&stripped, user_message);
    ShapedReply { text, escalate }
}

/// Remove the first occurrence of the escalation marker, if any.
fn split_escalation(raw: &str) -> (String, bool) {
    match raw.find(ESCALATION_MARKER) {
        Some(idx) => {
            let mut text = String::with_capacity(raw.len() - ESCALATION_MARKER.len());
            text.push_str(&raw[..idx]);
            text.push_str(&raw[idx + ESCALATION_MARKER.len()..]);
            (text.trim().to_string(), true)
        }
        None => (raw.to_string(), false),
    }
}

fn wants_detail(user_message: &str) -> bool {
    let text = user_message.to_lowercase();
    DETAIL_TRIGGERS.iter().any(|t| text.contains(t))
}

/// Collapse internal whitespace runs and bound the reply length.
///
/// Replies at or under [`MAX_COMPACT_CHARS`] pass through collapsed but
/// otherwise unchanged, so shaping is idempotent on short replies.
pub fn brief_reply(reply: &str, user_message: &str) -> String {
    if reply.is_empty() || wants_detail(user_message) {
        return reply.to_string();
    }

    let compact = collapse_whitespace(reply);
    if compact.chars().count() <= MAX_COMPACT_CHARS {
        return compact;
    }

    let mut brief: String = compact.chars().take(HARD_LIMIT_CHARS).collect();
    if let Some(byte_idx) = brief.rfind(' ') {
        // Keep the hard cut when the last space sits too early.
        if brief[..byte_idx].chars().count() > MIN_BOUNDARY_CHARS {
            brief.truncate(byte_idx);
        }
    }
    let brief = brief.trim_end_matches([',', ':', ';', '-']).trim();
    format!("{brief}. {FOLLOW_UP}")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

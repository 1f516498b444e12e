//! Prompt assembly — system instructions, knowledge text, and intent openers.
//!
//! The assembler is a pure function of its inputs: a fixed instruction
//! block plus the cached knowledge text become one system turn, followed
//! by the session's turns in order.

use std::sync::Arc;

use sumarelay_core::{Role, Turn};

/// Fixed assistant instructions, concatenated in this order ahead of the
/// knowledge text. Wording changes here change the product's voice.
const INSTRUCTIONS: &[&str] = &[
    "Eres el asistente de SUMA para seguros en El Salvador.",
    "Responde siempre en espanol.",
    "Habla en tono conversacional, claro y cercano-profesional.",
    "Tu rol es orientativo, no emites dictamen legal vinculante.",
    "No inventes leyes, articulos, ni datos regulatorios.",
    "Si no hay suficiente certeza, dilo con claridad y sugiere escalamiento.",
    "No hagas promesas absolutas de cobertura.",
    "Cuando detectes caso complejo legal/contractual, inicia la respuesta con la etiqueta [ESCALAR_A_SOFIA].",
    "Da respuestas claras, practicas y accionables.",
    "Regla estricta: responde en maximo 80 palabras salvo que el usuario pida mas detalle.",
    "Usa 2 a 4 oraciones cortas, sin listas largas.",
    "Haz una sola pregunta de seguimiento por turno, no varias a la vez.",
    "Si necesitas mas datos para ayudar, pide solo el siguiente dato minimo mas importante.",
    "Explicaciones largas solo si el usuario escribe explicitamente: 'explicalo en detalle'.",
];

/// Generic opener used when the widget sends an empty message and an
/// unknown (or no) intent.
const GENERAL_PROMPT: &str = "Quiero orientacion general sobre seguros en El Salvador.";

/// Canned opener per widget intent. Unknown intents map to the generic entry.
pub fn intent_prompt(intent: &str) -> &'static str {
    match intent {
        "vehiculo" => "Quiero orientacion inicial para seguro de vehiculo en El Salvador.",
        "gmm" => "Quiero orientacion inicial sobre seguro de gastos medicos.",
        "vida" => "Quiero orientacion inicial sobre seguro de vida.",
        "hogar" => "Quiero orientacion inicial para seguro de hogar/residencial.",
        "empresas" => "Quiero orientacion inicial sobre seguros para mi empresa.",
        "revision" => "Quiero revisar mi poliza actual para detectar brechas o sobrecostos.",
        "escalar" => "Necesito escalamiento a revision personalizada con Sofia.",
        _ => GENERAL_PROMPT,
    }
}

/// Builds the ordered message list sent to the completion API.
#[derive(Clone)]
pub struct PromptAssembler {
    knowledge: Arc<str>,
}

impl PromptAssembler {
    /// `knowledge` is the process-lifetime reference text, loaded once at
    /// startup (see [`crate::knowledge::load`]).
    pub fn new(knowledge: Arc<str>) -> Self {
        Self { knowledge }
    }

    /// One system turn (instructions then knowledge, newline-joined, fixed
    /// order) followed by `history` in order.
    pub fn assemble(&self, history: &[Turn]) -> Vec<Turn> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(Turn::system(self.system_prompt()));
        messages.extend_from_slice(history);
        messages
    }

    fn system_prompt(&self) -> String {
        let mut lines: Vec<String> = INSTRUCTIONS.iter().map(|s| (*s).to_string()).collect();
        lines.push(format!("Base de conocimiento interna:\n{}", self.knowledge));
        lines.join("\n")
    }
}

//! Reference knowledge text — loaded once per process lifetime.
//!
//! A single immutable block of text shared by all sessions through the
//! prompt assembler. Absence of the file degrades to a fixed placeholder
//! rather than failing startup.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

/// Placeholder used when the knowledge file cannot be read.
pub const KNOWLEDGE_PLACEHOLDER: &str = "Base local no disponible.";

/// Read the knowledge text from `path`, falling back to the placeholder.
pub async fn load(path: &Path) -> Arc<str> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => {
            info!(path = %path.display(), bytes = text.len(), "Knowledge text loaded");
            Arc::from(text.as_str())
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Knowledge text unavailable, using placeholder");
            Arc::from(KNOWLEDGE_PLACEHOLDER)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn loads_file_contents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Poliza de vehiculo: cobertura basica.").unwrap();
        let text = load(file.path()).await;
        assert_eq!(&*text, "Poliza de vehiculo: cobertura basica.");
    }

    #[tokio::test]
    async fn missing_file_degrades_to_placeholder() {
        let text = load(Path::new("/nonexistent/knowledge.md")).await;
        assert_eq!(&*text, KNOWLEDGE_PLACEHOLDER);
    }
}

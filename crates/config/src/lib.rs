//! Configuration loading and validation for the SUMA chat relay.
//!
//! Loads configuration from an optional `sumarelay.toml` with environment
//! variable overrides for everything deployments normally set (`PORT`,
//! `OPENAI_API_KEY`, `OPENAI_MODEL`, `RESEND_API_KEY`, ...). Validates
//! all settings at startup.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Default config file name, resolved against the working directory.
pub const CONFIG_FILE: &str = "sumarelay.toml";

/// The root configuration structure.
#[derive(Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Completion API settings
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Contact-form email relay settings
    #[serde(default)]
    pub contact: ContactConfig,

    /// Path to the reference knowledge text. Absence of the file is
    /// non-fatal; the chat pipeline degrades to a placeholder.
    #[serde(default = "default_knowledge_path")]
    pub knowledge_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served for non-API GET requests.
    #[serde(default = "default_site_root")]
    pub site_root: PathBuf,
}

#[derive(Clone, Deserialize)]
pub struct OpenAiConfig {
    /// API key for the completion API. No key means the chat endpoints
    /// answer 500 until one is configured; the rest of the server works.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,
}

#[derive(Clone, Deserialize)]
pub struct ContactConfig {
    #[serde(default)]
    pub resend_api_key: Option<String>,

    #[serde(default)]
    pub to_email: Option<String>,

    #[serde(default)]
    pub from_email: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    4173
}
fn default_site_root() -> PathBuf {
    "public".into()
}
fn default_model() -> String {
    "gpt-4.1-mini".into()
}
fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_knowledge_path() -> PathBuf {
    PathBuf::from("data").join("knowledge-es-sv.md")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            openai: OpenAiConfig::default(),
            contact: ContactConfig::default(),
            knowledge_path: default_knowledge_path(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            site_root: default_site_root(),
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
        }
    }
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            resend_api_key: None,
            to_email: None,
            from_email: None,
        }
    }
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("gateway", &self.gateway)
            .field("openai", &self.openai)
            .field("contact", &self.contact)
            .field("knowledge_path", &self.knowledge_path)
            .finish()
    }
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl std::fmt::Debug for ContactConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContactConfig")
            .field("resend_api_key", &redact(&self.resend_api_key))
            .field("to_email", &self.to_email)
            .field("from_email", &self.from_email)
            .finish()
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl AppConfig {
    /// Load configuration: optional TOML file, then environment overrides.
    ///
    /// The file path comes from `SUMARELAY_CONFIG` or defaults to
    /// `./sumarelay.toml`; a missing file is fine (all settings have
    /// defaults), an unreadable or malformed one is an error.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("SUMARELAY_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(CONFIG_FILE));

        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            debug!(path = %path.display(), "No config file found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific TOML file, without env overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Deployment-style environment variables take precedence over the file.
    fn apply_env_overrides(&mut self) {
        if let Ok(port) = std::env::var("PORT")
            && let Ok(port) = port.parse()
        {
            self.gateway.port = port;
        }
        if let Ok(host) = std::env::var("HOST") {
            self.gateway.host = host;
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.openai.api_key = Some(key);
        }
        if let Ok(model) = std::env::var("OPENAI_MODEL") {
            self.openai.model = model;
        }
        if let Ok(key) = std::env::var("RESEND_API_KEY") {
            self.contact.resend_api_key = Some(key);
        }
        if let Ok(to) = std::env::var("CONTACT_TO_EMAIL") {
            self.contact.to_email = Some(to);
        }
        if let Ok(from) = std::env::var("CONTACT_FROM_EMAIL") {
            self.contact.from_email = Some(from);
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.openai.model.trim().is_empty() {
            return Err(ConfigError::Invalid("openai.model must not be empty".into()));
        }
        if self.openai.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "openai.base_url must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Whether a completion API key is available.
    pub fn has_api_key(&self) -> bool {
        self.openai
            .api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }

    /// Whether the contact relay has everything it needs to deliver mail.
    pub fn contact_relay_ready(&self) -> bool {
        self.contact.resend_api_key.is_some()
            && self.contact.to_email.is_some()
            && self.contact.from_email.is_some()
    }
}

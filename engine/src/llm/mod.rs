//! LLM Provider Abstraction Layer
//!
//! This module provides a common interface for the remote completion services
//! (Gemini, OpenAI, Ollama). The `LLMProvider` trait is the per-vendor contract;
//! the `ModelInvoker` trait is what the query pipeline depends on. `LLMRouter`
//! bridges the two with ordered failover.

use async_trait::async_trait;
use sdk::errors::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub mod gemini;
pub mod invoker;
pub mod ollama;
pub mod openai;
pub mod router;

pub use invoker::{AgentProfile, ModelInvoker, Task};

/// Result type for LLM operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors that can occur during LLM operations
#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Timeout")]
    Timeout,

    #[error("Parse error: {0}")]
    ParseError(String),

    /// One `"provider: error"` entry per failed attempt, in call order
    #[error("All LLM providers exhausted: {}", .0.join("; "))]
    Exhausted(Vec<String>),
}

impl From<LLMError> for EngineError {
    fn from(err: LLMError) -> Self {
        match err {
            LLMError::Exhausted(causes) => {
                EngineError::AllProvidersExhausted(crate::secrets::scrub(&causes.join("; ")))
            }
            LLMError::NetworkError(msg) => EngineError::Network(crate::secrets::scrub(&msg)),
            other => EngineError::LLMProvider(crate::secrets::scrub(&other.to_string())),
        }
    }
}

/// Message in a completion request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Create a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }
}

/// Role of a message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
            MessageRole::System => write!(f, "system"),
        }
    }
}

/// LLM Provider trait that all providers must implement
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Returns the name of the provider (e.g., "gemini", "openai", "ollama")
    fn name(&self) -> &str;

    /// Generate a completion for `messages` and return its text
    async fn generate(&self, messages: &[Message]) -> Result<String>;

    /// Check if the provider is currently usable (credentials present, etc.)
    async fn check_health(&self) -> bool {
        true
    }
}

/// Build the shared HTTP client used by every provider
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| LLMError::ProviderUnavailable(format!("Failed to create HTTP client: {}", e)))
}

/// Map a transport error from reqwest
pub(crate) fn transport_error(provider: &str, base_url: &str, e: reqwest::Error) -> LLMError {
    if e.is_timeout() {
        LLMError::Timeout
    } else if e.is_connect() {
        LLMError::ProviderUnavailable(format!(
            "Cannot connect to {} at {}",
            provider, base_url
        ))
    } else {
        LLMError::NetworkError(e.to_string())
    }
}

/// Map a non-success HTTP status to an error
pub(crate) fn status_error(provider: &str, status: reqwest::StatusCode, body: String) -> LLMError {
    match status.as_u16() {
        401 | 403 => LLMError::AuthenticationFailed(body),
        429 => LLMError::RateLimitExceeded,
        400 | 404 | 422 => LLMError::InvalidRequest(body),
        _ => LLMError::ProviderUnavailable(format!("{} API error ({}): {}", provider, status, body)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let user_msg = Message::user("Hello");
        assert_eq!(user_msg.role, MessageRole::User);
        assert_eq!(user_msg.content, "Hello");

        let system_msg = Message::system("You are a code analyst");
        assert_eq!(system_msg.role, MessageRole::System);
        assert_eq!(MessageRole::Assistant.to_string(), "assistant");
    }

    #[test]
    fn test_status_error_mapping() {
        let err = status_error("gemini", reqwest::StatusCode::UNAUTHORIZED, "bad key".into());
        assert!(matches!(err, LLMError::AuthenticationFailed(_)));

        let err = status_error("gemini", reqwest::StatusCode::TOO_MANY_REQUESTS, String::new());
        assert!(matches!(err, LLMError::RateLimitExceeded));

        let err = status_error("openai", reqwest::StatusCode::BAD_GATEWAY, "down".into());
        assert!(err.to_string().contains("openai API error"));
    }

    #[test]
    fn test_engine_error_conversion_scrubs_secrets() {
        let err: EngineError = LLMError::AuthenticationFailed(
            "key sk-1234567890abcdefghijklmnop rejected".into(),
        )
        .into();
        assert!(matches!(err, EngineError::LLMProvider(_)));
        assert!(!err.to_string().contains("sk-1234567890"));

        let err: EngineError = LLMError::Exhausted(vec![
            "gemini: Authentication failed: No Gemini API key found".into(),
            "openai: Network error: url?key=abc123".into(),
        ])
        .into();
        assert!(matches!(err, EngineError::AllProvidersExhausted(_)));
        let text = err.to_string();
        assert!(text.contains("No Gemini API key found"));
        assert!(text.contains("openai: Network error"));
        assert!(!text.contains("abc123"));
    }
}

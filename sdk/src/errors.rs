//! Error types and handling
//!
//! This module provides the error types shared by the engine and the request
//! boundary. All errors implement the `ErrorExt` trait which provides a
//! user-friendly hint, a stable category name and whether the error is
//! recoverable.
//!
//! # Security
//!
//! Error messages that leave the engine are scrubbed so that:
//! - No secrets (API keys, tokens) are included
//! - All messages are safe to display to end users

use thiserror::Error;

/// Trait for engine error extensions
///
/// This trait provides additional context for errors, including user-friendly
/// hints and recoverability information. All engine errors implement this trait.
pub trait ErrorExt {
    /// Returns a user-friendly hint for the error
    ///
    /// The hint is safe to display to end users and does not contain
    /// secrets or internal implementation details.
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors can be retried or worked around. Non-recoverable
    /// errors typically require a configuration change.
    fn is_recoverable(&self) -> bool;

    /// Returns a stable, machine-readable category for the error
    fn kind(&self) -> &'static str;
}

/// Main engine error type
///
/// # Error Categories
///
/// - **Configuration**: Invalid or missing configuration
/// - **Provisioning**: `git clone` / `git pull` failures
/// - **LLM Provider**: API failures, authentication errors
/// - **Pipeline**: a query stage could not complete
/// - **Request**: malformed input at the request boundary
///
/// # Examples
///
/// ```
/// use sdk::errors::{EngineError, ErrorExt};
///
/// let error = EngineError::NoRepository;
/// println!("Hint: {}", error.user_hint());
/// assert!(error.is_recoverable());
/// assert_eq!(error.kind(), "no_repository");
///
/// let fatal_error = EngineError::AllProvidersExhausted("gemini: Timeout".into());
/// assert!(!fatal_error.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Path canonicalization failed for {0:?}: {1}")]
    PathCanonicalization(std::path::PathBuf, String),

    // Repository errors
    #[error("{0}")]
    Provisioning(String),

    #[error("No repository loaded. Submit a repository URL first")]
    NoRepository,

    #[error("Repository path is not a directory: {0:?}")]
    NotADirectory(std::path::PathBuf),

    // LLM provider errors
    #[error("LLM provider error: {0}")]
    LLMProvider(String),

    #[error("All LLM providers exhausted: {0}")]
    AllProvidersExhausted(String),

    // Pipeline errors
    #[error("Query processing failed: {0}")]
    Pipeline(String),

    // Request boundary errors
    #[error("{0}")]
    InvalidRequest(String),

    // Keyring errors
    #[error("Keyring error: {0}")]
    KeyringError(String),

    // Network errors
    #[error("Network error: {0}")]
    Network(String),

    // Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ErrorExt for EngineError {
    fn user_hint(&self) -> &str {
        match self {
            Self::Config(_) => "Check your config.toml file for errors",
            Self::PathCanonicalization(_, _) => "Invalid path specified",

            Self::Provisioning(_) => "Check the repository URL and that git is installed",
            Self::NoRepository => "Load a repository before asking questions",
            Self::NotADirectory(_) => "Point at a checked-out repository directory",

            Self::LLMProvider(_) => "LLM provider unavailable. Check your API keys and network",
            Self::AllProvidersExhausted(_) => "No LLM providers available. Check configuration",

            Self::Pipeline(_) => "The question could not be answered. Try again",

            Self::InvalidRequest(_) => "The request is missing a required field",

            Self::KeyringError(_) => "Failed to access secure storage. Check system keychain",

            Self::Network(_) => "Network operation failed. Check your connection",

            Self::Io(_) => "File system operation failed",
        }
    }

    fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::Config(_) | Self::AllProvidersExhausted(_) | Self::KeyringError(_)
        )
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) | Self::PathCanonicalization(_, _) => "config",
            Self::Provisioning(_) | Self::NotADirectory(_) => "provisioning",
            Self::NoRepository => "no_repository",
            Self::LLMProvider(_) | Self::AllProvidersExhausted(_) => "llm",
            Self::Pipeline(_) => "pipeline",
            Self::InvalidRequest(_) => "invalid_request",
            Self::KeyringError(_) => "keyring",
            Self::Network(_) => "network",
            Self::Io(_) => "io",
        }
    }
}

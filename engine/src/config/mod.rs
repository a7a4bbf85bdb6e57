//! Configuration management
//!
//! This module handles loading, validation, and management of the Raggit configuration.
//! Configuration is stored in TOML format at ~/.raggit/config.toml.
//!
//! # Configuration Sections
//!
//! - **core**: Log level, clone directory
//! - **llm**: Provider settings, temperature, request timeout
//! - **pipeline**: Query pipeline limits (batch size, fallback count, chunking)
//! - **scan**: Excluded directory names and code file extensions
//! - **server**: HTTP bind address
//!
//! # Path Expansion
//!
//! `core.clone_dir` supports a leading `~`, which is expanded to the user's
//! home directory. When unset, clones go to the platform cache directory
//! (`~/.cache/raggit` on Linux, `%LOCALAPPDATA%\raggit` on Windows).
//!
//! # Examples
//!
//! ```no_run
//! use raggit_engine::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_or_create()?;
//!
//! println!("Default provider: {}", config.llm.default_provider);
//! println!("Batch size: {}", config.pipeline.selector_batch_size);
//! # Ok(())
//! # }
//! ```

use sdk::errors::EngineError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Providers the router knows how to build
pub const VALID_PROVIDERS: [&str; 3] = ["gemini", "openai", "ollama"];

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Core engine settings
    #[serde(default)]
    pub core: CoreConfig,

    /// LLM provider configuration
    #[serde(default)]
    pub llm: LLMConfig,

    /// Query pipeline limits
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Repository scanning rules
    #[serde(default)]
    pub scan: ScanConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Core engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Parent directory for cloned repositories (supports ~ expansion)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clone_dir: Option<PathBuf>,
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    /// Default LLM provider (gemini, openai, ollama)
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Sampling temperature sent to providers that accept one
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// HTTP request timeout for a single completion call
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Try the remaining providers when the default one fails
    #[serde(default = "default_true")]
    pub failover: bool,

    /// Gemini provider settings
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// OpenAI provider settings
    #[serde(default)]
    pub openai: OpenAIConfig,

    /// Ollama provider settings
    #[serde(default)]
    pub ollama: OllamaConfig,
}

/// Gemini provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Base URL for Gemini API
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_gemini_model")]
    pub model: String,
    // Note: API key read from GEMINI_API_KEY / GOOGLE_API_KEY or the OS keychain
}

/// OpenAI provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIConfig {
    /// Base URL for OpenAI API
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_openai_model")]
    pub model: String,
    // Note: API key read from OPENAI_API_KEY or the OS keychain
}

/// Ollama provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Base URL for Ollama API
    #[serde(default = "default_ollama_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_ollama_model")]
    pub model: String,
}

/// Query pipeline limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Number of conversation turns kept in memory
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// File summaries shown to the selector per request
    #[serde(default = "default_selector_batch_size")]
    pub selector_batch_size: usize,

    /// Files analyzed when the selector picks nothing
    #[serde(default = "default_fallback_file_count")]
    pub fallback_file_count: usize,

    /// Files longer than this (in characters) are sampled instead of sent whole
    #[serde(default = "default_large_file_threshold")]
    pub large_file_threshold: usize,

    /// Splitter chunk size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Splitter chunk overlap in characters
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Lines included in a file preview
    #[serde(default = "default_preview_lines")]
    pub preview_lines: usize,

    /// Characters kept from a file preview
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
}

/// Repository scanning rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Directory names pruned during the scan
    #[serde(default = "default_excluded_dirs")]
    pub excluded_dirs: BTreeSet<String>,

    /// File extensions (with leading dot) that count as code
    #[serde(default = "default_extensions")]
    pub extensions: BTreeSet<String>,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind host
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_provider() -> String {
    "gemini".to_string()
}

fn default_temperature() -> f64 {
    0.2
}

fn default_request_timeout() -> u64 {
    300
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_ollama_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3.1:8b".to_string()
}

fn default_history_capacity() -> usize {
    10
}

fn default_selector_batch_size() -> usize {
    20
}

fn default_fallback_file_count() -> usize {
    5
}

fn default_large_file_threshold() -> usize {
    60_000
}

fn default_chunk_size() -> usize {
    4000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_preview_lines() -> usize {
    10
}

fn default_preview_chars() -> usize {
    1000
}

fn default_excluded_dirs() -> BTreeSet<String> {
    [
        ".git",
        "__pycache__",
        "node_modules",
        "venv",
        "env",
        ".venv",
        "dist",
        "build",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_extensions() -> BTreeSet<String> {
    [
        ".py", ".js", ".ts", ".jsx", ".tsx", ".java", ".c", ".cpp", ".h", ".cs", ".go", ".rs",
        ".php", ".rb", ".swift", ".kt", ".scala", ".sh", ".md", ".json", ".yaml", ".yml",
        ".html", ".css", ".scss", ".sql", ".graphql", ".proto",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            clone_dir: None,
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            temperature: default_temperature(),
            request_timeout_secs: default_request_timeout(),
            failover: true,
            gemini: GeminiConfig::default(),
            openai: OpenAIConfig::default(),
            ollama: OllamaConfig::default(),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: default_gemini_base_url(),
            model: default_gemini_model(),
        }
    }
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            base_url: default_openai_base_url(),
            model: default_openai_model(),
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_base_url(),
            model: default_ollama_model(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            selector_batch_size: default_selector_batch_size(),
            fallback_file_count: default_fallback_file_count(),
            large_file_threshold: default_large_file_threshold(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            preview_lines: default_preview_lines(),
            preview_chars: default_preview_chars(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            excluded_dirs: default_excluded_dirs(),
            extensions: default_extensions(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// `host:port` string for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Config {
    /// Load configuration from the default location (~/.raggit/config.toml)
    ///
    /// If the configuration file doesn't exist, creates a default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_or_create() -> Result<Self, EngineError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, EngineError> {
        let mut config: Config = toml::from_str(contents)
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate_and_process()?;

        Ok(config)
    }

    /// Create default configuration and save to path
    fn create_default(path: &Path) -> Result<Self, EngineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EngineError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let mut config = Self::default();
        config.validate_and_process()?;

        let toml_string = toml::to_string_pretty(&config)
            .map_err(|e| EngineError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| EngineError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(config)
    }

    /// Get the default configuration file path (~/.raggit/config.toml)
    pub fn default_config_path() -> Result<PathBuf, EngineError> {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(".raggit").join("config.toml"))
    }

    /// Parent directory for clones: `core.clone_dir` or the platform cache dir
    pub fn clone_dir(&self) -> Result<PathBuf, EngineError> {
        match &self.core.clone_dir {
            Some(dir) => expand_path(dir),
            None => dirs::cache_dir()
                .map(|cache| cache.join("raggit"))
                .ok_or_else(|| {
                    EngineError::Config("Could not determine cache directory".to_string())
                }),
        }
    }

    /// Validate and process configuration
    fn validate_and_process(&mut self) -> Result<(), EngineError> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.core.log_level.as_str()) {
            return Err(EngineError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.core.log_level,
                valid_log_levels.join(", ")
            )));
        }

        if !VALID_PROVIDERS.contains(&self.llm.default_provider.as_str()) {
            return Err(EngineError::Config(format!(
                "Invalid default provider '{}'. Must be one of: {}",
                self.llm.default_provider,
                VALID_PROVIDERS.join(", ")
            )));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(EngineError::Config(
                "temperature must be between 0.0 and 2.0".to_string(),
            ));
        }

        let pipeline = &self.pipeline;
        if pipeline.history_capacity == 0 {
            return Err(EngineError::Config(
                "history_capacity must be at least 1".to_string(),
            ));
        }
        if pipeline.selector_batch_size == 0 {
            return Err(EngineError::Config(
                "selector_batch_size must be at least 1".to_string(),
            ));
        }
        if pipeline.chunk_size == 0 || pipeline.chunk_overlap >= pipeline.chunk_size {
            return Err(EngineError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                pipeline.chunk_overlap, pipeline.chunk_size
            )));
        }

        if let Some(dir) = &self.core.clone_dir {
            self.core.clone_dir = Some(expand_path(dir)?);
        }

        Ok(())
    }
}

/// Expand ~ in path to user's home directory
fn expand_path(path: &Path) -> Result<PathBuf, EngineError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| EngineError::Config("Invalid UTF-8 in path".to_string()))?;

    if let Some(rest) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(rest))
    } else if path_str == "~" {
        dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))
    } else {
        Ok(path.to_path_buf())
    }
}

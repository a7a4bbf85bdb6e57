//! Raggit Engine Library
//!
//! This library provides the core functionality of raggit: repository
//! provisioning, file scanning, the LLM query pipeline and the service
//! handed to the HTTP server. It is used by both the main binary and
//! integration tests.

/// Configuration management module
pub mod config;

/// Secret management module
pub mod secrets;

/// LLM provider abstraction layer
pub mod llm;

/// Repository file store: scan, read cache, summaries, chunking
pub mod store;

/// Query pipeline orchestration module
pub mod conductor;

/// Git clone / pull
pub mod provision;

/// `RepoAssistant` implementation for the HTTP server
pub mod service;

/// Telemetry and Observability
pub mod telemetry;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;

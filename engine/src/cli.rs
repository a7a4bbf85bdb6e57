//! CLI interface for Raggit
//!
//! Command-line interface using clap's derive API: run the HTTP server, ask a
//! one-shot question, fetch a repository, or inspect configuration.

use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

/// Raggit
///
/// Ask natural-language questions about a git repository. Answers are produced
/// by a remote LLM reading the files it judges relevant.
#[derive(Parser, Debug)]
#[command(name = "raggit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Bind host (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides server.port)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Ask one question about a repository
    #[command(group(ArgGroup::new("source").required(true).args(["repo", "path"])))]
    Ask {
        /// The question
        question: String,

        /// Remote repository URL to clone or update
        #[arg(long, value_name = "URL")]
        repo: Option<String>,

        /// Existing local checkout
        #[arg(long, value_name = "DIR")]
        path: Option<PathBuf>,

        /// Parent directory for the clone (defaults to the cache directory)
        #[arg(long, value_name = "DIR", requires = "repo", conflicts_with = "path")]
        target: Option<PathBuf>,
    },

    /// Clone or update a repository without asking anything
    Fetch {
        /// Remote repository URL
        url: String,

        /// Parent directory for the clone (defaults to the cache directory)
        #[arg(long, value_name = "DIR")]
        target: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Store or remove provider API keys in the OS keychain
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
}

/// Configuration actions
#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Print the configuration file path
    Path,
}

/// Keychain actions
#[derive(Subcommand, Debug, Clone)]
pub enum KeyAction {
    /// Read a key from stdin and store it
    Set {
        /// Provider the key belongs to
        #[arg(value_parser = ["gemini", "openai"])]
        provider: String,
    },

    /// Remove a stored key
    Delete {
        #[arg(value_parser = ["gemini", "openai"])]
        provider: String,
    },
}

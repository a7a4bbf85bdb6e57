//! Conductor System
//!
//! The query pipeline: history check, file selection, file analysis and
//! aggregation, sequenced by `RepoSession`.

pub mod agents;
pub mod aggregator;
pub mod analyzer;
pub mod history;
pub mod memory;
pub mod parse;
pub mod selector;
pub mod session;
pub mod types;

pub use memory::{ConversationMemory, Turn};
pub use session::RepoSession;
pub use types::{ContextTrace, FileAnalysis, QueryOutcome, Stage};

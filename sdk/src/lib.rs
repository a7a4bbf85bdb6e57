//! Raggit SDK
//!
//! Shared library providing the error type, wire types and the assistant
//! trait used by both the engine and the HTTP server.

/// Repository assistant trait
pub mod assistant;

/// Error types and handling
pub mod errors;

/// Request/response types
pub mod types;

// Re-export commonly used types
pub use assistant::RepoAssistant;
pub use errors::{EngineError, ErrorExt};
pub use types::{
    ErrorBody, MessageBody, QueryBody, QueryReply, QueryRequest, SaveNoteRequest,
    SetupRepoRequest, Status,
};

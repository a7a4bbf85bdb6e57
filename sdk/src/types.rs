//! Request/response types for the HTTP boundary

use crate::errors::{EngineError, ErrorExt};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Body of `POST /setup_repo`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SetupRepoRequest {
    #[serde(default)]
    pub repo_url: Option<String>,

    /// Parent directory for the clone; the platform cache dir when absent
    #[serde(default)]
    pub target_directory: Option<PathBuf>,
}

/// Body of `POST /query`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: Option<String>,
}

/// Body of `POST /save_note`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaveNoteRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Answer produced for one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryReply {
    /// Final synthesized answer
    pub answer: String,

    /// Diagnostic trace (selected files, per-file analyses); free text
    pub context: String,
}

/// Outcome status in every response envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Error envelope: `{status: "error", message, kind, hint}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub status: Status,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorBody {
    /// Envelope with a bare message and no category
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: message.into(),
            kind: None,
            hint: None,
        }
    }
}

impl From<&EngineError> for ErrorBody {
    fn from(err: &EngineError) -> Self {
        Self {
            status: Status::Error,
            message: err.to_string(),
            kind: Some(err.kind().to_string()),
            hint: Some(err.user_hint().to_string()),
        }
    }
}

/// Success envelope carrying a message: `{status: "success", message}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageBody {
    pub status: Status,
    pub message: String,
}

impl MessageBody {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: Status::Success,
            message: message.into(),
        }
    }
}

/// Success envelope for `POST /query`: `{status: "success", response, context}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryBody {
    pub status: Status,
    pub response: String,
    pub context: String,
}

impl From<QueryReply> for QueryBody {
    fn from(reply: QueryReply) -> Self {
        Self {
            status: Status::Success,
            response: reply.answer,
            context: reply.context,
        }
    }
}

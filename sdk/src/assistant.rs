//! Repository assistant trait
//!
//! `RepoAssistant` is the sole API surface the request boundary uses to reach
//! the engine. The engine implements it; the HTTP server only ever holds an
//! `Arc<dyn RepoAssistant>`.

use crate::errors::EngineError;
use crate::types::QueryReply;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Trait for the engine-side query service
#[async_trait]
pub trait RepoAssistant: Send + Sync {
    /// Clone (or refresh) `repo_url` under `target_directory` and make it the
    /// active repository. Replaces any previous repository and its memory.
    ///
    /// Returns the local path of the working tree.
    async fn load_repository(
        &self,
        repo_url: &str,
        target_directory: Option<&Path>,
    ) -> Result<PathBuf, EngineError>;

    /// Answer a question about the active repository
    async fn ask(&self, query: &str) -> Result<QueryReply, EngineError>;

    /// Root of the active repository, if any
    async fn current_repository(&self) -> Option<PathBuf>;
}

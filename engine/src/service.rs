//! `RepoAssistant` implementation handed to the HTTP server
//!
//! Holds at most one active `RepoSession` behind an async mutex, so queries run
//! one at a time and a repository swap waits for the query in flight.

use crate::conductor::RepoSession;
use crate::config::Config;
use crate::llm::ModelInvoker;
use crate::provision;
use async_trait::async_trait;
use sdk::errors::EngineError;
use sdk::types::QueryReply;
use sdk::RepoAssistant;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct AssistantService {
    config: Arc<Config>,
    invoker: Arc<dyn ModelInvoker>,
    session: Mutex<Option<RepoSession>>,
}

impl AssistantService {
    pub fn new(config: Arc<Config>, invoker: Arc<dyn ModelInvoker>) -> Self {
        Self {
            config,
            invoker,
            session: Mutex::new(None),
        }
    }

    /// Replace the active session with a fresh one rooted at `root`
    pub async fn open(&self, root: PathBuf) {
        let session = RepoSession::new(
            root,
            self.config.scan.clone(),
            self.config.pipeline.clone(),
            Arc::clone(&self.invoker),
        );
        *self.session.lock().await = Some(session);
    }
}

#[async_trait]
impl RepoAssistant for AssistantService {
    async fn load_repository(
        &self,
        repo_url: &str,
        target_directory: Option<&Path>,
    ) -> Result<PathBuf, EngineError> {
        let parent = match target_directory {
            Some(dir) => dir.to_path_buf(),
            None => self.config.clone_dir()?,
        };

        let root = provision::provision(repo_url, &parent).await?;
        self.open(root.clone()).await;
        Ok(root)
    }

    async fn ask(&self, query: &str) -> Result<QueryReply, EngineError> {
        let mut guard = self.session.lock().await;
        let session = guard.as_mut().ok_or(EngineError::NoRepository)?;

        let outcome = session.answer_query(query).await.map_err(|e| {
            tracing::error!("Query failed: {}", e);
            e
        })?;
        Ok(outcome.into())
    }

    async fn current_repository(&self) -> Option<PathBuf> {
        self.session
            .lock()
            .await
            .as_ref()
            .map(|s| s.root().to_path_buf())
    }
}

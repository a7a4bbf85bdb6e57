//! Repository session
//!
//! One session per repository root. It owns the file content cache and the
//! conversation memory; both die with it.

use super::aggregator::{aggregate, aggregate_from_history};
use super::analyzer::analyze_files;
use super::history::check_history;
use super::memory::ConversationMemory;
use super::selector::{select_files, SelectorLimits};
use super::types::{ContextTrace, QueryOutcome, Stage};
use crate::config::{PipelineConfig, ScanConfig};
use crate::llm::ModelInvoker;
use crate::store::{FileStore, PreviewLimits, RecursiveSplitter};
use sdk::errors::EngineError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Instrument;

pub struct RepoSession {
    store: FileStore,
    memory: ConversationMemory,
    invoker: Arc<dyn ModelInvoker>,
    limits: PipelineConfig,
    splitter: RecursiveSplitter,
}

impl RepoSession {
    pub fn new(
        root: impl Into<PathBuf>,
        scan: ScanConfig,
        limits: PipelineConfig,
        invoker: Arc<dyn ModelInvoker>,
    ) -> Self {
        let preview = PreviewLimits {
            lines: limits.preview_lines,
            chars: limits.preview_chars,
        };
        Self {
            store: FileStore::new(root, scan, preview),
            memory: ConversationMemory::new(limits.history_capacity),
            splitter: RecursiveSplitter::new(limits.chunk_size, limits.chunk_overlap),
            invoker,
            limits,
        }
    }

    pub fn root(&self) -> &Path {
        self.store.root()
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    /// `Previous conversation:\n…\n\nCurrent user query:\n…` when memory has
    /// turns, else the bare query.
    fn full_query(&self, query: &str) -> String {
        if self.memory.is_empty() {
            query.to_string()
        } else {
            format!(
                "Previous conversation:\n{}\n\nCurrent user query:\n{}",
                self.memory.formatted(),
                query
            )
        }
    }

    /// Answer `query` and record it in memory.
    ///
    /// Stages run in sequence and are never retried; the first failure aborts
    /// the query and leaves memory untouched.
    pub async fn answer_query(&mut self, query: &str) -> Result<QueryOutcome, EngineError> {
        let span = tracing::info_span!("query", id = %uuid::Uuid::new_v4());
        self.run(query).instrument(span).await
    }

    async fn run(&mut self, query: &str) -> Result<QueryOutcome, EngineError> {
        let invoker = Arc::clone(&self.invoker);
        let invoker = invoker.as_ref();

        tracing::info!(stage = %Stage::CheckHistory, turns = self.memory.len(), "Processing query");
        let from_history = check_history(invoker, query, &self.memory).await?;
        let full_query = self.full_query(query);

        let outcome = match from_history {
            Some(recalled) => {
                tracing::info!(stage = %Stage::AggregateFromHistory, "Answer found in conversation history");
                let answer = aggregate_from_history(invoker, &full_query, &recalled).await?;
                QueryOutcome {
                    answer,
                    trace: ContextTrace::PreviousContext,
                }
            }
            None => {
                if !self.store.root().is_dir() {
                    return Err(EngineError::Pipeline(format!(
                        "Repository directory {} is no longer available",
                        self.store.root().display()
                    )));
                }

                tracing::info!(stage = %Stage::SelectFiles, "Selecting relevant files");
                let summaries = self.store.summaries();
                let selected = select_files(
                    invoker,
                    &full_query,
                    &summaries,
                    SelectorLimits {
                        batch_size: self.limits.selector_batch_size,
                        fallback_count: self.limits.fallback_file_count,
                    },
                )
                .await?;
                tracing::info!(
                    stage = %Stage::AnalyzeFiles,
                    summaries = summaries.len(),
                    selected = selected.len(),
                    "Analyzing selected files"
                );

                let analyses = analyze_files(
                    invoker,
                    &mut self.store,
                    &full_query,
                    &selected,
                    self.limits.large_file_threshold,
                    &self.splitter,
                )
                .await?;
                tracing::info!(
                    stage = %Stage::AggregateFromAnalyses,
                    analyses = analyses.len(),
                    "Aggregating analyses"
                );

                let answer = aggregate(invoker, &full_query, &analyses).await?;
                QueryOutcome {
                    answer,
                    trace: ContextTrace::Files { selected, analyses },
                }
            }
        };

        tracing::debug!(stage = %Stage::RecordHistory);
        self.memory.append(query, outcome.answer.clone());
        tracing::info!(stage = %Stage::Done, cached_files = self.store.cached(), "Query answered");

        Ok(outcome)
    }
}

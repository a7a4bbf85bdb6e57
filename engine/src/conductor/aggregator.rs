//! Aggregator

use super::agents::{aggregator_task, CONTEXT_AGGREGATOR};
use super::types::FileAnalysis;
use crate::llm::{ModelInvoker, Result};

/// Each analysis under an `--- ANALYSIS OF <path> ---` header
pub fn render_analyses(analyses: &[FileAnalysis]) -> String {
    analyses
        .iter()
        .map(|a| format!("\n\n--- ANALYSIS OF {} ---\n{}", a.path, a.analysis))
        .collect()
}

/// The reply recovered from conversation memory, framed like an analysis
pub fn render_history_answer(answer: &str) -> String {
    format!("\n\n--- ANSWER FROM CONVERSATION HISTORY ---\n{}", answer)
}

/// Synthesize one answer from `analyses` (which may be empty)
pub async fn aggregate(
    invoker: &dyn ModelInvoker,
    full_query: &str,
    analyses: &[FileAnalysis],
) -> Result<String> {
    let task = aggregator_task(full_query, &render_analyses(analyses));
    invoker.invoke(&CONTEXT_AGGREGATOR, &task).await
}

/// Synthesize the final answer from what the history check recovered
pub async fn aggregate_from_history(
    invoker: &dyn ModelInvoker,
    full_query: &str,
    history_answer: &str,
) -> Result<String> {
    let task = aggregator_task(full_query, &render_history_answer(history_answer));
    invoker.invoke(&CONTEXT_AGGREGATOR, &task).await
}

//! History Relevance Check

use super::agents::{history_task, CONTEXT_MEMORY};
use super::memory::ConversationMemory;
use super::parse::history_answer;
use crate::llm::{ModelInvoker, Result};

/// Ask whether `memory` already answers `query`.
///
/// Returns `Some(answer)` on a hit. Empty memory is a miss without a model call.
pub async fn check_history(
    invoker: &dyn ModelInvoker,
    query: &str,
    memory: &ConversationMemory,
) -> Result<Option<String>> {
    if memory.is_empty() {
        return Ok(None);
    }

    let task = history_task(query, &memory.formatted());
    let reply = invoker.invoke(&CONTEXT_MEMORY, &task).await?;

    Ok(history_answer(&reply).map(str::to_string))
}

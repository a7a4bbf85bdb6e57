//! File Selector
//!
//! Shows the model file summaries in fixed-size batches and collects the paths
//! it names. Falls back to the first few summaries when nothing was picked.

use super::agents::{selector_task, FILE_SELECTOR};
use super::parse::selected_paths;
use crate::llm::{ModelInvoker, Result};
use crate::store::FileSummary;

#[derive(Debug, Clone, Copy)]
pub struct SelectorLimits {
    pub batch_size: usize,
    pub fallback_count: usize,
}

impl Default for SelectorLimits {
    fn default() -> Self {
        Self {
            batch_size: 20,
            fallback_count: 5,
        }
    }
}

pub async fn select_files(
    invoker: &dyn ModelInvoker,
    query: &str,
    summaries: &[FileSummary],
    limits: SelectorLimits,
) -> Result<Vec<String>> {
    let known: Vec<&str> = summaries.iter().map(FileSummary::path).collect();
    let shown: Vec<String> = summaries.iter().filter_map(FileSummary::render).collect();

    let batches: Vec<&[String]> = shown.chunks(limits.batch_size.max(1)).collect();
    let total = batches.len();

    let mut selected: Vec<String> = Vec::new();
    for (index, batch) in batches.into_iter().enumerate() {
        tracing::debug!("Selecting files: batch {} of {}", index + 1, total);

        let task = selector_task(query, &batch.join("\n"), index + 1, total);
        let reply = invoker.invoke(&FILE_SELECTOR, &task).await?;

        selected.extend(selected_paths(&reply, &known).into_iter().map(String::from));
    }

    if selected.is_empty() && !known.is_empty() {
        let fallback: Vec<String> = known
            .iter()
            .take(limits.fallback_count)
            .map(|p| p.to_string())
            .collect();
        tracing::info!(
            "No files selected; falling back to the first {}",
            fallback.len()
        );
        return Ok(fallback);
    }

    Ok(selected)
}

//! File Analyzer
//!
//! Builds one query-focused request per selected file and dispatches them
//! together. Oversized files are sampled at the beginning, middle and end.

use super::agents::{analyzer_task, FILE_ANALYZER};
use super::types::FileAnalysis;
use crate::llm::{ModelInvoker, Result, Task};
use crate::store::{is_read_error, FileStore, RecursiveSplitter};
use futures::future::join_all;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

/// Material sent for one file: the whole content, or for files over
/// `threshold` characters the first, middle and last chunk under section markers.
pub fn excerpt<'a>(content: &'a str, threshold: usize, splitter: &RecursiveSplitter) -> Cow<'a, str> {
    if content.chars().count() <= threshold {
        return Cow::Borrowed(content);
    }

    let chunks = splitter.split(content);
    if chunks.len() >= 3 {
        Cow::Owned(format!(
            "\n\n--- BEGINNING OF FILE ---\n\n{}\n\n--- MIDDLE OF FILE ---\n\n{}\n\n--- END OF FILE ---\n\n{}",
            chunks[0],
            chunks[chunks.len() / 2],
            chunks[chunks.len() - 1]
        ))
    } else {
        Cow::Owned(chunks.join("\n\n"))
    }
}

/// Analyze `selected` paths of the current scan.
///
/// Paths not in the scan, empty files and unreadable files are skipped.
/// A path selected more than once is analyzed once. Results keep selection order.
pub async fn analyze_files(
    invoker: &dyn ModelInvoker,
    store: &mut FileStore,
    query: &str,
    selected: &[String],
    threshold: usize,
    splitter: &RecursiveSplitter,
) -> Result<Vec<FileAnalysis>> {
    let records: HashMap<String, _> = store
        .scan()
        .into_iter()
        .map(|r| (r.relative_path, r.absolute_path))
        .collect();

    let mut seen = HashSet::new();
    let mut requests: Vec<(String, Task)> = Vec::new();
    for path in selected {
        if !seen.insert(path.as_str()) {
            continue;
        }
        let Some(absolute) = records.get(path) else {
            tracing::debug!("Skipping {}: not in the current scan", path);
            continue;
        };

        let content = store.read(absolute);
        if content.is_empty() || is_read_error(&content) {
            continue;
        }

        let material = excerpt(&content, threshold, splitter);
        requests.push((path.clone(), analyzer_task(query, path, &material)));
    }

    tracing::debug!("Dispatching {} file analyses", requests.len());
    let replies = join_all(
        requests
            .iter()
            .map(|(_, task)| invoker.invoke(&FILE_ANALYZER, task)),
    )
    .await;

    requests
        .into_iter()
        .zip(replies)
        .map(|((path, _), reply)| reply.map(|analysis| FileAnalysis { path, analysis }))
        .collect()
}

//! Heuristic parsing of model output

/// Reply meaning "the conversation history doesn't answer this"
pub const NEED_NEW_INFORMATION: &str = "NEED_NEW_INFORMATION";

/// Interpret a history-check reply: `Some(answer)` on a hit, `None` when the
/// model asked for a file search.
pub fn history_answer(reply: &str) -> Option<&str> {
    if reply.contains(NEED_NEW_INFORMATION) {
        None
    } else {
        Some(reply)
    }
}

/// Pick known paths out of a selector reply.
///
/// Each trimmed line selects the first path in `known` (in order) that equals
/// the line or appears in it as `Path: <path>`. Selections keep reply order
/// and may repeat.
pub fn selected_paths<'a>(reply: &str, known: &[&'a str]) -> Vec<&'a str> {
    reply
        .split('\n')
        .map(str::trim)
        .filter_map(|line| {
            known
                .iter()
                .copied()
                .find(|path| line == *path || line.contains(&format!("Path: {}", path)))
        })
        .collect()
}

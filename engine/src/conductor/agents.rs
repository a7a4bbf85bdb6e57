//! Agent profiles and task prompts for each pipeline stage

use super::parse::NEED_NEW_INFORMATION;
use crate::llm::{AgentProfile, Task};

pub const CONTEXT_MEMORY: AgentProfile = AgentProfile {
    role: "Conversation Context Analyzer",
    goal: "Decide whether earlier turns of the conversation already answer the current question",
    backstory: "You keep track of what has been discussed. You can tell when a new question \
        is covered by earlier answers and when it needs a fresh look at the code, and you \
        avoid repeating a search whose results are already known.",
};

pub const FILE_SELECTOR: AgentProfile = AgentProfile {
    role: "File Relevance Selector",
    goal: "Pick the repository files most likely to hold the information a question needs",
    backstory: "You read codebases quickly. From a file's path, size and first few lines you \
        can judge whether it deserves a closer read, so only the files that matter get \
        analyzed in depth.",
};

pub const FILE_ANALYZER: AgentProfile = AgentProfile {
    role: "Query-Focused File Analyzer",
    goal: "Extract from a code file only what helps answer the user's question",
    backstory: "You are a code analyst fluent in many languages. Given a question and a \
        file, you find the functions, types and sections that bear on the question and \
        leave out the rest.",
};

pub const CONTEXT_AGGREGATOR: AgentProfile = AgentProfile {
    role: "Query-Focused Context Aggregator",
    goal: "Combine per-file findings into one clear answer to the user's question",
    backstory: "You are a systems architect who turns notes from many files into a single \
        coherent explanation that addresses exactly what was asked.",
};

pub fn history_task(query: &str, history: &str) -> Task {
    Task::new(
        format!(
            "CURRENT USER QUERY: {query}\n\n\
             CONVERSATION HISTORY:\n{history}\n\n\
             Decide whether the answers above already contain what is needed for the current \
             query. If they do, write a complete answer using only that history. If they do \
             not, or the information is incomplete, reply with exactly {NEED_NEW_INFORMATION} \
             so the repository files get searched."
        ),
        format!("Either an answer from the conversation history or {NEED_NEW_INFORMATION}"),
    )
}

pub fn selector_task(query: &str, batch: &str, index: usize, total: usize) -> Task {
    Task::new(
        format!(
            "QUERY: {query}\n\n\
             Repository files (batch {index} of {total}):\n{batch}\n\n\
             Select ONLY the files above that are likely to help answer the query. \
             Return their paths, one per line, with nothing else on the line. \
             If none are relevant, reply \"No relevant files found in this batch.\""
        ),
        "A list of file paths relevant to the query",
    )
}

pub fn analyzer_task(query: &str, path: &str, material: &str) -> Task {
    Task::new(
        format!(
            "USER QUERY: {query}\n\n\
             Analyze this file in the context of the query.\n\
             File: {path}\n\n\
             File content:\n```\n{material}\n```\n\n\
             Report only what helps answer the query: the relevant code sections (with line \
             numbers where possible), how the file relates to the query, and the functions, \
             classes or variables involved. If nothing in the file is relevant, say so in one \
             sentence."
        ),
        format!("Query-relevant analysis of {path}"),
    )
}

pub fn aggregator_task(query: &str, analyses: &str) -> Task {
    Task::new(
        format!(
            "USER QUERY and HISTORY: {query}\n\n\
             File analyses:\n{analyses}\n\n\
             Write one answer to the query from the analyses above. Answer directly, \
             reference specific files, functions and classes, and include short code \
             examples where they help. If the query is general knowledge, answer it in the \
             context of this codebase. Do not restate every analysis; synthesize them."
        ),
        "A comprehensive answer to the user's query",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_task_names_sentinel() {
        let task = history_task("what does main do?", "User: hi\nBot: hello");
        assert!(task.description.contains("CURRENT USER QUERY: what does main do?"));
        assert!(task.description.contains("User: hi\nBot: hello"));
        assert!(task.description.contains(NEED_NEW_INFORMATION));
    }

    #[test]
    fn test_analyzer_expected_output_names_path() {
        let task = analyzer_task("q", "src/lib.rs", "fn x() {}");
        assert_eq!(task.expected_output, "Query-relevant analysis of src/lib.rs");
        assert!(task.description.contains("```\nfn x() {}\n```"));
    }

    #[test]
    fn test_selector_task_batch_numbers() {
        let task = selector_task("q", "Path: a.rs", 2, 3);
        assert!(task.description.contains("(batch 2 of 3)"));
    }
}

//! Integration tests for the query pipeline
//!
//! Drives `RepoSession` over real temp directories with a scripted model that
//! answers by agent role and records every call.

use async_trait::async_trait;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use raggit_engine::conductor::agents::{
    CONTEXT_AGGREGATOR, CONTEXT_MEMORY, FILE_ANALYZER, FILE_SELECTOR,
};
use raggit_engine::conductor::parse::NEED_NEW_INFORMATION;
use raggit_engine::conductor::{ContextTrace, FileAnalysis, RepoSession};
use raggit_engine::config::{PipelineConfig, ScanConfig};
use raggit_engine::llm::{AgentProfile, LLMError, ModelInvoker, Task};
use sdk::errors::EngineError;

struct ScriptedInvoker {
    history_reply: Mutex<String>,
    selector_reply: String,
    fail_aggregation: bool,
    calls: Mutex<Vec<(&'static str, Task)>>,
}

impl ScriptedInvoker {
    fn new(selector_reply: &str) -> Self {
        Self {
            history_reply: Mutex::new(NEED_NEW_INFORMATION.to_string()),
            selector_reply: selector_reply.to_string(),
            fail_aggregation: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn failing_aggregation(mut self) -> Self {
        self.fail_aggregation = true;
        self
    }

    fn set_history_reply(&self, reply: &str) {
        *self.history_reply.lock().unwrap() = reply.to_string();
    }

    fn count(&self, role: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(r, _)| *r == role)
            .count()
    }

    fn tasks(&self, role: &str) -> Vec<Task> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(r, _)| *r == role)
            .map(|(_, t)| t.clone())
            .collect()
    }
}

#[async_trait]
impl ModelInvoker for ScriptedInvoker {
    async fn invoke(&self, agent: &AgentProfile, task: &Task) -> Result<String, LLMError> {
        self.calls.lock().unwrap().push((agent.role, task.clone()));

        if agent.role == CONTEXT_MEMORY.role {
            Ok(self.history_reply.lock().unwrap().clone())
        } else if agent.role == FILE_SELECTOR.role {
            Ok(self.selector_reply.clone())
        } else if agent.role == FILE_ANALYZER.role {
            let path = task
                .expected_output
                .trim_start_matches("Query-relevant analysis of ");
            Ok(format!("analysis of {}", path))
        } else if self.fail_aggregation {
            Err(LLMError::ProviderUnavailable("model offline".to_string()))
        } else {
            Ok("final answer".to_string())
        }
    }
}

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn session(root: &Path, invoker: Arc<ScriptedInvoker>, pipeline: PipelineConfig) -> RepoSession {
    RepoSession::new(root, ScanConfig::default(), pipeline, invoker)
}

fn sample_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "src/main.py", "from util import f\nprint(f())\n");
    write(dir.path(), "src/util.py", "def f():\n    return 'hi'\n");
    write(dir.path(), "node_modules/dep/index.js", "module.exports = 1;\n");
    write(dir.path(), ".git/hooks/pre-commit.sh", "exit 0\n");
    write(dir.path(), "notes.txt", "not source\n");
    dir
}

#[tokio::test]
async fn test_fresh_query_selects_and_analyzes() {
    let repo = sample_repo();
    let invoker = Arc::new(ScriptedInvoker::new("src/util.py\nsomething/unknown.py\n"));
    let mut session = session(repo.path(), Arc::clone(&invoker), PipelineConfig::default());

    let outcome = session.answer_query("what does f return?").await.unwrap();

    assert_eq!(outcome.answer, "final answer");
    assert_eq!(
        outcome.trace,
        ContextTrace::Files {
            selected: vec!["src/util.py".to_string()],
            analyses: vec![FileAnalysis {
                path: "src/util.py".to_string(),
                analysis: "analysis of src/util.py".to_string(),
            }],
        }
    );

    // Empty memory skips the history check
    assert_eq!(invoker.count(CONTEXT_MEMORY.role), 0);
    assert_eq!(invoker.count(FILE_SELECTOR.role), 1);
    assert_eq!(invoker.count(FILE_ANALYZER.role), 1);
    assert_eq!(invoker.count(CONTEXT_AGGREGATOR.role), 1);

    // Excluded directories and non-source files never reach the selector
    let selector = &invoker.tasks(FILE_SELECTOR.role)[0];
    assert!(selector.description.contains("Path: src/main.py"));
    assert!(selector.description.contains("Path: src/util.py"));
    assert!(!selector.description.contains("node_modules"));
    assert!(!selector.description.contains(".git"));
    assert!(!selector.description.contains("notes.txt"));

    let turns: Vec<_> = session.memory().turns().collect();
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0].user, "what does f return?");
    assert_eq!(turns[0].bot, "final answer");
}

#[tokio::test]
async fn test_history_hit_skips_file_stages() {
    let repo = sample_repo();
    let invoker = Arc::new(ScriptedInvoker::new("src/util.py"));
    let mut session = session(repo.path(), Arc::clone(&invoker), PipelineConfig::default());

    session.answer_query("what does f return?").await.unwrap();
    invoker.set_history_reply("f returns 'hi', as discussed.");

    let outcome = session.answer_query("and what was that again?").await.unwrap();

    assert_eq!(outcome.trace, ContextTrace::PreviousContext);
    assert_eq!(outcome.trace.to_string(), "PREVIOUS CONTEXT USED");
    assert_eq!(invoker.count(CONTEXT_MEMORY.role), 1);
    assert_eq!(invoker.count(FILE_SELECTOR.role), 1);
    assert_eq!(invoker.count(FILE_ANALYZER.role), 1);
    assert_eq!(invoker.count(CONTEXT_AGGREGATOR.role), 2);

    // History check sees the bare query; aggregation sees the conversation
    let history = &invoker.tasks(CONTEXT_MEMORY.role)[0];
    assert!(history
        .description
        .contains("CURRENT USER QUERY: and what was that again?"));
    assert!(history
        .description
        .contains("User: what does f return?\nBot: final answer"));

    let aggregation = &invoker.tasks(CONTEXT_AGGREGATOR.role)[1];
    assert!(aggregation
        .description
        .contains("--- ANSWER FROM CONVERSATION HISTORY ---\nf returns 'hi', as discussed."));
    assert!(aggregation.description.contains("Previous conversation:"));
    assert!(aggregation
        .description
        .contains("Current user query:\nand what was that again?"));

    assert_eq!(session.memory().len(), 2);
}

#[tokio::test]
async fn test_history_miss_searches_with_conversation() {
    let repo = sample_repo();
    let invoker = Arc::new(ScriptedInvoker::new("src/main.py"));
    let mut session = session(repo.path(), Arc::clone(&invoker), PipelineConfig::default());

    session.answer_query("what does f return?").await.unwrap();
    session.answer_query("where is f called?").await.unwrap();

    assert_eq!(invoker.count(CONTEXT_MEMORY.role), 1);
    assert_eq!(invoker.count(FILE_SELECTOR.role), 2);
    let second = &invoker.tasks(FILE_SELECTOR.role)[1];
    assert!(second.description.contains("Previous conversation:"));
    assert!(second.description.contains("Current user query:\nwhere is f called?"));
}

#[tokio::test]
async fn test_fallback_to_first_files() {
    let repo = TempDir::new().unwrap();
    for i in 0..7 {
        write(repo.path(), &format!("mod_{}.py", i), &format!("x = {}\n", i));
    }
    let invoker = Arc::new(ScriptedInvoker::new("No relevant files found in this batch."));
    let mut session = session(repo.path(), Arc::clone(&invoker), PipelineConfig::default());

    let outcome = session.answer_query("anything?").await.unwrap();

    let ContextTrace::Files { selected, analyses } = outcome.trace else {
        panic!("Expected a file trace");
    };
    let expected: Vec<String> = (0..5).map(|i| format!("mod_{}.py", i)).collect();
    assert_eq!(selected, expected);
    assert_eq!(analyses.len(), 5);
    assert!(analyses.iter().all(|a| expected.contains(&a.path)));
}

#[tokio::test]
async fn test_fallback_is_capped_by_repository_size() {
    let repo = TempDir::new().unwrap();
    write(repo.path(), "a.rs", "fn a() {}\n");
    write(repo.path(), "b.rs", "fn b() {}\n");
    let invoker = Arc::new(ScriptedInvoker::new(""));
    let mut session = session(repo.path(), Arc::clone(&invoker), PipelineConfig::default());

    let outcome = session.answer_query("anything?").await.unwrap();

    let ContextTrace::Files { selected, .. } = outcome.trace else {
        panic!("Expected a file trace");
    };
    assert_eq!(selected, vec!["a.rs".to_string(), "b.rs".to_string()]);
}

#[tokio::test]
async fn test_empty_repository_skips_selection() {
    let repo = TempDir::new().unwrap();
    write(repo.path(), "README.txt", "no source here\n");
    let invoker = Arc::new(ScriptedInvoker::new("README.txt"));
    let mut session = session(repo.path(), Arc::clone(&invoker), PipelineConfig::default());

    let outcome = session.answer_query("what is this?").await.unwrap();

    assert_eq!(
        outcome.trace,
        ContextTrace::Files {
            selected: vec![],
            analyses: vec![],
        }
    );
    assert_eq!(invoker.count(FILE_SELECTOR.role), 0);
    assert_eq!(invoker.count(FILE_ANALYZER.role), 0);
    assert_eq!(invoker.count(CONTEXT_AGGREGATOR.role), 1);
}

#[tokio::test]
async fn test_oversized_file_is_excerpted() {
    let repo = TempDir::new().unwrap();
    let content: String = (0..30).map(|i| format!("line {:02}\n", i)).collect();
    write(repo.path(), "big.py", &content);

    let pipeline = PipelineConfig {
        large_file_threshold: 100,
        chunk_size: 40,
        chunk_overlap: 0,
        ..PipelineConfig::default()
    };
    let invoker = Arc::new(ScriptedInvoker::new("big.py"));
    let mut session = session(repo.path(), Arc::clone(&invoker), pipeline);

    session.answer_query("what is in big.py?").await.unwrap();

    let analyzer = &invoker.tasks(FILE_ANALYZER.role)[0];
    let description = &analyzer.description;
    let beginning = description.find("--- BEGINNING OF FILE ---").unwrap();
    let middle = description.find("--- MIDDLE OF FILE ---").unwrap();
    let end = description.find("--- END OF FILE ---").unwrap();
    assert!(beginning < middle && middle < end);
    assert!(description[beginning..middle].contains("line 00"));
    assert!(description[end..].contains("line 29"));
    assert!(!description.contains("line 10\nline 11\nline 12\nline 13\nline 14\nline 15"));
}

#[tokio::test]
async fn test_small_file_is_sent_whole() {
    let repo = TempDir::new().unwrap();
    write(repo.path(), "small.py", "a = 1\nb = 2\n");
    let invoker = Arc::new(ScriptedInvoker::new("small.py"));
    let mut session = session(repo.path(), Arc::clone(&invoker), PipelineConfig::default());

    session.answer_query("what is b?").await.unwrap();

    let analyzer = &invoker.tasks(FILE_ANALYZER.role)[0];
    assert!(analyzer.description.contains("```\na = 1\nb = 2\n\n```"));
    assert!(!analyzer.description.contains("--- BEGINNING OF FILE ---"));
}

#[tokio::test]
async fn test_memory_keeps_last_ten_turns() {
    let repo = sample_repo();
    let invoker = Arc::new(ScriptedInvoker::new("src/util.py"));
    let mut session = session(repo.path(), Arc::clone(&invoker), PipelineConfig::default());

    for i in 1..=11 {
        session.answer_query(&format!("question {}", i)).await.unwrap();
    }

    let users: Vec<String> = session.memory().turns().map(|t| t.user.clone()).collect();
    let expected: Vec<String> = (2..=11).map(|i| format!("question {}", i)).collect();
    assert_eq!(users, expected);
}

#[tokio::test]
async fn test_trace_rendering() {
    let repo = sample_repo();
    let invoker = Arc::new(ScriptedInvoker::new("src/util.py"));
    let mut session = session(repo.path(), Arc::clone(&invoker), PipelineConfig::default());

    let outcome = session.answer_query("what does f return?").await.unwrap();

    assert_eq!(
        outcome.trace.to_string(),
        "--- SELECTED FILES ---\n[\"src/util.py\"]\n--- ANALYSES ---\n{\"src/util.py\": \"analysis of src/util.py\"}\n"
    );
}

#[tokio::test]
async fn test_failed_stage_leaves_memory_untouched() {
    let repo = sample_repo();
    let invoker = Arc::new(ScriptedInvoker::new("src/util.py").failing_aggregation());
    let mut session = session(repo.path(), Arc::clone(&invoker), PipelineConfig::default());

    let err = session.answer_query("what does f return?").await.unwrap_err();

    assert!(matches!(err, EngineError::LLMProvider(_)));
    assert!(session.memory().is_empty());
}

#[tokio::test]
async fn test_vanished_repository_is_a_pipeline_error() {
    let repo = sample_repo();
    let invoker = Arc::new(ScriptedInvoker::new("src/util.py"));
    let mut session = session(repo.path(), Arc::clone(&invoker), PipelineConfig::default());
    fs::remove_dir_all(repo.path()).unwrap();

    let err = session.answer_query("what does f return?").await.unwrap_err();

    assert!(matches!(err, EngineError::Pipeline(_)));
    assert!(err.to_string().contains("is no longer available"));
    assert_eq!(invoker.count(FILE_SELECTOR.role), 0);
    assert!(session.memory().is_empty());
}

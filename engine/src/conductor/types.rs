//! Pipeline types

use sdk::types::QueryReply;
use std::fmt;

/// Stages of one query, in the order they can run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CheckHistory,
    AggregateFromHistory,
    SelectFiles,
    AnalyzeFiles,
    AggregateFromAnalyses,
    RecordHistory,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::CheckHistory => "check_history",
            Stage::AggregateFromHistory => "aggregate_from_history",
            Stage::SelectFiles => "select_files",
            Stage::AnalyzeFiles => "analyze_files",
            Stage::AggregateFromAnalyses => "aggregate_from_analyses",
            Stage::RecordHistory => "record_history",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Analysis of one file, keyed by the path the request was built for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAnalysis {
    pub path: String,
    pub analysis: String,
}

/// How an answer was produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextTrace {
    /// Answered from conversation memory
    PreviousContext,
    /// Answered from file analyses
    Files {
        selected: Vec<String>,
        analyses: Vec<FileAnalysis>,
    },
}

impl fmt::Display for ContextTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextTrace::PreviousContext => f.write_str("PREVIOUS CONTEXT USED"),
            ContextTrace::Files { selected, analyses } => {
                writeln!(f, "--- SELECTED FILES ---")?;
                writeln!(f, "{:?}", selected)?;
                writeln!(f, "--- ANALYSES ---")?;
                let entries: Vec<String> = analyses
                    .iter()
                    .map(|a| format!("{:?}: {:?}", a.path, a.analysis))
                    .collect();
                writeln!(f, "{{{}}}", entries.join(", "))
            }
        }
    }
}

/// Result of `RepoSession::answer_query`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOutcome {
    pub answer: String,
    pub trace: ContextTrace,
}

impl From<QueryOutcome> for QueryReply {
    fn from(outcome: QueryOutcome) -> Self {
        QueryReply {
            answer: outcome.answer,
            context: outcome.trace.to_string(),
        }
    }
}

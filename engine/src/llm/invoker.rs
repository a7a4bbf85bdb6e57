//! Agent profiles and the model invocation seam
//!
//! An agent is configuration, not behaviour: a role, a goal and a backstory
//! that frame one task. Every pipeline stage hands its profile and task to a
//! single `ModelInvoker` and gets text back.

use super::{Message, Result};
use async_trait::async_trait;

/// Persona sent as the system prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentProfile {
    pub role: &'static str,
    pub goal: &'static str,
    pub backstory: &'static str,
}

/// One unit of work for an agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub description: String,
    pub expected_output: String,
}

impl Task {
    pub fn new(description: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            expected_output: expected_output.into(),
        }
    }
}

impl AgentProfile {
    /// Render `task` for this agent as `[system, user]` messages
    pub fn messages_for(&self, task: &Task) -> Vec<Message> {
        let system = format!(
            "You are {}.\n{}\n\nYour personal goal is: {}",
            self.role, self.backstory, self.goal
        );
        let user = format!(
            "{}\n\nThis is the expected criteria for your final answer: {}",
            task.description.trim(),
            task.expected_output
        );
        vec![Message::system(system), Message::user(user)]
    }
}

/// Submit an agent profile and task, receive the model's text
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn invoke(&self, agent: &AgentProfile, task: &Task) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MessageRole;

    const PROFILE: AgentProfile = AgentProfile {
        role: "Tester",
        goal: "Check rendering",
        backstory: "You write small tests.",
    };

    #[test]
    fn test_messages_for_task() {
        let task = Task::new("  QUERY: what?\n  ", "An answer");
        let messages = PROFILE.messages_for(&task);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::System);
        assert!(messages[0].content.starts_with("You are Tester.\nYou write small tests."));
        assert!(messages[0].content.ends_with("Your personal goal is: Check rendering"));
        assert_eq!(messages[1].role, MessageRole::User);
        assert!(messages[1].content.starts_with("QUERY: what?\n\n"));
        assert!(messages[1].content.ends_with("An answer"));
    }
}

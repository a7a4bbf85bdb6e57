//! Conversation Memory
//!
//! Bounded log of the most recent `(question, answer)` turns. The oldest turn
//! is evicted once the capacity is exceeded.

use std::collections::VecDeque;

/// One exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub user: String,
    pub bot: String,
}

#[derive(Debug, Clone)]
pub struct ConversationMemory {
    turns: VecDeque<Turn>,
    capacity: usize,
}

impl ConversationMemory {
    /// Create a memory holding at most `capacity` turns (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            turns: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a turn, evicting the oldest when full
    pub fn append(&mut self, query: impl Into<String>, answer: impl Into<String>) {
        self.turns.push_back(Turn {
            user: query.into(),
            bot: answer.into(),
        });
        while self.turns.len() > self.capacity {
            self.turns.pop_front();
        }
    }

    /// `User: …\nBot: …` per turn, oldest first, joined by `\n`.
    /// Empty when there are no turns.
    pub fn formatted(&self) -> String {
        self.turns
            .iter()
            .map(|turn| format!("User: {}\nBot: {}", turn.user, turn.bot))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new(10)
    }
}

//! Exchange history: append-only turns with strictly increasing sequence numbers.

use serde::{Deserialize, Serialize};

/// Author of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
}

/// One entry in the exchange history. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub sequence: u64,
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    /// Synthetic agent turn that reports a generation failure
    #[serde(default)]
    pub is_error: bool,
}

/// Prefix of the agent turn recorded for a failed generation
pub const ERROR_TURN_PREFIX: &str = "Error: ";

/// Ordered turn history.
///
/// The sequence counter survives [`Transcript::clear`], so a sequence number
/// is never handed out twice by the same transcript.
#[derive(Debug, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
    next_sequence: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub(crate) fn push_user(&mut self, content: impl Into<String>) -> &Turn {
        self.push(Role::User, content.into(), false)
    }

    pub(crate) fn push_agent(&mut self, content: impl Into<String>) -> &Turn {
        self.push(Role::Agent, content.into(), false)
    }

    pub(crate) fn push_error(&mut self, message: &str) -> &Turn {
        self.push(Role::Agent, format!("{}{}", ERROR_TURN_PREFIX, message), true)
    }

    pub(crate) fn clear(&mut self) {
        self.turns.clear();
    }

    fn push(&mut self, role: Role, content: String, is_error: bool) -> &Turn {
        let turn = Turn {
            role,
            content,
            sequence: self.next_sequence,
            timestamp: chrono::Utc::now().timestamp_millis(),
            is_error,
        };
        self.next_sequence += 1;
        self.turns.push(turn);
        &self.turns[self.turns.len() - 1]
    }
}

//! Exchange event types

use parley_ai::GeneratedArtifact;
use serde::{Deserialize, Serialize};

use crate::{
    conversation::Turn,
    state::{InterruptKind, RequestId},
};

/// Events broadcast by the exchange runtime after each transition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExchangeEvent {
    /// A submission was accepted and its request dispatched
    Submitted { request: RequestId, turn: Turn },

    /// The backend answered and the agent turn was appended
    Responded {
        request: RequestId,
        turn: Turn,
        artifact: GeneratedArtifact,
    },

    /// The backend failed and an error turn was appended
    Failed {
        request: RequestId,
        turn: Turn,
        message: String,
    },

    /// The in-flight request was stopped, paused or cancelled
    Interrupted {
        request: RequestId,
        kind: InterruptKind,
    },

    /// A result arrived for a request nobody is waiting on
    Discarded { request: RequestId },

    /// A refinement produced a new current artifact
    Refined { artifact: GeneratedArtifact },

    /// History, artifacts and draft were wiped
    Reset,

    /// Chat history and draft were wiped
    Cleared,
}

impl ExchangeEvent {
    /// Check if this event ends the wait on a request
    pub fn settles_request(&self) -> bool {
        matches!(
            self,
            ExchangeEvent::Responded { .. }
                | ExchangeEvent::Failed { .. }
                | ExchangeEvent::Interrupted { .. }
        )
    }
}

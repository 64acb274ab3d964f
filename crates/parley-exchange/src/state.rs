//! Exchange state and the renderer-facing snapshot

use serde::{Deserialize, Serialize};
use std::fmt;

use parley_ai::GeneratedArtifact;

use crate::conversation::Turn;

/// Identifies one generation request. Allocated in increasing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Current phase of the exchange. Exactly one is active at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ExchangeState {
    /// Ready for a submission
    #[default]
    Idle,
    /// Waiting on the backend for `request`
    AwaitingResponse { request: RequestId },
    /// Cancelled; a reset is required before the next submission
    Interrupted,
    /// The last generation failed
    Errored { message: String },
}

impl ExchangeState {
    pub fn name(&self) -> &'static str {
        match self {
            ExchangeState::Idle => "idle",
            ExchangeState::AwaitingResponse { .. } => "awaiting_response",
            ExchangeState::Interrupted => "interrupted",
            ExchangeState::Errored { .. } => "errored",
        }
    }

    pub fn is_awaiting(&self) -> bool {
        matches!(self, ExchangeState::AwaitingResponse { .. })
    }

    /// The in-flight request, if any
    pub fn pending_request(&self) -> Option<RequestId> {
        match self {
            ExchangeState::AwaitingResponse { request } => Some(*request),
            _ => None,
        }
    }
}

/// How an in-flight request was interrupted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterruptKind {
    /// Drop the response, keep history, back to idle
    Stop,
    /// Same as stop
    Pause,
    /// Drop the response and wait for a reset that clears history
    Cancel,
}

impl InterruptKind {
    pub fn name(&self) -> &'static str {
        match self {
            InterruptKind::Stop => "stop",
            InterruptKind::Pause => "pause",
            InterruptKind::Cancel => "cancel",
        }
    }
}

/// Everything a renderer reads after a transition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub turns: Vec<Turn>,
    pub state: ExchangeState,
    pub current_artifact: Option<GeneratedArtifact>,
    pub draft: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_request_only_when_awaiting() {
        let awaiting = ExchangeState::AwaitingResponse {
            request: RequestId(3),
        };
        assert_eq!(awaiting.pending_request(), Some(RequestId(3)));
        assert_eq!(ExchangeState::Idle.pending_request(), None);
        assert_eq!(ExchangeState::Interrupted.pending_request(), None);
    }

    #[test]
    fn test_state_serde_tag() {
        let state = ExchangeState::Errored {
            message: "HTTP 500".into(),
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["state"], "errored");
        assert_eq!(json["message"], "HTTP 500");
    }
}

//! The exchange state machine
//!
//! ```text
//! Idle ──submit──▶ AwaitingResponse ──ok──────▶ Idle
//!  ▲                 │   │   └──────failure──▶ Errored ──submit──▶ AwaitingResponse
//!  │                 │   └──stop / pause─────▶ Idle
//!  │                 └──cancel──▶ Interrupted
//!  └──────────reset───────────────────┘
//! ```
//!
//! The controller does no I/O. Callers dispatch the backend request described
//! by a [`Submission`] and feed the outcome back through
//! [`ExchangeController::on_generation_result`], tagged with its request id.

use parley_ai::{GeneratedArtifact, RefinementTag};

use crate::{
    conversation::{Transcript, Turn},
    error::Rejection,
    refine::refine,
    state::{ExchangeState, InterruptKind, RequestId, Snapshot},
};

/// An accepted submission: the caller must run exactly one generation for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub request: RequestId,
    pub prompt: String,
    pub turn: Turn,
}

/// What happened to a generation result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Applied: agent turn appended, state back to idle
    Completed {
        turn: Turn,
        artifact: GeneratedArtifact,
    },
    /// Applied: error turn appended, state errored
    Failed { turn: Turn, message: String },
    /// Stale (interrupted or superseded request): nothing changed
    Discarded,
}

/// Turn-taking state machine for one exchange
#[derive(Debug, Default)]
pub struct ExchangeController {
    transcript: Transcript,
    state: ExchangeState,
    /// Artifact lineage, oldest first. The last entry is the current artifact.
    artifacts: Vec<GeneratedArtifact>,
    draft: String,
    next_request: u64,
}

impl ExchangeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ExchangeState {
        &self.state
    }

    pub fn turns(&self) -> &[Turn] {
        self.transcript.turns()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// The most recent artifact (generated or refined)
    pub fn current_artifact(&self) -> Option<&GeneratedArtifact> {
        self.artifacts.last()
    }

    /// All artifacts since the last reset, oldest first
    pub fn artifacts(&self) -> &[GeneratedArtifact] {
        &self.artifacts
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Replace the pending prompt buffer
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// View handed to renderers after every transition
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            turns: self.transcript.turns().to_vec(),
            state: self.state.clone(),
            current_artifact: self.current_artifact().cloned(),
            draft: self.draft.clone(),
        }
    }

    /// Accept a user submission and open a generation request for it.
    pub fn submit(&mut self, content: &str) -> Result<Submission, Rejection> {
        if content.trim().is_empty() {
            return Err(Rejection::EmptyInput);
        }
        match self.state {
            ExchangeState::Idle | ExchangeState::Errored { .. } => {}
            ExchangeState::AwaitingResponse { .. } => return Err(Rejection::Busy),
            ExchangeState::Interrupted => return Err(Rejection::Interrupted),
        }

        let request = RequestId(self.next_request);
        self.next_request += 1;

        let turn = self.transcript.push_user(content).clone();
        self.draft.clear();
        self.state = ExchangeState::AwaitingResponse { request };
        tracing::debug!("submit {} -> awaiting_response (turn {})", request, turn.sequence);

        Ok(Submission {
            request,
            prompt: content.to_string(),
            turn,
        })
    }

    /// Submit the draft buffer
    pub fn submit_draft(&mut self) -> Result<Submission, Rejection> {
        let draft = self.draft.clone();
        self.submit(&draft)
    }

    /// Apply the outcome of generation `request`, unless it is stale.
    pub fn on_generation_result(
        &mut self,
        request: RequestId,
        result: parley_ai::Result<GeneratedArtifact>,
    ) -> Resolution {
        if self.state.pending_request() != Some(request) {
            tracing::debug!(
                "discarding stale result for {} (state: {})",
                request,
                self.state.name()
            );
            return Resolution::Discarded;
        }

        match result {
            Ok(artifact) => {
                let turn = self.transcript.push_agent(artifact.render()).clone();
                self.artifacts.push(artifact.clone());
                self.state = ExchangeState::Idle;
                tracing::debug!("{} completed -> idle", request);
                Resolution::Completed { turn, artifact }
            }
            Err(e) => {
                let message = e.to_string();
                let turn = self.transcript.push_error(&message).clone();
                self.state = ExchangeState::Errored {
                    message: message.clone(),
                };
                tracing::debug!("{} failed -> errored: {}", request, message);
                Resolution::Failed { turn, message }
            }
        }
    }

    /// Interrupt the in-flight request and wait for a reset.
    pub fn cancel(&mut self) -> Result<RequestId, Rejection> {
        let request = self.state.pending_request().ok_or(Rejection::NotAwaiting)?;
        self.draft.clear();
        self.state = ExchangeState::Interrupted;
        tracing::debug!("cancel {} -> interrupted", request);
        Ok(request)
    }

    /// Drop the in-flight request's result and return to idle, keeping history.
    pub fn pause(&mut self) -> Result<RequestId, Rejection> {
        self.suppress(InterruptKind::Pause)
    }

    /// Same as [`pause`](Self::pause)
    pub fn stop(&mut self) -> Result<RequestId, Rejection> {
        self.suppress(InterruptKind::Stop)
    }

    /// Dispatch an interrupt by kind
    pub fn interrupt(&mut self, kind: InterruptKind) -> Result<RequestId, Rejection> {
        match kind {
            InterruptKind::Cancel => self.cancel(),
            InterruptKind::Pause | InterruptKind::Stop => self.suppress(kind),
        }
    }

    fn suppress(&mut self, kind: InterruptKind) -> Result<RequestId, Rejection> {
        let request = self.state.pending_request().ok_or(Rejection::NotAwaiting)?;
        self.state = ExchangeState::Idle;
        tracing::debug!("{} {} -> idle", kind.name(), request);
        Ok(request)
    }

    /// Full reset: clears turns, artifacts and draft, returns to idle.
    pub fn reset(&mut self) -> Result<(), Rejection> {
        if self.state.is_awaiting() {
            return Err(Rejection::Busy);
        }
        tracing::debug!("reset -> idle ({} turns dropped)", self.transcript.len());
        self.transcript.clear();
        self.artifacts.clear();
        self.draft.clear();
        self.state = ExchangeState::Idle;
        Ok(())
    }

    /// Clear the chat history and draft, keeping the artifact lineage.
    pub fn clear(&mut self) -> Result<(), Rejection> {
        match self.state {
            ExchangeState::Idle | ExchangeState::Errored { .. } => {}
            ExchangeState::AwaitingResponse { .. } => return Err(Rejection::Busy),
            ExchangeState::Interrupted => return Err(Rejection::Interrupted),
        }
        tracing::debug!("clear -> idle ({} turns dropped)", self.transcript.len());
        self.transcript.clear();
        self.draft.clear();
        self.state = ExchangeState::Idle;
        Ok(())
    }

    /// Derive a new current artifact from the current one.
    pub fn refine(&mut self, tag: RefinementTag) -> Result<&GeneratedArtifact, Rejection> {
        let current = self.artifacts.last().ok_or(Rejection::NoArtifact)?;
        let refined = refine(current, tag);
        tracing::debug!("refine {} -> revision {}", tag, refined.revision);
        self.artifacts.push(refined);
        Ok(&self.artifacts[self.artifacts.len() - 1])
    }

    /// [`refine`](Self::refine) with a tag name; unknown names are a no-op.
    pub fn refine_named(&mut self, tag: &str) -> Result<&GeneratedArtifact, Rejection> {
        let tag = tag
            .parse::<RefinementTag>()
            .map_err(|_| Rejection::UnknownRefinement(tag.trim().to_string()))?;
        self.refine(tag)
    }
}

//! A cloneable handle for driving an exchange from external code.

use parley_ai::{GeneratedArtifact, RefinementTag};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    error::{Error, Rejection, Result},
    events::ExchangeEvent,
    state::{ExchangeState, InterruptKind, RequestId, Snapshot},
};

pub(crate) type Reply<T> = oneshot::Sender<std::result::Result<T, Rejection>>;

/// User actions, processed one at a time by the exchange task
pub(crate) enum Command {
    /// `None` submits the draft buffer
    Submit {
        content: Option<String>,
        reply: Reply<RequestId>,
    },
    SetDraft {
        text: String,
        reply: Reply<()>,
    },
    Interrupt {
        kind: InterruptKind,
        reply: Reply<RequestId>,
    },
    Reset {
        reply: Reply<()>,
    },
    Clear {
        reply: Reply<()>,
    },
    Refine {
        tag: RefinementTag,
        reply: Reply<GeneratedArtifact>,
    },
}

/// A cloneable handle to a running [`Exchange`](crate::Exchange).
///
/// Every action waits for the exchange task to process it and returns the
/// controller's verdict. Rejections come back as [`Error::Rejected`] and leave
/// the exchange unchanged.
#[derive(Clone)]
pub struct ExchangeHandle {
    pub(crate) id: Uuid,
    pub(crate) commands: mpsc::Sender<Command>,
    pub(crate) snapshots: watch::Receiver<Snapshot>,
    pub(crate) events: broadcast::Sender<ExchangeEvent>,
    pub(crate) shutdown: CancellationToken,
}

impl ExchangeHandle {
    /// Identifier used in log spans
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Subscribe to exchange events
    pub fn subscribe(&self) -> broadcast::Receiver<ExchangeEvent> {
        self.events.subscribe()
    }

    /// Latest snapshot
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// Latest state
    pub fn state(&self) -> ExchangeState {
        self.snapshots.borrow().state.clone()
    }

    /// Submit `content` as a user turn
    pub async fn submit(&self, content: impl Into<String>) -> Result<RequestId> {
        let content = Some(content.into());
        self.request(|reply| Command::Submit { content, reply }).await
    }

    /// Submit the draft buffer
    pub async fn submit_draft(&self) -> Result<RequestId> {
        self.request(|reply| Command::Submit {
            content: None,
            reply,
        })
        .await
    }

    /// Replace the draft buffer
    pub async fn set_draft(&self, text: impl Into<String>) -> Result<()> {
        let text = text.into();
        self.request(|reply| Command::SetDraft { text, reply }).await
    }

    /// Drop the pending response, keep history
    pub async fn stop(&self) -> Result<RequestId> {
        self.interrupt(InterruptKind::Stop).await
    }

    /// Drop the pending response, keep history
    pub async fn pause(&self) -> Result<RequestId> {
        self.interrupt(InterruptKind::Pause).await
    }

    /// Drop the pending response and wait for [`reset`](Self::reset)
    pub async fn cancel(&self) -> Result<RequestId> {
        self.interrupt(InterruptKind::Cancel).await
    }

    pub async fn interrupt(&self, kind: InterruptKind) -> Result<RequestId> {
        self.request(|reply| Command::Interrupt { kind, reply }).await
    }

    /// Clear history, artifacts and draft
    pub async fn reset(&self) -> Result<()> {
        self.request(|reply| Command::Reset { reply }).await
    }

    /// Clear chat history and draft
    pub async fn clear(&self) -> Result<()> {
        self.request(|reply| Command::Clear { reply }).await
    }

    /// Refine the current artifact
    pub async fn refine(&self, tag: RefinementTag) -> Result<GeneratedArtifact> {
        self.request(|reply| Command::Refine { tag, reply }).await
    }

    /// Refine by tag name. Unknown names are rejected without reaching the
    /// exchange.
    pub async fn refine_named(&self, tag: &str) -> Result<GeneratedArtifact> {
        let parsed = tag
            .parse::<RefinementTag>()
            .map_err(|_| Rejection::UnknownRefinement(tag.trim().to_string()))?;
        self.refine(parsed).await
    }

    /// Wait until no request is in flight and return that snapshot.
    pub async fn wait_for_idle(&self) -> Result<Snapshot> {
        let mut rx = self.snapshots.clone();
        let snapshot = rx
            .wait_for(|s| !s.state.is_awaiting())
            .await
            .map_err(|_| Error::Closed)?;
        Ok(snapshot.clone())
    }

    /// Wait until idle, with a timeout.
    /// Returns `None` on timeout.
    pub async fn wait_for_idle_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> Result<Option<Snapshot>> {
        match tokio::time::timeout(timeout, self.wait_for_idle()).await {
            Ok(snapshot) => snapshot.map(Some),
            Err(_) => Ok(None),
        }
    }

    /// Stop the exchange task. In-flight backend calls are left to finish and
    /// their results are dropped.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Whether the exchange task has stopped accepting commands
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    async fn request<T>(&self, make: impl FnOnce(Reply<T>) -> Command) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(make(reply))
            .await
            .map_err(|_| Error::Closed)?;
        let verdict = rx.await.map_err(|_| Error::Closed)?;
        Ok(verdict?)
    }
}

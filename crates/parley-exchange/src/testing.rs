//! Test backends and helpers

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use parley_ai::{GeneratedArtifact, GenerationBackend};
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::events::ExchangeEvent;

/// Backend that answers from a canned list, then with "done".
pub(crate) struct ScriptedBackend {
    responses: Mutex<Vec<parley_ai::Result<GeneratedArtifact>>>,
}

impl ScriptedBackend {
    pub(crate) fn new(responses: Vec<parley_ai::Result<GeneratedArtifact>>) -> Self {
        Self {
            responses: Mutex::new(responses),
        }
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, _prompt: &str) -> parley_ai::Result<GeneratedArtifact> {
        let mut responses = self.responses.lock();
        if responses.is_empty() {
            Ok(GeneratedArtifact::text("done"))
        } else {
            responses.remove(0)
        }
    }
}

/// A backend call held open until the test answers it
pub(crate) struct PendingCall {
    pub(crate) prompt: String,
    respond: oneshot::Sender<parley_ai::Result<GeneratedArtifact>>,
}

impl PendingCall {
    pub(crate) fn respond(self, result: parley_ai::Result<GeneratedArtifact>) {
        let _ = self.respond.send(result);
    }
}

/// Backend whose calls block until the test responds to them.
pub(crate) struct GatedBackend {
    calls: mpsc::UnboundedSender<PendingCall>,
}

impl GatedBackend {
    pub(crate) fn new() -> (Self, mpsc::UnboundedReceiver<PendingCall>) {
        let (calls, rx) = mpsc::unbounded_channel();
        (Self { calls }, rx)
    }
}

#[async_trait]
impl GenerationBackend for GatedBackend {
    fn name(&self) -> &str {
        "gated"
    }

    async fn generate(&self, prompt: &str) -> parley_ai::Result<GeneratedArtifact> {
        let (respond, rx) = oneshot::channel();
        let call = PendingCall {
            prompt: prompt.to_string(),
            respond,
        };
        if self.calls.send(call).is_err() {
            return Err(parley_ai::Error::Backend("test harness gone".into()));
        }
        rx.await
            .unwrap_or_else(|_| Err(parley_ai::Error::Backend("call dropped".into())))
    }
}

/// Receive events until one matches, failing the test after a second.
pub(crate) async fn next_matching(
    events: &mut broadcast::Receiver<ExchangeEvent>,
    pred: impl Fn(&ExchangeEvent) -> bool,
) -> ExchangeEvent {
    tokio::time::timeout(Duration::from_secs(1), async {
        loop {
            let event = events.recv().await.expect("event channel closed");
            if pred(&event) {
                return event;
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}

//! The exchange runtime: one task that owns the controller

use std::sync::Arc;

use parley_ai::{BoxedBackend, GeneratedArtifact};
use tokio::sync::{broadcast, mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    controller::{ExchangeController, Resolution},
    events::ExchangeEvent,
    handle::{Command, ExchangeHandle},
    state::RequestId,
};

/// Outcome of one backend call, routed back to the exchange task
struct Completion {
    request: RequestId,
    result: parley_ai::Result<GeneratedArtifact>,
}

/// Drives an [`ExchangeController`] from a single task.
///
/// Commands from [`ExchangeHandle`]s and backend completions are processed
/// strictly one at a time. Backend calls run in their own tasks so the
/// exchange stays responsive to interrupts while a request is in flight.
pub struct Exchange {
    id: Uuid,
    controller: ExchangeController,
    backend: BoxedBackend,
    commands: mpsc::Receiver<Command>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    snapshots: watch::Sender<crate::state::Snapshot>,
    events: broadcast::Sender<ExchangeEvent>,
    shutdown: CancellationToken,
}

impl Exchange {
    /// Maximum number of queued commands
    const COMMAND_CAPACITY: usize = 32;
    /// Event buffer per subscriber
    const EVENT_CAPACITY: usize = 256;

    /// Build an exchange without starting it
    pub fn new(controller: ExchangeController, backend: BoxedBackend) -> (Self, ExchangeHandle) {
        let id = Uuid::new_v4();
        let (commands_tx, commands) = mpsc::channel(Self::COMMAND_CAPACITY);
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (snapshots, snapshots_rx) = watch::channel(controller.snapshot());
        let (events, _) = broadcast::channel(Self::EVENT_CAPACITY);
        let shutdown = CancellationToken::new();

        let handle = ExchangeHandle {
            id,
            commands: commands_tx,
            snapshots: snapshots_rx,
            events: events.clone(),
            shutdown: shutdown.clone(),
        };

        let exchange = Self {
            id,
            controller,
            backend,
            commands,
            completions_tx,
            completions_rx,
            snapshots,
            events,
            shutdown,
        };

        (exchange, handle)
    }

    /// Start an exchange on the current tokio runtime
    pub fn spawn(controller: ExchangeController, backend: BoxedBackend) -> ExchangeHandle {
        let (exchange, handle) = Self::new(controller, backend);
        tokio::spawn(exchange.run());
        handle
    }

    /// Process commands and completions until shutdown or until every handle
    /// is dropped.
    pub async fn run(self) {
        let span = tracing::info_span!("exchange", id = %self.id);
        self.run_loop().instrument(span).await
    }

    async fn run_loop(mut self) {
        tracing::debug!("exchange started with {} backend", self.backend.name());

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => break,

                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },

                Some(completion) = self.completions_rx.recv() => {
                    self.handle_completion(completion);
                }
            }
        }

        tracing::debug!("exchange stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Submit { content, reply } => {
                let result = match content {
                    Some(content) => self.controller.submit(&content),
                    None => self.controller.submit_draft(),
                };
                let verdict = match result {
                    Ok(submission) => {
                        let request = submission.request;
                        self.dispatch(request, submission.prompt);
                        self.publish(Some(ExchangeEvent::Submitted {
                            request,
                            turn: submission.turn,
                        }));
                        Ok(request)
                    }
                    Err(rejection) => {
                        tracing::debug!("submission rejected: {}", rejection);
                        Err(rejection)
                    }
                };
                let _ = reply.send(verdict);
            }

            Command::SetDraft { text, reply } => {
                self.controller.set_draft(text);
                self.publish(None);
                let _ = reply.send(Ok(()));
            }

            Command::Interrupt { kind, reply } => {
                let verdict = self.controller.interrupt(kind);
                match &verdict {
                    Ok(request) => {
                        tracing::info!("{} interrupted ({})", request, kind.name());
                        self.publish(Some(ExchangeEvent::Interrupted {
                            request: *request,
                            kind,
                        }));
                    }
                    Err(rejection) => tracing::debug!("{} rejected: {}", kind.name(), rejection),
                }
                let _ = reply.send(verdict);
            }

            Command::Reset { reply } => {
                let verdict = self.controller.reset();
                if verdict.is_ok() {
                    self.publish(Some(ExchangeEvent::Reset));
                }
                let _ = reply.send(verdict);
            }

            Command::Clear { reply } => {
                let verdict = self.controller.clear();
                if verdict.is_ok() {
                    self.publish(Some(ExchangeEvent::Cleared));
                }
                let _ = reply.send(verdict);
            }

            Command::Refine { tag, reply } => {
                let verdict = self.controller.refine(tag).cloned();
                if let Ok(artifact) = &verdict {
                    self.publish(Some(ExchangeEvent::Refined {
                        artifact: artifact.clone(),
                    }));
                }
                let _ = reply.send(verdict);
            }
        }
    }

    fn handle_completion(&mut self, completion: Completion) {
        let Completion { request, result } = completion;
        let backend_reported = result.as_ref().err().map(|e| e.is_backend_reported());

        let event = match self.controller.on_generation_result(request, result) {
            Resolution::Completed { turn, artifact } => {
                tracing::info!("{} completed ({} artifact)", request, artifact.kind().name());
                ExchangeEvent::Responded {
                    request,
                    turn,
                    artifact,
                }
            }
            Resolution::Failed { turn, message } => {
                tracing::warn!(
                    backend_reported = backend_reported.unwrap_or(false),
                    "{} failed: {}",
                    request,
                    message
                );
                ExchangeEvent::Failed {
                    request,
                    turn,
                    message,
                }
            }
            Resolution::Discarded => {
                tracing::debug!("{} result arrived after interrupt, discarded", request);
                ExchangeEvent::Discarded { request }
            }
        };

        self.publish(Some(event));
    }

    /// Run the backend for `request` in its own task.
    fn dispatch(&self, request: RequestId, prompt: String) {
        let backend = Arc::clone(&self.backend);
        let completions = self.completions_tx.clone();
        tracing::info!("dispatching {} to {} backend", request, backend.name());

        let call = async move {
            let result = backend.generate(&prompt).await;
            // Send fails only if the exchange is gone
            let _ = completions.send(Completion { request, result });
        };
        tokio::spawn(call.instrument(tracing::debug_span!("generate", %request)));
    }

    /// Publish the current snapshot, then the event.
    fn publish(&self, event: Option<ExchangeEvent>) {
        self.snapshots.send_replace(self.controller.snapshot());
        if let Some(event) = event {
            let _ = self.events.send(event);
        }
    }
}

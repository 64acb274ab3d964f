//! Line-mode interactive session

use std::io::Write;
use std::time::Duration;

use futures::StreamExt;
use parley_ai::ArtifactKind;
use parley_exchange::{ExchangeEvent, ExchangeHandle, RequestId};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::{BroadcastStream, errors::BroadcastStreamRecvError};

use crate::commands::{self, CommandResult, Defaults};
use crate::render;

/// Upper bound on flushing the last events after the exchange stops
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Prompt of a submitted brief and the artifact kind it asked for
type BriefExpectation = (String, ArtifactKind);

pub async fn run(
    handle: ExchangeHandle,
    defaults: Defaults,
    backend_name: &str,
) -> anyhow::Result<()> {
    let interactive = std::io::IsTerminal::is_terminal(&std::io::stdin());

    if std::io::IsTerminal::is_terminal(&std::io::stderr()) {
        eprintln!("parley ({} backend)", backend_name);
        eprintln!("Type /help for commands.");
        eprintln!();
    }

    // Responses arrive while the prompt is waiting for input
    let (briefs_tx, briefs_rx) = mpsc::unbounded_channel();
    let renderer = spawn_renderer(handle.subscribe(), briefs_rx, std::io::stdout());

    let input = BufReader::new(tokio::io::stdin());
    let result = read_commands(&handle, input, defaults, &briefs_tx, interactive).await;

    finish(handle, renderer).await;
    result
}

/// Print the outcome of a handle action. Rejections are shown to the user and
/// are not fatal.
fn report<T>(result: parley_exchange::Result<T>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(parley_exchange::Error::Rejected(rejection)) => {
            println!("{}", rejection);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Run slash commands and prompts from `input` until EOF or `/quit`.
async fn read_commands(
    handle: &ExchangeHandle,
    input: impl AsyncBufRead + Unpin,
    defaults: Defaults,
    briefs: &mpsc::UnboundedSender<BriefExpectation>,
    show_prompt: bool,
) -> anyhow::Result<()> {
    let mut lines = input.lines();

    loop {
        if show_prompt {
            print!("> ");
            std::io::stdout().flush()?;
        }

        let Some(input) = lines.next_line().await? else {
            // EOF
            break;
        };

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        let Some(result) = commands::execute_command(input, defaults) else {
            report(handle.submit(input).await)?;
            continue;
        };

        match result {
            CommandResult::Brief(brief) => {
                let prompt = brief.to_prompt();
                println!("you: {}", prompt);
                let _ = briefs.send((prompt.clone(), brief.kind.artifact_kind()));
                report(handle.submit(prompt).await)?;
            }
            CommandResult::Interrupt(kind) => {
                report(handle.interrupt(kind).await)?;
            }
            CommandResult::Reset => {
                report(handle.reset().await)?;
            }
            CommandResult::Clear => {
                report(handle.clear().await)?;
            }
            CommandResult::Refine(tag) => {
                report(handle.refine(tag).await)?;
            }
            CommandResult::History => {
                println!("{}", render::format_history(&handle.snapshot().turns));
            }
            CommandResult::Artifact => {
                let snapshot = handle.snapshot();
                println!("{}", render::format_artifact(snapshot.current_artifact.as_ref()));
            }
            CommandResult::Message(msg) => {
                println!("{}", msg);
            }
            CommandResult::Exit => {
                break;
            }
            CommandResult::Unknown(cmd) => {
                println!("Unknown command: /{}", cmd);
                println!("Type /help for available commands.");
            }
        }
    }

    Ok(())
}

/// Wait out a response still in flight, stop the exchange and let the
/// renderer print everything it was sent.
async fn finish(handle: ExchangeHandle, renderer: JoinHandle<()>) {
    match handle.wait_for_idle().await {
        Ok(snapshot) => tracing::debug!("exiting in state {}", snapshot.state.name()),
        Err(e) => tracing::debug!("exiting: {}", e),
    }

    // The event stream ends once the exchange task drops the last sender
    handle.shutdown();
    drop(handle);

    if tokio::time::timeout(DRAIN_TIMEOUT, renderer).await.is_err() {
        tracing::warn!("renderer still busy after {:?}, exiting anyway", DRAIN_TIMEOUT);
    }
}

fn spawn_renderer<W>(
    events: broadcast::Receiver<ExchangeEvent>,
    briefs: mpsc::UnboundedReceiver<BriefExpectation>,
    out: W,
) -> JoinHandle<()>
where
    W: Write + Send + 'static,
{
    let mut renderer = Renderer::new(briefs, out);
    let mut events = BroadcastStream::new(events);

    tokio::spawn(async move {
        while let Some(item) = events.next().await {
            match item {
                Ok(event) => {
                    if let Err(e) = renderer.show(&event) {
                        tracing::debug!("renderer output closed: {}", e);
                        break;
                    }
                }
                Err(BroadcastStreamRecvError::Lagged(n)) => {
                    tracing::warn!("renderer skipped {} events", n);
                }
            }
        }
    })
}

/// Prints events and flags brief responses of the wrong kind
struct Renderer<W> {
    briefs: mpsc::UnboundedReceiver<BriefExpectation>,
    expected: Option<(RequestId, ArtifactKind)>,
    out: W,
}

impl<W: Write> Renderer<W> {
    fn new(briefs: mpsc::UnboundedReceiver<BriefExpectation>, out: W) -> Self {
        Self {
            briefs,
            expected: None,
            out,
        }
    }

    fn show(&mut self, event: &ExchangeEvent) -> std::io::Result<()> {
        // Briefs are queued before their submission, so the matching entry is
        // already here when its Submitted event arrives.
        if let ExchangeEvent::Submitted { request, turn } = event {
            self.expected = None;
            while let Ok((prompt, kind)) = self.briefs.try_recv() {
                if prompt == turn.content {
                    self.expected = Some((*request, kind));
                }
            }
        }

        if let Some(line) = render::format_event(event) {
            writeln!(self.out, "{}", line)?;
        }

        if event.settles_request() {
            let expected = self.expected.take();
            if let (ExchangeEvent::Responded { request, artifact, .. }, Some((for_request, kind))) =
                (event, expected)
            {
                if *request == for_request {
                    if let Some(note) = render::kind_mismatch(kind, artifact) {
                        tracing::warn!("{}: {}", request, note);
                        writeln!(self.out, "{}", note)?;
                    }
                }
            }
        }

        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use parking_lot::Mutex;
    use parley_ai::{GeneratedArtifact, providers::EchoBackend};
    use parley_exchange::{Exchange, ExchangeController, Role, Turn};

    /// Writer whose contents the test can read back
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Feed `input` through a full session against an echo backend and
    /// return everything the renderer printed.
    async fn session(input: &str, delay: Duration) -> String {
        let handle = Exchange::spawn(
            ExchangeController::new(),
            Arc::new(EchoBackend::new(delay)),
        );
        let out = SharedBuf::default();
        let (briefs_tx, briefs_rx) = mpsc::unbounded_channel();
        let renderer = spawn_renderer(handle.subscribe(), briefs_rx, out.clone());

        read_commands(&handle, input.as_bytes(), Defaults::default(), &briefs_tx, false)
            .await
            .unwrap();
        finish(handle, renderer).await;
        out.text()
    }

    fn user_turn(content: &str) -> Turn {
        Turn {
            role: Role::User,
            content: content.into(),
            sequence: 0,
            timestamp: 0,
            is_error: false,
        }
    }

    #[tokio::test]
    async fn test_reply_pending_at_eof_is_printed() {
        let out = session("hello\n", Duration::from_millis(50)).await;
        assert!(
            out.contains("agent: Chatbot: I received your message - \"hello\""),
            "output was: {:?}",
            out
        );
    }

    #[tokio::test]
    async fn test_reply_pending_at_quit_is_printed() {
        let out = session("hello\n/quit\nignored\n", Duration::from_millis(50)).await;
        assert!(out.contains("agent: Chatbot: I received your message - \"hello\""));
        assert!(!out.contains("ignored"));
    }

    #[tokio::test]
    async fn test_instant_replies_are_never_dropped() {
        for _ in 0..20 {
            let out = session("hello\n", Duration::ZERO).await;
            assert_eq!(out.lines().filter(|l| l.contains("agent: ")).count(), 1);
        }
    }

    #[tokio::test]
    async fn test_meme_brief_answered_with_text_is_flagged() {
        let out = session("/brief meme instagram our spring sale\n", Duration::ZERO).await;
        assert!(out.contains("agent: Chatbot: I received your message"));
        assert!(out.contains("asked for composite content, got text"), "output was: {:?}", out);
    }

    #[tokio::test]
    async fn test_text_brief_answered_with_text_is_not_flagged() {
        let out = session("/brief text our spring sale\n", Duration::ZERO).await;
        assert!(out.contains("agent: Chatbot: I received your message"));
        assert!(!out.contains("asked for"));
    }

    #[test]
    fn test_expectation_only_applies_to_matching_submission() {
        let (briefs_tx, briefs_rx) = mpsc::unbounded_channel();
        let out = SharedBuf::default();
        let mut renderer = Renderer::new(briefs_rx, out.clone());

        // Brief that never got submitted (rejected as busy)
        briefs_tx
            .send(("Generate a video".into(), ArtifactKind::Video))
            .unwrap();

        renderer
            .show(&ExchangeEvent::Submitted {
                request: RequestId(3),
                turn: user_turn("plain prompt"),
            })
            .unwrap();
        renderer
            .show(&ExchangeEvent::Responded {
                request: RequestId(3),
                turn: user_turn("reply"),
                artifact: GeneratedArtifact::text("reply"),
            })
            .unwrap();

        assert!(!out.text().contains("asked for"));
    }

    #[tokio::test]
    async fn test_rejection_is_reported_not_fatal() {
        let handle = Exchange::spawn(
            ExchangeController::new(),
            Arc::new(EchoBackend::new(Duration::ZERO)),
        );
        assert_eq!(report(handle.submit("   ").await).unwrap(), None);
        assert_eq!(report(handle.reset().await).unwrap(), Some(()));
        handle.shutdown();
    }
}

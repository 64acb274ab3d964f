//! Plain-text rendering of turns, artifacts and exchange events

use parley_ai::{ArtifactKind, GeneratedArtifact};
use parley_exchange::{ExchangeEvent, InterruptKind, Role, Turn};

use crate::utils::{clock_time, truncate_chars};

/// Longest artifact preview printed after a refinement
const PREVIEW_CHARS: usize = 200;

pub fn role_label(turn: &Turn) -> &'static str {
    match (turn.role, turn.is_error) {
        (Role::User, _) => "you",
        (Role::Agent, false) => "agent",
        (Role::Agent, true) => "error",
    }
}

pub fn format_turn(turn: &Turn) -> String {
    format!(
        "[{}] {}: {}",
        clock_time(turn.timestamp),
        role_label(turn),
        turn.content
    )
}

pub fn format_history(turns: &[Turn]) -> String {
    if turns.is_empty() {
        return "No messages yet.".to_string();
    }
    turns
        .iter()
        .map(|t| format!("{:>3}  {}", t.sequence, format_turn(t)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_artifact(artifact: Option<&GeneratedArtifact>) -> String {
    let Some(artifact) = artifact else {
        return "Nothing has been generated yet.".to_string();
    };

    let mut header = format!("{} artifact, revision {}", artifact.kind().name(), artifact.revision);
    if let Some(tag) = artifact.refinement {
        header.push_str(&format!(" ({})", tag));
    }
    format!("{}\n{}", header, artifact.render())
}

/// Note shown when a brief asked for one kind of content and the backend
/// produced another
pub fn kind_mismatch(expected: ArtifactKind, artifact: &GeneratedArtifact) -> Option<String> {
    let actual = artifact.kind();
    if actual == expected {
        return None;
    }
    Some(format!(
        "[asked for {} content, got {}]",
        expected.name(),
        actual.name()
    ))
}

fn interrupt_notice(kind: InterruptKind) -> &'static str {
    match kind {
        InterruptKind::Stop => "Stopped. The response will be ignored.",
        InterruptKind::Pause => "Paused. The response will be ignored.",
        InterruptKind::Cancel => "Cancelled. Use /reset to start over.",
    }
}

/// Line printed for an event, if any. User turns are not echoed back since
/// the user just typed them.
pub fn format_event(event: &ExchangeEvent) -> Option<String> {
    match event {
        ExchangeEvent::Submitted { .. } => None,
        ExchangeEvent::Responded { turn, .. } | ExchangeEvent::Failed { turn, .. } => {
            Some(format_turn(turn))
        }
        ExchangeEvent::Interrupted { kind, .. } => Some(format!("[{}]", interrupt_notice(*kind))),
        ExchangeEvent::Discarded { request } => {
            tracing::debug!("late response for {} ignored", request);
            None
        }
        ExchangeEvent::Refined { artifact } => Some(format!(
            "[refined {} -> revision {}] {}",
            artifact
                .refinement
                .map(|t| t.to_string())
                .unwrap_or_default(),
            artifact.revision,
            truncate_chars(&artifact.render(), PREVIEW_CHARS)
        )),
        ExchangeEvent::Reset => Some("[Reset. History and generated content cleared.]".to_string()),
        ExchangeEvent::Cleared => Some("[Cleared conversation.]".to_string()),
    }
}

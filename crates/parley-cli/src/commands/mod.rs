//! Slash commands for interactive mode

mod brief;
mod refine;

pub use brief::BriefCommand;
pub use refine::RefineCommand;

use parley_ai::{ContentBrief, Platform, RefinementTag, Tone};
use parley_exchange::InterruptKind;

/// Defaults applied to commands that leave options out
#[derive(Debug, Clone, Copy, Default)]
pub struct Defaults {
    pub tone: Tone,
    pub platform: Platform,
}

/// Result of executing a slash command
#[derive(Debug, PartialEq)]
pub enum CommandResult {
    /// Submit the prompt rendered from a content brief
    Brief(ContentBrief),
    /// Stop, pause or cancel the pending response
    Interrupt(InterruptKind),
    /// Full reset
    Reset,
    /// Clear the conversation
    Clear,
    /// Refine the current artifact
    Refine(RefinementTag),
    /// Print the exchange history
    History,
    /// Print the current artifact
    Artifact,
    /// Show a message to the user (not sent to the backend)
    Message(String),
    /// Exit the application
    Exit,
    /// Unknown command
    Unknown(String),
}

/// Parse and execute a slash command
pub fn execute_command(input: &str, defaults: Defaults) -> Option<CommandResult> {
    let input = input.trim();

    let rest = input.strip_prefix('/')?;
    let parts: Vec<&str> = rest.splitn(2, char::is_whitespace).collect();
    let command = parts[0].to_lowercase();
    let args = parts.get(1).map(|s| s.trim()).unwrap_or("");

    Some(match command.as_str() {
        "help" | "h" | "?" => CommandResult::Message(help_message()),

        "stop" => CommandResult::Interrupt(InterruptKind::Stop),

        "pause" | "p" => CommandResult::Interrupt(InterruptKind::Pause),

        "cancel" => CommandResult::Interrupt(InterruptKind::Cancel),

        "reset" => CommandResult::Reset,

        "clear" | "c" => CommandResult::Clear,

        "refine" | "r" => RefineCommand::execute(args, defaults.tone),

        "brief" | "b" => BriefCommand::execute(args, defaults),

        "history" => CommandResult::History,

        "artifact" | "a" => CommandResult::Artifact,

        "quit" | "exit" | "q" => CommandResult::Exit,

        _ => CommandResult::Unknown(command),
    })
}

fn help_message() -> String {
    r#"Available commands:
  /help, /h, /?          Show this help message
  /stop                  Drop the pending response, keep history
  /pause, /p             Drop the pending response, keep history
  /cancel                Drop the pending response and require /reset
  /reset                 Wipe history and generated content
  /clear, /c             Clear conversation history
  /refine, /r [tag]      Refine the current artifact (shorten, changeTone[:tone])
  /brief, /b [opts] idea Generate content from a brief
  /history               Show the exchange history
  /artifact, /a          Show the current artifact
  /quit, /exit, /q       Exit parley

Examples:
  /refine shorten        Truncate the current text
  /refine changeTone:casual
  /brief meme instagram humorous our spring sale
  /brief launch day is tomorrow"#
        .to_string()
}

//! /brief command - build a generation prompt from a content brief

use super::{CommandResult, Defaults};
use parley_ai::{BriefKind, ContentBrief, Platform, Tone};

pub struct BriefCommand;

impl BriefCommand {
    /// Leading words that name a kind, platform or tone set that option, in
    /// any order. Everything after them is the idea.
    pub fn execute(args: &str, defaults: Defaults) -> CommandResult {
        let brief = parse_brief(args, defaults);
        if brief.to_prompt().is_empty() {
            return CommandResult::Message(usage());
        }
        CommandResult::Brief(brief)
    }
}

fn parse_brief(args: &str, defaults: Defaults) -> ContentBrief {
    let mut kind = None;
    let mut platform = None;
    let mut tone = None;

    let mut rest = args.trim_start();
    while let Some(word) = rest.split_whitespace().next() {
        match (
            word.parse::<BriefKind>().ok(),
            word.parse::<Platform>().ok(),
            word.parse::<Tone>().ok(),
        ) {
            (Some(k), _, _) if kind.is_none() => kind = Some(k),
            (_, Some(p), _) if platform.is_none() => platform = Some(p),
            (_, _, Some(t)) if tone.is_none() => tone = Some(t),
            _ => break,
        }
        rest = rest[word.len()..].trim_start();
    }

    ContentBrief::new(rest)
        .with_kind(kind.unwrap_or_default())
        .with_platform(platform.unwrap_or(defaults.platform))
        .with_tone(tone.unwrap_or(defaults.tone))
}

fn usage() -> String {
    let kinds = ["text", "image", "video", "meme"].join(", ");
    let platforms = ["twitter", "facebook", "linkedin", "instagram"].join(", ");
    let tones: Vec<&str> = Tone::ALL.iter().map(|t| t.name()).collect();

    format!(
        "Usage: /brief [kind] [platform] [tone] <idea>\n\n  kinds:     {}\n  platforms: {}\n  tones:     {}",
        kinds,
        platforms,
        tones.join(", ")
    )
}

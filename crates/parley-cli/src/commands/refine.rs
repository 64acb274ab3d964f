//! /refine command - derive a new artifact from the current one

use super::CommandResult;
use parley_ai::{RefinementTag, Tone};

pub struct RefineCommand;

impl RefineCommand {
    pub fn execute(args: &str, default_tone: Tone) -> CommandResult {
        if args.is_empty() {
            return CommandResult::Message(show_refinements(default_tone));
        }

        match parse_tag(args, default_tone) {
            Some(tag) => CommandResult::Refine(tag),
            None => CommandResult::Message(format!(
                "Unknown refinement: '{}'\nValid refinements: shorten, changeTone[:tone]",
                args
            )),
        }
    }
}

fn show_refinements(default_tone: Tone) -> String {
    let mut output = String::from("Refinements:\n\n");
    output.push_str(&format!(
        "  {:<26} {}\n",
        "shorten", "Cut text down to a short prefix"
    ));

    for tone in Tone::ALL {
        let marker = if tone == default_tone { " *" } else { "" };
        output.push_str(&format!(
            "  {:<26} Rewrite in a {} tone{}\n",
            format!("changeTone:{}", tone),
            tone,
            marker
        ));
    }

    output.push_str("\nApply with: /refine <tag>");
    output
}

/// `changeTone` without a tone picks up the configured default. A space works
/// as well as a colon between the name and the tone.
fn parse_tag(args: &str, default_tone: Tone) -> Option<RefinementTag> {
    let normalized = match args.split_once(char::is_whitespace) {
        Some((name, tone)) => format!("{}:{}", name, tone.trim()),
        None => args.to_string(),
    };

    match normalized.parse::<RefinementTag>().ok()? {
        RefinementTag::ChangeTone(_) if !normalized.contains(':') => {
            Some(RefinementTag::ChangeTone(default_tone))
        }
        tag => Some(tag),
    }
}

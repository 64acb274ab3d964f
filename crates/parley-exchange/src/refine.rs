//! Pure refinement of generated artifacts

use parley_ai::{GeneratedArtifact, RefinementTag, Tone};

/// Longest text prefix kept by `shorten`, in characters
pub const SHORTEN_MAX_CHARS: usize = 40;

/// Appended to shortened text
pub const TRUNCATION_MARKER: &str = "...";

const CASUAL_PREFIX: &str = "Hey! ";
const INFORMATIVE_PREFIX: &str = "FYI: ";
const HUMOROUS_SUFFIX: &str = " ;)";

/// Derive a new artifact from `artifact` by applying `tag`.
///
/// The input is never modified. Artifacts without a text part come back with
/// the same payload, the new tag and the next revision.
pub fn refine(artifact: &GeneratedArtifact, tag: RefinementTag) -> GeneratedArtifact {
    let payload = match artifact.text_content() {
        Some(text) => {
            let refined = match tag {
                RefinementTag::Shorten => shorten(text),
                RefinementTag::ChangeTone(tone) => change_tone(text, tone),
            };
            artifact.payload.with_text(refined)
        }
        None => artifact.payload.clone(),
    };

    GeneratedArtifact {
        payload,
        refinement: Some(tag),
        revision: artifact.revision + 1,
    }
}

fn shorten(text: &str) -> String {
    let mut chars = text.chars();
    let prefix: String = chars.by_ref().take(SHORTEN_MAX_CHARS).collect();
    if chars.next().is_none() {
        return prefix;
    }
    format!("{}{}", prefix.trim_end(), TRUNCATION_MARKER)
}

/// Re-render `text` in `tone`, replacing any earlier tone decoration.
///
/// Professional output has no marker to strip: its capital letter and added
/// period stay in the text through later tone changes.
fn change_tone(text: &str, tone: Tone) -> String {
    let base = strip_tone(text.trim());
    if base.is_empty() {
        return String::new();
    }

    match tone {
        Tone::Casual => format!("{}{}", CASUAL_PREFIX, base),
        Tone::Professional => professional(base),
        Tone::Humorous => format!("{}{}", base, HUMOROUS_SUFFIX),
        Tone::Informative => format!("{}{}", INFORMATIVE_PREFIX, base),
    }
}

/// Remove the casual, informative and humorous decorations.
fn strip_tone(text: &str) -> &str {
    let text = text
        .strip_prefix(CASUAL_PREFIX)
        .or_else(|| text.strip_prefix(INFORMATIVE_PREFIX))
        .unwrap_or(text);
    text.strip_suffix(HUMOROUS_SUFFIX).unwrap_or(text)
}

/// Capitalized, with terminal punctuation
fn professional(text: &str) -> String {
    let mut chars = text.chars();
    let mut out = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => return String::new(),
    };
    if !out.ends_with(['.', '!', '?']) {
        out.push('.');
    }
    out
}

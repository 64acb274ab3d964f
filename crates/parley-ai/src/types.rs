//! Core types for generated content

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Kind of a generated artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Text,
    Image,
    Video,
    Composite,
}

impl ArtifactKind {
    pub fn name(&self) -> &'static str {
        match self {
            ArtifactKind::Text => "text",
            ArtifactKind::Image => "image",
            ArtifactKind::Video => "video",
            ArtifactKind::Composite => "composite",
        }
    }
}

/// Kind of a media attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// A media attachment referenced by URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    pub kind: MediaKind,
    pub url: String,
}

impl Media {
    pub fn image(url: impl Into<String>) -> Self {
        Self {
            kind: MediaKind::Image,
            url: url.into(),
        }
    }

    pub fn video(url: impl Into<String>) -> Self {
        Self {
            kind: MediaKind::Video,
            url: url.into(),
        }
    }
}

/// Artifact payload. The artifact kind is derived from the variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Payload {
    Text { text: String },
    Image { url: String },
    Video { url: String },
    Composite {
        text: Option<String>,
        media: Vec<Media>,
    },
}

impl Payload {
    /// Build the narrowest payload that holds `text` and `media`.
    pub fn from_parts(text: Option<String>, mut media: Vec<Media>) -> Self {
        match (text, media.len()) {
            (Some(text), 0) => Payload::Text { text },
            (None, 0) => Payload::Text {
                text: String::new(),
            },
            (None, 1) => {
                let Media { kind, url } = media.remove(0);
                match kind {
                    MediaKind::Image => Payload::Image { url },
                    MediaKind::Video => Payload::Video { url },
                }
            }
            (text, _) => Payload::Composite { text, media },
        }
    }

    pub fn kind(&self) -> ArtifactKind {
        match self {
            Payload::Text { .. } => ArtifactKind::Text,
            Payload::Image { .. } => ArtifactKind::Image,
            Payload::Video { .. } => ArtifactKind::Video,
            Payload::Composite { .. } => ArtifactKind::Composite,
        }
    }

    /// Text part of the payload, if any
    pub fn text(&self) -> Option<&str> {
        match self {
            Payload::Text { text } => Some(text),
            Payload::Composite { text, .. } => text.as_deref(),
            Payload::Image { .. } | Payload::Video { .. } => None,
        }
    }

    /// Copy of this payload with its text part replaced. Payloads without a
    /// text part are returned unchanged.
    pub fn with_text(&self, new_text: String) -> Self {
        match self {
            Payload::Text { .. } => Payload::Text { text: new_text },
            Payload::Composite { text: Some(_), media } => Payload::Composite {
                text: Some(new_text),
                media: media.clone(),
            },
            other => other.clone(),
        }
    }
}

/// Content produced by a generation step, or derived from one by refinement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedArtifact {
    pub payload: Payload,
    /// Tag of the refinement that produced this artifact
    #[serde(default)]
    pub refinement: Option<RefinementTag>,
    /// 0 for generated artifacts, parent revision + 1 for refinements
    #[serde(default)]
    pub revision: u32,
}

impl GeneratedArtifact {
    pub fn new(payload: Payload) -> Self {
        Self {
            payload,
            refinement: None,
            revision: 0,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(Payload::Text { text: text.into() })
    }

    pub fn kind(&self) -> ArtifactKind {
        self.payload.kind()
    }

    pub fn text_content(&self) -> Option<&str> {
        self.payload.text()
    }

    /// Plain-text rendering used for the agent turn in the exchange history.
    pub fn render(&self) -> String {
        let media_line = |kind: MediaKind, url: &str| match kind {
            MediaKind::Image => format!("[image] {}", url),
            MediaKind::Video => format!("[video] {}", url),
        };

        match &self.payload {
            Payload::Text { text } => text.clone(),
            Payload::Image { url } => media_line(MediaKind::Image, url),
            Payload::Video { url } => media_line(MediaKind::Video, url),
            Payload::Composite { text, media } => {
                let mut lines: Vec<String> = text.iter().cloned().collect();
                lines.extend(media.iter().map(|m| media_line(m.kind, &m.url)));
                lines.join("\n")
            }
        }
    }
}

/// Response tone offered by the content generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Casual,
    #[default]
    Professional,
    Humorous,
    Informative,
}

impl Tone {
    pub const ALL: [Tone; 4] = [
        Tone::Casual,
        Tone::Professional,
        Tone::Humorous,
        Tone::Informative,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Tone::Casual => "casual",
            Tone::Professional => "professional",
            Tone::Humorous => "humorous",
            Tone::Informative => "informative",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tone {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "casual" => Ok(Tone::Casual),
            "professional" | "pro" => Ok(Tone::Professional),
            "humorous" | "funny" => Ok(Tone::Humorous),
            "informative" | "info" => Ok(Tone::Informative),
            _ => Err(Error::unknown("tone", s)),
        }
    }
}

/// Refinement applied to an existing artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "tag", content = "tone", rename_all = "camelCase")]
pub enum RefinementTag {
    /// Truncate text to a bounded prefix with a truncation marker
    Shorten,
    /// Re-render text in the given tone
    ChangeTone(Tone),
}

impl fmt::Display for RefinementTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefinementTag::Shorten => f.write_str("shorten"),
            RefinementTag::ChangeTone(tone) => write!(f, "changeTone:{}", tone),
        }
    }
}

impl FromStr for RefinementTag {
    type Err = Error;

    /// Accepts `shorten`, `changeTone` and `changeTone:<tone>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (name, tone) = match s.split_once(':') {
            Some((name, tone)) => (name, Some(tone)),
            None => (s, None),
        };

        match (name.to_lowercase().as_str(), tone) {
            ("shorten", None) => Ok(RefinementTag::Shorten),
            ("changetone" | "change-tone" | "tone", None) => {
                Ok(RefinementTag::ChangeTone(Tone::default()))
            }
            ("changetone" | "change-tone" | "tone", Some(tone)) => {
                Ok(RefinementTag::ChangeTone(tone.parse()?))
            }
            _ => Err(Error::unknown("refinement", s)),
        }
    }
}

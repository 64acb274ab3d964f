//! Content briefs for the social-media generator

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::types::{ArtifactKind, Tone};

/// Target platform for generated content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Twitter,
    Facebook,
    LinkedIn,
    Instagram,
}

impl Platform {
    pub fn name(&self) -> &'static str {
        match self {
            Platform::Twitter => "Twitter",
            Platform::Facebook => "Facebook",
            Platform::LinkedIn => "LinkedIn",
            Platform::Instagram => "Instagram",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "twitter" | "x" => Ok(Platform::Twitter),
            "facebook" | "fb" => Ok(Platform::Facebook),
            "linkedin" => Ok(Platform::LinkedIn),
            "instagram" | "ig" => Ok(Platform::Instagram),
            _ => Err(Error::unknown("platform", s)),
        }
    }
}

/// Kind of content requested in a brief
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BriefKind {
    #[default]
    Text,
    Image,
    Video,
    Meme,
}

impl BriefKind {
    pub fn name(&self) -> &'static str {
        match self {
            BriefKind::Text => "text",
            BriefKind::Image => "image",
            BriefKind::Video => "video",
            BriefKind::Meme => "meme",
        }
    }

    /// Artifact kind a backend is expected to produce for this brief.
    /// A meme is an image with a caption.
    pub fn artifact_kind(&self) -> ArtifactKind {
        match self {
            BriefKind::Text => ArtifactKind::Text,
            BriefKind::Image => ArtifactKind::Image,
            BriefKind::Video => ArtifactKind::Video,
            BriefKind::Meme => ArtifactKind::Composite,
        }
    }
}

impl FromStr for BriefKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(BriefKind::Text),
            "image" => Ok(BriefKind::Image),
            "video" => Ok(BriefKind::Video),
            "meme" => Ok(BriefKind::Meme),
            _ => Err(Error::unknown("content kind", s)),
        }
    }
}

/// What the user asked the generator for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBrief {
    pub idea: String,
    pub kind: BriefKind,
    pub tone: Tone,
    pub platform: Platform,
}

impl ContentBrief {
    pub fn new(idea: impl Into<String>) -> Self {
        Self {
            idea: idea.into(),
            kind: BriefKind::default(),
            tone: Tone::default(),
            platform: Platform::default(),
        }
    }

    pub fn with_kind(mut self, kind: BriefKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Prompt text submitted to the backend for this brief. Empty when the
    /// idea is blank so the exchange rejects it like any empty input.
    pub fn to_prompt(&self) -> String {
        let idea = self.idea.trim();
        if idea.is_empty() {
            return String::new();
        }
        format!(
            "Generate {} {} content for {}: \"{}\"",
            self.tone, self.kind.name(), self.platform, idea
        )
    }
}

//! parley-ai: generation backends and artifact types
//!
//! This crate defines the content produced by a generation step
//! ([`GeneratedArtifact`]), the refinement tags that can be applied to it, and
//! the [`GenerationBackend`] trait with an HTTP JSON backend and a timed echo
//! backend.

pub mod brief;
pub mod error;
pub mod providers;
pub mod types;

pub use brief::{BriefKind, ContentBrief, Platform};
pub use error::{Error, Result};
pub use providers::{BoxedBackend, GenerationBackend};
pub use types::*;

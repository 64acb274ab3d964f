//! Generation backend implementations

pub mod echo;
pub mod http;

pub use echo::EchoBackend;
pub use http::HttpBackend;

use std::sync::Arc;

use crate::{GeneratedArtifact, Result};
use async_trait::async_trait;

/// A backend that turns a prompt into a generated artifact.
///
/// Called at most once per submission. Implementations must not assume the
/// caller is still interested in the result when it arrives.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Generate an artifact for `prompt`
    async fn generate(&self, prompt: &str) -> Result<GeneratedArtifact>;
}

/// Shared backend handle
pub type BoxedBackend = Arc<dyn GenerationBackend>;

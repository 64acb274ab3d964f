//! Echo backend: answers every prompt after a fixed delay

use std::time::Duration;

use async_trait::async_trait;

use super::GenerationBackend;
use crate::{GeneratedArtifact, Result};

/// Offline backend that acknowledges the prompt after `delay`.
pub struct EchoBackend {
    delay: Duration,
}

impl EchoBackend {
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(2000);

    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for EchoBackend {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELAY)
    }
}

#[async_trait]
impl GenerationBackend for EchoBackend {
    fn name(&self) -> &str {
        "echo"
    }

    async fn generate(&self, prompt: &str) -> Result<GeneratedArtifact> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(GeneratedArtifact::text(format!(
            "Chatbot: I received your message - \"{}\"",
            prompt
        )))
    }
}

//! HTTP JSON backend
//!
//! Request: `POST <endpoint>` with body `{"prompt": "..."}`.
//! Response: `{"response": "..."}` on success or `{"error": "..."}` on
//! failure. Any non-2xx status is a failure. A success body may also carry a
//! `media` array of `{"kind": "image" | "video", "url": "..."}` entries.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::GenerationBackend;
use crate::{
    error::{Error, Result},
    types::{GeneratedArtifact, Media, Payload},
};

/// Longest error body kept in a status error
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Backend that POSTs prompts to a JSON endpoint
pub struct HttpBackend {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpBackend {
    /// Create a backend for `endpoint` with no request timeout
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let endpoint = endpoint.into();
        check_endpoint(&endpoint)?;
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
        })
    }

    /// Create a backend whose requests give up after `timeout`
    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let endpoint = endpoint.into();
        check_endpoint(&endpoint)?;

        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn check_endpoint(endpoint: &str) -> Result<()> {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        return Ok(());
    }
    Err(Error::InvalidConfig(format!(
        "endpoint must be an http(s) URL, got '{}'",
        endpoint
    )))
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    media: Vec<Media>,
}

#[async_trait]
impl GenerationBackend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn generate(&self, prompt: &str) -> Result<GeneratedArtifact> {
        tracing::debug!("POST {} ({} chars)", self.endpoint, prompt.chars().count());

        let response = self
            .client
            .post(&self.endpoint)
            .json(&GenerateRequest { prompt })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Error::status(status.as_u16(), error_message(&body, status)));
        }

        parse_response(&body)
    }
}

/// Interpret a 2xx body. An `error` field wins over a `response` field.
fn parse_response(body: &str) -> Result<GeneratedArtifact> {
    let parsed: GenerateResponse = serde_json::from_str(body)?;

    if let Some(error) = parsed.error {
        return Err(Error::Backend(error));
    }

    match (parsed.response, parsed.media.is_empty()) {
        (None, true) => Err(Error::UnexpectedResponse(
            "body has neither `response` nor `error`".to_string(),
        )),
        (text, _) => Ok(GeneratedArtifact::new(Payload::from_parts(text, parsed.media))),
    }
}

/// Best message for a non-2xx body: its `error` field if it is JSON, else the
/// raw text, else the status reason.
fn error_message(body: &str, status: reqwest::StatusCode) -> String {
    if let Ok(GenerateResponse {
        error: Some(error), ..
    }) = serde_json::from_str::<GenerateResponse>(body)
    {
        return error;
    }

    let body = body.trim();
    if body.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string();
    }

    let mut chars = body.chars();
    let truncated: String = chars.by_ref().take(MAX_ERROR_BODY_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", truncated)
    } else {
        truncated
    }
}

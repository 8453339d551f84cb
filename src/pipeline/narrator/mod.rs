//! Natural-language report for positive predictions.
//!
//! The narrator is best-effort: the orchestrator turns any `NarratorError`
//! into the domain's fallback text and never fails the request.

pub mod chat;
pub mod prompt;

pub use chat::ChatCompletionsNarrator;
pub use prompt::*;

use thiserror::Error;

use crate::models::{Domain, RankedContributor};

#[derive(Error, Debug)]
pub enum NarratorError {
    #[error("Narrator is not configured")]
    NotConfigured,

    #[error("Narrator endpoint unreachable at {0}")]
    Connection(String),

    #[error("Narrator request timed out after {0}s")]
    Timeout(u64),

    #[error("Narrator returned error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Narrator returned no content")]
    EmptyResponse,
}

/// Everything a narrator needs to describe one prediction.
#[derive(Debug, Clone, Copy)]
pub struct NarrativeRequest<'a> {
    pub domain: Domain,
    pub contributors: &'a [RankedContributor],
    pub probability: f64,
    pub label: &'a str,
}

/// Text generation backend (allows mocking).
pub trait Narrator: Send + Sync {
    fn narrate(&self, request: &NarrativeRequest<'_>) -> Result<String, NarratorError>;

    /// Whether this narrator can ever succeed.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Narrator used when no API key is configured.
pub struct DisabledNarrator;

impl Narrator for DisabledNarrator {
    fn narrate(&self, _request: &NarrativeRequest<'_>) -> Result<String, NarratorError> {
        Err(NarratorError::NotConfigured)
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

/// Mock narrator for testing: returns a configured text or always fails.
pub struct MockNarrator {
    response: Option<String>,
    calls: std::sync::atomic::AtomicUsize,
}

impl MockNarrator {
    pub fn new(response: &str) -> Self {
        Self {
            response: Some(response.to_string()),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// A narrator whose every call fails like an unreachable endpoint.
    pub fn failing() -> Self {
        Self {
            response: None,
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl Narrator for MockNarrator {
    fn narrate(&self, _request: &NarrativeRequest<'_>) -> Result<String, NarratorError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.response
            .clone()
            .ok_or_else(|| NarratorError::Connection("mock://narrator".into()))
    }
}

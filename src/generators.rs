//! Remote guide generators (the LLM collaborator seam)

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;

/// Failure reported by a remote generator
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct RemoteError {
    /// HTTP-style status reported by the remote side, when it gave one
    pub status: Option<u16>,
    pub message: String,
}

impl RemoteError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

/// Trait for pluggable remote guide generators
#[async_trait]
pub trait GuideGenerator: Send + Sync {
    fn name(&self) -> &'static str;

    /// Model identifier, reported back when the remote rejects it
    fn model(&self) -> &str;

    /// Turn a prompt into guide markdown
    async fn generate(&self, prompt: &str) -> Result<String, RemoteError>;
}

/// Scripted generator for tests
pub struct MockGuideGen {
    model: String,
    reply: Result<String, RemoteError>,
    calls: AtomicUsize,
}

impl MockGuideGen {
    pub fn replying(text: impl Into<String>) -> Self {
        Self::with_result(Ok(text.into()))
    }

    pub fn failing(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::with_result(Err(RemoteError::new(status, message)))
    }

    fn with_result(reply: Result<String, RemoteError>) -> Self {
        Self {
            model: "mock-model".to_string(),
            reply,
            calls: AtomicUsize::new(0),
        }
    }

    /// How many times `generate` has been awaited
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GuideGenerator for MockGuideGen {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, _prompt: &str) -> Result<String, RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone()
    }
}

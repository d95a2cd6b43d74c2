//! Request-level error taxonomy

use crate::generators::RemoteError;
use thiserror::Error;

/// How a remote failure is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteFailure {
    /// Bad or missing credentials; recovered through the local generator
    Auth,
    /// Quota or rate limit; recovered through the local generator
    RateLimited,
    /// Unknown or unavailable model; fatal
    ModelMisconfigured,
    /// Anything else; fatal
    Unclassified,
}

impl RemoteFailure {
    /// Classify by status first, then by message text. Checks run in a fixed
    /// order, so a 401 that mentions "model" is still an auth failure.
    pub fn classify(err: &RemoteError) -> Self {
        let message = err.message.as_str();
        let lower = message.to_lowercase();

        if err.status == Some(401) || message.contains("API key") || message.contains("401") {
            RemoteFailure::Auth
        } else if err.status == Some(429)
            || lower.contains("quota")
            || lower.contains("rate")
            || message.contains("429")
        {
            RemoteFailure::RateLimited
        } else if err.status == Some(404) || lower.contains("model") {
            RemoteFailure::ModelMisconfigured
        } else {
            RemoteFailure::Unclassified
        }
    }
}

/// Errors surfaced to the caller of `generate_guide`
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GuideError {
    #[error("sensors array is required and must contain at least one sensor")]
    InvalidInput,

    #[error("Select at least one input sensor and at least one output device before generating a project guide.")]
    IncompleteSelection,

    #[error("Model configuration error. Check OPENAI_MODEL (current: {model}).")]
    ModelMisconfigured { model: String },

    #[error("Failed to generate project guide: {message}")]
    Remote { status: Option<u16>, message: String },
}

impl GuideError {
    /// HTTP status the caller should see
    pub fn status(&self) -> u16 {
        match self {
            GuideError::InvalidInput
            | GuideError::IncompleteSelection
            | GuideError::ModelMisconfigured { .. } => 400,
            GuideError::Remote { status, .. } => match status {
                Some(code) if (100..=599).contains(code) => *code,
                _ => 500,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(status: Option<u16>, message: &str) -> RemoteFailure {
        RemoteFailure::classify(&RemoteError::new(status, message))
    }

    #[test]
    fn test_classify_by_status() {
        assert_eq!(classify(Some(401), "nope"), RemoteFailure::Auth);
        assert_eq!(classify(Some(429), "slow down"), RemoteFailure::RateLimited);
        assert_eq!(classify(Some(404), "not found"), RemoteFailure::ModelMisconfigured);
        assert_eq!(classify(Some(503), "unavailable"), RemoteFailure::Unclassified);
    }

    #[test]
    fn test_classify_by_message() {
        assert_eq!(classify(None, "Incorrect API key provided"), RemoteFailure::Auth);
        assert_eq!(classify(None, "You exceeded your current Quota"), RemoteFailure::RateLimited);
        assert_eq!(classify(None, "Rate limit reached"), RemoteFailure::RateLimited);
        assert_eq!(classify(None, "The Model gpt-x does not exist"), RemoteFailure::ModelMisconfigured);
        assert_eq!(classify(None, "connection reset"), RemoteFailure::Unclassified);
    }

    #[test]
    fn test_auth_checked_before_model() {
        assert_eq!(classify(Some(401), "model access denied"), RemoteFailure::Auth);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(GuideError::InvalidInput.status(), 400);
        assert_eq!(GuideError::IncompleteSelection.status(), 400);
        assert_eq!(GuideError::ModelMisconfigured { model: "m".into() }.status(), 400);
        let remote = |status| GuideError::Remote { status, message: "x".into() };
        assert_eq!(remote(Some(503)).status(), 503);
        assert_eq!(remote(None).status(), 500);
        assert_eq!(remote(Some(42)).status(), 500);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            GuideError::ModelMisconfigured { model: "gpt-4o-mini".into() }.to_string(),
            "Model configuration error. Check OPENAI_MODEL (current: gpt-4o-mini)."
        );
        assert_eq!(
            GuideError::Remote { status: None, message: "boom".into() }.to_string(),
            "Failed to generate project guide: boom"
        );
    }
}

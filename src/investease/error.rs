use serde_json::Value;
use thiserror::Error;

/// Errors raised by the InvestEase sandbox client and proxy
#[derive(Debug, Error)]
pub enum InvestEaseError {
    /// Rejected locally, before any network call
    #[error("{0}")]
    Invalid(String),

    /// Upstream answered with a non-2xx status
    #[error("[{status}] {message}")]
    Api { status: u16, message: String, payload: Value },

    #[error("InvestEase token not configured. Set INVESTEASE_TOKEN or INVESTEASE_TEAM_NAME/INVESTEASE_CONTACT_EMAIL.")]
    NotConfigured,

    #[error("Invalid InvestEase URL: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl InvestEaseError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            InvestEaseError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

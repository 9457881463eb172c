use qikspare_core::DomainError;
use thiserror::Error;

/// Failure talking to the invoice backend. Requests are one-shot; callers
/// decide whether to retry.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("network error: {0}")]
    Network(String),
    #[error("API error ({0}): {1}")]
    Api(u16, String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("not found: {0}")]
    NotFound(String),
    /// The invoice failed validation; no request was sent.
    #[error(transparent)]
    Invalid(#[from] DomainError),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::Parse(err.to_string())
        } else {
            GatewayError::Network(err.to_string())
        }
    }
}

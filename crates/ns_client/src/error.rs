use thiserror::Error;

/// Why a request to the proxy failed, as seen by the client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("{0}")]
    Network(String),

    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl FetchError {
    /// Transport failures and upstream outages may pass on a second try;
    /// rejected input and a missing server key will not.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Network(_) | FetchError::Decode(_) => true,
            FetchError::Status { status, .. } => *status >= 500 && *status != 503,
        }
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Config(String),

    #[error("{0}")]
    UpstreamFormat(String),

    #[error("{message}")]
    UpstreamApi {
        code: Option<String>,
        message: String,
    },

    #[error("{0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    /// Whether repeating the same request can succeed without new input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::UpstreamFormat(_) | Error::Http(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

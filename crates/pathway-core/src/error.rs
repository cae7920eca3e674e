use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed input, rejected before any work is done.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Embedding provider or vector store failure; aborts the call.
    #[error("Upstream failure: {0}")]
    Upstream(String),

    /// Streaming connection failure.
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl Error {
    /// HTTP status a request handler should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            Error::NotFound(_) => 404,
            Error::Upstream(_) | Error::Transport(_) => 502,
            Error::InvalidConfig(_) => 500,
        }
    }

    pub fn upstream(context: &str, err: anyhow::Error) -> Self {
        Error::Upstream(format!("{context}: {err:#}"))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

use thiserror::Error;

use pathway_core::error::Error as CoreError;

/// Failure of the underlying chunk transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("answer endpoint returned status {0}")]
    Status(u16),
    #[error("connection failed: {0}")]
    Connection(String),
}

impl From<TransportError> for CoreError {
    fn from(e: TransportError) -> Self { CoreError::Transport(e.to_string()) }
}

/// Accept 2xx statuses only.
pub fn check_status(status: u16) -> Result<(), TransportError> {
    if (200..300).contains(&status) { Ok(()) } else { Err(TransportError::Status(status)) }
}

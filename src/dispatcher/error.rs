use crate::{
    dispatcher::status_error::StatusError, request_builder::error::ConstructionError,
    transport::error::TransportError,
};

/// Every way a dispatched request can fail. Each variant is terminal.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Status(#[from] StatusError),

    #[error("Could not decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl DispatchError {
    /// The HTTP status behind a [`DispatchError::Status`].
    pub fn status_code(&self) -> Option<u16> {
        match self {
            DispatchError::Status(error) => Some(error.status_code()),
            _ => None,
        }
    }

    /// The transport code behind a [`DispatchError::Transport`].
    pub fn transport_code(&self) -> Option<i32> {
        match self {
            DispatchError::Transport(error) => Some(error.code()),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, DispatchError::Transport(TransportError::Cancelled))
    }
}

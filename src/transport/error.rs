/// Network-layer failures reported by a [`Transport`](crate::transport::transport::Transport).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Timeout")]
    Timeout,

    #[error("Cancelled")]
    Cancelled,
}

impl TransportError {
    pub const CANCELLED_CODE: i32 = -999;
    pub const INVALID_REQUEST_CODE: i32 = -1000;
    pub const TIMEOUT_CODE: i32 = -1001;
    pub const NETWORK_CODE: i32 = -1009;

    /// Numeric code identifying the failure class.
    pub fn code(&self) -> i32 {
        match self {
            TransportError::Network(_) => Self::NETWORK_CODE,
            TransportError::InvalidRequest(_) => Self::INVALID_REQUEST_CODE,
            TransportError::Timeout => Self::TIMEOUT_CODE,
            TransportError::Cancelled => Self::CANCELLED_CODE,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, TransportError::Cancelled)
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait TransportErrorChecker {
    fn is_timeout(&self) -> bool;
    fn is_connect(&self) -> bool;
    fn is_request(&self) -> bool;
    fn error_string(&self) -> String;
}

impl<T: TransportErrorChecker> From<T> for TransportError {
    fn from(err: T) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() || err.is_request() {
            TransportError::Network(err.error_string())
        } else {
            TransportError::InvalidRequest(err.error_string())
        }
    }
}

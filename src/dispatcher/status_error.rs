/// HTTP statuses that fail a request regardless of the body they carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StatusError {
    #[error("Bad request (400)")]
    BadRequest,

    #[error("Unauthorized (401)")]
    Unauthorized,

    #[error("Forbidden (403)")]
    Forbidden,

    #[error("Not found (404)")]
    NotFound,

    #[error("Request timeout (408)")]
    RequestTimeout,

    #[error("Too many requests (429)")]
    TooManyRequests,

    #[error("Client error ({0})")]
    Client(u16),

    #[error("Internal server error (500)")]
    InternalServerError,

    #[error("Bad gateway (502)")]
    BadGateway,

    #[error("Service unavailable (503)")]
    ServiceUnavailable,

    #[error("Server error ({0})")]
    Server(u16),
}

impl StatusError {
    /// Maps 4xx and 5xx codes to an error; anything else is not a failure.
    pub fn from_status_code(status: u16) -> Option<Self> {
        let error = match status {
            400 => StatusError::BadRequest,
            401 => StatusError::Unauthorized,
            403 => StatusError::Forbidden,
            404 => StatusError::NotFound,
            408 => StatusError::RequestTimeout,
            429 => StatusError::TooManyRequests,
            400..=499 => StatusError::Client(status),
            500 => StatusError::InternalServerError,
            502 => StatusError::BadGateway,
            503 => StatusError::ServiceUnavailable,
            500..=599 => StatusError::Server(status),
            _ => return None,
        };
        Some(error)
    }

    pub fn status_code(&self) -> u16 {
        match self {
            StatusError::BadRequest => 400,
            StatusError::Unauthorized => 401,
            StatusError::Forbidden => 403,
            StatusError::NotFound => 404,
            StatusError::RequestTimeout => 408,
            StatusError::TooManyRequests => 429,
            StatusError::Client(status) => *status,
            StatusError::InternalServerError => 500,
            StatusError::BadGateway => 502,
            StatusError::ServiceUnavailable => 503,
            StatusError::Server(status) => *status,
        }
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status_code())
    }
}

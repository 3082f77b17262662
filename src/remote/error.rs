use thiserror::Error;

/// Remote API errors, tagged by kind so callers branch on structure rather
/// than inspecting status codes ad hoc.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Transport-level failure: DNS, connect, timeout.
    #[error("Network error: {0}")]
    Network(String),
    /// The server answered with a non-success status.
    #[error("Server returned status {status}: {message}")]
    Status { status: u16, message: String },
    /// The response body could not be decoded, or a queued payload could not
    /// be interpreted for its target call.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl ApiError {
    /// The HTTP status, when the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for a unique-constraint conflict (HTTP 409).
    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }
}

//! Client error taxonomy.

use thiserror::Error;

/// Result type for API client calls.
pub type ClientResult<T> = Result<T, ClientError>;

/// Failure of a single API round trip.
///
/// `Clone` so results can be fed back into the controller as plain data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The server rejected the input (400).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The item does not exist (404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success status.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The request never produced a usable response.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl ClientError {
    /// Maps a non-success status and its message to an error.
    #[must_use]
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            400 => Self::Validation(message.into()),
            404 => Self::NotFound(message.into()),
            _ => Self::Server {
                status,
                message: message.into(),
            },
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(400, ClientError::Validation("bad".to_string()))]
    #[case(404, ClientError::NotFound("bad".to_string()))]
    #[case(500, ClientError::Server { status: 500, message: "bad".to_string() })]
    #[case(409, ClientError::Server { status: 409, message: "bad".to_string() })]
    fn test_from_status(#[case] status: u16, #[case] expected: ClientError) {
        assert_eq!(ClientError::from_status(status, "bad"), expected);
    }
}

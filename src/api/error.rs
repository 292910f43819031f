use thiserror::Error;

use super::endpoint::Endpoint;

/// Failure of a single backend call.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request to {endpoint} failed: {message}")]
    Transport { endpoint: Endpoint, message: String },

    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: Endpoint, status: u16 },

    #[error("failed to decode {endpoint} response: {message}")]
    Decode { endpoint: Endpoint, message: String },

    /// The server answered `success: false`.
    #[error("{endpoint}: {message}")]
    Server { endpoint: Endpoint, message: String },

    #[error("{endpoint} reported success without data")]
    MissingData { endpoint: Endpoint },
}

impl ApiError {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Self::Transport { endpoint, .. }
            | Self::Status { endpoint, .. }
            | Self::Decode { endpoint, .. }
            | Self::Server { endpoint, .. }
            | Self::MissingData { endpoint } => *endpoint,
        }
    }

    /// The message the server supplied with `success: false`, if that is
    /// what happened.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Server { message, .. } => Some(message),
            _ => None,
        }
    }
}

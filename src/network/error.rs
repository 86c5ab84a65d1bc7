use thiserror::Error;

/// Coarse classification of a failed API call. Neither kind is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request never produced a response (unreachable host, timeout, ...).
    Transport,
    /// A response arrived but could not be used.
    InvalidResponse,
}

#[derive(Error, Debug)]
pub enum PhotoClientError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid server response: HTTP {0}")]
    Status(u16),

    #[error("Response body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Response is missing `{0}`")]
    MissingField(&'static str),

    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },
}

impl PhotoClientError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) => ErrorKind::Transport,
            Self::Status(_) | Self::Json(_) | Self::MissingField(_) | Self::Api { .. } => {
                ErrorKind::InvalidResponse
            }
        }
    }
}

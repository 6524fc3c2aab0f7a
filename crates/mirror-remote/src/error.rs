//! Error types for mirror-remote

/// Result type for mirror-remote operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the remote repository service
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Request for {operation} failed: {source}")]
    Transport {
        operation: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{operation} rejected by remote (HTTP {status}): {message}")]
    Rejected {
        operation: String,
        status: u16,
        message: String,
    },

    #[error(
        "Could not download a snapshot of {repository}; check network and DNS ({})",
        .attempts.join("; ")
    )]
    Unreachable {
        repository: String,
        attempts: Vec<String>,
    },

    #[error("Unexpected response for {operation}: {message}")]
    InvalidResponse { operation: String, message: String },

    #[error("Credential cannot be sent as an HTTP header")]
    InvalidCredential,

    #[error("Snapshot archive is unreadable: {message}")]
    Archive { message: String },
}

impl Error {
    pub fn rejected(operation: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            operation: operation.into(),
            status,
            message: message.into(),
        }
    }

    pub fn archive(message: impl Into<String>) -> Self {
        Self::Archive {
            message: message.into(),
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(e: zip::result::ZipError) -> Self {
        Self::archive(e.to_string())
    }
}

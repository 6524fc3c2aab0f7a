//! Error types for mirror-core

/// Result type for mirror-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in mirror-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Repository reference could not be parsed into owner and repo
    #[error("Invalid repository reference '{input}': {reason}")]
    InvalidReference { input: String, reason: String },

    /// Cron expression could not be parsed
    #[error("Invalid schedule '{expression}': {reason}")]
    InvalidSchedule { expression: String, reason: String },

    /// A configured value is unusable
    #[error("Invalid configuration: {message}")]
    Configuration { message: String },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from mirror-fs
    #[error(transparent)]
    Fs(#[from] mirror_fs::Error),

    /// Remote service error from mirror-remote
    #[error(transparent)]
    Remote(#[from] mirror_remote::Error),
}

/// Coarse classification callers use to decide how to react to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidReference,
    NetworkFailure,
    RemoteRejected,
    LocalIoFailure,
    InvalidSchedule,
    Configuration,
}

impl Error {
    pub fn invalid_reference(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidReference {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_schedule(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSchedule {
            expression: expression.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        use mirror_remote::Error as Remote;

        match self {
            Self::InvalidReference { .. } => ErrorKind::InvalidReference,
            Self::InvalidSchedule { .. } => ErrorKind::InvalidSchedule,
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::Fs(
                mirror_fs::Error::ConfigParse { .. }
                | mirror_fs::Error::ConfigSerialize { .. }
                | mirror_fs::Error::UnsupportedFormat { .. },
            ) => ErrorKind::Configuration,
            Self::Fs(_) => ErrorKind::LocalIoFailure,
            Self::Remote(Remote::Transport { .. } | Remote::Unreachable { .. } | Remote::Archive { .. }) => {
                ErrorKind::NetworkFailure
            }
            Self::Remote(
                Remote::Rejected { .. } | Remote::InvalidResponse { .. } | Remote::InvalidCredential,
            ) => ErrorKind::RemoteRejected,
        }
    }
}

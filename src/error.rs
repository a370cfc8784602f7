use thiserror::Error;

/// Failures reading or writing the persisted account blob.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("malformed account data: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("username `{0}` already exists")]
    DuplicateUser(String),
    #[error("incorrect password")]
    BadCredentials,
    #[error("todo text is empty")]
    EmptyInput,
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error("parallax barrier renderer unavailable")]
    RendererUnavailable,
    #[error("no active session")]
    NoSession,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T, E = UniverseError> = std::result::Result<T, E>;

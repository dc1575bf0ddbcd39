use thiserror::Error;

/// Failure reported by one of the backend collaborators.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("Invalid login credentials")]
    InvalidCredentials,

    /// The request was refused before or by the backend, with a readable reason.
    #[error("{0}")]
    Rejected(String),

    #[error("session file: {0}")]
    SessionIo(#[from] std::io::Error),

    #[error("session file: {0}")]
    SessionFormat(#[from] serde_json::Error),
}

impl BackendError {
    /// The human-readable message shown to the user.
    ///
    /// Database errors carry the server's own message rather than the driver's
    /// wrapper text.
    pub fn message(&self) -> String {
        match self {
            BackendError::Database(sqlx::Error::Database(db)) => db.message().to_string(),
            other => other.to_string(),
        }
    }
}

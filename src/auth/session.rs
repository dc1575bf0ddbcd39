use std::io::ErrorKind;
use std::path::PathBuf;

use crate::db::BackendError;
use crate::models::User;

/// JSON file holding the signed-in user between runs.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub async fn load(&self) -> Result<Option<User>, BackendError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        match serde_json::from_slice(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "ignoring unreadable session file"
                );
                Ok(None)
            }
        }
    }

    pub async fn save(&self, user: &User) -> Result<(), BackendError> {
        let raw = serde_json::to_vec_pretty(user)?;
        tokio::fs::write(&self.path, raw).await?;
        Ok(())
    }

    /// Forget the session. Clearing an absent session is not an error.
    pub async fn clear(&self) -> Result<(), BackendError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

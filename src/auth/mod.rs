mod session;

use std::future::Future;

use uuid::Uuid;

use crate::db::{BackendError, Database};
use crate::models::User;

pub use session::SessionStore;

/// Sign-in state as the screens see it.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    resolving: bool,
    user: Option<User>,
}

/// The two auth flags collapsed into the cases the screens act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthGate {
    Resolving,
    Anonymous,
    Authenticated(Uuid),
}

impl AuthState {
    pub fn resolving() -> Self {
        Self { resolving: true, user: None }
    }

    pub fn resolved(user: Option<User>) -> Self {
        Self { resolving: false, user }
    }

    pub fn is_resolving(&self) -> bool {
        self.resolving
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn gate(&self) -> AuthGate {
        match (self.is_resolving(), &self.user) {
            (true, _) => AuthGate::Resolving,
            (false, None) => AuthGate::Anonymous,
            (false, Some(user)) => AuthGate::Authenticated(user.id),
        }
    }
}

/// The authentication side of the hosted backend.
pub trait AuthProvider: Clone + Send + Sync + 'static {
    /// The user of a previously persisted session, if it is still valid.
    fn restore_session(&self) -> impl Future<Output = Result<Option<User>, BackendError>> + Send;

    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<User, BackendError>> + Send;

    fn sign_out(&self) -> impl Future<Output = Result<(), BackendError>> + Send;
}

/// Password auth against the backend's user table, with the session kept in a local file.
#[derive(Clone)]
pub struct PgAuth {
    db: Database,
    session: SessionStore,
}

impl PgAuth {
    pub fn new(db: Database, session: SessionStore) -> Self {
        Self { db, session }
    }
}

impl AuthProvider for PgAuth {
    async fn restore_session(&self) -> Result<Option<User>, BackendError> {
        let Some(saved) = self.session.load().await? else {
            return Ok(None);
        };

        let user = self.db.get_user(saved.id).await?;
        if user.is_none() {
            tracing::info!(user_id = %saved.id, "session refers to a missing user, clearing it");
            self.session.clear().await?;
        }
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<User, BackendError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(BackendError::Rejected("Email and password are required".into()));
        }

        let user = self
            .db
            .verify_credentials(email, password)
            .await?
            .ok_or(BackendError::InvalidCredentials)?;

        self.session.save(&user).await?;
        tracing::info!(user_id = %user.id, "signed in");
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        self.session.clear().await?;
        tracing::info!("signed out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User { id: Uuid::from_u128(7), email: "site@example.com".into() }
    }

    #[test]
    fn gate_waits_while_resolving_even_with_user() {
        let state = AuthState { resolving: true, user: Some(user()) };
        assert_eq!(state.gate(), AuthGate::Resolving);
    }

    #[test]
    fn gate_after_resolution() {
        assert_eq!(AuthState::resolved(None).gate(), AuthGate::Anonymous);
        assert_eq!(
            AuthState::resolved(Some(user())).gate(),
            AuthGate::Authenticated(Uuid::from_u128(7))
        );
    }
}

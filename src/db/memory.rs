//! In-memory collaborators for exercising the screens without a database.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{BackendError, OrderBy, ProjectStore};
use crate::auth::AuthProvider;
use crate::models::{NewProject, Project, User};

#[derive(Default)]
struct Inner {
    rows: Vec<Project>,
    inserted: Vec<NewProject>,
    selects: Vec<(Uuid, OrderBy)>,
    fail_with: Option<String>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn with_rows(rows: Vec<Project>) -> Self {
        let store = Self::default();
        store.inner.lock().unwrap().rows = rows;
        store
    }

    /// Make every following call fail with `message`.
    pub fn fail_with(&self, message: &str) {
        self.inner.lock().unwrap().fail_with = Some(message.to_string());
    }

    pub fn inserted(&self) -> Vec<NewProject> {
        self.inner.lock().unwrap().inserted.clone()
    }

    pub fn selects(&self) -> Vec<(Uuid, OrderBy)> {
        self.inner.lock().unwrap().selects.clone()
    }
}

impl ProjectStore for MemoryStore {
    async fn insert_project(&self, project: &NewProject) -> Result<Uuid, BackendError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(message) = &inner.fail_with {
            return Err(BackendError::Rejected(message.clone()));
        }
        inner.inserted.push(project.clone());
        Ok(Uuid::new_v4())
    }

    async fn select_projects(
        &self,
        owner_id: Uuid,
        order: OrderBy,
    ) -> Result<Vec<Project>, BackendError> {
        let mut inner = self.inner.lock().unwrap();
        inner.selects.push((owner_id, order));
        if let Some(message) = &inner.fail_with {
            return Err(BackendError::Rejected(message.clone()));
        }

        let mut rows: Vec<Project> = inner
            .rows
            .iter()
            .filter(|row| row.owner_id == owner_id)
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.created_at);
        if !order.ascending {
            rows.reverse();
        }
        Ok(rows)
    }
}

#[derive(Clone, Default)]
pub struct MemoryAuth {
    user: Arc<Mutex<Option<User>>>,
    password: String,
}

impl MemoryAuth {
    pub fn with_account(user: User, password: &str) -> Self {
        Self {
            user: Arc::new(Mutex::new(None)),
            password: password.to_string(),
        }
        .remember(user)
    }

    fn remember(self, user: User) -> Self {
        *self.user.lock().unwrap() = Some(user);
        self
    }
}

impl AuthProvider for MemoryAuth {
    async fn restore_session(&self) -> Result<Option<User>, BackendError> {
        Ok(self.user.lock().unwrap().clone())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<User, BackendError> {
        match self.user.lock().unwrap().as_ref() {
            Some(user) if user.email == email && self.password == password => Ok(user.clone()),
            _ => Err(BackendError::InvalidCredentials),
        }
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        Ok(())
    }
}

pub fn project(owner_id: Uuid, name: &str, created_at: DateTime<Utc>) -> Project {
    Project {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: None,
        status: "planning".to_string(),
        project_type: "residential".to_string(),
        budget: None,
        location: None,
        start_date: None,
        end_date: None,
        owner_id,
        created_at,
        updated_at: created_at,
    }
}

mod error;
#[cfg(test)]
pub mod memory;

use std::future::Future;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::models::{NewProject, Project, User};

pub use error::BackendError;

pub const PROJECTS_TABLE: &str = "projects";

// Enum-like and numeric columns are cast so they decode as `String` and `f64`.
const PROJECT_COLUMNS: &str = "id, name, description, status::text AS status, \
    project_type::text AS project_type, budget::float8 AS budget, location, start_date, \
    end_date, owner_id, created_at, updated_at";

/// Columns a project listing may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectColumn {
    CreatedAt,
}

impl ProjectColumn {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectColumn::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub column: ProjectColumn,
    pub ascending: bool,
}

impl OrderBy {
    pub const fn desc(column: ProjectColumn) -> Self {
        Self { column, ascending: false }
    }

    fn to_sql(self) -> String {
        let direction = if self.ascending { "ASC" } else { "DESC" };
        format!("{} {}", self.column.as_str(), direction)
    }
}

/// Table storage used by the project screens.
pub trait ProjectStore: Clone + Send + Sync + 'static {
    /// Insert one project and return the id the backend assigned.
    fn insert_project(
        &self,
        project: &NewProject,
    ) -> impl Future<Output = Result<Uuid, BackendError>> + Send;

    /// All projects visible to `owner_id`, in the given order. No limit.
    fn select_projects(
        &self,
        owner_id: Uuid,
        order: OrderBy,
    ) -> impl Future<Output = Result<Vec<Project>, BackendError>> + Send;
}

/// Database connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new Database instance with a connection pool
    pub async fn new(config: &Config) -> Result<Self, BackendError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(config.database_url())
            .await?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }

    // User operations
    pub async fn get_user(&self, id: Uuid) -> Result<Option<User>, BackendError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, COALESCE(email, '') AS email FROM auth.users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.get_pool())
        .await?;

        Ok(user)
    }

    /// Look up a user by email and check the password against the stored bcrypt hash.
    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, BackendError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, COALESCE(email, '') AS email
            FROM auth.users
            WHERE lower(email) = lower($1)
              AND encrypted_password = crypt($2, encrypted_password)
            "#,
        )
        .bind(email)
        .bind(password)
        .fetch_optional(self.get_pool())
        .await?;

        Ok(user)
    }
}

impl ProjectStore for Database {
    async fn insert_project(&self, project: &NewProject) -> Result<Uuid, BackendError> {
        let sql = format!(
            r#"
            INSERT INTO {PROJECTS_TABLE}
                (name, description, owner_id, status, project_type, budget, location,
                 start_date, end_date)
            VALUES ($1, $2, $3, $4, $5, $6::float8, $7, $8::date, $9::date)
            RETURNING id
            "#
        );

        let id = sqlx::query_scalar::<_, Uuid>(&sql)
            .bind(&project.name)
            .bind(&project.description)
            .bind(project.owner_id)
            .bind(project.status.as_str())
            .bind(project.project_type.as_str())
            .bind(project.budget)
            .bind(&project.location)
            .bind(project.start_date)
            .bind(project.end_date)
            .fetch_one(self.get_pool())
            .await?;

        Ok(id)
    }

    async fn select_projects(
        &self,
        owner_id: Uuid,
        order: OrderBy,
    ) -> Result<Vec<Project>, BackendError> {
        let sql = format!(
            "SELECT {PROJECT_COLUMNS} FROM {PROJECTS_TABLE} WHERE owner_id = $1 ORDER BY {}",
            order.to_sql()
        );

        let projects = sqlx::query_as::<_, Project>(&sql)
            .bind(owner_id)
            .fetch_all(self.get_pool())
            .await?;

        Ok(projects)
    }
}

/// Initialize the database connection pool
pub async fn init(config: &Config) -> Result<Database, BackendError> {
    let db = Database::new(config).await?;
    tracing::info!(max_connections = config.max_connections, "database pool ready");
    Ok(db)
}

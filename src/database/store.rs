use async_trait::async_trait;
use thiserror::Error;

use super::models::{Project, ProjectDetail};
use crate::types::{Id, UserId};

/// Postgres SQLSTATE for unique_violation.
pub const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Classify a driver error, separating unique violations from everything else.
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                return StoreError::UniqueViolation {
                    constraint: db_err.constraint().unwrap_or_default().to_string(),
                };
            }
        }
        StoreError::Database(err)
    }
}

/// Persistence for projects. Every method is scoped by project id and owner;
/// a project owned by someone else behaves exactly like a missing one.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn find_owned(&self, id: Id, owner: &UserId) -> Result<Option<Project>, StoreError>;

    /// Project plus its documents (ordered by id).
    async fn find_owned_detail(
        &self,
        id: Id,
        owner: &UserId,
    ) -> Result<Option<ProjectDetail>, StoreError>;

    /// Returns `None` when no row matched both id and owner.
    async fn rename_owned(
        &self,
        id: Id,
        owner: &UserId,
        name: &str,
    ) -> Result<Option<Project>, StoreError>;

    /// Documents go with the project (ON DELETE CASCADE). Returns whether a row was removed.
    async fn delete_owned(&self, id: Id, owner: &UserId) -> Result<bool, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

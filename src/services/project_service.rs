use std::sync::Arc;

use crate::database::{Project, ProjectDetail, ProjectStore, StoreError};
use crate::types::{Id, UserId};

#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("project not found")]
    NotFound,
    #[error("project not found or not owned by caller")]
    NotFoundOrNoAccess,
    #[error("project name is required")]
    NameRequired,
    #[error("project name already in use by this owner")]
    NameTaken,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ProjectError {
    /// Failures that should be logged as server errors.
    pub fn is_internal(&self) -> bool {
        matches!(self, ProjectError::Store(_))
    }
}

/// Owner-scoped operations on projects.
///
/// Mutations verify ownership with a scoped lookup first, then act with a
/// statement that is itself conditioned on id and owner. If the row vanished
/// between the two steps the action matches nothing and the caller sees the
/// same not-found outcome as a failed lookup.
#[derive(Clone)]
pub struct ProjectService {
    store: Arc<dyn ProjectStore>,
}

impl ProjectService {
    pub fn new(store: Arc<dyn ProjectStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ProjectStore> {
        &self.store
    }

    /// Fetch a project the caller owns, or `NotFoundOrNoAccess`.
    pub async fn authorize(&self, id: Id, owner: &UserId) -> Result<Project, ProjectError> {
        self.store
            .find_owned(id, owner)
            .await?
            .ok_or(ProjectError::NotFoundOrNoAccess)
    }

    pub async fn get(&self, id: Id, owner: &UserId) -> Result<ProjectDetail, ProjectError> {
        self.store
            .find_owned_detail(id, owner)
            .await?
            .ok_or(ProjectError::NotFound)
    }

    pub async fn rename(
        &self,
        id: Id,
        owner: &UserId,
        name: Option<&str>,
    ) -> Result<Project, ProjectError> {
        let name = validate_name(name)?;

        self.authorize(id, owner).await?;

        match self.store.rename_owned(id, owner, name).await {
            Ok(Some(project)) => Ok(project),
            Ok(None) => Err(ProjectError::NotFoundOrNoAccess),
            Err(StoreError::UniqueViolation { .. }) => Err(ProjectError::NameTaken),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete(&self, id: Id, owner: &UserId) -> Result<(), ProjectError> {
        self.authorize(id, owner).await?;

        if self.store.delete_owned(id, owner).await? {
            Ok(())
        } else {
            Err(ProjectError::NotFoundOrNoAccess)
        }
    }
}

fn validate_name(name: Option<&str>) -> Result<&str, ProjectError> {
    match name {
        Some(name) if !name.is_empty() => Ok(name),
        _ => Err(ProjectError::NameRequired),
    }
}

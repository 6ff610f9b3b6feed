use async_trait::async_trait;
use sqlx::PgPool;

use super::models::{Document, Project, ProjectDetail};
use super::store::{ProjectStore, StoreError};
use crate::types::{Id, UserId};

const PROJECT_COLUMNS: &str = "id, name, owner_id, created_at, updated_at";

/// `ProjectStore` over an injected Postgres pool.
#[derive(Clone)]
pub struct PgProjectStore {
    pool: PgPool,
}

impl PgProjectStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectStore for PgProjectStore {
    async fn find_owned(&self, id: Id, owner: &UserId) -> Result<Option<Project>, StoreError> {
        let sql = format!(
            "SELECT {} FROM projects WHERE id = $1 AND owner_id = $2",
            PROJECT_COLUMNS
        );
        sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn find_owned_detail(
        &self,
        id: Id,
        owner: &UserId,
    ) -> Result<Option<ProjectDetail>, StoreError> {
        // Both reads share one snapshot so the count matches the list
        let mut tx = self.pool.begin().await.map_err(StoreError::from_sqlx)?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(StoreError::from_sqlx)?;

        let sql = format!(
            "SELECT {} FROM projects WHERE id = $1 AND owner_id = $2",
            PROJECT_COLUMNS
        );
        let project = sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&mut *tx)
            .await
            .map_err(StoreError::from_sqlx)?;

        let Some(project) = project else {
            tx.rollback().await.map_err(StoreError::from_sqlx)?;
            return Ok(None);
        };

        let documents = sqlx::query_as::<_, Document>(
            "SELECT id, title, content, project_id, created_at, updated_at \
             FROM documents WHERE project_id = $1 ORDER BY id",
        )
        .bind(project.id)
        .fetch_all(&mut *tx)
        .await
        .map_err(StoreError::from_sqlx)?;

        tx.commit().await.map_err(StoreError::from_sqlx)?;

        Ok(Some(ProjectDetail::new(project, documents)))
    }

    async fn rename_owned(
        &self,
        id: Id,
        owner: &UserId,
        name: &str,
    ) -> Result<Option<Project>, StoreError> {
        let sql = format!(
            "UPDATE projects SET name = $3, updated_at = now() \
             WHERE id = $1 AND owner_id = $2 RETURNING {}",
            PROJECT_COLUMNS
        );
        sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .bind(owner)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn delete_owned(&self, id: Id, owner: &UserId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        Ok(())
    }
}

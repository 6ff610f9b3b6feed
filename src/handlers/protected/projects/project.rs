use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::auth::Session;
use crate::database::{Project, ProjectDetail};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::server::AppState;
use crate::services::ProjectError;
use crate::types::Id;

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub name: Option<String>,
}

/// GET /projects/:id - Project with its documents and document count
pub async fn get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(raw_id): Path<String>,
) -> ApiResult<ProjectDetail> {
    let owner = session.user_id()?;
    let id = parse_id(&raw_id, ProjectError::NotFound)?;

    let detail = state
        .projects
        .get(id, owner)
        .await
        .map_err(|e| failure("get", &raw_id, e))?;

    Ok(ApiResponse::success(detail))
}

/// PUT /projects/:id - Rename a project
pub async fn put(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(raw_id): Path<String>,
    payload: Result<Json<RenameRequest>, JsonRejection>,
) -> ApiResult<Project> {
    let owner = session.user_id()?;
    let id = parse_id(&raw_id, ProjectError::NotFoundOrNoAccess)?;

    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(project_id = %raw_id, "Rejected rename body: {}", rejection.body_text());
        ApiError::bad_request("Invalid request body")
    })?;

    let project = state
        .projects
        .rename(id, owner, request.name.as_deref())
        .await
        .map_err(|e| failure("rename", &raw_id, e))?;

    tracing::info!(project_id = %project.id, user_id = %owner, "Project renamed");
    Ok(ApiResponse::success(project))
}

/// DELETE /projects/:id - Delete a project and, by cascade, its documents
pub async fn delete(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(raw_id): Path<String>,
) -> ApiResult<()> {
    let owner = session.user_id()?;
    let id = parse_id(&raw_id, ProjectError::NotFoundOrNoAccess)?;

    state
        .projects
        .delete(id, owner)
        .await
        .map_err(|e| failure("delete", &raw_id, e))?;

    tracing::info!(project_id = %id, user_id = %owner, "Project deleted");
    Ok(ApiResponse::no_content())
}

/// A path segment that is not a decimal id cannot name any project.
fn parse_id(raw: &str, not_found: ProjectError) -> Result<Id, ApiError> {
    raw.parse::<Id>().map_err(|_| not_found.into())
}

fn failure(op: &'static str, raw_id: &str, err: ProjectError) -> ApiError {
    if err.is_internal() {
        tracing::error!(op, project_id = %raw_id, error = %err, "Project operation failed");
    }
    err.into()
}

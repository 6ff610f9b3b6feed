use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Document;
use crate::types::{Id, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Id,
    pub name: String,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentCount {
    pub documents: i64,
}

/// A project with its documents eagerly loaded, as returned by `GET /projects/:id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub documents: Vec<Document>,
    #[serde(rename = "_count")]
    pub count: DocumentCount,
}

impl ProjectDetail {
    pub fn new(project: Project, documents: Vec<Document>) -> Self {
        let count = DocumentCount {
            documents: documents.len() as i64,
        };
        Self {
            project,
            documents,
            count,
        }
    }
}

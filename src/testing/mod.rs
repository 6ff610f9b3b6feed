use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::database::{Document, Project, ProjectDetail, ProjectStore, StoreError};
use crate::types::{Id, UserId};

/// In-memory `ProjectStore` mirroring the Postgres schema rules:
/// unique (owner, name) and cascading document deletes.
#[derive(Default)]
pub struct MemoryProjectStore {
    state: Mutex<State>,
    calls: AtomicUsize,
    writes: AtomicUsize,
    fail_next: AtomicBool,
    vanish_after_lookup: AtomicBool,
}

#[derive(Default)]
struct State {
    next_id: i64,
    projects: BTreeMap<Id, Project>,
    documents: BTreeMap<Id, Document>,
}

impl State {
    fn next_id(&mut self) -> Id {
        self.next_id += 1;
        Id(self.next_id)
    }
}

impl MemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_project(&self, owner: &str, name: &str) -> Id {
        let id = self.state.lock().unwrap().next_id();
        self.insert_project_with_id(id, owner, name);
        id
    }

    pub fn insert_project_with_id(&self, id: Id, owner: &str, name: &str) {
        let now = Utc::now();
        let mut state = self.state.lock().unwrap();
        state.next_id = state.next_id.max(id.get());
        state.projects.insert(
            id,
            Project {
                id,
                name: name.to_string(),
                owner_id: UserId::new(owner),
                created_at: now,
                updated_at: now,
            },
        );
    }

    pub fn insert_document(&self, project_id: Id, title: &str) -> Id {
        let id = self.state.lock().unwrap().next_id();
        self.insert_document_with_id(id, project_id, title);
        id
    }

    pub fn insert_document_with_id(&self, id: Id, project_id: Id, title: &str) {
        let now = Utc::now();
        let mut state = self.state.lock().unwrap();
        state.next_id = state.next_id.max(id.get());
        state.documents.insert(
            id,
            Document {
                id,
                title: title.to_string(),
                content: None,
                project_id,
                created_at: now,
                updated_at: now,
            },
        );
    }

    pub fn project(&self, id: Id) -> Option<Project> {
        self.state.lock().unwrap().projects.get(&id).cloned()
    }

    pub fn document_exists(&self, id: Id) -> bool {
        self.state.lock().unwrap().documents.contains_key(&id)
    }

    pub fn document_count(&self, project_id: Id) -> usize {
        self.state
            .lock()
            .unwrap()
            .documents
            .values()
            .filter(|d| d.project_id == project_id)
            .count()
    }

    /// Total store calls, reads included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make the next store call fail with a driver error.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Delete the project right after the next successful ownership lookup.
    pub fn vanish_after_lookup(&self) {
        self.vanish_after_lookup.store(true, Ordering::SeqCst);
    }

    fn enter(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    fn owned<'a>(state: &'a State, id: Id, owner: &UserId) -> Option<&'a Project> {
        state.projects.get(&id).filter(|p| &p.owner_id == owner)
    }
}

#[async_trait]
impl ProjectStore for MemoryProjectStore {
    async fn find_owned(&self, id: Id, owner: &UserId) -> Result<Option<Project>, StoreError> {
        self.enter()?;
        let mut state = self.state.lock().unwrap();
        let found = Self::owned(&state, id, owner).cloned();
        if found.is_some() && self.vanish_after_lookup.swap(false, Ordering::SeqCst) {
            state.projects.remove(&id);
            state.documents.retain(|_, d| d.project_id != id);
        }
        Ok(found)
    }

    async fn find_owned_detail(
        &self,
        id: Id,
        owner: &UserId,
    ) -> Result<Option<ProjectDetail>, StoreError> {
        self.enter()?;
        let state = self.state.lock().unwrap();
        Ok(Self::owned(&state, id, owner).cloned().map(|project| {
            let documents = state
                .documents
                .values()
                .filter(|d| d.project_id == id)
                .cloned()
                .collect();
            ProjectDetail::new(project, documents)
        }))
    }

    async fn rename_owned(
        &self,
        id: Id,
        owner: &UserId,
        name: &str,
    ) -> Result<Option<Project>, StoreError> {
        self.enter()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        if Self::owned(&state, id, owner).is_none() {
            return Ok(None);
        }
        let taken = state
            .projects
            .values()
            .any(|p| p.id != id && &p.owner_id == owner && p.name == name);
        if taken {
            return Err(StoreError::UniqueViolation {
                constraint: "projects_owner_id_name_key".to_string(),
            });
        }
        let project = state.projects.get_mut(&id).map(|p| {
            p.name = name.to_string();
            p.updated_at = Utc::now();
            p.clone()
        });
        Ok(project)
    }

    async fn delete_owned(&self, id: Id, owner: &UserId) -> Result<bool, StoreError> {
        self.enter()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        if Self::owned(&state, id, owner).is_none() {
            return Ok(false);
        }
        state.projects.remove(&id);
        state.documents.retain(|_, d| d.project_id != id);
        Ok(true)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.enter()
    }
}

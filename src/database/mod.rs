pub mod manager;
pub mod models;
pub mod postgres;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use models::{Document, DocumentCount, Project, ProjectDetail};
pub use postgres::PgProjectStore;
pub use store::{ProjectStore, StoreError};

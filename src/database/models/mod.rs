pub mod document;
pub mod project;

pub use document::Document;
pub use project::{DocumentCount, Project, ProjectDetail};

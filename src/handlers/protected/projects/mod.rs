pub mod project;


// Re-export handler functions for use in routing
pub use project::delete as project_delete;
pub use project::get as project_get;
pub use project::put as project_put;

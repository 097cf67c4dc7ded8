//! Application layer for taskdeck.
//!
//! This crate owns the task collection and the session view state, and
//! exposes the command surface shared by presentation frontends.

pub mod config;
pub mod service;
pub mod task_patch;
pub mod task_store;
pub mod view_state;

// Re-exports for convenience
pub use config::{ProjectConfig, StorageConfig, ViewDefaults};
pub use service::TaskService;
pub use task_patch::{FieldPatch, TaskUpdate};
pub use task_store::{NewTask, TaskStore, TaskStoreError, TaskStoreResult};
pub use view_state::ViewState;

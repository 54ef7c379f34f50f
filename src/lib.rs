//! Task tracking: a JSON-over-HTTP task service backed by a document store,
//! and a terminal client for browsing, creating and deleting tasks.

pub mod client;
pub mod config;
pub mod error;
pub mod service;
pub mod store;
pub mod task;
pub mod validation;

pub use error::{ServiceError, StoreError};
pub use service::build_router;
pub use store::{JsonTaskStore, TaskStore};
pub use task::{Task, TaskDraft, TaskId, TaskStatus};

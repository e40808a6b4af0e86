//! # portal-storage
//!
//! Storage abstraction layer for the client portal.
//!
//! This crate defines the records the portal manages and the traits storage
//! backends implement. Implementations live in separate crates.
//!
//! ## Example
//!
//! ```ignore
//! use portal_storage::{ProjectStorage, StorageError, StorageResult, Project};
//!
//! async fn project_or_404(storage: &dyn ProjectStorage, id: &str) -> StorageResult<Project> {
//!     storage
//!         .get_project(id)
//!         .await?
//!         .ok_or_else(|| StorageError::not_found("project", id))
//! }
//! ```

mod error;
mod traits;
mod types;

pub use error::StorageError;
pub use traits::{
    ActivityStorage, ClientStorage, MilestoneStorage, NotificationStorage, PortalStorage,
    ProjectStorage, ResourceStorage,
};
pub use types::{
    ActivityEntry, Client, ClientInput, Milestone, MilestoneInput, NewActivity, Notification,
    NotificationInput, Project, ProjectInput, ProjectStatus, Resource, ResourceInput, new_id,
};

/// Type alias for a storage result.
pub type StorageResult<T> = Result<T, StorageError>;

/// Type alias for a shareable portal storage instance.
pub type DynPortalStorage = std::sync::Arc<dyn PortalStorage>;

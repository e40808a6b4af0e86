//! Storage traits implemented by portal storage backends.
//!
//! Lookups return `Ok(None)` for missing records; writes against a missing
//! record fail with `StorageError::NotFound`, and writes naming a missing
//! parent fail with `StorageError::InvalidReference`.

use async_trait::async_trait;

use crate::StorageResult;
use crate::types::{
    ActivityEntry, Client, ClientInput, Milestone, MilestoneInput, NewActivity, Notification,
    NotificationInput, Project, ProjectInput, Resource, ResourceInput,
};

/// Persistence for clients.
#[async_trait]
pub trait ClientStorage: Send + Sync {
    /// Lists all clients ordered by name.
    async fn list_clients(&self) -> StorageResult<Vec<Client>>;

    /// Reads a client by ID.
    async fn get_client(&self, id: &str) -> StorageResult<Option<Client>>;

    /// Creates a client.
    async fn create_client(&self, input: ClientInput) -> StorageResult<Client>;

    /// Replaces a client's editable fields.
    async fn update_client(&self, id: &str, input: ClientInput) -> StorageResult<Client>;

    /// Deletes a client together with its projects, milestones, resources
    /// and notifications.
    async fn delete_client(&self, id: &str) -> StorageResult<()>;
}

/// Persistence for projects.
#[async_trait]
pub trait ProjectStorage: Send + Sync {
    /// Lists projects, optionally restricted to one client, newest first.
    async fn list_projects(&self, client_id: Option<&str>) -> StorageResult<Vec<Project>>;

    /// Reads a project by ID.
    async fn get_project(&self, id: &str) -> StorageResult<Option<Project>>;

    /// Creates a project. The client must exist.
    async fn create_project(&self, input: ProjectInput) -> StorageResult<Project>;

    /// Replaces a project's editable fields. The client must exist.
    async fn update_project(&self, id: &str, input: ProjectInput) -> StorageResult<Project>;

    /// Deletes a project and its milestones. Resources attached to it are
    /// kept and detached from the project.
    async fn delete_project(&self, id: &str) -> StorageResult<()>;
}

/// Persistence for milestones.
#[async_trait]
pub trait MilestoneStorage: Send + Sync {
    /// Lists a project's milestones ordered by due date.
    async fn list_milestones(&self, project_id: &str) -> StorageResult<Vec<Milestone>>;

    /// Lists milestones across all of a client's projects ordered by due date.
    async fn list_client_milestones(&self, client_id: &str) -> StorageResult<Vec<Milestone>>;

    /// Reads a milestone by ID.
    async fn get_milestone(&self, id: &str) -> StorageResult<Option<Milestone>>;

    /// Creates a milestone. The project must exist.
    async fn create_milestone(&self, input: MilestoneInput) -> StorageResult<Milestone>;

    /// Replaces a milestone's editable fields.
    async fn update_milestone(&self, id: &str, input: MilestoneInput) -> StorageResult<Milestone>;

    /// Deletes a milestone.
    async fn delete_milestone(&self, id: &str) -> StorageResult<()>;
}

/// Persistence for shared resources.
#[async_trait]
pub trait ResourceStorage: Send + Sync {
    /// Lists resources, optionally restricted to one client, newest first.
    async fn list_resources(&self, client_id: Option<&str>) -> StorageResult<Vec<Resource>>;

    /// Reads a resource by ID.
    async fn get_resource(&self, id: &str) -> StorageResult<Option<Resource>>;

    /// Creates a resource. The client must exist, and the project, if given,
    /// must belong to that client.
    async fn create_resource(&self, input: ResourceInput) -> StorageResult<Resource>;

    /// Replaces a resource's editable fields.
    async fn update_resource(&self, id: &str, input: ResourceInput) -> StorageResult<Resource>;

    /// Deletes a resource.
    async fn delete_resource(&self, id: &str) -> StorageResult<()>;
}

/// Persistence for client notifications.
#[async_trait]
pub trait NotificationStorage: Send + Sync {
    /// Lists a client's notifications, newest first.
    async fn list_notifications(&self, client_id: &str) -> StorageResult<Vec<Notification>>;

    /// Creates an unread notification. The client must exist.
    async fn create_notification(&self, input: NotificationInput) -> StorageResult<Notification>;

    /// Marks one of a client's notifications as read.
    ///
    /// Fails with `NotFound` if the notification does not exist or belongs
    /// to another client.
    async fn mark_notification_read(
        &self,
        client_id: &str,
        id: &str,
    ) -> StorageResult<Notification>;
}

/// Append-only activity log.
#[async_trait]
pub trait ActivityStorage: Send + Sync {
    /// Appends an entry.
    async fn record_activity(&self, activity: NewActivity) -> StorageResult<ActivityEntry>;

    /// Lists the most recent entries, newest first.
    async fn list_activity(&self, limit: usize) -> StorageResult<Vec<ActivityEntry>>;
}

/// Every portal storage capability behind one trait object.
pub trait PortalStorage:
    ClientStorage
    + ProjectStorage
    + MilestoneStorage
    + ResourceStorage
    + NotificationStorage
    + ActivityStorage
{
}

impl<T> PortalStorage for T where
    T: ClientStorage
        + ProjectStorage
        + MilestoneStorage
        + ResourceStorage
        + NotificationStorage
        + ActivityStorage
{
}

//! Implementation of the portal storage traits for InMemoryStorage.

use std::cmp::Ordering;

use async_trait::async_trait;
use time::OffsetDateTime;

use portal_storage::{
    ActivityEntry, ActivityStorage, Client, ClientInput, ClientStorage, Milestone, MilestoneInput,
    MilestoneStorage, NewActivity, Notification, NotificationInput, NotificationStorage, Project,
    ProjectInput, ProjectStorage, Resource, ResourceInput, ResourceStorage, StorageError,
    StorageResult, new_id,
};

use crate::storage::{self, InMemoryStorage, Stored};

/// Orders milestones by due date, undated last, then creation.
fn by_due_date(a: &Milestone, b: &Milestone) -> Ordering {
    match (a.due_date, b.due_date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl InMemoryStorage {
    fn check_project_reference(
        &self,
        client_id: &str,
        project_id: Option<&str>,
    ) -> StorageResult<()> {
        if !storage::contains(&self.clients, client_id) {
            return Err(StorageError::invalid_reference("client", client_id));
        }
        if let Some(project_id) = project_id {
            match storage::get(&self.projects, project_id) {
                Some(project) if project.client_id == client_id => {}
                _ => return Err(StorageError::invalid_reference("project", project_id)),
            }
        }
        Ok(())
    }

    /// Clears the project link of every resource attached to `project_id`.
    fn detach_resources(&self, project_id: &str) {
        let guard = self.resources.pin();
        for (id, stored) in guard.iter() {
            if stored.record.project_id.as_deref() == Some(project_id) {
                let mut detached = stored.clone();
                detached.record.project_id = None;
                guard.insert(id.clone(), detached);
            }
        }
    }
}

// =============================================================================
// Clients
// =============================================================================

#[async_trait]
impl ClientStorage for InMemoryStorage {
    async fn list_clients(&self) -> StorageResult<Vec<Client>> {
        let mut clients = storage::rows(&self.clients, |_| true);
        clients.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(clients)
    }

    async fn get_client(&self, id: &str) -> StorageResult<Option<Client>> {
        Ok(storage::get(&self.clients, id))
    }

    async fn create_client(&self, input: ClientInput) -> StorageResult<Client> {
        input.validate()?;
        let _lock = self.write_lock().await;

        let now = OffsetDateTime::now_utc();
        let client = Client {
            id: new_id(),
            name: input.name,
            company: input.company,
            email: input.email,
            phone: input.phone,
            created_at: now,
            updated_at: now,
        };
        self.clients.pin().insert(
            client.id.clone(),
            Stored {
                seq: self.next_seq(),
                record: client.clone(),
            },
        );
        Ok(client)
    }

    async fn update_client(&self, id: &str, input: ClientInput) -> StorageResult<Client> {
        input.validate()?;
        let _lock = self.write_lock().await;

        let guard = self.clients.pin();
        let current = guard
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::not_found("client", id))?;

        let client = Client {
            name: input.name,
            company: input.company,
            email: input.email,
            phone: input.phone,
            updated_at: OffsetDateTime::now_utc(),
            ..current.record
        };
        guard.insert(
            id.to_string(),
            Stored {
                seq: current.seq,
                record: client.clone(),
            },
        );
        Ok(client)
    }

    async fn delete_client(&self, id: &str) -> StorageResult<()> {
        let _lock = self.write_lock().await;

        if self.clients.pin().remove(id).is_none() {
            return Err(StorageError::not_found("client", id));
        }

        let project_ids = storage::remove_where(&self.projects, |p| p.client_id == id);
        let milestones = storage::remove_where(&self.milestones, |m| {
            project_ids.iter().any(|p| *p == m.project_id)
        });
        let resources = storage::remove_where(&self.resources, |r| r.client_id == id);
        let notifications = storage::remove_where(&self.notifications, |n| n.client_id == id);

        tracing::debug!(
            client_id = %id,
            projects = project_ids.len(),
            milestones = milestones.len(),
            resources = resources.len(),
            notifications = notifications.len(),
            "Deleted client and dependent records"
        );
        Ok(())
    }
}

// =============================================================================
// Projects
// =============================================================================

#[async_trait]
impl ProjectStorage for InMemoryStorage {
    async fn list_projects(&self, client_id: Option<&str>) -> StorageResult<Vec<Project>> {
        let mut projects =
            storage::rows(&self.projects, |p| client_id.is_none_or(|c| p.client_id == c));
        projects.reverse();
        Ok(projects)
    }

    async fn get_project(&self, id: &str) -> StorageResult<Option<Project>> {
        Ok(storage::get(&self.projects, id))
    }

    async fn create_project(&self, input: ProjectInput) -> StorageResult<Project> {
        input.validate()?;
        let _lock = self.write_lock().await;
        self.check_project_reference(&input.client_id, None)?;

        let now = OffsetDateTime::now_utc();
        let project = Project {
            id: new_id(),
            client_id: input.client_id,
            name: input.name,
            description: input.description,
            status: input.status,
            start_date: input.start_date,
            due_date: input.due_date,
            created_at: now,
            updated_at: now,
        };
        self.projects.pin().insert(
            project.id.clone(),
            Stored {
                seq: self.next_seq(),
                record: project.clone(),
            },
        );
        Ok(project)
    }

    async fn update_project(&self, id: &str, input: ProjectInput) -> StorageResult<Project> {
        input.validate()?;
        let _lock = self.write_lock().await;

        let Stored { seq, record: current } = self
            .projects
            .pin()
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::not_found("project", id))?;
        self.check_project_reference(&input.client_id, None)?;

        let moved = current.client_id != input.client_id;
        let project = Project {
            client_id: input.client_id,
            name: input.name,
            description: input.description,
            status: input.status,
            start_date: input.start_date,
            due_date: input.due_date,
            updated_at: OffsetDateTime::now_utc(),
            ..current
        };
        self.projects.pin().insert(
            id.to_string(),
            Stored {
                seq,
                record: project.clone(),
            },
        );

        if moved {
            // Resources must stay within their own client.
            self.detach_resources(id);
        }
        Ok(project)
    }

    async fn delete_project(&self, id: &str) -> StorageResult<()> {
        let _lock = self.write_lock().await;

        if self.projects.pin().remove(id).is_none() {
            return Err(StorageError::not_found("project", id));
        }
        storage::remove_where(&self.milestones, |m| m.project_id == id);
        self.detach_resources(id);
        Ok(())
    }
}

// =============================================================================
// Milestones
// =============================================================================

#[async_trait]
impl MilestoneStorage for InMemoryStorage {
    async fn list_milestones(&self, project_id: &str) -> StorageResult<Vec<Milestone>> {
        let mut milestones = storage::rows(&self.milestones, |m| m.project_id == project_id);
        milestones.sort_by(by_due_date);
        Ok(milestones)
    }

    async fn list_client_milestones(&self, client_id: &str) -> StorageResult<Vec<Milestone>> {
        let project_ids: Vec<String> = storage::rows(&self.projects, |p| p.client_id == client_id)
            .into_iter()
            .map(|p| p.id)
            .collect();
        let mut milestones = storage::rows(&self.milestones, |m| {
            project_ids.iter().any(|p| *p == m.project_id)
        });
        milestones.sort_by(by_due_date);
        Ok(milestones)
    }

    async fn get_milestone(&self, id: &str) -> StorageResult<Option<Milestone>> {
        Ok(storage::get(&self.milestones, id))
    }

    async fn create_milestone(&self, input: MilestoneInput) -> StorageResult<Milestone> {
        input.validate()?;
        let _lock = self.write_lock().await;
        if !storage::contains(&self.projects, &input.project_id) {
            return Err(StorageError::invalid_reference("project", input.project_id));
        }

        let now = OffsetDateTime::now_utc();
        let milestone = Milestone {
            id: new_id(),
            project_id: input.project_id,
            title: input.title,
            description: input.description,
            due_date: input.due_date,
            completed: input.completed,
            created_at: now,
            updated_at: now,
        };
        self.milestones.pin().insert(
            milestone.id.clone(),
            Stored {
                seq: self.next_seq(),
                record: milestone.clone(),
            },
        );
        Ok(milestone)
    }

    async fn update_milestone(&self, id: &str, input: MilestoneInput) -> StorageResult<Milestone> {
        input.validate()?;
        let _lock = self.write_lock().await;

        let guard = self.milestones.pin();
        let current = guard
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::not_found("milestone", id))?;
        if !storage::contains(&self.projects, &input.project_id) {
            return Err(StorageError::invalid_reference("project", input.project_id));
        }

        let milestone = Milestone {
            project_id: input.project_id,
            title: input.title,
            description: input.description,
            due_date: input.due_date,
            completed: input.completed,
            updated_at: OffsetDateTime::now_utc(),
            ..current.record
        };
        guard.insert(
            id.to_string(),
            Stored {
                seq: current.seq,
                record: milestone.clone(),
            },
        );
        Ok(milestone)
    }

    async fn delete_milestone(&self, id: &str) -> StorageResult<()> {
        let _lock = self.write_lock().await;
        match self.milestones.pin().remove(id) {
            Some(_) => Ok(()),
            None => Err(StorageError::not_found("milestone", id)),
        }
    }
}

// =============================================================================
// Resources
// =============================================================================

#[async_trait]
impl ResourceStorage for InMemoryStorage {
    async fn list_resources(&self, client_id: Option<&str>) -> StorageResult<Vec<Resource>> {
        let mut resources =
            storage::rows(&self.resources, |r| client_id.is_none_or(|c| r.client_id == c));
        resources.reverse();
        Ok(resources)
    }

    async fn get_resource(&self, id: &str) -> StorageResult<Option<Resource>> {
        Ok(storage::get(&self.resources, id))
    }

    async fn create_resource(&self, input: ResourceInput) -> StorageResult<Resource> {
        input.validate()?;
        let _lock = self.write_lock().await;
        self.check_project_reference(&input.client_id, input.project_id.as_deref())?;

        let now = OffsetDateTime::now_utc();
        let resource = Resource {
            id: new_id(),
            client_id: input.client_id,
            project_id: input.project_id,
            title: input.title,
            url: input.url,
            kind: input.kind,
            created_at: now,
            updated_at: now,
        };
        self.resources.pin().insert(
            resource.id.clone(),
            Stored {
                seq: self.next_seq(),
                record: resource.clone(),
            },
        );
        Ok(resource)
    }

    async fn update_resource(&self, id: &str, input: ResourceInput) -> StorageResult<Resource> {
        input.validate()?;
        let _lock = self.write_lock().await;

        let guard = self.resources.pin();
        let current = guard
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::not_found("resource", id))?;
        self.check_project_reference(&input.client_id, input.project_id.as_deref())?;

        let resource = Resource {
            client_id: input.client_id,
            project_id: input.project_id,
            title: input.title,
            url: input.url,
            kind: input.kind,
            updated_at: OffsetDateTime::now_utc(),
            ..current.record
        };
        guard.insert(
            id.to_string(),
            Stored {
                seq: current.seq,
                record: resource.clone(),
            },
        );
        Ok(resource)
    }

    async fn delete_resource(&self, id: &str) -> StorageResult<()> {
        let _lock = self.write_lock().await;
        match self.resources.pin().remove(id) {
            Some(_) => Ok(()),
            None => Err(StorageError::not_found("resource", id)),
        }
    }
}

// =============================================================================
// Notifications
// =============================================================================

#[async_trait]
impl NotificationStorage for InMemoryStorage {
    async fn list_notifications(&self, client_id: &str) -> StorageResult<Vec<Notification>> {
        let mut notifications = storage::rows(&self.notifications, |n| n.client_id == client_id);
        notifications.reverse();
        Ok(notifications)
    }

    async fn create_notification(&self, input: NotificationInput) -> StorageResult<Notification> {
        input.validate()?;
        let _lock = self.write_lock().await;
        if !storage::contains(&self.clients, &input.client_id) {
            return Err(StorageError::invalid_reference("client", input.client_id));
        }

        let notification = Notification {
            id: new_id(),
            client_id: input.client_id,
            title: input.title,
            message: input.message,
            read: false,
            created_at: OffsetDateTime::now_utc(),
        };
        self.notifications.pin().insert(
            notification.id.clone(),
            Stored {
                seq: self.next_seq(),
                record: notification.clone(),
            },
        );
        Ok(notification)
    }

    async fn mark_notification_read(
        &self,
        client_id: &str,
        id: &str,
    ) -> StorageResult<Notification> {
        let _lock = self.write_lock().await;

        let guard = self.notifications.pin();
        let mut stored = guard
            .get(id)
            .filter(|stored| stored.record.client_id == client_id)
            .cloned()
            .ok_or_else(|| StorageError::not_found("notification", id))?;
        stored.record.read = true;
        let notification = stored.record.clone();
        guard.insert(id.to_string(), stored);
        Ok(notification)
    }
}

// =============================================================================
// Activity
// =============================================================================

#[async_trait]
impl ActivityStorage for InMemoryStorage {
    async fn record_activity(&self, activity: NewActivity) -> StorageResult<ActivityEntry> {
        let entry = ActivityEntry {
            id: new_id(),
            actor: activity.actor,
            action: activity.action,
            entity_kind: activity.entity_kind,
            entity_id: activity.entity_id,
            details: activity.details,
            created_at: OffsetDateTime::now_utc(),
        };
        let mut log = self.activity.write().await;
        while log.len() >= self.activity_capacity {
            log.pop_front();
        }
        log.push_back(entry.clone());
        Ok(entry)
    }

    async fn list_activity(&self, limit: usize) -> StorageResult<Vec<ActivityEntry>> {
        let log = self.activity.read().await;
        Ok(log.iter().rev().take(limit).cloned().collect())
    }
}

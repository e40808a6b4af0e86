//! Cached read access to everything a client sees in the portal.
//!
//! Each read is memoized in the [`ResponseCache`] under
//! `client-<kind>-<client id>`. Writes that touch a client's records call
//! [`ClientDataService::invalidate_client`] so the next read is fresh.

use std::sync::Arc;
use std::time::Duration;

use portal_storage::{
    Client, DynPortalStorage, Milestone, Notification, Project, Resource, StorageError,
};
use serde::Serialize;

use crate::cache::{CacheStats, ResponseCache};
use crate::config::CacheConfig;
use crate::error::ApiError;

/// Kinds of cached client data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    Data,
    Projects,
    Resources,
    Milestones,
    Notifications,
}

impl DataKind {
    pub const ALL: [DataKind; 5] = [
        DataKind::Data,
        DataKind::Projects,
        DataKind::Resources,
        DataKind::Milestones,
        DataKind::Notifications,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DataKind::Data => "data",
            DataKind::Projects => "projects",
            DataKind::Resources => "resources",
            DataKind::Milestones => "milestones",
            DataKind::Notifications => "notifications",
        }
    }

    /// Cache key for this kind of data for one client.
    pub fn key(self, client_id: &str) -> String {
        format!("client-{}-{client_id}", self.as_str())
    }
}

/// Everything shown on a client's dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct ClientOverview {
    pub client: Client,
    pub projects: Vec<Project>,
    pub milestones: Vec<Milestone>,
    pub resources: Vec<Resource>,
    pub notifications: Vec<Notification>,
    pub active_projects: usize,
    pub unread_notifications: usize,
}

/// A cached value. One cache holds every kind, keyed by [`DataKind::key`].
#[derive(Debug, Clone)]
pub enum ClientPayload {
    Overview(Arc<ClientOverview>),
    Projects(Arc<Vec<Project>>),
    Resources(Arc<Vec<Resource>>),
    Milestones(Arc<Vec<Milestone>>),
    Notifications(Arc<Vec<Notification>>),
}

/// Shared response cache for client data.
pub type ClientDataCache = ResponseCache<ClientPayload>;

// Reads one variant through the cache. A wrong variant under the key is
// treated as a miss and overwritten.
macro_rules! cached {
    ($self:ident, $kind:expr, $client_id:expr, $variant:ident, $load:expr) => {{
        let key = $kind.key($client_id);
        if let Some(ClientPayload::$variant(value)) = $self.cache.get(&key) {
            tracing::trace!(key = %key, "client data cache hit");
            return Ok(value);
        }
        let value = Arc::new($load.await?);
        $self
            .cache
            .set(key, ClientPayload::$variant(value.clone()), $self.ttl($kind));
        Ok(value)
    }};
}

/// Aggregates and caches per-client reads.
#[derive(Clone)]
pub struct ClientDataService {
    storage: DynPortalStorage,
    cache: Arc<ClientDataCache>,
    ttls: CacheConfig,
}

impl ClientDataService {
    pub fn new(storage: DynPortalStorage, cache: Arc<ClientDataCache>, ttls: CacheConfig) -> Self {
        Self {
            storage,
            cache,
            ttls,
        }
    }

    pub fn cache(&self) -> &Arc<ClientDataCache> {
        &self.cache
    }

    async fn require_client(&self, client_id: &str) -> Result<Client, ApiError> {
        self.storage
            .get_client(client_id)
            .await?
            .ok_or_else(|| StorageError::not_found("client", client_id).into())
    }

    /// The client's full dashboard aggregate.
    pub async fn client_data(&self, client_id: &str) -> Result<Arc<ClientOverview>, ApiError> {
        cached!(
            self,
            DataKind::Data,
            client_id,
            Overview,
            self.load_overview(client_id)
        )
    }

    pub async fn projects(&self, client_id: &str) -> Result<Arc<Vec<Project>>, ApiError> {
        cached!(
            self,
            DataKind::Projects,
            client_id,
            Projects,
            async {
                self.require_client(client_id).await?;
                Ok::<_, ApiError>(self.storage.list_projects(Some(client_id)).await?)
            }
        )
    }

    pub async fn resources(&self, client_id: &str) -> Result<Arc<Vec<Resource>>, ApiError> {
        cached!(
            self,
            DataKind::Resources,
            client_id,
            Resources,
            async {
                self.require_client(client_id).await?;
                Ok::<_, ApiError>(self.storage.list_resources(Some(client_id)).await?)
            }
        )
    }

    pub async fn milestones(&self, client_id: &str) -> Result<Arc<Vec<Milestone>>, ApiError> {
        cached!(
            self,
            DataKind::Milestones,
            client_id,
            Milestones,
            async {
                self.require_client(client_id).await?;
                Ok::<_, ApiError>(self.storage.list_client_milestones(client_id).await?)
            }
        )
    }

    pub async fn notifications(
        &self,
        client_id: &str,
    ) -> Result<Arc<Vec<Notification>>, ApiError> {
        cached!(
            self,
            DataKind::Notifications,
            client_id,
            Notifications,
            async {
                self.require_client(client_id).await?;
                Ok::<_, ApiError>(self.storage.list_notifications(client_id).await?)
            }
        )
    }

    async fn load_overview(&self, client_id: &str) -> Result<ClientOverview, ApiError> {
        let client = self.require_client(client_id).await?;
        let projects = self.storage.list_projects(Some(client_id)).await?;
        let milestones = self.storage.list_client_milestones(client_id).await?;
        let resources = self.storage.list_resources(Some(client_id)).await?;
        let notifications = self.storage.list_notifications(client_id).await?;

        Ok(ClientOverview {
            active_projects: projects.iter().filter(|p| p.status.is_active()).count(),
            unread_notifications: notifications.iter().filter(|n| !n.read).count(),
            client,
            projects,
            milestones,
            resources,
            notifications,
        })
    }

    /// Drops every cached read for one client.
    pub fn invalidate_client(&self, client_id: &str) {
        for kind in DataKind::ALL {
            self.cache.delete(&kind.key(client_id));
        }
        tracing::debug!(client_id = %client_id, "client data cache invalidated");
    }

    /// Drops every cached entry whose key starts with `prefix`.
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        self.cache.invalidate_by_prefix(prefix)
    }

    /// Drops every cached read. Returns the number of keys removed.
    pub fn clear_cache(&self) -> usize {
        let removed = self.cache.clear();
        tracing::debug!(removed, "client data cache cleared");
        removed
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// TTL applied to one kind of data.
    pub fn ttl(&self, kind: DataKind) -> Duration {
        match kind {
            DataKind::Data => self.ttls.client_data_ttl(),
            DataKind::Projects => self.ttls.projects_ttl(),
            DataKind::Resources => self.ttls.resources_ttl(),
            DataKind::Milestones => self.ttls.milestones_ttl(),
            DataKind::Notifications => self.ttls.notifications_ttl(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_db_memory::InMemoryStorage;
    use portal_storage::{
        ClientInput, ClientStorage, NotificationInput, NotificationStorage, ProjectInput,
        ProjectStatus, ProjectStorage,
    };

    async fn setup() -> (ClientDataService, Arc<InMemoryStorage>, String) {
        let storage = Arc::new(InMemoryStorage::new());
        let client = storage
            .create_client(ClientInput {
                name: "Acme".into(),
                ..ClientInput::default()
            })
            .await
            .unwrap();
        storage
            .create_project(ProjectInput {
                client_id: client.id.clone(),
                name: "Website".into(),
                status: ProjectStatus::InProgress,
                ..ProjectInput::default()
            })
            .await
            .unwrap();

        let service = ClientDataService::new(
            storage.clone(),
            Arc::new(ClientDataCache::new()),
            CacheConfig::default(),
        );
        (service, storage, client.id)
    }

    #[test]
    fn test_cache_keys() {
        assert_eq!(DataKind::Data.key("42"), "client-data-42");
        assert_eq!(DataKind::Notifications.key("42"), "client-notifications-42");
    }

    #[tokio::test]
    async fn test_overview_aggregates() {
        let (service, storage, client_id) = setup().await;
        storage
            .create_notification(NotificationInput {
                client_id: client_id.clone(),
                title: "Welcome".into(),
                message: String::new(),
            })
            .await
            .unwrap();

        let overview = service.client_data(&client_id).await.unwrap();
        assert_eq!(overview.client.name, "Acme");
        assert_eq!(overview.projects.len(), 1);
        assert_eq!(overview.active_projects, 1);
        assert_eq!(overview.unread_notifications, 1);
    }

    #[tokio::test]
    async fn test_reads_are_cached_until_invalidated() {
        let (service, storage, client_id) = setup().await;

        assert_eq!(service.projects(&client_id).await.unwrap().len(), 1);
        storage
            .create_project(ProjectInput {
                client_id: client_id.clone(),
                name: "App".into(),
                ..ProjectInput::default()
            })
            .await
            .unwrap();

        // Stale until invalidated.
        assert_eq!(service.projects(&client_id).await.unwrap().len(), 1);
        assert_eq!(service.stats().hits, 1);

        service.invalidate_client(&client_id);
        assert_eq!(service.projects(&client_id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_client_only_touches_that_client() {
        let (service, _storage, client_id) = setup().await;
        service.projects(&client_id).await.unwrap();
        service.notifications(&client_id).await.unwrap();
        service.cache().set(
            "client-projects-other",
            ClientPayload::Projects(Arc::new(Vec::new())),
            service.ttl(DataKind::Projects),
        );

        service.invalidate_client(&client_id);

        assert_eq!(service.cache().keys(), ["client-projects-other"]);
    }

    #[tokio::test]
    async fn test_unknown_client_is_not_cached() {
        let (service, _storage, _) = setup().await;
        let err = service.client_data("missing").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        assert!(service.cache().is_empty());
    }

    #[tokio::test]
    async fn test_invalidate_prefix() {
        let (service, _storage, client_id) = setup().await;
        service.client_data(&client_id).await.unwrap();
        service.projects(&client_id).await.unwrap();

        assert_eq!(service.invalidate_prefix("client-data-"), 1);
        assert_eq!(service.cache().keys(), [DataKind::Projects.key(&client_id)]);
    }
}

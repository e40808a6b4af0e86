//! Audit trail of admin writes and logins.

use portal_storage::{DynPortalStorage, NewActivity};
use serde_json::Value;

/// Records activity entries. Recording never fails the caller: storage
/// errors are logged and dropped.
#[derive(Clone)]
pub struct ActivityLogger {
    storage: DynPortalStorage,
}

impl ActivityLogger {
    pub fn new(storage: DynPortalStorage) -> Self {
        Self { storage }
    }

    pub async fn record(
        &self,
        actor: &str,
        action: &str,
        entity_kind: &str,
        entity_id: Option<&str>,
        details: Option<Value>,
    ) {
        let activity = NewActivity {
            actor: actor.to_string(),
            action: action.to_string(),
            entity_kind: entity_kind.to_string(),
            entity_id: entity_id.map(str::to_string),
            details,
        };
        if let Err(e) = self.storage.record_activity(activity).await {
            tracing::warn!(
                error = %e,
                actor = %actor,
                action = %action,
                entity_kind = %entity_kind,
                "Failed to record activity"
            );
        }
    }

    /// Records in a background task, for callers that cannot await.
    pub fn record_detached(
        &self,
        actor: String,
        action: &'static str,
        entity_kind: &'static str,
        entity_id: Option<String>,
    ) {
        let logger = self.clone();
        tokio::spawn(async move {
            logger
                .record(&actor, action, entity_kind, entity_id.as_deref(), None)
                .await;
        });
    }
}

//! Domain records stored by the portal and the inputs used to write them.
//!
//! Records carry server-assigned IDs and timestamps. Inputs carry only the
//! caller-editable fields and are used for both create and full replace.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::error::StorageError;

fn require(field: &str, value: &str) -> Result<(), StorageError> {
    if value.trim().is_empty() {
        return Err(StorageError::invalid_input(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Generates a new record ID.
#[must_use]
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// =============================================================================
// Clients
// =============================================================================

/// A customer organisation with access to the portal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Editable client fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientInput {
    pub name: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl ClientInput {
    /// Checks required fields.
    pub fn validate(&self) -> Result<(), StorageError> {
        require("name", &self.name)
    }
}

// =============================================================================
// Projects
// =============================================================================

/// Lifecycle state of a project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Planning,
    InProgress,
    OnHold,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    /// Returns `true` for projects still being worked on.
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Planning | Self::InProgress | Self::OnHold)
    }
}

/// A piece of work delivered to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub client_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: ProjectStatus,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start_date: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Editable project fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectInput {
    pub client_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start_date: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
}

impl ProjectInput {
    /// Checks required fields.
    pub fn validate(&self) -> Result<(), StorageError> {
        require("client_id", &self.client_id)?;
        require("name", &self.name)?;
        if let (Some(start), Some(due)) = (self.start_date, self.due_date) {
            if due < start {
                return Err(StorageError::invalid_input(
                    "due_date must not be before start_date",
                ));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Milestones
// =============================================================================

/// A checkpoint within a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: String,
    pub project_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
    pub completed: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Editable milestone fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MilestoneInput {
    pub project_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
    #[serde(default)]
    pub completed: bool,
}

impl MilestoneInput {
    /// Checks required fields.
    pub fn validate(&self) -> Result<(), StorageError> {
        require("project_id", &self.project_id)?;
        require("title", &self.title)
    }
}

// =============================================================================
// Resources
// =============================================================================

/// A document or link shared with a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Editable resource fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceInput {
    pub client_id: String,
    #[serde(default)]
    pub project_id: Option<String>,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub kind: Option<String>,
}

impl ResourceInput {
    /// Checks required fields.
    pub fn validate(&self) -> Result<(), StorageError> {
        require("client_id", &self.client_id)?;
        require("title", &self.title)?;
        require("url", &self.url)
    }
}

// =============================================================================
// Notifications
// =============================================================================

/// A message shown to a client in the portal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub client_id: String,
    pub title: String,
    pub message: String,
    pub read: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Fields for a new notification.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationInput {
    pub client_id: String,
    pub title: String,
    #[serde(default)]
    pub message: String,
}

impl NotificationInput {
    /// Checks required fields.
    pub fn validate(&self) -> Result<(), StorageError> {
        require("client_id", &self.client_id)?;
        require("title", &self.title)
    }
}

// =============================================================================
// Activity
// =============================================================================

/// An audit record of something a user did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: String,
    /// Email or ID of the acting user.
    pub actor: String,
    /// Verb, e.g. `create`, `update`, `delete`, `login`.
    pub action: String,
    /// Kind of the affected record, e.g. `client`.
    pub entity_kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Fields for a new activity entry.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub actor: String,
    pub action: String,
    pub entity_kind: String,
    pub entity_id: Option<String>,
    pub details: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_project_status_serde() {
        let status: ProjectStatus = serde_json::from_str("\"in_progress\"").unwrap();
        assert_eq!(status, ProjectStatus::InProgress);
        assert_eq!(
            serde_json::to_string(&ProjectStatus::OnHold).unwrap(),
            "\"on_hold\""
        );
        assert!(status.is_active());
        assert!(!ProjectStatus::Completed.is_active());
    }

    #[test]
    fn test_project_input_defaults() {
        let input: ProjectInput =
            serde_json::from_str(r#"{"client_id":"c-1","name":"Website"}"#).unwrap();
        assert_eq!(input.status, ProjectStatus::Planning);
        assert!(input.due_date.is_none());
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_project_input_dates() {
        let input = ProjectInput {
            client_id: "c-1".into(),
            name: "Website".into(),
            start_date: Some(datetime!(2024-03-01 0:00 UTC)),
            due_date: Some(datetime!(2024-02-01 0:00 UTC)),
            ..ProjectInput::default()
        };
        assert!(matches!(
            input.validate(),
            Err(StorageError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_blank_required_fields_rejected() {
        let client = ClientInput {
            name: "   ".into(),
            ..ClientInput::default()
        };
        assert!(client.validate().is_err());

        let resource = ResourceInput {
            client_id: "c-1".into(),
            title: "Brief".into(),
            ..ResourceInput::default()
        };
        let err = resource.validate().unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: url must not be empty");
    }
}

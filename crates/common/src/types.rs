//! Core v3 API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Task status label reported while the task waits for a worker
pub const TASK_QUEUED: &str = "QUEUED";
/// Task status label reported while the task executes
pub const TASK_RUNNING: &str = "RUNNING";
/// Task status label reported once the task has completed
pub const TASK_SUCCEEDED: &str = "SUCCEEDED";
/// Task status label reported when the task itself failed
pub const TASK_FAILED: &str = "FAILED";
/// Task status label reported when the task handle is permanently invalid
pub const TASK_INVALID_UUID: &str = "INVALID_UUID";

/// Reference to another entity (cluster, project, owner, ...)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Reference {
    pub fn new(kind: impl Into<String>, uuid: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            uuid: Some(uuid.into()),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Entity metadata common to all v3 resources
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec_version: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_reference: Option<Reference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_reference: Option<Reference>,
}

/// Snapshot of an asynchronous task as returned by `GET /tasks/{uuid}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage_complete: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entity_reference_list: Vec<Reference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<DateTime<Utc>>,
}

impl TaskStatus {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            ..Default::default()
        }
    }

    pub fn with_error_detail(mut self, detail: impl Into<String>) -> Self {
        self.error_detail = Some(detail.into());
        self
    }

    /// Backend error detail, empty when the backend supplied none
    pub fn error_detail(&self) -> &str {
        self.error_detail.as_deref().unwrap_or("")
    }

    /// True for the two labels that mark a task as permanently failed
    pub fn is_failed(&self) -> bool {
        self.status == TASK_FAILED || self.status == TASK_INVALID_UUID
    }
}

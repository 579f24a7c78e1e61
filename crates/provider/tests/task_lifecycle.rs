//! Create-then-wait flow as a resource would run it
//!
//! Builds request metadata from configuration, submits it to a fake backend
//! that hands out a task handle, then waits for the task through the public
//! driver and flattens the resulting metadata back into state.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use nutanix_common::{Metadata, TaskStatus};
use nutanix_provider::helpers::{get_metadata_attributes, set_rs_entity_metadata};
use nutanix_provider::state::DynamicValue;
use nutanix_provider::{FetchError, TaskStatusProvider, TaskWaiter, WaitConfig, WaitError};
use serde_json::json;

/// Backend whose task advances one step per poll
struct Backend {
    task_uuid: String,
    progress: Mutex<Vec<&'static str>>,
}

impl Backend {
    fn new(task_uuid: &str, mut steps: Vec<&'static str>) -> Self {
        steps.reverse();
        Self {
            task_uuid: task_uuid.to_string(),
            progress: Mutex::new(steps),
        }
    }
}

#[async_trait]
impl TaskStatusProvider for Backend {
    async fn get_task(&self, task_uuid: &str) -> Result<TaskStatus, FetchError> {
        if task_uuid != self.task_uuid {
            return Err(FetchError::Api {
                status: 404,
                message: format!("task {task_uuid}: INVALID_UUID"),
            });
        }
        let mut progress = self.progress.lock().unwrap();
        let status = if progress.len() > 1 {
            progress.pop().unwrap()
        } else {
            progress[0]
        };
        match status {
            "FAILED" => Ok(TaskStatus::new(status)
                .with_error_detail("vm create failed: out of memory")),
            "DOWN" => Err(FetchError::Transport("connection refused".into())),
            _ => Ok(TaskStatus::new(status)),
        }
    }
}

fn waiter() -> TaskWaiter {
    let config = WaitConfig {
        timeout_secs: 120,
        delay_secs: 1,
        min_timeout_secs: 1,
        poll_interval_secs: None,
    };
    TaskWaiter::from_config(&config)
}

#[tokio::test(start_paused = true)]
async fn create_and_wait_for_vm() {
    let config = DynamicValue::from(json!({
        "name": "web-01",
        "categories": [{"name": "Environment", "value": "Staging"}],
        "project_reference": {"kind": "project", "uuid": "6f1d"},
    }));

    let mut metadata = Metadata::default();
    get_metadata_attributes(&config, &mut metadata, "vm").unwrap();
    assert_eq!(metadata.kind.as_deref(), Some("vm"));

    let backend: Box<dyn TaskStatusProvider> =
        Box::new(Backend::new("task-1", vec!["QUEUED", "RUNNING", "RUNNING", "SUCCEEDED"]));
    let task = waiter().wait_for_task(backend.as_ref(), "task-1").await.unwrap();
    assert_eq!(task.status, "SUCCEEDED");

    metadata.uuid = Some("vm-uuid".into());
    let (state, categories) = set_rs_entity_metadata(&metadata);
    assert_eq!(state.get("uuid").and_then(|v| v.as_string()), Some("vm-uuid"));
    assert_eq!(categories.len(), 1);
    assert_eq!(
        categories[0].get("value").and_then(|v| v.as_string()),
        Some("Staging")
    );
}

#[tokio::test(start_paused = true)]
async fn failed_task_message_is_backend_detail() {
    let backend = Backend::new("task-2", vec!["QUEUED", "FAILED"]);
    let err = waiter().wait_for_task(&backend, "task-2").await.unwrap_err();
    assert_eq!(err.to_string(), "vm create failed: out of memory");
}

#[tokio::test(start_paused = true)]
async fn unknown_handle_keeps_polling_until_not_found() {
    let backend = Backend::new("task-3", vec!["RUNNING"]);
    let waiter = TaskWaiter {
        not_found_checks: 2,
        ..waiter()
    };
    let err = waiter.wait_for_task(&backend, "other").await.unwrap_err();
    assert!(matches!(err, WaitError::NotFound { checks: 2 }));
}

#[tokio::test(start_paused = true)]
async fn backend_outage_is_not_retried() {
    let backend = Backend::new("task-4", vec!["RUNNING", "DOWN", "SUCCEEDED"]);
    let err = waiter().wait_for_task(&backend, "task-4").await.unwrap_err();
    assert_eq!(err.to_string(), "connection refused");
}

#[tokio::test(start_paused = true)]
async fn stuck_task_times_out() {
    let backend = Backend::new("task-5", vec!["RUNNING"]);
    let err = waiter()
        .with_timeout(Duration::from_secs(45))
        .wait_for_task(&backend, "task-5")
        .await
        .unwrap_err();
    assert!(matches!(err, WaitError::Timeout { ref last_state, .. } if last_state == "RUNNING"));
}

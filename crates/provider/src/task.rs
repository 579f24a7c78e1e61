//! Task status polling
//!
//! State-changing v3 calls return a task handle right away and finish on the
//! backend later. [`poll_task`] fetches the task once and classifies the
//! result; the waiting loop lives in [`crate::waiter`].

use async_trait::async_trait;
use nutanix_common::{TaskStatus, TASK_INVALID_UUID};
use thiserror::Error;
use tracing::{debug, warn};

use crate::diag::print_to_json;

/// Outcome label reported when the task handle was rejected at fetch time
pub const STATE_ERROR: &str = "ERROR";

/// Error returned by a [`TaskStatusProvider`] when a task cannot be fetched
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The backend rejected the task handle itself
    #[error("{0}")]
    InvalidUuid(String),

    #[error("{0}")]
    Transport(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
}

impl FetchError {
    /// Whether the backend considers the identifier invalid.
    ///
    /// Collaborators that only surface free-text errors are matched on the
    /// `INVALID_UUID` marker in the rendered message.
    pub fn is_invalid_uuid(&self) -> bool {
        match self {
            FetchError::InvalidUuid(_) => true,
            other => other.to_string().contains(TASK_INVALID_UUID),
        }
    }
}

/// Source of task status snapshots
#[async_trait]
pub trait TaskStatusProvider: Send + Sync {
    /// Fetch the current status of a task
    async fn get_task(&self, task_uuid: &str) -> Result<TaskStatus, FetchError>;
}

/// Result of a single successful poll
#[derive(Debug, Clone, PartialEq)]
pub struct TaskPoll {
    /// Snapshot returned by the provider, absent when the handle was rejected
    pub snapshot: Option<TaskStatus>,
    /// Outcome label
    pub state: String,
}

/// Failure of a single poll
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PollError {
    /// The snapshot could not be fetched
    #[error(transparent)]
    Fetch(FetchError),

    /// The backend reports the task failed; renders as the backend's detail verbatim
    #[error("{}", .snapshot.error_detail())]
    TaskFailed { snapshot: Box<TaskStatus>, state: String },
}

impl PollError {
    /// Outcome label, empty for fetch failures
    pub fn state(&self) -> &str {
        match self {
            PollError::Fetch(_) => "",
            PollError::TaskFailed { state, .. } => state,
        }
    }

    pub fn snapshot(&self) -> Option<&TaskStatus> {
        match self {
            PollError::Fetch(_) => None,
            PollError::TaskFailed { snapshot, .. } => Some(snapshot),
        }
    }
}

/// Fetch `task_uuid` once and classify the snapshot.
///
/// * fetch rejected as an invalid identifier: `Ok` with state `ERROR` and no snapshot
/// * any other fetch failure: `Err(PollError::Fetch)` with the error unchanged
/// * status `FAILED` or `INVALID_UUID`: `Err(PollError::TaskFailed)`
/// * anything else: `Ok` with the raw status label
pub async fn poll_task<P>(provider: &P, task_uuid: &str) -> Result<TaskPoll, PollError>
where
    P: TaskStatusProvider + ?Sized,
{
    let snapshot = match provider.get_task(task_uuid).await {
        Ok(snapshot) => snapshot,
        Err(e) if e.is_invalid_uuid() => {
            debug!(task_uuid, error = %e, "Task not visible yet");
            return Ok(TaskPoll {
                snapshot: None,
                state: STATE_ERROR.to_string(),
            });
        }
        Err(e) => return Err(PollError::Fetch(e)),
    };

    if snapshot.is_failed() {
        print_to_json(&snapshot, "TASKS Validation");
        warn!(task_uuid, status = %snapshot.status, "Task failed: {}", snapshot.error_detail());
        let state = snapshot.status.clone();
        return Err(PollError::TaskFailed {
            snapshot: Box::new(snapshot),
            state,
        });
    }

    debug!(task_uuid, status = %snapshot.status, "Polled task");
    Ok(TaskPoll {
        state: snapshot.status.clone(),
        snapshot: Some(snapshot),
    })
}

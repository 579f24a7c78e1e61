//! Waiting for tasks to reach a terminal state
//!
//! [`TaskWaiter`] drives [`poll_task`] until the task lands in one of its
//! target labels, fails, or the overall timeout elapses. Cadence follows
//! Terraform's `StateChangeConf`: an initial delay, then exponential waits
//! between polls floored at `min_timeout`.

use std::time::Duration;

use nutanix_common::{TaskStatus, TASK_QUEUED, TASK_RUNNING, TASK_SUCCEEDED};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::WaitConfig;
use crate::task::{poll_task, PollError, TaskStatusProvider};

const INITIAL_WAIT: Duration = Duration::from_millis(100);
const MAX_BACKOFF: Duration = Duration::from_secs(10);
const DEFAULT_NOT_FOUND_CHECKS: u32 = 20;

/// Classification of an outcome label by the driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Continue,
    Succeeded,
    Failed(String),
}

/// Error returned by [`TaskWaiter::wait_for_task`]
#[derive(Error, Debug)]
pub enum WaitError {
    #[error(transparent)]
    Poll(#[from] PollError),

    #[error("unexpected state '{}', wanted target '{}'", .state, .expected.join(", "))]
    UnexpectedState { state: String, expected: Vec<String> },

    #[error("couldn't find task after {checks} status checks")]
    NotFound { checks: u32 },

    #[error(
        "timeout while waiting for state to become '{target}' \
         (last state: '{last_state}', timeout: {timeout:?})"
    )]
    Timeout {
        target: String,
        last_state: String,
        timeout: Duration,
    },
}

/// Polling driver for a single task
#[derive(Debug, Clone)]
pub struct TaskWaiter {
    pub pending: Vec<String>,
    pub target: Vec<String>,
    pub timeout: Duration,
    pub delay: Duration,
    pub min_timeout: Duration,
    pub poll_interval: Option<Duration>,
    /// Consecutive polls without a snapshot tolerated before giving up
    pub not_found_checks: u32,
}

impl Default for TaskWaiter {
    fn default() -> Self {
        Self::from_config(&WaitConfig::default())
    }
}

impl TaskWaiter {
    pub fn from_config(config: &WaitConfig) -> Self {
        Self {
            pending: vec![TASK_QUEUED.to_string(), TASK_RUNNING.to_string()],
            target: vec![TASK_SUCCEEDED.to_string()],
            timeout: config.timeout(),
            delay: config.delay(),
            min_timeout: config.min_timeout(),
            poll_interval: config.poll_interval(),
            not_found_checks: DEFAULT_NOT_FOUND_CHECKS,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Classify an outcome label against the pending and target sets
    pub fn classify(&self, state: &str) -> PollOutcome {
        if self.target.iter().any(|t| t == state) {
            PollOutcome::Succeeded
        } else if self.pending.iter().any(|p| p == state) {
            PollOutcome::Continue
        } else {
            PollOutcome::Failed(format!(
                "unexpected state '{}', wanted target '{}'",
                state,
                self.target.join(", ")
            ))
        }
    }

    /// Wait before the poll following `attempt` (zero-based)
    pub fn next_wait(&self, attempt: u32) -> Duration {
        if let Some(interval) = self.poll_interval {
            return interval;
        }
        let backoff = INITIAL_WAIT
            .checked_mul(2u32.saturating_pow(attempt.min(16)))
            .unwrap_or(MAX_BACKOFF)
            .min(MAX_BACKOFF);
        backoff.max(self.min_timeout)
    }

    /// Poll `task_uuid` until it reaches a target label.
    pub async fn wait_for_task<P>(
        &self,
        provider: &P,
        task_uuid: &str,
    ) -> Result<TaskStatus, WaitError>
    where
        P: TaskStatusProvider + ?Sized,
    {
        info!(task_uuid, timeout = ?self.timeout, "Waiting for task");

        let mut last_state = String::new();
        let result = tokio::time::timeout(
            self.timeout,
            self.run(provider, task_uuid, &mut last_state),
        )
        .await;
        match result {
            Ok(result) => result,
            Err(_) => {
                warn!(task_uuid, last_state = %last_state, "Timed out waiting for task");
                Err(WaitError::Timeout {
                    target: self.target.join(", "),
                    last_state,
                    timeout: self.timeout,
                })
            }
        }
    }

    async fn run<P>(
        &self,
        provider: &P,
        task_uuid: &str,
        last_state: &mut String,
    ) -> Result<TaskStatus, WaitError>
    where
        P: TaskStatusProvider + ?Sized,
    {
        tokio::time::sleep(self.delay).await;

        let mut not_found = 0;
        let mut attempt = 0;
        loop {
            let poll = poll_task(provider, task_uuid).await?;
            last_state.clone_from(&poll.state);

            match poll.snapshot {
                None => {
                    not_found += 1;
                    if not_found > self.not_found_checks {
                        return Err(WaitError::NotFound { checks: self.not_found_checks });
                    }
                    debug!(task_uuid, state = %poll.state, not_found, "No task snapshot yet");
                }
                Some(snapshot) => {
                    not_found = 0;
                    match self.classify(&poll.state) {
                        PollOutcome::Succeeded => {
                            info!(task_uuid, state = %poll.state, "Task reached target state");
                            return Ok(snapshot);
                        }
                        PollOutcome::Failed(reason) => {
                            warn!(task_uuid, "{}", reason);
                            return Err(WaitError::UnexpectedState {
                                state: poll.state,
                                expected: self.target.clone(),
                            });
                        }
                        PollOutcome::Continue => {}
                    }
                }
            }

            let wait = self.next_wait(attempt);
            attempt = attempt.saturating_add(1);
            debug!(task_uuid, state = %last_state, wait = ?wait, "Task still in progress");
            tokio::time::sleep(wait).await;
        }
    }
}

/// Wait for a task with the default waiter
pub async fn wait_for_task<P>(provider: &P, task_uuid: &str) -> Result<TaskStatus, WaitError>
where
    P: TaskStatusProvider + ?Sized,
{
    TaskWaiter::default().wait_for_task(provider, task_uuid).await
}

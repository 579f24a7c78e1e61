//! Nutanix Terraform Provider helpers
//!
//! Translation between resource configuration and v3 API structs, plus the
//! task polling used to wait on asynchronous backend operations.

pub mod config;
pub mod diag;
pub mod helpers;
pub mod state;
pub mod task;
pub mod waiter;

pub use config::WaitConfig;
pub use task::{poll_task, FetchError, PollError, TaskPoll, TaskStatusProvider};
pub use waiter::{wait_for_task, PollOutcome, TaskWaiter, WaitError};

pub mod logging {
    //! Logging setup for the plugin binary

    /// Install a stderr fmt subscriber filtered by `RUST_LOG` (default `info`).
    ///
    /// Terraform reads the plugin handshake from stdout, so logs must stay on
    /// stderr. Safe to call more than once.
    pub fn init() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_writer(std::io::stderr)
            .try_init();
    }
}

//! Diagnostic output for API payloads

use serde::Serialize;
use tracing::{debug, warn};

/// Emit `value` as pretty-printed JSON under a human-facing label.
///
/// Output goes to the `nutanix::diag` target at debug level, so it only
/// shows up when that target is enabled (e.g. `RUST_LOG=nutanix::diag=debug`).
pub fn print_to_json<T: Serialize + ?Sized>(value: &T, label: &str) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => debug!(target: "nutanix::diag", label, "{}\n{}", label, json),
        Err(e) => warn!(target: "nutanix::diag", label, "Cannot render diagnostic value: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nutanix_common::TaskStatus;

    #[test]
    fn test_print_to_json_does_not_panic() {
        crate::logging::init();
        let task = TaskStatus::new("FAILED").with_error_detail("disk busy");
        print_to_json(&task, "TASKS Validation");
        print_to_json("plain", "string value");
    }
}

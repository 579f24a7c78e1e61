//! Task wait configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use tracing::debug;

/// Timing for waiting on asynchronous tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitConfig {
    /// Overall deadline for a single task
    pub timeout_secs: u64,

    /// Delay before the first poll
    pub delay_secs: u64,

    /// Lower bound on the wait between polls
    pub min_timeout_secs: u64,

    /// Fixed wait between polls, replacing the exponential backoff
    pub poll_interval_secs: Option<u64>,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 600,
            delay_secs: 3,
            min_timeout_secs: 3,
            poll_interval_secs: None,
        }
    }
}

impl WaitConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)
                .with_context(|| format!("invalid wait configuration in {}", path.display()))?;
            Ok(config)
        } else {
            debug!(path = %path.display(), "No wait configuration file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Override fields from `NUTANIX_TASK_*` environment variables
    pub fn apply_env(self) -> anyhow::Result<Self> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    fn apply_vars(mut self, var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let parse = |key: &str| -> anyhow::Result<Option<u64>> {
            var(key)
                .map(|v| {
                    v.trim()
                        .parse::<u64>()
                        .with_context(|| format!("{key} must be a number of seconds, got {v:?}"))
                })
                .transpose()
        };

        if let Some(v) = parse("NUTANIX_TASK_TIMEOUT")? {
            self.timeout_secs = v;
        }
        if let Some(v) = parse("NUTANIX_TASK_DELAY")? {
            self.delay_secs = v;
        }
        if let Some(v) = parse("NUTANIX_TASK_MIN_TIMEOUT")? {
            self.min_timeout_secs = v;
        }
        if let Some(v) = parse("NUTANIX_TASK_POLL_INTERVAL")? {
            self.poll_interval_secs = Some(v);
        }
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }

    pub fn min_timeout(&self) -> Duration {
        Duration::from_secs(self.min_timeout_secs)
    }

    pub fn poll_interval(&self) -> Option<Duration> {
        self.poll_interval_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = WaitConfig::load(&dir.path().join("wait.toml")).unwrap();
        assert_eq!(config, WaitConfig::default());
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wait.toml");
        std::fs::write(&path, "timeout_secs = 120\npoll_interval_secs = 2\n").unwrap();

        let config = WaitConfig::load(&path).unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(120));
        assert_eq!(config.poll_interval(), Some(Duration::from_secs(2)));
        assert_eq!(config.delay_secs, 3);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("wait.toml");
        let config = WaitConfig { min_timeout_secs: 7, ..Default::default() };
        config.save(&path).unwrap();
        assert_eq!(WaitConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wait.toml");
        std::fs::write(&path, "timeout_secs = \"soon\"").unwrap();
        let err = WaitConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("wait.toml"));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("NUTANIX_TASK_TIMEOUT", "30"),
            ("NUTANIX_TASK_POLL_INTERVAL", " 1 "),
        ]
        .into_iter()
        .collect();
        let config = WaitConfig::default()
            .apply_vars(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.poll_interval_secs, Some(1));
        assert_eq!(config.delay_secs, 3);
    }

    #[test]
    fn test_env_rejects_garbage() {
        let err = WaitConfig::default()
            .apply_vars(|k| (k == "NUTANIX_TASK_DELAY").then(|| "later".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("NUTANIX_TASK_DELAY"));
    }
}

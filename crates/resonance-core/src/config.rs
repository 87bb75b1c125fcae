//! Workflow and application configuration
//!
//! `ResonanceConfig` gathers every section into one TOML document:
//!
//! ```toml
//! [device]
//! device_port = 16416
//!
//! [rail]
//! max_sweeps = 5
//!
//! [workflow]
//! max_negotiation_attempts = 10
//!
//! [ocr]
//! endpoint = "http://127.0.0.1:8866"
//! ```

use crate::error::TaskError;
use resonance_device::DeviceConfig;
use resonance_kernel::{NavigatorConfig, RailConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Workflow timing and bounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Settle time after the first negotiation tap of a session
    pub first_negotiation_settle_ms: u64,
    /// Settle time after every later negotiation tap
    pub negotiation_settle_ms: u64,
    /// Negotiation taps allowed per trade, successful or not
    pub max_negotiation_attempts: u32,
    /// Item list pages scanned before giving up on missing goods
    pub max_item_pages: u32,
    /// Order board pages scanned in one pass
    pub max_order_pages: u32,
    /// Delay between completion checks
    pub poll_interval_ms: u64,
    /// Give up on a completion check after this long
    pub poll_timeout_ms: u64,
    /// Wait after leaving a battle result screen
    pub expulsion_settle_ms: u64,
}

impl WorkflowConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With negotiation settle times
    #[inline]
    #[must_use]
    pub fn with_negotiation_settle(mut self, first: Duration, rest: Duration) -> Self {
        self.first_negotiation_settle_ms = resonance_kernel::config::duration_ms(first);
        self.negotiation_settle_ms = resonance_kernel::config::duration_ms(rest);
        self
    }

    /// With completion polling
    #[inline]
    #[must_use]
    pub fn with_polling(mut self, interval: Duration, timeout: Duration) -> Self {
        self.poll_interval_ms = resonance_kernel::config::duration_ms(interval);
        self.poll_timeout_ms = resonance_kernel::config::duration_ms(timeout);
        self
    }

    #[must_use]
    pub fn negotiation_settle(&self, first: bool) -> Duration {
        if first {
            Duration::from_millis(self.first_negotiation_settle_ms)
        } else {
            Duration::from_millis(self.negotiation_settle_ms)
        }
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    #[must_use]
    pub fn expulsion_settle(&self) -> Duration {
        Duration::from_millis(self.expulsion_settle_ms)
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            first_negotiation_settle_ms: 4000,
            negotiation_settle_ms: 2000,
            max_negotiation_attempts: 20,
            max_item_pages: 10,
            max_order_pages: 20,
            poll_interval_ms: 3000,
            poll_timeout_ms: 300_000,
            expulsion_settle_ms: 5000,
        }
    }
}

/// Text recognition service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Base URL of the recognition sidecar
    pub endpoint: String,
    /// Per-request timeout
    pub timeout_ms: u64,
}

impl OcrConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8866".to_string(),
            timeout_ms: 10_000,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResonanceConfig {
    pub device: DeviceConfig,
    pub navigator: NavigatorConfig,
    pub rail: RailConfig,
    pub workflow: WorkflowConfig,
    pub ocr: OcrConfig,
}

impl ResonanceConfig {
    /// Parse a TOML document
    ///
    /// # Errors
    /// - `TaskError::Config` on invalid TOML or mistyped fields
    pub fn from_toml(text: &str) -> Result<Self, TaskError> {
        toml::from_str(text).map_err(|e| TaskError::Config(e.to_string()))
    }

    /// Load from a file; a missing file yields the defaults
    ///
    /// # Errors
    /// - `TaskError::Config` if the file exists but cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TaskError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(TaskError::Config(format!("{}: {e}", path.display()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_defaults() {
        let config = WorkflowConfig::default();
        assert_eq!(config.negotiation_settle(true), Duration::from_secs(4));
        assert_eq!(config.negotiation_settle(false), Duration::from_secs(2));
        assert_eq!(config.poll_timeout(), Duration::from_secs(300));
    }

    #[test]
    fn test_builders() {
        let config = WorkflowConfig::new()
            .with_negotiation_settle(Duration::from_millis(10), Duration::from_millis(5))
            .with_polling(Duration::from_secs(1), Duration::from_secs(9));
        assert_eq!(config.first_negotiation_settle_ms, 10);
        assert_eq!(config.negotiation_settle_ms, 5);
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.poll_timeout(), Duration::from_secs(9));
    }

    #[test]
    fn test_sections_fill_in_defaults() {
        let config = ResonanceConfig::from_toml(
            "[device]\ndevice_port = 16416\n\n[rail]\nmax_sweeps = 5\n",
        )
        .unwrap();
        assert_eq!(config.device.device_port, 16416);
        assert_eq!(config.device.daemon_addr, "127.0.0.1:5037");
        assert_eq!(config.rail.max_sweeps, 5);
        assert_eq!(config.workflow, WorkflowConfig::default());
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let err = ResonanceConfig::from_toml("[rail]\nmax_sweeps = \"many\"").unwrap_err();
        assert!(matches!(err, TaskError::Config(_)));
    }
}

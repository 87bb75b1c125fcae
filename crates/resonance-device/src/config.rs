//! Device connection and gesture timing configuration

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Inclusive millisecond range sampled for gesture durations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DurationRange {
    #[inline]
    #[must_use]
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// Draw a duration in `[min_ms, max_ms]`
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let (lo, hi) = if self.min_ms <= self.max_ms {
            (self.min_ms, self.max_ms)
        } else {
            (self.max_ms, self.min_ms)
        };
        Duration::from_millis(rng.random_range(lo..=hi))
    }
}

/// Device client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Address of the local device-control daemon
    pub daemon_addr: String,
    /// Host of the emulator's debug bridge
    pub device_host: String,
    /// Port of the emulator's debug bridge
    pub device_port: u16,
    /// Press duration range for taps (modelled as short swipes)
    pub tap_duration: DurationRange,
    /// Duration range for swipes
    pub swipe_duration: DurationRange,
    /// Shell command producing a PNG screenshot on stdout
    pub screencap_command: String,
}

impl DeviceConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With daemon address
    #[inline]
    #[must_use]
    pub fn with_daemon_addr(mut self, addr: impl Into<String>) -> Self {
        self.daemon_addr = addr.into();
        self
    }

    /// With target device
    #[inline]
    #[must_use]
    pub fn with_device(mut self, host: impl Into<String>, port: u16) -> Self {
        self.device_host = host.into();
        self.device_port = port;
        self
    }

    /// Device serial used for transport selection
    #[must_use]
    pub fn serial(&self) -> String {
        format!("{}:{}", self.device_host, self.device_port)
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            daemon_addr: "127.0.0.1:5037".to_string(),
            device_host: "127.0.0.1".to_string(),
            device_port: 16384,
            tap_duration: DurationRange::new(100, 120),
            swipe_duration: DurationRange::new(1500, 2000),
            screencap_command: "screencap -p".to_string(),
        }
    }
}

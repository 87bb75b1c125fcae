//! Navigation and rail search configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Navigator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Pause after each gesture while walking a route
    pub route_interval_ms: u64,
    /// Pause after each gesture elsewhere
    pub gesture_interval_ms: u64,
}

impl NavigatorConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With route interval
    #[inline]
    #[must_use]
    pub fn with_route_interval(mut self, interval: Duration) -> Self {
        self.route_interval_ms = duration_ms(interval);
        self
    }

    #[must_use]
    pub fn route_interval(&self) -> Duration {
        Duration::from_millis(self.route_interval_ms)
    }

    #[must_use]
    pub fn gesture_interval(&self) -> Duration {
        Duration::from_millis(self.gesture_interval_ms)
    }
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            route_interval_ms: 2000,
            gesture_interval_ms: 2500,
        }
    }
}

/// Rail search configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RailConfig {
    /// Pause after opening the map, tapping the destination and embarking
    pub gesture_interval_ms: u64,
    /// Pause after each map pan
    pub pan_interval_ms: u64,
    /// (up, left) pan pairs used to park the map at its top-left corner
    pub reset_cycles: u32,
    /// Full map sweeps before giving up on the destination
    pub max_sweeps: u32,
    /// Delay between arrival checks
    pub arrival_poll_ms: u64,
    /// Arrival checks before giving up
    pub max_arrival_polls: u32,
    /// Pause after confirming arrival
    pub arrival_confirm_ms: u64,
}

impl RailConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With search bounds
    #[inline]
    #[must_use]
    pub fn with_limits(mut self, max_sweeps: u32, max_arrival_polls: u32) -> Self {
        self.max_sweeps = max_sweeps;
        self.max_arrival_polls = max_arrival_polls;
        self
    }

    /// With pause after map taps
    #[inline]
    #[must_use]
    pub fn with_gesture_interval(mut self, interval: Duration) -> Self {
        self.gesture_interval_ms = duration_ms(interval);
        self
    }

    #[must_use]
    pub fn gesture_interval(&self) -> Duration {
        Duration::from_millis(self.gesture_interval_ms)
    }

    #[must_use]
    pub fn pan_interval(&self) -> Duration {
        Duration::from_millis(self.pan_interval_ms)
    }

    #[must_use]
    pub fn arrival_poll(&self) -> Duration {
        Duration::from_millis(self.arrival_poll_ms)
    }

    #[must_use]
    pub fn arrival_confirm(&self) -> Duration {
        Duration::from_millis(self.arrival_confirm_ms)
    }
}

impl Default for RailConfig {
    fn default() -> Self {
        Self {
            gesture_interval_ms: 2500,
            pan_interval_ms: 500,
            reset_cycles: 3,
            max_sweeps: 3,
            arrival_poll_ms: 5000,
            max_arrival_polls: 60,
            arrival_confirm_ms: 5000,
        }
    }
}

/// Whole milliseconds of a duration, saturating
#[must_use]
pub fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let nav = NavigatorConfig::default();
        assert_eq!(nav.route_interval(), Duration::from_secs(2));
        assert_eq!(nav.gesture_interval(), Duration::from_millis(2500));

        let rail = RailConfig::new().with_limits(1, 2);
        assert_eq!((rail.max_sweeps, rail.max_arrival_polls), (1, 2));
        assert_eq!(rail.pan_interval(), Duration::from_millis(500));
        assert_eq!(rail.gesture_interval(), nav.gesture_interval());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let rail: RailConfig = serde_json::from_str(r#"{"max_sweeps": 5}"#).unwrap();
        assert_eq!(rail.max_sweeps, 5);
        assert_eq!(rail.reset_cycles, 3);
    }
}

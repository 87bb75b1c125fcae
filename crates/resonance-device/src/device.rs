//! The gesture/screenshot seam consumed by the executor

use crate::error::DeviceError;
use crate::geometry::Point;

/// A controllable screen
///
/// `DeviceClient` is the production implementation; test doubles record
/// calls instead of touching a socket. All calls are strictly sequential.
#[async_trait::async_trait]
pub trait Device: Send + Sync {
    /// Attach to the target device
    async fn connect(&mut self) -> Result<(), DeviceError>;

    /// Tap a point
    async fn tap(&mut self, point: Point) -> Result<(), DeviceError>;

    /// Swipe between two points
    async fn swipe(&mut self, from: Point, to: Point) -> Result<(), DeviceError>;

    /// Capture the screen as encoded image bytes
    async fn screenshot(&mut self) -> Result<Vec<u8>, DeviceError>;

    /// Release the connection and stop the daemon
    async fn shutdown(&mut self) -> Result<(), DeviceError>;
}

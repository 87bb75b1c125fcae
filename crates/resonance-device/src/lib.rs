//! Resonance Device - wire-level control of an Android instance
//!
//! Speaks the request/response protocol of a local device-control daemon:
//! - Length-prefixed ASCII request frames (`0012host:transport:...`)
//! - `OKAY` / `FAIL` status words, with a failure message frame on `FAIL`
//! - Length-prefixed payloads, degrading to read-until-close for shell output
//!
//! On top of the protocol it emulates gestures (taps are short swipes with a
//! randomized press duration) and decodes the raw touch-event stream into
//! landscape screen coordinates.
//!
//! # Example
//!
//! ```rust,ignore
//! use resonance_device::{DeviceClient, DeviceConfig, Point};
//!
//! # async fn example() -> Result<(), resonance_device::DeviceError> {
//! let mut client = DeviceClient::new(DeviceConfig::default());
//! client.connect().await?;
//! client.tap(Point::new(1765, 750)).await?;
//! let png = client.screenshot().await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod device;
pub mod error;
pub mod events;
pub mod geometry;
pub mod protocol;

pub use client::{DeviceClient, ScreenSize};
pub use config::{DeviceConfig, DurationRange};
pub use device::Device;
pub use error::DeviceError;
pub use events::{InputEventStream, TouchDecoder, TouchPosition, TouchSample};
pub use geometry::{Point, Rect};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

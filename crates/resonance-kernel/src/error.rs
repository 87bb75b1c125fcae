//! Error types for navigation and screen reading

use crate::site::Site;
use resonance_device::{DeviceError, Rect};

/// Navigation error type
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    /// Device protocol failure
    #[error("device error: {0}")]
    Device(#[from] DeviceError),

    /// Screen reading failure
    #[error("vision error: {0}")]
    Vision(#[from] VisionError),

    /// The screenshot did not match any known scene
    #[error("scene not recognized (read {text:?})")]
    SceneNotRecognized {
        /// Text read from the station label
        text: String,
    },

    /// Scene name is not in the catalog
    #[error("unknown scene: {0}")]
    UnknownScene(String),

    /// Target is not an immediate neighbor of the current scene
    #[error("transition not found: {from} -> {to}")]
    TransitionNotFound {
        /// Current scene
        from: String,
        /// Requested neighbor
        to: String,
    },

    /// Gesture script line that is neither a tap nor a swipe
    #[error("invalid gesture: {0:?}")]
    InvalidGestureKind(String),

    /// No path exists between two scenes
    #[error("no route from {from} to {to}")]
    UnreachableTarget {
        /// Start scene
        from: String,
        /// Target scene
        to: String,
    },

    /// Rail search swept the whole map without seeing the destination
    #[error("destination {site} not found after {sweeps} sweeps")]
    DestinationNotFound {
        /// Destination site
        site: Site,
        /// Full sweeps performed
        sweeps: u32,
    },

    /// Arrival marker never appeared
    #[error("arrival at {site} not detected after {polls} polls")]
    ArrivalNotDetected {
        /// Destination site
        site: Site,
        /// Polls performed
        polls: u32,
    },

    /// Navigation requested before the current scene is known
    #[error("current scene unknown")]
    NoCurrentScene,

    /// Cancellation was requested
    #[error("operation cancelled")]
    Cancelled,
}

impl NavError {
    /// Check if the error is a cancellation rather than a failure
    #[inline]
    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Check if retrying the operation could succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Device(e) => e.is_retryable(),
            Self::Vision(e) => e.is_retryable(),
            Self::SceneNotRecognized { .. }
            | Self::DestinationNotFound { .. }
            | Self::ArrivalNotDetected { .. } => true,
            _ => false,
        }
    }
}

/// Screen reading error type
#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    /// Screenshot bytes could not be decoded or re-encoded
    #[error("image error: {0}")]
    Decode(#[from] image::ImageError),

    /// Region lies entirely outside the image
    #[error("region {region} outside {width}x{height} image")]
    RegionOutOfBounds {
        /// Requested region
        region: Rect,
        /// Image width
        width: u32,
        /// Image height
        height: u32,
    },

    /// Recognition engine reported a failure
    #[error("recognition engine error: {0}")]
    Engine(String),

    /// OCR service could not be reached or answered badly
    #[error("ocr service error: {0}")]
    Http(#[from] reqwest::Error),
}

impl VisionError {
    /// Check if retrying the read could succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Engine(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_errors_convert() {
        let err: NavError = DeviceError::CommandFailed {
            command: "shell:screencap -p".to_string(),
            message: "closed".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "device error: command failed: closed");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_cancellation_predicate() {
        assert!(NavError::Cancelled.is_cancellation());
        assert!(!NavError::NoCurrentScene.is_cancellation());
    }

    #[test]
    fn test_rail_failures_are_retryable() {
        let err = NavError::DestinationNotFound {
            site: Site::Freeport,
            sweeps: 3,
        };
        assert!(err.is_retryable());
        assert_eq!(err.to_string(), "destination 7号自由港 not found after 3 sweeps");
    }
}

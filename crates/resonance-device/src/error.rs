//! Error types for the device-control client

/// Device protocol error type
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// Socket-level failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Daemon answered with a non-success status
    #[error("command failed: {message}")]
    CommandFailed {
        /// Command that was rejected
        command: String,
        /// Message returned by the daemon
        message: String,
    },

    /// Transport selection for the target device was rejected
    #[error("device not selected: {serial}: {message}")]
    DeviceNotSelected {
        /// Device serial (`host:port`)
        serial: String,
        /// Message returned by the daemon
        message: String,
    },

    /// Frame could not be decoded
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// Status word was neither `OKAY` nor `FAIL`
    #[error("unexpected status word {0:?}")]
    UnexpectedStatus(String),

    /// Command does not fit in a 4-hex-digit length header
    #[error("command too long: {0} bytes")]
    CommandTooLong(usize),

    /// Screen size output was not understood
    #[error("cannot parse screen size from {0:?}")]
    ScreenSize(String),
}

impl DeviceError {
    /// Check if the error came from the daemon rather than the socket
    #[inline]
    #[must_use]
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            Self::CommandFailed { .. }
                | Self::DeviceNotSelected { .. }
                | Self::MalformedFrame(_)
                | Self::UnexpectedStatus(_)
        )
    }

    /// Check if a fresh connection could plausibly succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_failed_displays_daemon_message() {
        let err = DeviceError::CommandFailed {
            command: "shell:ls".to_string(),
            message: "device offline".to_string(),
        };
        assert_eq!(err.to_string(), "command failed: device offline");
        assert!(err.is_protocol_error());
        assert!(!err.is_retryable());
    }

    #[test]
    fn io_errors_are_retryable() {
        let err = DeviceError::from(std::io::Error::from(std::io::ErrorKind::ConnectionReset));
        assert!(err.is_retryable());
        assert!(!err.is_protocol_error());
    }
}

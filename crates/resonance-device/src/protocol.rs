//! Frame encoding for the device-control daemon
//!
//! Requests are `LLLL` + payload, where `LLLL` is the payload length as four
//! lowercase hex digits. Responses start with a four-byte status word.

use crate::error::DeviceError;

/// Success status word
pub const STATUS_OKAY: &[u8; 4] = b"OKAY";

/// Failure status word
pub const STATUS_FAIL: &[u8; 4] = b"FAIL";

/// Largest payload a length header can describe
pub const MAX_PAYLOAD: usize = 0xffff;

/// Decoded status word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Okay,
    Fail,
    Unknown([u8; 4]),
}

impl Status {
    #[must_use]
    pub fn parse(word: [u8; 4]) -> Self {
        match &word {
            STATUS_OKAY => Self::Okay,
            STATUS_FAIL => Self::Fail,
            _ => Self::Unknown(word),
        }
    }
}

/// Encode a request frame
///
/// # Errors
/// - `DeviceError::CommandTooLong` if the command exceeds `MAX_PAYLOAD` bytes
pub fn encode_request(command: &str) -> Result<Vec<u8>, DeviceError> {
    let len = command.len();
    if len > MAX_PAYLOAD {
        return Err(DeviceError::CommandTooLong(len));
    }
    let mut frame = Vec::with_capacity(4 + len);
    frame.extend_from_slice(format!("{len:04x}").as_bytes());
    frame.extend_from_slice(command.as_bytes());
    Ok(frame)
}

/// Parse a 4-hex-digit length header; `None` when it is not one
#[must_use]
pub fn parse_length(header: &[u8]) -> Option<usize> {
    if header.len() != 4 || !header.iter().all(u8::is_ascii_hexdigit) {
        return None;
    }
    let text = std::str::from_utf8(header).ok()?;
    usize::from_str_radix(text, 16).ok()
}

/// `host:transport:<serial>`
#[must_use]
pub fn transport_command(serial: &str) -> String {
    format!("host:transport:{serial}")
}

/// `host:connect:<serial>`
#[must_use]
pub fn connect_command(serial: &str) -> String {
    format!("host:connect:{serial}")
}

/// `shell:<command>`
#[must_use]
pub fn shell_command(command: &str) -> String {
    format!("shell:{command}")
}

/// `host:kill`
pub const KILL_COMMAND: &str = "host:kill";

//! Device-daemon client
//!
//! One request per connection: the daemon closes the socket after answering
//! a host or shell command, so the client drops its stream after every
//! request and reopens it lazily on the next one. A failed request is never
//! retried here; the error goes to the caller.

use crate::config::DeviceConfig;
use crate::device::Device;
use crate::error::DeviceError;
use crate::events::{InputEventStream, TouchDecoder};
use crate::geometry::Point;
use crate::protocol::{self, Status};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

/// Landscape screen dimensions reported by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    pub width: i32,
    pub height: i32,
}

impl ScreenSize {
    /// Parse `wm size` output
    ///
    /// The device reports its portrait size (`1080x1920`); the game runs in
    /// landscape, so the two axes are swapped.
    ///
    /// # Errors
    /// - `DeviceError::ScreenSize` if no `NxM` token is found
    pub fn parse_landscape(output: &str) -> Result<Self, DeviceError> {
        let invalid = || DeviceError::ScreenSize(output.trim().to_string());
        let token = output
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .and_then(|line| line.split_whitespace().last())
            .ok_or_else(invalid)?;
        let (first, second) = token.split_once('x').ok_or_else(invalid)?;
        let height = first.parse::<i32>().map_err(|_| invalid())?;
        let width = second.parse::<i32>().map_err(|_| invalid())?;
        Ok(Self { width, height })
    }
}

enum Reply {
    Okay,
    Failed(String),
}

/// Client for the local device-control daemon
#[derive(Debug)]
pub struct DeviceClient {
    config: DeviceConfig,
    stream: Option<TcpStream>,
    screen: Option<ScreenSize>,
}

impl DeviceClient {
    #[must_use]
    pub fn new(config: DeviceConfig) -> Self {
        Self {
            config,
            stream: None,
            screen: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Whether a socket is currently open
    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Drop the socket; the next request reconnects
    pub fn close(&mut self) {
        if self.stream.take().is_some() {
            debug!("Closed daemon connection");
        }
    }

    async fn socket(&mut self) -> Result<&mut TcpStream, DeviceError> {
        let stream = match self.stream.take() {
            Some(stream) => stream,
            None => {
                let stream = TcpStream::connect(&self.config.daemon_addr).await?;
                stream.set_nodelay(true)?;
                stream
            }
        };
        Ok(self.stream.insert(stream))
    }

    fn open_socket(&mut self) -> Result<&mut TcpStream, DeviceError> {
        self.stream
            .as_mut()
            .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::NotConnected).into())
    }

    /// Write one frame and read its status word
    async fn send_frame(&mut self, command: &str) -> Result<Reply, DeviceError> {
        let frame = protocol::encode_request(command)?;
        let stream = self.socket().await?;
        stream.write_all(&frame).await?;

        let mut word = [0u8; 4];
        stream.read_exact(&mut word).await?;
        match Status::parse(word) {
            Status::Okay => Ok(Reply::Okay),
            Status::Fail => Ok(Reply::Failed(read_message(stream).await?)),
            Status::Unknown(word) => Err(DeviceError::UnexpectedStatus(
                String::from_utf8_lossy(&word).into_owned(),
            )),
        }
    }

    async fn request(&mut self, command: &str) -> Result<Vec<u8>, DeviceError> {
        match self.send_frame(command).await? {
            Reply::Okay => read_payload(self.open_socket()?).await,
            Reply::Failed(message) => Err(DeviceError::CommandFailed {
                command: command.to_string(),
                message,
            }),
        }
    }

    async fn select_device(&mut self) -> Result<(), DeviceError> {
        let serial = self.config.serial();
        match self.send_frame(&protocol::transport_command(&serial)).await? {
            Reply::Okay => Ok(()),
            Reply::Failed(message) => Err(DeviceError::DeviceNotSelected { serial, message }),
        }
    }

    async fn shell_exchange(&mut self, command: &str) -> Result<Vec<u8>, DeviceError> {
        self.select_device().await?;
        self.request(&protocol::shell_command(command)).await
    }

    /// Send a host-level command (no device selection)
    ///
    /// # Errors
    /// - `DeviceError::CommandFailed` if the daemon answers `FAIL`
    /// - `DeviceError::Io` on socket failure
    pub async fn host_command(&mut self, command: &str) -> Result<Vec<u8>, DeviceError> {
        let result = self.request(command).await;
        self.close();
        result
    }

    /// Run a shell command on the target device and return its output
    ///
    /// # Errors
    /// - `DeviceError::DeviceNotSelected` if transport selection fails
    /// - `DeviceError::CommandFailed` if the shell frame is rejected
    /// - `DeviceError::Io` on socket failure
    pub async fn send_shell_command(&mut self, command: &str) -> Result<Vec<u8>, DeviceError> {
        let result = self.shell_exchange(command).await;
        self.close();
        result
    }

    /// Attach the emulator to the daemon
    ///
    /// # Errors
    /// - `DeviceError::CommandFailed` if the daemon reports it cannot connect
    pub async fn connect(&mut self) -> Result<(), DeviceError> {
        let serial = self.config.serial();
        let command = protocol::connect_command(&serial);
        let reply = self.host_command(&command).await?;
        let text = String::from_utf8_lossy(&reply).trim().to_string();
        if text.contains("cannot") || text.contains("failed") {
            return Err(DeviceError::CommandFailed {
                command,
                message: text,
            });
        }
        info!("Attached device {serial}: {text}");
        Ok(())
    }

    /// Landscape screen size, cached after the first query
    ///
    /// # Errors
    /// - `DeviceError::ScreenSize` if `wm size` output is not understood
    pub async fn screen_size(&mut self) -> Result<ScreenSize, DeviceError> {
        if let Some(size) = self.screen {
            return Ok(size);
        }
        let output = self.send_shell_command("wm size").await?;
        let size = ScreenSize::parse_landscape(&String::from_utf8_lossy(&output))?;
        debug!("Screen size {}x{}", size.width, size.height);
        self.screen = Some(size);
        Ok(size)
    }

    /// Tap as a one-pixel swipe with a natural press duration
    ///
    /// # Errors
    /// Propagates shell command failures.
    pub async fn tap(&mut self, point: Point) -> Result<(), DeviceError> {
        let duration = self.config.tap_duration.sample(&mut rand::rng());
        let command = format!(
            "input swipe {} {} {} {} {}",
            point.x,
            point.y,
            point.x + 1,
            point.y + 1,
            duration.as_millis()
        );
        debug!("Tap {point}");
        self.send_shell_command(&command).await.map(drop)
    }

    /// Swipe between two points
    ///
    /// # Errors
    /// Propagates shell command failures.
    pub async fn swipe(&mut self, from: Point, to: Point) -> Result<(), DeviceError> {
        let duration = self.config.swipe_duration.sample(&mut rand::rng());
        let command = format!(
            "input swipe {} {} {} {} {}",
            from.x,
            from.y,
            to.x,
            to.y,
            duration.as_millis()
        );
        debug!("Swipe {from} -> {to}");
        self.send_shell_command(&command).await.map(drop)
    }

    /// Capture the screen as PNG bytes
    ///
    /// # Errors
    /// Propagates shell command failures.
    pub async fn screenshot(&mut self) -> Result<Vec<u8>, DeviceError> {
        let command = self.config.screencap_command.clone();
        self.send_shell_command(&command).await
    }

    /// Open a `getevent` shell and hand its socket to a decoder
    ///
    /// # Errors
    /// - `DeviceError::CommandFailed` if the shell cannot be opened
    pub async fn stream_input_events(&mut self) -> Result<InputEventStream, DeviceError> {
        let screen = self.screen_size().await?;
        if let Err(e) = self.open_event_shell().await {
            self.close();
            return Err(e);
        }
        let stream = self
            .stream
            .take()
            .ok_or_else(|| DeviceError::from(std::io::Error::from(std::io::ErrorKind::NotConnected)))?;
        info!("Listening for touch events");
        Ok(InputEventStream::new(stream, TouchDecoder::new(screen.height)))
    }

    async fn open_event_shell(&mut self) -> Result<(), DeviceError> {
        self.select_device().await?;
        let command = protocol::shell_command("getevent -lt");
        match self.send_frame(&command).await? {
            Reply::Okay => Ok(()),
            Reply::Failed(message) => Err(DeviceError::CommandFailed { command, message }),
        }
    }

    /// Ask the daemon to exit
    ///
    /// # Errors
    /// - `DeviceError::Io` if the daemon is not reachable
    pub async fn kill_server(&mut self) -> Result<(), DeviceError> {
        self.host_command(protocol::KILL_COMMAND).await.map(drop)
    }
}

/// Read a response payload
///
/// A valid hex length header is followed by exactly that many bytes.
/// Anything else means the daemon streamed raw output: the bytes already
/// read are kept and the rest is read until the peer closes.
pub(crate) async fn read_payload<R>(reader: &mut R) -> Result<Vec<u8>, DeviceError>
where
    R: AsyncRead + Unpin,
{
    let mut header = Vec::with_capacity(4);
    (&mut *reader).take(4).read_to_end(&mut header).await?;

    if let Some(len) = protocol::parse_length(&header) {
        let mut payload = vec![0u8; len];
        reader.read_exact(&mut payload).await?;
        return Ok(payload);
    }

    let mut raw = header;
    reader.read_to_end(&mut raw).await?;
    Ok(raw)
}

async fn read_message<R>(reader: &mut R) -> Result<String, DeviceError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; 4];
    reader.read_exact(&mut header).await?;
    let len = protocol::parse_length(&header).ok_or_else(|| {
        DeviceError::MalformedFrame(format!(
            "failure length {:?}",
            String::from_utf8_lossy(&header)
        ))
    })?;
    let mut message = vec![0u8; len];
    reader.read_exact(&mut message).await?;
    Ok(String::from_utf8_lossy(&message).into_owned())
}

#[async_trait::async_trait]
impl Device for DeviceClient {
    async fn connect(&mut self) -> Result<(), DeviceError> {
        DeviceClient::connect(self).await
    }

    async fn tap(&mut self, point: Point) -> Result<(), DeviceError> {
        DeviceClient::tap(self, point).await
    }

    async fn swipe(&mut self, from: Point, to: Point) -> Result<(), DeviceError> {
        DeviceClient::swipe(self, from, to).await
    }

    async fn screenshot(&mut self) -> Result<Vec<u8>, DeviceError> {
        DeviceClient::screenshot(self).await
    }

    async fn shutdown(&mut self) -> Result<(), DeviceError> {
        self.close();
        match self.kill_server().await {
            Ok(()) => {
                info!("Device daemon stopped");
                Ok(())
            }
            Err(e) => {
                warn!("Failed to stop device daemon: {e}");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_size_swaps_axes() {
        let size = ScreenSize::parse_landscape("Physical size: 1080x1920\n").unwrap();
        assert_eq!(size, ScreenSize { width: 1920, height: 1080 });
    }

    #[test]
    fn screen_size_prefers_override_line() {
        let output = "Physical size: 1080x1920\nOverride size: 720x1280\n";
        let size = ScreenSize::parse_landscape(output).unwrap();
        assert_eq!(size, ScreenSize { width: 1280, height: 720 });
    }

    #[test]
    fn screen_size_rejects_garbage() {
        assert!(matches!(
            ScreenSize::parse_landscape("error: no devices"),
            Err(DeviceError::ScreenSize(_))
        ));
    }

    #[tokio::test]
    async fn payload_with_length_header() {
        let mut input: &[u8] = b"0005helloTRAILING";
        let payload = read_payload(&mut input).await.unwrap();
        assert_eq!(payload, b"hello");
    }

    #[tokio::test]
    async fn payload_without_length_header_reads_to_close() {
        let mut input: &[u8] = b"\x89PNG\r\n\x1a\nrest-of-image";
        let payload = read_payload(&mut input).await.unwrap();
        assert_eq!(payload, b"\x89PNG\r\n\x1a\nrest-of-image");
    }

    #[tokio::test]
    async fn short_payload_is_returned_as_is() {
        let mut input: &[u8] = b"ok";
        assert_eq!(read_payload(&mut input).await.unwrap(), b"ok");
    }

    #[tokio::test]
    async fn failure_message_is_decoded() {
        let mut input: &[u8] = b"000edevice offline";
        assert_eq!(read_message(&mut input).await.unwrap(), "device offline");
    }

    #[test]
    fn new_client_is_disconnected() {
        let client = DeviceClient::new(DeviceConfig::default());
        assert!(!client.is_open());
        assert_eq!(client.config().daemon_addr, "127.0.0.1:5037");
    }
}

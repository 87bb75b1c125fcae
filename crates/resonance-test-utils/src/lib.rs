//! Testing utilities for the resonance workspace
//!
//! Recording device, scripted screen reader and a fake device daemon.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use resonance_device::{Device, DeviceError, Point, Rect};
use resonance_kernel::vision::{ScreenReader, TextBox};
use resonance_kernel::{CancelSignal, Executor, VisionError};
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Shared log of device calls, rendered as gesture script lines
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    /// Only the tap and swipe lines
    pub fn gestures(&self) -> Vec<String> {
        self.0
            .lock()
            .iter()
            .filter(|e| e.starts_with("tap ") || e.starts_with("swipe "))
            .cloned()
            .collect()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.0.lock().iter().filter(|e| e.starts_with(prefix)).count()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

/// Device double that records every call
#[derive(Debug, Clone, Default)]
pub struct RecordingDevice {
    log: CallLog,
    screenshots: Arc<Mutex<VecDeque<Vec<u8>>>>,
}

impl RecordingDevice {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            screenshots: Arc::default(),
        }
    }

    pub fn log(&self) -> &CallLog {
        &self.log
    }

    /// Queue bytes for the next screenshot; an empty queue yields `b"png"`
    pub fn push_screenshot(&self, bytes: impl Into<Vec<u8>>) {
        self.screenshots.lock().push_back(bytes.into());
    }
}

#[async_trait]
impl Device for RecordingDevice {
    async fn connect(&mut self) -> Result<(), DeviceError> {
        self.log.push("connect");
        Ok(())
    }

    async fn tap(&mut self, point: Point) -> Result<(), DeviceError> {
        self.log.push(format!("tap {} {}", point.x, point.y));
        Ok(())
    }

    async fn swipe(&mut self, from: Point, to: Point) -> Result<(), DeviceError> {
        self.log
            .push(format!("swipe {} {} {} {}", from.x, from.y, to.x, to.y));
        Ok(())
    }

    async fn screenshot(&mut self) -> Result<Vec<u8>, DeviceError> {
        self.log.push("screenshot");
        Ok(self
            .screenshots
            .lock()
            .pop_front()
            .unwrap_or_else(|| b"png".to_vec()))
    }

    async fn shutdown(&mut self) -> Result<(), DeviceError> {
        self.log.push("shutdown");
        Ok(())
    }
}

/// Executor whose devices all write to `log`
pub fn recording_executor(log: &CallLog, cancel: CancelSignal) -> Executor {
    let device = RecordingDevice::new(log.clone());
    Executor::new(
        Box::new(move || Box::new(device.clone()) as Box<dyn Device>),
        cancel,
    )
}

#[derive(Debug, Default)]
struct ReaderScript {
    queued: HashMap<Rect, VecDeque<String>>,
    sticky: HashMap<Rect, String>,
    finds: VecDeque<Vec<TextBox>>,
    sticky_find: Vec<TextBox>,
    reads: Vec<Rect>,
    find_calls: usize,
}

/// Screen reader answering from a script
///
/// Queued answers are consumed first; once a region's queue is empty the
/// sticky answer (or an empty string) is returned.
#[derive(Debug, Clone, Default)]
pub struct ScriptedReader {
    script: Arc<Mutex<ReaderScript>>,
}

impl ScriptedReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_text(&self, region: Rect, text: impl Into<String>) -> &Self {
        self.script
            .lock()
            .queued
            .entry(region)
            .or_default()
            .push_back(text.into());
        self
    }

    pub fn set_text(&self, region: Rect, text: impl Into<String>) -> &Self {
        self.script.lock().sticky.insert(region, text.into());
        self
    }

    pub fn push_find(&self, boxes: Vec<TextBox>) -> &Self {
        self.script.lock().finds.push_back(boxes);
        self
    }

    pub fn set_find(&self, boxes: Vec<TextBox>) -> &Self {
        self.script.lock().sticky_find = boxes;
        self
    }

    /// Regions read so far, in order
    pub fn reads(&self) -> Vec<Rect> {
        self.script.lock().reads.clone()
    }

    pub fn find_calls(&self) -> usize {
        self.script.lock().find_calls
    }
}

#[async_trait]
impl ScreenReader for ScriptedReader {
    async fn read_text(&self, _screenshot: &[u8], region: Rect) -> Result<String, VisionError> {
        let mut script = self.script.lock();
        script.reads.push(region);
        if let Some(text) = script.queued.get_mut(&region).and_then(VecDeque::pop_front) {
            return Ok(text);
        }
        Ok(script.sticky.get(&region).cloned().unwrap_or_default())
    }

    async fn find_text(
        &self,
        _screenshot: &[u8],
        _region: Option<Rect>,
    ) -> Result<Vec<TextBox>, VisionError> {
        let mut script = self.script.lock();
        script.find_calls += 1;
        if let Some(boxes) = script.finds.pop_front() {
            return Ok(boxes);
        }
        Ok(script.sticky_find.clone())
    }
}

/// Reply with `OKAY` and a hex-length-prefixed payload
pub fn okay_with(payload: &[u8]) -> Vec<u8> {
    let mut reply = format!("OKAY{:04x}", payload.len()).into_bytes();
    reply.extend_from_slice(payload);
    reply
}

/// Reply with `FAIL` and a failure message
pub fn fail_with(message: &str) -> Vec<u8> {
    format!("FAIL{:04x}{message}", message.len()).into_bytes()
}

/// Fake device daemon on a loopback port
///
/// Each accepted connection gets the next script: one reply per request
/// frame read. The connection is closed after the last reply.
pub struct FakeDaemon {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
    handle: JoinHandle<()>,
}

impl FakeDaemon {
    pub async fn start(connections: Vec<Vec<Vec<u8>>>) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = requests.clone();
        let handle = tokio::spawn(async move {
            for replies in connections {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                if serve(stream, replies, &log).await.is_err() {
                    return;
                }
            }
        });
        Ok(Self {
            addr,
            requests,
            handle,
        })
    }

    pub fn addr(&self) -> String {
        self.addr.to_string()
    }

    /// Request bodies received so far, without length headers
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

impl Drop for FakeDaemon {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve(
    mut stream: TcpStream,
    replies: Vec<Vec<u8>>,
    log: &Mutex<Vec<String>>,
) -> std::io::Result<()> {
    for reply in replies {
        let mut header = [0u8; 4];
        stream.read_exact(&mut header).await?;
        let len = std::str::from_utf8(&header)
            .ok()
            .and_then(|h| usize::from_str_radix(h, 16).ok())
            .unwrap_or(0);
        let mut body = vec![0u8; len];
        stream.read_exact(&mut body).await?;
        log.lock().push(String::from_utf8_lossy(&body).into_owned());
        stream.write_all(&reply).await?;
    }
    stream.shutdown().await
}

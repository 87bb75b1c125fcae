//! Raw touch-event decoding
//!
//! The device runs in landscape while the input driver reports portrait
//! axes, so the raw horizontal axis drives the *vertical* screen coordinate
//! (inverted against screen height) and the raw vertical axis drives the
//! horizontal screen coordinate directly.

use crate::error::DeviceError;
use futures::Stream;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::net::TcpStream;

/// Marker of the raw horizontal axis
pub const AXIS_X_MARKER: &str = "ABS_MT_POSITION_X";

/// Marker of the raw vertical axis
pub const AXIS_Y_MARKER: &str = "ABS_MT_POSITION_Y";

const READ_CHUNK: usize = 4096;

/// Touch position in landscape screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TouchSample {
    pub x: i32,
    pub y: i32,
}

/// Line-by-line decoder for `getevent -lt` output
#[derive(Debug, Clone)]
pub struct TouchDecoder {
    screen_height: i32,
    current: TouchSample,
}

impl TouchDecoder {
    #[must_use]
    pub fn new(screen_height: i32) -> Self {
        Self {
            screen_height,
            current: TouchSample::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn current(&self) -> TouchSample {
        self.current
    }

    /// Apply one raw event line
    ///
    /// Returns the updated sample when the line moved an axis. Lines without
    /// an axis marker, and lines whose value does not parse (a frame cut in
    /// half by a socket read), leave the position untouched.
    pub fn apply_line(&mut self, line: &str) -> Option<TouchSample> {
        let line = line.trim();
        if line.contains(AXIS_X_MARKER) {
            let raw = parse_axis_value(line)?;
            self.current.y = self.screen_height - raw;
        } else if line.contains(AXIS_Y_MARKER) {
            self.current.x = parse_axis_value(line)?;
        } else {
            return None;
        }
        Some(self.current)
    }

    /// Apply every line of a chunk, collecting the samples it produced
    pub fn apply_chunk(&mut self, chunk: &str) -> Vec<TouchSample> {
        chunk.lines().filter_map(|line| self.apply_line(line)).collect()
    }
}

fn parse_axis_value(line: &str) -> Option<i32> {
    let token = line.split_whitespace().last()?;
    let digits = token.trim_start_matches("0x");
    match i64::from_str_radix(digits, 16).ok().and_then(|v| i32::try_from(v).ok()) {
        Some(value) => Some(value),
        None => {
            tracing::trace!("Skipping unparsable event line: {line:?}");
            None
        }
    }
}

/// Last decoded touch position, shared with a display task
///
/// Readers only need an atomic read of each coordinate; no other
/// synchronisation is offered.
#[derive(Debug, Clone, Default)]
pub struct TouchPosition {
    inner: Arc<(AtomicI32, AtomicI32)>,
}

impl TouchPosition {
    pub fn store(&self, sample: TouchSample) {
        self.inner.0.store(sample.x, Ordering::Relaxed);
        self.inner.1.store(sample.y, Ordering::Relaxed);
    }

    #[must_use]
    pub fn load(&self) -> TouchSample {
        TouchSample {
            x: self.inner.0.load(Ordering::Relaxed),
            y: self.inner.1.load(Ordering::Relaxed),
        }
    }
}

/// Decoded touch samples read from an open `getevent` shell
pub struct InputEventStream<S = TcpStream> {
    reader: S,
    decoder: TouchDecoder,
    carry: String,
    pending: VecDeque<TouchSample>,
    position: TouchPosition,
    buffer: Vec<u8>,
}

impl<S> InputEventStream<S>
where
    S: AsyncRead + Unpin + Send,
{
    pub fn new(reader: S, decoder: TouchDecoder) -> Self {
        Self {
            reader,
            decoder,
            carry: String::new(),
            pending: VecDeque::new(),
            position: TouchPosition::default(),
            buffer: vec![0u8; READ_CHUNK],
        }
    }

    /// Handle that always holds the most recent sample
    #[must_use]
    pub fn position(&self) -> TouchPosition {
        self.position.clone()
    }

    /// Next decoded sample; `None` once the device closes the stream
    ///
    /// # Errors
    /// - `DeviceError::Io` if the socket read fails
    pub async fn next_sample(&mut self) -> Result<Option<TouchSample>, DeviceError> {
        loop {
            if let Some(sample) = self.pending.pop_front() {
                return Ok(Some(sample));
            }

            let n = self.reader.read(&mut self.buffer).await?;
            if n == 0 {
                let rest = std::mem::take(&mut self.carry);
                let last = self.decoder.apply_line(&rest);
                if let Some(sample) = last {
                    self.position.store(sample);
                }
                return Ok(last);
            }

            self.carry.push_str(&String::from_utf8_lossy(&self.buffer[..n]));
            // Only complete lines are decoded; the tail waits for the next read
            if let Some(end) = self.carry.rfind('\n') {
                let complete: String = self.carry.drain(..=end).collect();
                for sample in self.decoder.apply_chunk(&complete) {
                    self.position.store(sample);
                    self.pending.push_back(sample);
                }
            }
        }
    }

    /// Adapt into a `Stream`; the stream ends after the first error
    pub fn into_stream(self) -> impl Stream<Item = Result<TouchSample, DeviceError>> {
        futures::stream::unfold(Some(self), |state| async move {
            let mut events = state?;
            match events.next_sample().await {
                Ok(Some(sample)) => Some((Ok(sample), Some(events))),
                Ok(None) => None,
                Err(e) => Some((Err(e), None)),
            }
        })
    }
}

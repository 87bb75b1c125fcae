//! Gesture executor
//!
//! Owns the device for the lifetime of a workflow. The device is built
//! lazily from a factory on first use, so a cancellation requested while
//! the workflow is idle stops it before any connection is opened.

use crate::cancel::CancelSignal;
use crate::error::NavError;
use crate::gesture::{Gesture, GestureBatch};
use resonance_device::Device;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Builds a fresh device
pub type DeviceFactory = Box<dyn Fn() -> Box<dyn Device> + Send + Sync>;

/// Called once when the executor observes cancellation
pub type StopHook = Arc<dyn Fn() + Send + Sync>;

/// Default pause after each gesture
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(2500);

/// Replays gesture batches against a lazily constructed device
pub struct Executor {
    device: Option<Box<dyn Device>>,
    factory: DeviceFactory,
    cancel: CancelSignal,
    on_stop: Option<StopHook>,
    stop_fired: AtomicBool,
}

impl Executor {
    /// Create an executor that builds its device with `factory`
    pub fn new(factory: DeviceFactory, cancel: CancelSignal) -> Self {
        Self {
            device: None,
            factory,
            cancel,
            on_stop: None,
            stop_fired: AtomicBool::new(false),
        }
    }

    /// With a hook run when cancellation is observed
    #[must_use]
    pub fn with_stop_hook(mut self, hook: StopHook) -> Self {
        self.on_stop = Some(hook);
        self
    }

    #[inline]
    #[must_use]
    pub fn cancel_signal(&self) -> &CancelSignal {
        &self.cancel
    }

    /// Whether a device has been constructed
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.device.is_some()
    }

    fn cancelled(&self) -> NavError {
        if !self.stop_fired.swap(true, Ordering::SeqCst) {
            info!("Cancellation requested, stopping");
            if let Some(hook) = &self.on_stop {
                hook();
            }
        }
        NavError::Cancelled
    }

    fn ensure_running(&self) -> Result<(), NavError> {
        if self.cancel.is_cancelled() {
            return Err(self.cancelled());
        }
        Ok(())
    }

    async fn device(&mut self) -> Result<&mut Box<dyn Device>, NavError> {
        let device = match self.device.take() {
            Some(device) => device,
            None => {
                self.ensure_running()?;
                info!("Connecting to device");
                let mut device = (self.factory)();
                device.connect().await?;
                device
            }
        };
        Ok(self.device.insert(device))
    }

    /// Replay a batch, pausing `interval` after each gesture
    ///
    /// # Errors
    /// - `NavError::Cancelled` if cancellation is observed between gestures
    /// - `NavError::Device` on device failure
    pub async fn execute(&mut self, batch: &GestureBatch, interval: Duration) -> Result<(), NavError> {
        for gesture in batch {
            self.ensure_running()?;
            let device = self.device().await?;
            match *gesture {
                Gesture::Tap(point) => device.tap(point).await?,
                Gesture::Swipe(from, to) => device.swipe(from, to).await?,
            }
            debug!("Executed {gesture}");
            self.pause(interval).await?;
        }
        Ok(())
    }

    /// Sleep unless cancelled
    ///
    /// # Errors
    /// - `NavError::Cancelled` if cancellation arrives before the delay ends
    pub async fn pause(&self, duration: Duration) -> Result<(), NavError> {
        if self.cancel.sleep(duration).await {
            Ok(())
        } else {
            Err(self.cancelled())
        }
    }

    /// Capture the screen
    ///
    /// # Errors
    /// - `NavError::Cancelled` if cancellation was requested
    /// - `NavError::Device` on device failure
    pub async fn screenshot(&mut self) -> Result<Vec<u8>, NavError> {
        self.ensure_running()?;
        let device = self.device().await?;
        Ok(device.screenshot().await?)
    }

    /// Release the device and stop its daemon; a no-op when idle
    ///
    /// # Errors
    /// - `NavError::Device` if the daemon could not be stopped
    pub async fn shutdown(&mut self) -> Result<(), NavError> {
        let Some(mut device) = self.device.take() else {
            return Ok(());
        };
        if let Err(e) = device.shutdown().await {
            warn!("Device shutdown failed: {e}");
            return Err(e.into());
        }
        Ok(())
    }
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("connected", &self.device.is_some())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use resonance_device::{DeviceError, Point};
    use std::sync::atomic::AtomicUsize;

    #[derive(Clone, Default)]
    struct Log(Arc<Mutex<Vec<String>>>);

    struct FakeDevice(Log);

    #[async_trait::async_trait]
    impl Device for FakeDevice {
        async fn connect(&mut self) -> Result<(), DeviceError> {
            self.0 .0.lock().push("connect".into());
            Ok(())
        }
        async fn tap(&mut self, p: Point) -> Result<(), DeviceError> {
            self.0 .0.lock().push(format!("tap {} {}", p.x, p.y));
            Ok(())
        }
        async fn swipe(&mut self, a: Point, b: Point) -> Result<(), DeviceError> {
            self.0 .0.lock().push(format!("swipe {} {} {} {}", a.x, a.y, b.x, b.y));
            Ok(())
        }
        async fn screenshot(&mut self) -> Result<Vec<u8>, DeviceError> {
            Ok(vec![1, 2, 3])
        }
        async fn shutdown(&mut self) -> Result<(), DeviceError> {
            self.0 .0.lock().push("shutdown".into());
            Ok(())
        }
    }

    fn executor(log: &Log, cancel: CancelSignal) -> Executor {
        let log = log.clone();
        Executor::new(
            Box::new(move || Box::new(FakeDevice(log.clone())) as Box<dyn Device>),
            cancel,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_replays_in_order_and_connects_once() {
        let log = Log::default();
        let mut exec = executor(&log, CancelSignal::new());
        let batch = GestureBatch::new()
            .tap(Point::new(1, 2))
            .swipe(Point::new(3, 4), Point::new(5, 6));

        exec.execute(&batch, DEFAULT_INTERVAL).await.unwrap();
        exec.execute(&batch, Duration::ZERO).await.unwrap();

        let calls = log.0.lock().clone();
        assert_eq!(
            calls,
            vec!["connect", "tap 1 2", "swipe 3 4 5 6", "tap 1 2", "swipe 3 4 5 6"]
        );
    }

    #[tokio::test]
    async fn test_cancel_before_construction_fires_hook_once() {
        let log = Log::default();
        let cancel = CancelSignal::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let mut exec = executor(&log, cancel.clone()).with_stop_hook(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        cancel.cancel();
        assert!(matches!(exec.screenshot().await, Err(NavError::Cancelled)));
        assert!(matches!(
            exec.execute(&GestureBatch::new().tap(Point::new(0, 0)), Duration::ZERO).await,
            Err(NavError::Cancelled)
        ));

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(log.0.lock().is_empty());
        assert!(!exec.is_connected());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_pause() {
        let log = Log::default();
        let cancel = CancelSignal::new();
        let exec = executor(&log, cancel.clone());

        let remote = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            remote.cancel();
        });
        let result = exec.pause(Duration::from_secs(300)).await;
        assert!(matches!(result, Err(NavError::Cancelled)));
    }

    #[tokio::test]
    async fn test_shutdown_is_safe_when_idle() {
        let log = Log::default();
        let mut exec = executor(&log, CancelSignal::new());
        exec.shutdown().await.unwrap();
        assert!(log.0.lock().is_empty());

        exec.screenshot().await.unwrap();
        exec.shutdown().await.unwrap();
        assert_eq!(log.0.lock().last().map(String::as_str), Some("shutdown"));
        assert!(!exec.is_connected());
    }
}

//! Background task runner
//!
//! The surface a front end drives: start one task at a time, cancel it
//! from anywhere, and stop it. `stop` is safe to call when idle.

use crate::config::ResonanceConfig;
use crate::error::TaskError;
use crate::task::{ExchangeTask, ExpulsionTask, OrderTask, Task};
use crate::workflow::{Session, TaskReport};
use parking_lot::Mutex;
use resonance_device::{Device, DeviceClient};
use resonance_kernel::vision::{HttpTextRecognizer, OcrScreenReader, ScreenReader};
use resonance_kernel::{CancelSignal, Executor, Navigator, SceneGraph, StopHook};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn, Instrument};
use uuid::Uuid;

/// Builds a fresh device for each run
pub type SharedDeviceFactory = Arc<dyn Fn() -> Box<dyn Device> + Send + Sync>;

struct ActiveRun {
    id: Uuid,
    handle: JoinHandle<Result<TaskReport, TaskError>>,
}

/// Runs at most one task at a time on a background tokio task
pub struct TaskRunner {
    config: ResonanceConfig,
    graph: Arc<SceneGraph>,
    reader: Arc<dyn ScreenReader>,
    factory: SharedDeviceFactory,
    cancel: CancelSignal,
    on_stop: Option<StopHook>,
    active: Mutex<Option<ActiveRun>>,
}

impl TaskRunner {
    /// Create a runner from explicit collaborators
    ///
    /// # Errors
    /// - `TaskError::Graph` if the scene catalog is inconsistent
    pub fn new(
        config: ResonanceConfig,
        factory: SharedDeviceFactory,
        reader: Arc<dyn ScreenReader>,
    ) -> Result<Self, TaskError> {
        Ok(Self {
            config,
            graph: Arc::new(SceneGraph::standard()?),
            reader,
            factory,
            cancel: CancelSignal::new(),
            on_stop: None,
            active: Mutex::new(None),
        })
    }

    /// Runner backed by the device daemon and the OCR service
    ///
    /// # Errors
    /// - `TaskError::Nav` if the OCR client cannot be built
    /// - `TaskError::Graph` if the scene catalog is inconsistent
    pub fn from_config(config: ResonanceConfig) -> Result<Self, TaskError> {
        let recognizer = HttpTextRecognizer::new(config.ocr.endpoint.clone(), config.ocr.timeout())
            .map_err(resonance_kernel::NavError::from)?;
        let reader: Arc<dyn ScreenReader> = Arc::new(OcrScreenReader::new(recognizer));
        let device = config.device.clone();
        let factory: SharedDeviceFactory =
            Arc::new(move || Box::new(DeviceClient::new(device.clone())) as Box<dyn Device>);
        Self::new(config, factory, reader)
    }

    /// Callback run once when a task stops on cancellation or error
    #[inline]
    #[must_use]
    pub fn with_stop_hook(mut self, hook: StopHook) -> Self {
        self.on_stop = Some(hook);
        self
    }

    #[must_use]
    pub fn config(&self) -> &ResonanceConfig {
        &self.config
    }

    #[must_use]
    pub fn graph(&self) -> &Arc<SceneGraph> {
        &self.graph
    }

    #[must_use]
    pub fn cancel_signal(&self) -> &CancelSignal {
        &self.cancel
    }

    /// Whether a task is still running
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.active
            .lock()
            .as_ref()
            .is_some_and(|run| !run.handle.is_finished())
    }

    /// Id of the current or last started run
    #[must_use]
    pub fn active_id(&self) -> Option<Uuid> {
        self.active.lock().as_ref().map(|run| run.id)
    }

    /// A session wired to this runner's collaborators
    #[must_use]
    pub fn session(&self) -> Session {
        let factory = Arc::clone(&self.factory);
        let mut executor = Executor::new(Box::new(move || factory()), self.cancel.clone());
        if let Some(hook) = &self.on_stop {
            executor = executor.with_stop_hook(Arc::clone(hook));
        }
        let navigator = Navigator::new(Arc::clone(&self.graph), Arc::clone(&self.reader))
            .with_config(self.config.navigator.clone())
            .with_rail_config(self.config.rail.clone());
        Session::new(executor, navigator, self.config.workflow.clone())
    }

    /// Start a round-trip exchange
    ///
    /// # Errors
    /// See `start`.
    pub fn start_exchange(&self, task: ExchangeTask) -> Result<Uuid, TaskError> {
        self.start(Task::Exchange(task))
    }

    /// Start repeating an expulsion slot
    ///
    /// # Errors
    /// See `start`.
    pub fn start_expulsion(&self, task: ExpulsionTask) -> Result<Uuid, TaskError> {
        self.start(Task::Expulsion(task))
    }

    /// Start an order-board pass
    ///
    /// # Errors
    /// See `start`.
    pub fn start_orders(&self, task: OrderTask) -> Result<Uuid, TaskError> {
        self.start(Task::Orders(task))
    }

    /// Start a task in the background
    ///
    /// # Errors
    /// - `TaskError::AlreadyRunning` if a task is still active
    /// - `TaskError::InvalidTask` if the task's parameters cannot work
    pub fn start(&self, task: Task) -> Result<Uuid, TaskError> {
        task.validate()?;
        let mut active = self.active.lock();
        if active.as_ref().is_some_and(|run| !run.handle.is_finished()) {
            return Err(TaskError::AlreadyRunning);
        }

        self.cancel.reset();
        let id = Uuid::new_v4();
        let session = self.session();
        let on_stop = self.on_stop.clone();
        let span = tracing::info_span!("task", %id, kind = task.kind());
        let handle = tokio::spawn(run_guarded(session, task, on_stop).instrument(span));
        *active = Some(ActiveRun { id, handle });
        Ok(id)
    }

    /// Request cancellation; the task stops at its next pause
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the active task to end and take its result
    ///
    /// Returns `None` when nothing was started.
    pub async fn wait(&self) -> Option<Result<TaskReport, TaskError>> {
        let run = self.active.lock().take()?;
        Some(match run.handle.await {
            Ok(result) => result,
            Err(e) => Err(TaskError::Aborted(e.to_string())),
        })
    }

    /// Cancel the active task, if any, and wait for it to release the device
    pub async fn stop(&self) {
        if self.active.lock().is_none() {
            return;
        }
        self.cancel();
        if let Some(Err(e)) = self.wait().await {
            if !e.is_cancellation() {
                warn!("Task ended with error while stopping: {e}");
            }
        }
    }
}

impl std::fmt::Debug for TaskRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskRunner")
            .field("config", &self.config)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

/// Run a task and always release the device afterwards
///
/// Errors other than cancellation are logged and reported to the stop
/// hook; cancellation already reported itself through the executor.
async fn run_guarded(
    mut session: Session,
    task: Task,
    on_stop: Option<StopHook>,
) -> Result<TaskReport, TaskError> {
    info!("Starting {task}");
    let result = session.run(&task).await;
    match &result {
        Ok(report) => info!("Finished {task} after {} rounds", report.rounds),
        Err(e) if e.is_cancellation() => info!("Cancelled {task}"),
        Err(e) => {
            error!("{task} failed: {e}");
            if let Some(hook) = &on_stop {
                hook();
            }
        }
    }
    if let Err(e) = session.shutdown().await {
        warn!("Device shutdown failed: {e}");
    }
    result
}

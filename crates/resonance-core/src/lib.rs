//! Resonance Core - trading and errand workflows on top of scene navigation
//!
//! Each workflow drives the game through a `Session`, which pairs an
//! `Executor` (the device) with a `Navigator` (where the game is):
//! - **Exchange**: buy at one site, sell at the other, and back again,
//!   negotiating prices on the way
//! - **Expulsion**: repeat one slot of a security office's board
//! - **Orders**: accept every order on a guild's board, page by page
//!
//! `TaskRunner` runs one task at a time in the background and exposes the
//! start, cancel and stop surface a front end needs.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use resonance_core::prelude::*;
//!
//! let runner = TaskRunner::from_config(ResonanceConfig::load("resonance.toml")?)?;
//! runner.start_expulsion(ExpulsionTask::new(Site::Freeport, 2).with_rounds(10))?;
//! let report = runner.wait().await;
//! ```

pub mod config;
pub mod error;
pub mod goods;
pub mod negotiation;
pub mod orders;
pub mod runner;
pub mod task;
pub mod workflow;

pub use config::{OcrConfig, ResonanceConfig, WorkflowConfig};
pub use error::TaskError;
pub use goods::{all_goods, goods_for, match_goods};
pub use negotiation::{NegotiationOutcome, NegotiationTracker};
pub use orders::{parse_orders, OrderInfo, OrderKind};
pub use runner::{SharedDeviceFactory, TaskRunner};
pub use task::{ExchangeTask, ExpulsionTask, OrderTask, Task, TradeLeg};
pub use workflow::{Session, TaskReport};

/// Common imports for running workflows
pub mod prelude {
    pub use crate::config::ResonanceConfig;
    pub use crate::error::TaskError;
    pub use crate::runner::TaskRunner;
    pub use crate::task::{ExchangeTask, ExpulsionTask, OrderTask, Task, TradeLeg};
    pub use crate::workflow::{Session, TaskReport};
    pub use resonance_kernel::{Capability, CancelSignal, Site};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

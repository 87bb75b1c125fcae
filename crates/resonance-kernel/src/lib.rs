//! Resonance Kernel - scene graph navigation over a controlled device
//!
//! Two-phase design:
//! 1. **Construction Phase**: wire scenes and transitions into a
//!    `SceneGraphBuilder`, validated once into an immutable `SceneGraph`
//! 2. **Execution Phase**: recognize the current scene, plan a shortest
//!    route and replay it through an `Executor`
//!
//! Local transitions are gesture batches. Cross-site transitions go through
//! the rail map, which `RailController` searches by sweeping and reading
//! text off screenshots.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use resonance_kernel::prelude::*;
//!
//! let graph = Arc::new(SceneGraph::standard()?);
//! let mut navigator = Navigator::new(graph, reader);
//! let mut executor = Executor::new(factory, CancelSignal::new());
//!
//! navigator.navigate(Site::Clarity, Capability::ExchangeBuy, &mut executor).await?;
//! ```

pub mod cancel;
pub mod config;
pub mod error;
pub mod executor;
pub mod gesture;
pub mod graph;
pub mod layout;
pub mod navigator;
pub mod rail;
pub mod site;
pub mod vision;

pub use cancel::CancelSignal;
pub use config::{NavigatorConfig, RailConfig};
pub use error::{NavError, VisionError};
pub use executor::{DeviceFactory, Executor, StopHook, DEFAULT_INTERVAL};
pub use gesture::{Gesture, GestureBatch};
pub use graph::{Edge, GraphBuildError, Rail, Scene, SceneGraph, SceneGraphBuilder, SceneId};
pub use navigator::{DeviceDriver, Navigator, TransitionDriver};
pub use rail::{Pan, RailController};
pub use site::{Capability, ParseSiteError, Site};

/// Common imports for building on the kernel
pub mod prelude {
    pub use crate::cancel::CancelSignal;
    pub use crate::error::{NavError, VisionError};
    pub use crate::executor::Executor;
    pub use crate::gesture::GestureBatch;
    pub use crate::graph::{Edge, SceneGraph, SceneGraphBuilder, SceneId};
    pub use crate::navigator::{Navigator, TransitionDriver};
    pub use crate::site::{Capability, Site};
    pub use crate::vision::{OcrScreenReader, HttpTextRecognizer, ScreenReader, TextBox};
    pub use std::sync::Arc;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

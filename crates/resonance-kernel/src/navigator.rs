//! Scene recognition and route following
//!
//! The navigator tracks which scene the game is showing. It recognizes the
//! scene once from the station label, plans routes by breadth-first search
//! over the scene graph and replays edges through a `TransitionDriver`.
//! The current scene only advances after a transition succeeds.

use crate::config::{NavigatorConfig, RailConfig};
use crate::error::NavError;
use crate::executor::Executor;
use crate::gesture::GestureBatch;
use crate::graph::{Edge, Rail, Scene, SceneGraph, SceneId};
use crate::layout;
use crate::rail::RailController;
use crate::site::{Capability, Site};
use crate::vision::ScreenReader;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Performs the two kinds of edge transition
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransitionDriver: Send {
    /// Replay a local gesture batch
    async fn perform_gestures(&mut self, batch: &GestureBatch) -> Result<(), NavError>;

    /// Ride the rail between two hubs
    async fn travel(&mut self, rail: Rail) -> Result<(), NavError>;
}

/// Driver backed by a live executor
pub struct DeviceDriver<'a> {
    executor: &'a mut Executor,
    reader: &'a dyn ScreenReader,
    rail: &'a RailController,
    interval: Duration,
}

impl<'a> DeviceDriver<'a> {
    #[must_use]
    pub fn new(
        executor: &'a mut Executor,
        reader: &'a dyn ScreenReader,
        rail: &'a RailController,
        interval: Duration,
    ) -> Self {
        Self {
            executor,
            reader,
            rail,
            interval,
        }
    }
}

#[async_trait]
impl TransitionDriver for DeviceDriver<'_> {
    async fn perform_gestures(&mut self, batch: &GestureBatch) -> Result<(), NavError> {
        self.executor.execute(batch, self.interval).await
    }

    async fn travel(&mut self, rail: Rail) -> Result<(), NavError> {
        self.rail.execute(self.executor, self.reader, rail).await
    }
}

/// Scene tracker and route follower
pub struct Navigator {
    graph: Arc<SceneGraph>,
    reader: Arc<dyn ScreenReader>,
    rail: RailController,
    config: NavigatorConfig,
    current: Option<SceneId>,
}

impl Navigator {
    #[must_use]
    pub fn new(graph: Arc<SceneGraph>, reader: Arc<dyn ScreenReader>) -> Self {
        Self {
            graph,
            reader,
            rail: RailController::default(),
            config: NavigatorConfig::default(),
            current: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_config(mut self, config: NavigatorConfig) -> Self {
        let rail = self.rail.config().clone();
        self.config = config;
        self.with_rail_config(rail)
    }

    /// Rail settings; map taps always pause for the navigator's gesture interval
    #[inline]
    #[must_use]
    pub fn with_rail_config(mut self, config: RailConfig) -> Self {
        let config = config.with_gesture_interval(self.config.gesture_interval());
        self.rail = RailController::new(config);
        self
    }

    #[must_use]
    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    #[must_use]
    pub fn reader(&self) -> &Arc<dyn ScreenReader> {
        &self.reader
    }

    #[must_use]
    pub fn rail(&self) -> &RailController {
        &self.rail
    }

    #[must_use]
    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    #[must_use]
    pub fn current_id(&self) -> Option<SceneId> {
        self.current
    }

    #[must_use]
    pub fn current(&self) -> Option<&Scene> {
        self.current.map(|id| self.graph.scene(id))
    }

    /// Record a scene change made outside of `goto`
    pub fn set_current(&mut self, id: SceneId) {
        debug!("Current scene set to {}", self.graph.scene(id).name);
        self.current = Some(id);
    }

    /// Forget the current scene so the next navigation re-recognizes it
    pub fn reset(&mut self) {
        self.current = None;
    }

    /// Hub scene named by the station label, if any
    ///
    /// # Errors
    /// Propagates screen reading failures.
    pub async fn classify(&self, screenshot: &[u8]) -> Result<Option<SceneId>, NavError> {
        Ok(self.read_station(screenshot).await?.1)
    }

    async fn read_station(&self, screenshot: &[u8]) -> Result<(String, Option<SceneId>), NavError> {
        let text = self.reader.read_text(screenshot, layout::STATION_NAME).await?;
        let name = format!("{text}{}", Capability::Hub.suffix());
        let id = self.graph.find(&name);
        Ok((text, id))
    }

    /// Recognize the scene on screen and make it current
    ///
    /// # Errors
    /// `NavError::SceneNotRecognized` when the label names no known hub.
    pub async fn check_scene(&mut self, executor: &mut Executor) -> Result<SceneId, NavError> {
        let screenshot = executor.screenshot().await?;
        let (text, id) = self.read_station(&screenshot).await?;
        let id = id.ok_or(NavError::SceneNotRecognized { text })?;
        info!("Recognized scene {}", self.graph.scene(id).name);
        self.current = Some(id);
        Ok(id)
    }

    /// Shortest path to a scene by name
    ///
    /// # Errors
    /// - `NavError::UnknownScene` if `target` is not in the graph
    /// - `NavError::UnreachableTarget` if no path exists
    pub fn route(&self, from: SceneId, target: &str) -> Result<Vec<SceneId>, NavError> {
        let to = self
            .graph
            .find(target)
            .ok_or_else(|| NavError::UnknownScene(target.to_string()))?;
        self.graph
            .shortest_path(from, to)
            .ok_or_else(|| NavError::UnreachableTarget {
                from: self.graph.scene(from).name.clone(),
                to: target.to_string(),
            })
    }

    /// Follow a path from the current scene
    ///
    /// # Errors
    /// - `NavError::NoCurrentScene` if the current scene is unknown
    /// - `NavError::TransitionNotFound` if a step is not adjacent
    ///
    /// Transition failures propagate; the current scene stays at the last
    /// scene actually reached.
    pub async fn goto(
        &mut self,
        path: &[SceneId],
        driver: &mut dyn TransitionDriver,
    ) -> Result<(), NavError> {
        for &step in path {
            let from = self.current.ok_or(NavError::NoCurrentScene)?;
            let edge = self
                .graph
                .edge(from, step)
                .ok_or_else(|| NavError::TransitionNotFound {
                    from: self.graph.scene(from).name.clone(),
                    to: self.graph.scene(step).name.clone(),
                })?;
            match edge {
                Edge::Gestures(batch) => driver.perform_gestures(batch).await?,
                Edge::Rail(rail) => driver.travel(*rail).await?,
            }
            self.current = Some(step);
            info!("Arrived at {}", self.graph.scene(step).name);
        }
        Ok(())
    }

    /// Navigate to a scene by name, recognizing the start if needed
    ///
    /// # Errors
    /// See `check_scene`, `route` and `goto`.
    pub async fn navigate_to(
        &mut self,
        target: &str,
        executor: &mut Executor,
    ) -> Result<SceneId, NavError> {
        let from = match self.current {
            Some(id) => id,
            None => self.check_scene(executor).await?,
        };
        let path = self.route(from, target)?;
        if path.is_empty() {
            return Ok(from);
        }
        info!(
            "Route to {target}: {}",
            path.iter()
                .map(|id| self.graph.scene(*id).name.as_str())
                .collect::<Vec<_>>()
                .join(" -> ")
        );

        let reader = Arc::clone(&self.reader);
        let rail = self.rail.clone();
        let interval = self.config.route_interval();
        let mut driver = DeviceDriver::new(executor, reader.as_ref(), &rail, interval);
        self.goto(&path, &mut driver).await?;
        Ok(path[path.len() - 1])
    }

    /// Navigate to the scene of a capability at a site
    ///
    /// # Errors
    /// `NavError::UnknownScene` if the site lacks that capability.
    pub async fn navigate(
        &mut self,
        site: Site,
        capability: Capability,
        executor: &mut Executor,
    ) -> Result<SceneId, NavError> {
        self.navigate_to(&capability.scene_name(site), executor).await
    }
}

impl std::fmt::Debug for Navigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("scenes", &self.graph.len())
            .field("current", &self.current())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VisionError;
    use crate::vision::TextBox;
    use mockall::Sequence;
    use resonance_device::Rect;

    struct FixedReader(&'static str);

    #[async_trait]
    impl ScreenReader for FixedReader {
        async fn read_text(&self, _screenshot: &[u8], _region: Rect) -> Result<String, VisionError> {
            Ok(self.0.to_string())
        }

        async fn find_text(
            &self,
            _screenshot: &[u8],
            _region: Option<Rect>,
        ) -> Result<Vec<TextBox>, VisionError> {
            Ok(Vec::new())
        }
    }

    fn navigator(label: &'static str) -> Navigator {
        let graph = Arc::new(SceneGraph::standard().unwrap());
        Navigator::new(graph, Arc::new(FixedReader(label)))
    }

    #[tokio::test]
    async fn test_classify_matches_hub_by_station_label() {
        let nav = navigator("修格里城");
        let hub = nav.graph().hub(Site::Shoggolith);
        assert_eq!(nav.classify(b"png").await.unwrap(), hub);

        let nav = navigator("某处");
        assert_eq!(nav.classify(b"png").await.unwrap(), None);
    }

    #[test]
    fn test_route_errors() {
        let nav = navigator("");
        let hub = nav.graph().hub(Site::Mander).unwrap();
        assert!(nav.route(hub, "曼德矿场主界面").unwrap().is_empty());
        assert!(matches!(
            nav.route(hub, "不存在"),
            Err(NavError::UnknownScene(name)) if name == "不存在"
        ));
    }

    #[tokio::test]
    async fn test_goto_dispatches_by_edge_kind() {
        let mut nav = navigator("");
        let start = nav.graph().lookup(Site::Shoggolith, Capability::ExchangeBuy).unwrap();
        let target = nav.graph().hub(Site::Freeport).unwrap();
        nav.set_current(start);
        let path = nav.route(start, &Capability::Hub.scene_name(Site::Freeport)).unwrap();
        assert_eq!(path.len(), 4);

        let mut seq = Sequence::new();
        let mut driver = MockTransitionDriver::new();
        driver
            .expect_perform_gestures()
            .withf(|batch| batch.as_slice() == GestureBatch::new().tap(layout::ESCAPE).as_slice())
            .times(3)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        driver
            .expect_travel()
            .withf(|rail| *rail == Rail::new(Site::Shoggolith, Site::Freeport))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        nav.goto(&path, &mut driver).await.unwrap();
        assert_eq!(nav.current_id(), Some(target));
    }

    #[tokio::test]
    async fn test_goto_rejects_non_adjacent_step() {
        let mut nav = navigator("");
        let hub = nav.graph().hub(Site::Mander).unwrap();
        let buy = nav.graph().lookup(Site::Mander, Capability::ExchangeBuy).unwrap();
        nav.set_current(hub);

        let mut driver = MockTransitionDriver::new();
        let err = nav.goto(&[buy], &mut driver).await.unwrap_err();
        assert!(matches!(
            err,
            NavError::TransitionNotFound { ref from, ref to }
                if from == "曼德矿场主界面" && to == "曼德矿场交易所购买"
        ));
        assert_eq!(nav.current_id(), Some(hub));
    }

    #[tokio::test]
    async fn test_failed_transition_keeps_last_reached_scene() {
        let mut nav = navigator("");
        let buy = nav.graph().lookup(Site::Brcl, Capability::ExchangeBuy).unwrap();
        let exchange = nav.graph().lookup(Site::Brcl, Capability::Exchange).unwrap();
        nav.set_current(buy);
        let path = nav.route(buy, "铁盟哨站市区").unwrap();

        let mut calls = 0;
        let mut driver = MockTransitionDriver::new();
        driver.expect_perform_gestures().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Ok(())
            } else {
                Err(NavError::Cancelled)
            }
        });

        let err = nav.goto(&path, &mut driver).await.unwrap_err();
        assert!(err.is_cancellation());
        assert_eq!(nav.current_id(), Some(exchange));
    }

    #[tokio::test]
    async fn test_goto_without_current_scene() {
        let mut nav = navigator("");
        let hub = nav.graph().hub(Site::Mander).unwrap();
        let mut driver = MockTransitionDriver::new();
        assert!(matches!(
            nav.goto(&[hub], &mut driver).await,
            Err(NavError::NoCurrentScene)
        ));
    }
}

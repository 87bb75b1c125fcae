//! Rail travel between sites
//!
//! The rail map is larger than the screen. To find a destination the map
//! is parked at its top-left corner and then swept in a boustrophedon over
//! a 3x5 grid of screens, reading every label after each pan. The search
//! and the arrival wait are both bounded.

use crate::config::RailConfig;
use crate::error::NavError;
use crate::executor::Executor;
use crate::gesture::GestureBatch;
use crate::graph::Rail;
use crate::layout;
use crate::site::Site;
use crate::vision::ScreenReader;
use resonance_device::geometry::{SCREEN_HEIGHT, SCREEN_WIDTH};
use resonance_device::Point;
use tracing::{debug, info, warn};

/// Label shown once the train has arrived
pub const ARRIVAL_TEXT: &str = "进入站点";

/// Map pan, named for the part of the map brought into view
///
/// Bringing the right side into view means dragging the map leftward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pan {
    Up,
    Down,
    Left,
    Right,
}

impl Pan {
    /// Swipe endpoints between quarter points of the screen
    #[must_use]
    pub const fn endpoints(self) -> (Point, Point) {
        let (w, h) = (SCREEN_WIDTH, SCREEN_HEIGHT);
        match self {
            Self::Left => (Point::new(w / 4, h / 2), Point::new(w / 4 * 3, h / 2)),
            Self::Right => (Point::new(w / 4 * 3, h / 2), Point::new(w / 4, h / 2)),
            Self::Up => (Point::new(w / 2, h / 4), Point::new(w / 2, h / 4 * 3)),
            Self::Down => (Point::new(w / 2, h / 4 * 3), Point::new(w / 2, h / 4)),
        }
    }
}

/// Pans of one sweep after the top-left screen has been checked
pub const SWEEP: [Pan; 10] = [
    Pan::Right,
    Pan::Right,
    Pan::Down,
    Pan::Down,
    Pan::Left,
    Pan::Left,
    Pan::Down,
    Pan::Down,
    Pan::Right,
    Pan::Right,
];

/// Drives the rail map
#[derive(Debug, Clone, Default)]
pub struct RailController {
    config: RailConfig,
}

impl RailController {
    #[must_use]
    pub fn new(config: RailConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &RailConfig {
        &self.config
    }

    /// Travel from one hub to another
    ///
    /// # Errors
    /// - `NavError::DestinationNotFound` after `max_sweeps` fruitless sweeps
    /// - `NavError::ArrivalNotDetected` after `max_arrival_polls` checks
    pub async fn execute(
        &self,
        executor: &mut Executor,
        reader: &dyn ScreenReader,
        rail: Rail,
    ) -> Result<(), NavError> {
        info!("Taking the rail from {} to {}", rail.from, rail.to);
        let interval = self.config.gesture_interval();
        executor.execute(&GestureBatch::new().tap(layout::MAP), interval).await?;

        let target = self.find_destination(executor, reader, rail.to).await?;
        executor
            .execute(&GestureBatch::new().tap(target).tap(layout::EMBARK), interval)
            .await?;

        info!("Waiting for arrival at {}", rail.to);
        self.wait_for_arrival(executor, reader, rail.to).await?;
        executor
            .execute(&GestureBatch::new().tap(layout::ARRIVAL), self.config.arrival_confirm())
            .await?;
        Ok(())
    }

    async fn find_destination(
        &self,
        executor: &mut Executor,
        reader: &dyn ScreenReader,
        site: Site,
    ) -> Result<Point, NavError> {
        for sweep in 1..=self.config.max_sweeps {
            if let Some(position) = self.detect_destination(executor, reader, site).await? {
                return Ok(position);
            }
            warn!("{site} not on the map after sweep {sweep}");
        }
        Err(NavError::DestinationNotFound {
            site,
            sweeps: self.config.max_sweeps,
        })
    }

    /// One full sweep of the map, stopping at the first sighting
    ///
    /// # Errors
    /// Propagates device and screen reading failures.
    pub async fn detect_destination(
        &self,
        executor: &mut Executor,
        reader: &dyn ScreenReader,
        site: Site,
    ) -> Result<Option<Point>, NavError> {
        for _ in 0..self.config.reset_cycles {
            self.pan(executor, Pan::Up).await?;
            self.pan(executor, Pan::Left).await?;
        }
        if let Some(position) = self.detect(executor, reader, site).await? {
            return Ok(Some(position));
        }
        for pan in SWEEP {
            self.pan(executor, pan).await?;
            if let Some(position) = self.detect(executor, reader, site).await? {
                return Ok(Some(position));
            }
        }
        Ok(None)
    }

    /// Position of the site's label on the current screen
    ///
    /// # Errors
    /// Propagates device and screen reading failures.
    pub async fn detect(
        &self,
        executor: &mut Executor,
        reader: &dyn ScreenReader,
        site: Site,
    ) -> Result<Option<Point>, NavError> {
        let screenshot = executor.screenshot().await?;
        let boxes = reader.find_text(&screenshot, None).await?;
        let found = boxes
            .into_iter()
            .find(|b| b.text == site.display_name())
            .map(|b| b.position);
        if let Some(position) = found {
            debug!("Found {site} at {position}");
        }
        Ok(found)
    }

    async fn pan(&self, executor: &mut Executor, pan: Pan) -> Result<(), NavError> {
        let (from, to) = pan.endpoints();
        executor
            .execute(&GestureBatch::new().swipe(from, to), self.config.pan_interval())
            .await
    }

    async fn wait_for_arrival(
        &self,
        executor: &mut Executor,
        reader: &dyn ScreenReader,
        site: Site,
    ) -> Result<(), NavError> {
        for _ in 0..self.config.max_arrival_polls {
            let screenshot = executor.screenshot().await?;
            if reader.read_text(&screenshot, layout::ARRIVAL_LABEL).await? == ARRIVAL_TEXT {
                return Ok(());
            }
            executor.pause(self.config.arrival_poll()).await?;
        }
        Err(NavError::ArrivalNotDetected {
            site,
            polls: self.config.max_arrival_polls,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pans_are_mirrored_quarter_swipes() {
        assert_eq!(
            Pan::Right.endpoints(),
            (Point::new(1440, 540), Point::new(480, 540))
        );
        assert_eq!(
            Pan::Left.endpoints(),
            (Point::new(480, 540), Point::new(1440, 540))
        );
        assert_eq!(Pan::Up.endpoints(), (Point::new(960, 270), Point::new(960, 810)));
        assert_eq!(Pan::Down.endpoints(), (Point::new(960, 810), Point::new(960, 270)));
    }

    #[test]
    fn test_sweep_covers_three_by_five_grid() {
        // Track the visible screen as (column, row) from the top-left corner
        let (mut col, mut row) = (0i32, 0i32);
        let mut visited = vec![(col, row)];
        for pan in SWEEP {
            match pan {
                Pan::Right => col += 1,
                Pan::Left => col -= 1,
                Pan::Down => row += 1,
                Pan::Up => row -= 1,
            }
            visited.push((col, row));
        }
        visited.sort_unstable();
        visited.dedup();
        assert_eq!(visited.len(), 11);
        assert!(visited.iter().all(|&(c, r)| (0..3).contains(&c) && (0..5).contains(&r)));
    }
}

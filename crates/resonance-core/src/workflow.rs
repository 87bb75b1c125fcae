//! Task workflows
//!
//! A `Session` owns the executor and navigator for one task and runs the
//! trading, expulsion and order-board routines on top of them. Every wait
//! goes through the executor, so cancellation is observed at each pause.

use crate::config::WorkflowConfig;
use crate::error::TaskError;
use crate::goods::match_goods;
use crate::negotiation::{
    parse_percent, NegotiationOutcome, NegotiationTracker, BARGAIN_VERB, RAISE_VERB,
};
use crate::orders::{parse_orders, OrderInfo};
use crate::task::{ExchangeTask, ExpulsionTask, OrderTask, Task, TradeLeg};
use resonance_device::{Point, Rect};
use resonance_kernel::vision::TextBox;
use resonance_kernel::{
    layout, Capability, Executor, GestureBatch, NavError, Navigator, SceneId, Site,
};
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Text shown when a battle is won
pub const BATTLE_WON_TEXT: &str = "作战胜利";

/// Prompt offering to silence the local-goods warning
pub const LOCAL_ITEM_WARNING_TEXT: &str = "今日不再提示";

/// Summary of a finished task
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskReport {
    /// Round trips or battles completed
    pub rounds: u32,
    /// Orders accepted
    pub orders: Vec<OrderInfo>,
}

/// Executor and navigator driving one task
#[derive(Debug)]
pub struct Session {
    executor: Executor,
    navigator: Navigator,
    config: WorkflowConfig,
    first_negotiation: bool,
}

impl Session {
    #[must_use]
    pub fn new(executor: Executor, navigator: Navigator, config: WorkflowConfig) -> Self {
        Self {
            executor,
            navigator,
            config,
            first_negotiation: true,
        }
    }

    #[must_use]
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut Navigator {
        &mut self.navigator
    }

    pub fn executor_mut(&mut self) -> &mut Executor {
        &mut self.executor
    }

    /// Run a task to completion
    ///
    /// # Errors
    /// Whatever the workflow raises; cancellation surfaces as
    /// `TaskError::Nav(NavError::Cancelled)`.
    pub async fn run(&mut self, task: &Task) -> Result<TaskReport, TaskError> {
        task.validate()?;
        match task {
            Task::Exchange(t) => self.run_exchange(t).await,
            Task::Expulsion(t) => self.run_expulsion(t).await,
            Task::Orders(t) => self.run_orders(t).await,
        }
    }

    /// Recognize the scene on screen and adopt it as the current one
    ///
    /// # Errors
    /// - `TaskError::Nav` if the screen matches no known scene
    pub async fn detect_scene(&mut self) -> Result<SceneId, TaskError> {
        Ok(self.navigator.check_scene(&mut self.executor).await?)
    }

    /// Release the device
    ///
    /// # Errors
    /// Propagates device shutdown failures.
    pub async fn shutdown(&mut self) -> Result<(), TaskError> {
        self.executor.shutdown().await?;
        Ok(())
    }

    async fn perform(&mut self, batch: &GestureBatch) -> Result<(), TaskError> {
        let interval = self.navigator.config().gesture_interval();
        self.executor.execute(batch, interval).await?;
        Ok(())
    }

    async fn tap(&mut self, point: Point) -> Result<(), TaskError> {
        self.perform(&GestureBatch::new().tap(point)).await
    }

    async fn read(&mut self, region: Rect) -> Result<String, TaskError> {
        let screenshot = self.executor.screenshot().await?;
        let reader = self.navigator.reader();
        Ok(reader.read_text(&screenshot, region).await.map_err(NavError::from)?)
    }

    async fn find(&mut self, region: Option<Rect>) -> Result<Vec<TextBox>, TaskError> {
        let screenshot = self.executor.screenshot().await?;
        let reader = self.navigator.reader();
        Ok(reader.find_text(&screenshot, region).await.map_err(NavError::from)?)
    }

    async fn enter(&mut self, site: Site, capability: Capability) -> Result<(), TaskError> {
        self.navigator.navigate(site, capability, &mut self.executor).await?;
        Ok(())
    }

    /// Leave a trade form; the game drops back to the exchange
    fn returned_to_exchange(&mut self, site: Site) {
        if let Some(exchange) = self.navigator.graph().lookup(site, Capability::Exchange) {
            self.navigator.set_current(exchange);
        }
    }

    async fn current_site(&mut self) -> Result<Site, TaskError> {
        let id = match self.navigator.current_id() {
            Some(id) => id,
            None => self.navigator.check_scene(&mut self.executor).await?,
        };
        Ok(self.navigator.graph().scene(id).site)
    }

    /// Poll a region until it reads `expected`
    ///
    /// Returns `false` once `timeout` has passed without a match. After a
    /// match it pauses one more `interval` so the screen can settle.
    ///
    /// # Errors
    /// Device and reading failures, and cancellation, propagate.
    pub async fn check_finished(
        &mut self,
        region: Rect,
        expected: &str,
        interval: Duration,
        timeout: Duration,
    ) -> Result<bool, TaskError> {
        let started = Instant::now();
        loop {
            if self.read(region).await? == expected {
                debug!("Read {expected:?}");
                self.executor.pause(interval).await?;
                return Ok(true);
            }
            self.executor.pause(interval).await?;
            if started.elapsed() > timeout {
                warn!("Gave up waiting for {expected:?} after {}s", timeout.as_secs());
                return Ok(false);
            }
        }
    }

    /// Tap the negotiation button until enough rounds are credited
    ///
    /// Stops early once the button no longer reads `verb`, or after
    /// `max_negotiation_attempts` taps.
    async fn negotiate(&mut self, rounds: u32, verb: &str) -> Result<u32, TaskError> {
        let mut tracker = NegotiationTracker::new(rounds);
        let mut attempts = 0;
        while !tracker.is_complete() {
            if attempts >= self.config.max_negotiation_attempts {
                warn!("Stopped negotiating after {attempts} attempts");
                break;
            }
            attempts += 1;
            self.tap(layout::NEGOTIATE).await?;
            let settle = self.config.negotiation_settle(self.first_negotiation);
            self.first_negotiation = false;
            self.executor.pause(settle).await?;

            // Percent and verb must come from the same frame
            let screenshot = self.executor.screenshot().await?;
            let reader = self.navigator.reader();
            let percent_text = reader
                .read_text(&screenshot, layout::PRICE_PERCENT)
                .await
                .map_err(NavError::from)?;
            let action = reader
                .read_text(&screenshot, layout::PRICE_ACTION)
                .await
                .map_err(NavError::from)?;
            let percent = parse_percent(&percent_text)?;
            let can_continue = action == verb;
            match tracker.observe(percent, can_continue) {
                NegotiationOutcome::Continue => {
                    debug!("Negotiation at {percent}%, {} credited", tracker.credited());
                }
                NegotiationOutcome::Completed => {
                    info!("Negotiated to {percent}%");
                }
                NegotiationOutcome::Exhausted => {
                    info!("Negotiation exhausted at {}%", tracker.best());
                    break;
                }
            }
        }
        Ok(tracker.credited())
    }

    /// Buy one leg's goods at its exchange
    ///
    /// # Errors
    /// Navigation, reading and device failures propagate.
    pub async fn exchange_buy(&mut self, leg: &TradeLeg) -> Result<(), TaskError> {
        info!("Buying at {}", leg.site);
        self.enter(leg.site, Capability::ExchangeBuy).await?;
        self.negotiate(leg.buy_rounds, BARGAIN_VERB).await?;

        let use_book = GestureBatch::new()
            .tap(layout::USE_ITEM)
            .tap(layout::PURCHASE_BOOK)
            .tap(layout::USE_ITEM_CONFIRM);
        for _ in 0..leg.extra {
            self.perform(&use_book).await?;
        }

        let next_page = GestureBatch::new().swipe(layout::ITEM_PAGE_FROM, layout::ITEM_PAGE_TO);
        let mut wanted = leg.goods.clone();
        let mut pages = 0;
        while !wanted.is_empty() {
            if pages >= self.config.max_item_pages {
                warn!("Not on sale at {}: {}", leg.site, wanted.join(", "));
                break;
            }
            let boxes = self.find(Some(layout::ITEM_LIST)).await?;
            let (taps, rest) = match_goods(&wanted, &boxes);
            if !taps.is_empty() {
                self.perform(&taps).await?;
            }
            wanted = rest;
            self.perform(&next_page).await?;
            pages += 1;
        }

        // A changed market asks for confirmation twice
        self.perform(
            &GestureBatch::new()
                .tap(layout::CONFIRM_TRADE)
                .tap(layout::CONFIRM_TRADE),
        )
        .await?;
        self.tap(layout::BLANK_SPACE).await?;
        self.returned_to_exchange(leg.site);
        info!("Bought {} at {}", leg.goods.join(", "), leg.site);
        Ok(())
    }

    /// Sell everything in the hold at a site
    ///
    /// # Errors
    /// Navigation, reading and device failures propagate.
    pub async fn exchange_sell(&mut self, site: Site, rounds: u32) -> Result<(), TaskError> {
        info!("Selling at {site}");
        self.enter(site, Capability::ExchangeSell).await?;

        if self.find(Some(layout::ITEM_LIST)).await?.is_empty() {
            info!("Nothing to sell at {site}");
            self.tap(layout::ESCAPE).await?;
            self.returned_to_exchange(site);
            return Ok(());
        }

        self.negotiate(rounds, RAISE_VERB).await?;
        self.tap(layout::SELECT_ALL).await?;
        self.perform(
            &GestureBatch::new()
                .tap(layout::CONFIRM_TRADE)
                .tap(layout::CONFIRM_TRADE),
        )
        .await?;

        let prompt = self.find(None).await?;
        if prompt.iter().any(|b| b.text == LOCAL_ITEM_WARNING_TEXT) {
            debug!("Confirming local goods warning");
            self.tap(layout::LOCAL_ITEM_WARNING_CONFIRM).await?;
        }
        self.tap(layout::BLANK_SPACE).await?;
        self.returned_to_exchange(site);
        info!("Sold at {site}");
        Ok(())
    }

    /// Trade back and forth between two sites
    ///
    /// Starts from whichever leg's site the game is at, or the first leg.
    ///
    /// # Errors
    /// The first failure of any step ends the loop.
    pub async fn run_exchange(&mut self, task: &ExchangeTask) -> Result<TaskReport, TaskError> {
        let here = self.current_site().await?;
        let [first, second] = &task.legs;
        let (src, dst) = if here == second.site {
            (second, first)
        } else {
            (first, second)
        };

        let mut report = TaskReport::default();
        while task.rounds.map_or(true, |limit| report.rounds < limit) {
            info!("Exchange round {} between {} and {}", report.rounds + 1, src.site, dst.site);
            self.exchange_buy(src).await?;
            self.exchange_sell(dst.site, src.sell_rounds).await?;
            self.exchange_buy(dst).await?;
            self.exchange_sell(src.site, dst.sell_rounds).await?;
            report.rounds += 1;
        }
        Ok(report)
    }

    /// Progress counters of the three board slots
    ///
    /// Unreadable counters are `None`.
    ///
    /// # Errors
    /// Device and reading failures propagate.
    pub async fn expulsion_progress(&mut self) -> Result<[Option<u32>; 3], TaskError> {
        let mut progress = [None; 3];
        for (slot, region) in progress.iter_mut().zip(layout::EXPULSION_PROGRESS) {
            *slot = self.read(region).await?.trim().parse().ok();
        }
        Ok(progress)
    }

    /// Fight one board slot repeatedly
    ///
    /// # Errors
    /// Navigation, reading and device failures propagate.
    pub async fn run_expulsion(&mut self, task: &ExpulsionTask) -> Result<TaskReport, TaskError> {
        self.enter(task.site, Capability::ExpulsionBoard).await?;
        let slot = layout::EXPULSION_SLOTS
            .get(usize::from(task.slot).wrapping_sub(1))
            .copied()
            .ok_or_else(|| TaskError::InvalidTask(format!("expulsion slot {}", task.slot)))?;
        let start = GestureBatch::new()
            .tap(slot)
            .tap(layout::EXPULSION_START)
            .tap(layout::BATTLE_CONFIRM);

        let mut report = TaskReport::default();
        while task.rounds.map_or(true, |limit| report.rounds < limit) {
            let progress = self.expulsion_progress().await?;
            info!("Expulsion progress {progress:?}, starting slot {}", task.slot);
            self.perform(&start).await?;

            let won = self
                .check_finished(
                    layout::BATTLE_WIN,
                    BATTLE_WON_TEXT,
                    self.config.poll_interval(),
                    self.config.poll_timeout(),
                )
                .await?;
            if !won {
                warn!("No victory screen; moving on");
            }
            self.tap(layout::BATTLE_END_NEXT).await?;
            self.executor.pause(self.config.expulsion_settle()).await?;
            report.rounds += 1;
        }
        Ok(report)
    }

    /// Accept every order on a board, page by page
    ///
    /// Without a site the board of the site on screen is used.
    ///
    /// # Errors
    /// - `TaskError::InvalidTask` if the site has no guild
    /// - Navigation, reading and device failures propagate.
    pub async fn run_orders(&mut self, task: &OrderTask) -> Result<TaskReport, TaskError> {
        let site = match task.site {
            Some(site) => site,
            None => {
                let site = self.current_site().await?;
                Task::Orders(OrderTask { site: Some(site) }).validate()?;
                site
            }
        };
        self.enter(site, Capability::OrderBoard).await?;

        let next_page = GestureBatch::new().swipe(layout::ORDER_PAGE_FROM, layout::ORDER_PAGE_TO);
        let mut report = TaskReport::default();
        for _ in 0..self.config.max_order_pages {
            let orders = parse_orders(&self.find(Some(layout::ORDER_LIST)).await?);
            if orders.is_empty() {
                info!("No orders left at {site}");
                break;
            }
            for order in orders {
                info!(
                    "Accepting {} order to {} ({})",
                    order.kind, order.destination, order.capacity
                );
                self.perform(
                    &GestureBatch::new()
                        .tap(order.accept)
                        .tap(layout::ORDER_CONFIRM),
                )
                .await?;
                report.orders.push(order);
            }
            self.perform(&next_page).await?;
        }
        Ok(report)
    }
}

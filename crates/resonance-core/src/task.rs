//! Task descriptions accepted by the runner

use crate::error::TaskError;
use crate::goods;
use resonance_kernel::{layout, Site};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One side of an exchange round trip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeLeg {
    pub site: Site,
    /// Goods to buy here
    pub goods: Vec<String>,
    /// Purchase books to use before buying
    #[serde(default)]
    pub extra: u32,
    /// Successful bargaining rounds wanted when buying here
    #[serde(default)]
    pub buy_rounds: u32,
    /// Successful price-raising rounds wanted when selling these goods
    #[serde(default)]
    pub sell_rounds: u32,
}

impl TradeLeg {
    #[must_use]
    pub fn new(site: Site, goods: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            site,
            goods: goods.into_iter().map(Into::into).collect(),
            extra: 0,
            buy_rounds: 0,
            sell_rounds: 0,
        }
    }

    /// With negotiation rounds
    #[inline]
    #[must_use]
    pub fn with_rounds(mut self, buy_rounds: u32, sell_rounds: u32) -> Self {
        self.buy_rounds = buy_rounds;
        self.sell_rounds = sell_rounds;
        self
    }

    /// With purchase books
    #[inline]
    #[must_use]
    pub fn with_extra(mut self, extra: u32) -> Self {
        self.extra = extra;
        self
    }

    fn validate(&self) -> Result<(), TaskError> {
        if let Some(name) = self.goods.iter().find(|g| !goods::sells(self.site, g)) {
            return Err(TaskError::InvalidTask(format!(
                "{} does not sell {name}",
                self.site
            )));
        }
        Ok(())
    }
}

/// Buy at one site, sell at the other, and back again
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeTask {
    pub legs: [TradeLeg; 2],
    /// Round trips to make; `None` runs until cancelled
    #[serde(default)]
    pub rounds: Option<u32>,
}

impl ExchangeTask {
    #[must_use]
    pub fn new(first: TradeLeg, second: TradeLeg) -> Self {
        Self {
            legs: [first, second],
            rounds: None,
        }
    }

    /// With a round-trip limit
    #[inline]
    #[must_use]
    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = Some(rounds);
        self
    }

    /// # Errors
    /// - `TaskError::InvalidTask` for a single-site trip or goods the site lacks
    pub fn validate(&self) -> Result<(), TaskError> {
        let [a, b] = &self.legs;
        if a.site == b.site {
            return Err(TaskError::InvalidTask(format!(
                "both legs trade at {}",
                a.site
            )));
        }
        a.validate()?;
        b.validate()
    }
}

/// Repeat one expulsion board slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpulsionTask {
    pub site: Site,
    /// Board slot, 1 to 3
    pub slot: u8,
    /// Battles to fight; `None` runs until cancelled
    #[serde(default)]
    pub rounds: Option<u32>,
}

impl ExpulsionTask {
    #[must_use]
    pub fn new(site: Site, slot: u8) -> Self {
        Self {
            site,
            slot,
            rounds: None,
        }
    }

    /// With a battle limit
    #[inline]
    #[must_use]
    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = Some(rounds);
        self
    }

    /// # Errors
    /// - `TaskError::InvalidTask` for a slot outside 1..=3 or a site without a board
    pub fn validate(&self) -> Result<(), TaskError> {
        if !(1..=3).contains(&self.slot) {
            return Err(TaskError::InvalidTask(format!(
                "expulsion slot {} (expected 1 to 3)",
                self.slot
            )));
        }
        if layout::security_office_entrance(self.site).is_none() {
            return Err(TaskError::InvalidTask(format!(
                "{} has no expulsion board",
                self.site
            )));
        }
        Ok(())
    }
}

/// Accept every order on the current site's board
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTask {
    /// Board to use; `None` means the site the game is showing
    #[serde(default)]
    pub site: Option<Site>,
}

/// Anything the runner can start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Task {
    Exchange(ExchangeTask),
    Expulsion(ExpulsionTask),
    Orders(OrderTask),
}

impl Task {
    /// # Errors
    /// - `TaskError::InvalidTask` if the parameters cannot work
    pub fn validate(&self) -> Result<(), TaskError> {
        match self {
            Self::Exchange(task) => task.validate(),
            Self::Expulsion(task) => task.validate(),
            Self::Orders(OrderTask { site: Some(site) }) if layout::guild_entrance(*site).is_none() => {
                Err(TaskError::InvalidTask(format!("{site} has no order board")))
            }
            Self::Orders(_) => Ok(()),
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Exchange(_) => "exchange",
            Self::Expulsion(_) => "expulsion",
            Self::Orders(_) => "orders",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exchange(t) => write!(f, "exchange {} <-> {}", t.legs[0].site, t.legs[1].site),
            Self::Expulsion(t) => write!(f, "expulsion {} slot {}", t.site, t.slot),
            Self::Orders(OrderTask { site: Some(site) }) => write!(f, "orders at {site}"),
            Self::Orders(_) => f.write_str("orders"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchange_validation() {
        let task = ExchangeTask::new(
            TradeLeg::new(Site::Mander, ["钛矿石"]),
            TradeLeg::new(Site::Clarity, ["游戏机", "录像带"]),
        );
        task.validate().unwrap();

        let same = ExchangeTask::new(
            TradeLeg::new(Site::Mander, ["钛矿石"]),
            TradeLeg::new(Site::Mander, ["石材"]),
        );
        assert!(matches!(same.validate(), Err(TaskError::InvalidTask(_))));

        let wrong = ExchangeTask::new(
            TradeLeg::new(Site::Mander, ["游戏机"]),
            TradeLeg::new(Site::Clarity, ["录像带"]),
        );
        assert!(matches!(wrong.validate(), Err(TaskError::InvalidTask(m)) if m.contains("游戏机")));
    }

    #[test]
    fn test_expulsion_validation() {
        ExpulsionTask::new(Site::Freeport, 3).validate().unwrap();
        assert!(ExpulsionTask::new(Site::Freeport, 0).validate().is_err());
        assert!(ExpulsionTask::new(Site::Freeport, 4).validate().is_err());
        assert!(ExpulsionTask::new(Site::Wilderness, 1).validate().is_err());
    }

    #[test]
    fn test_order_validation() {
        Task::Orders(OrderTask::default()).validate().unwrap();
        Task::Orders(OrderTask { site: Some(Site::Mander) }).validate().unwrap();
        assert!(Task::Orders(OrderTask { site: Some(Site::Wilderness) })
            .validate()
            .is_err());
    }

    #[test]
    fn test_task_from_json() {
        let task: Task = serde_json::from_str(
            r#"{"kind": "expulsion", "site": "freeport", "slot": 2, "rounds": 5}"#,
        )
        .unwrap();
        assert_eq!(task, Task::Expulsion(ExpulsionTask::new(Site::Freeport, 2).with_rounds(5)));
        assert_eq!(task.to_string(), "expulsion 7号自由港 slot 2");
    }
}

//! Price negotiation bookkeeping
//!
//! A negotiation round is credited when the displayed percentage rises
//! above the last credited reading. The baseline starts at 0.0 for every
//! trade, so a first reading above zero is already a credit.

use crate::error::TaskError;

/// Label of the negotiation button while buying
pub const BARGAIN_VERB: &str = "砍价";

/// Label of the negotiation button while selling
pub const RAISE_VERB: &str = "抬价";

/// Result of one observation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationOutcome {
    /// Keep tapping
    Continue,
    /// The requested number of rounds was credited
    Completed,
    /// The button no longer offers negotiation
    Exhausted,
}

/// Credits successful negotiation rounds
#[derive(Debug, Clone, PartialEq)]
pub struct NegotiationTracker {
    requested: u32,
    credited: u32,
    best: f32,
}

impl NegotiationTracker {
    #[must_use]
    pub fn new(requested: u32) -> Self {
        Self {
            requested,
            credited: 0,
            best: 0.0,
        }
    }

    #[must_use]
    pub fn credited(&self) -> u32 {
        self.credited
    }

    /// Last credited percentage
    #[must_use]
    pub fn best(&self) -> f32 {
        self.best
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.credited >= self.requested
    }

    /// Record a reading taken after a negotiation tap
    pub fn observe(&mut self, percent: f32, can_continue: bool) -> NegotiationOutcome {
        if percent > self.best {
            self.credited += 1;
            self.best = percent;
            if self.is_complete() {
                return NegotiationOutcome::Completed;
            }
            return NegotiationOutcome::Continue;
        }
        if can_continue {
            NegotiationOutcome::Continue
        } else {
            NegotiationOutcome::Exhausted
        }
    }
}

/// Parse a percentage label such as `"12.5%"`
///
/// # Errors
/// - `TaskError::UnreadablePrice` if no number remains after stripping `%`
pub fn parse_percent(text: &str) -> Result<f32, TaskError> {
    text.replace(['%', '％'], "")
        .trim()
        .parse::<f32>()
        .map_err(|_| TaskError::UnreadablePrice(text.to_string()))
}

//! Evaluation context for eligibility rules.

use chrono::NaiveDate;

use crate::config::ResolverConfig;
use crate::models::{Block, DayKey, Exception, TimeWindow};

/// Day state passed to eligibility rules.
///
/// Carries the resolved date and block, the day's exceptions, and the policy
/// configuration. Rules read it; they never modify it.
#[derive(Debug, Clone)]
pub struct EligibilityContext<'a> {
    /// Date being resolved.
    pub date: NaiveDate,
    /// Weekday key of `date`.
    pub day: DayKey,
    /// Block being filled.
    pub block: Block,
    /// Every exception of the day.
    pub exceptions: &'a [Exception],
    pub config: &'a ResolverConfig,
    /// Staff already holding the client in the other block.
    pub other_block_holders: Vec<String>,
}

impl<'a> EligibilityContext<'a> {
    /// Creates a context for one block of one day.
    pub fn new(
        date: NaiveDate,
        day: DayKey,
        block: Block,
        exceptions: &'a [Exception],
        config: &'a ResolverConfig,
    ) -> Self {
        Self {
            date,
            day,
            block,
            exceptions,
            config,
            other_block_holders: Vec::new(),
        }
    }

    /// Records who holds the client in the other block.
    pub fn with_other_block_holders(mut self, staff_ids: Vec<String>) -> Self {
        self.other_block_holders = staff_ids;
        self
    }

    /// Default window of the current block.
    pub fn block_window(&self) -> TimeWindow {
        self.config.block_window(self.block)
    }

    /// Whether `staff_id` holds the client in the other block.
    pub fn holds_other_block(&self, staff_id: &str) -> bool {
        self.other_block_holders.iter().any(|s| s == staff_id)
    }
}

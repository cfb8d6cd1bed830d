//! Resolver configuration.
//!
//! Every policy constant the resolution stages consult lives here so that a
//! caller can tune block times and protection windows without touching code.
//! Configuration documents are JSON; missing keys take their defaults.

use serde::{Deserialize, Serialize};

use crate::error::{ResolveError, ResolveResult};
use crate::models::{Block, LunchSlot, TimeWindow};
use crate::validation::validate_config;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Default AM block window.
    pub am_window: TimeWindow,
    /// Default PM block window.
    pub pm_window: TimeWindow,
    /// Lunch window; split at its midpoint into two sub-slots.
    pub lunch_window: TimeWindow,
    /// Days after service start during which a client cannot be cancelled.
    pub tenure_protection_days: i64,
    /// Days after hire during which a staff member is not floated.
    pub new_hire_protection_days: i64,
    /// Consecutive absent days that qualify a returning client for a skip.
    pub absence_skip_threshold: u32,
    /// Sessions per week that qualify a client for the one-time skip.
    pub skip_sessions_per_week: u32,
    /// Clients a Lead RBT may hold in one block when used as a reserve.
    pub lead_reserve_capacity: usize,
    /// Lunch group size for clients without their own allowance.
    pub default_max_group_size: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            am_window: TimeWindow::hm(8, 0, 12, 0),
            pm_window: TimeWindow::hm(12, 0, 16, 0),
            lunch_window: TimeWindow::hm(11, 30, 12, 30),
            tenure_protection_days: 30,
            new_hire_protection_days: 30,
            absence_skip_threshold: 5,
            skip_sessions_per_week: 2,
            lead_reserve_capacity: 2,
            default_max_group_size: 2,
        }
    }
}

impl ResolverConfig {
    /// Parses a JSON configuration document.
    ///
    /// # Errors
    /// [`ResolveError::Config`] for malformed JSON and
    /// [`ResolveError::InvalidInput`] for empty or inverted windows.
    pub fn from_json(json: &str) -> ResolveResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        validate_config(&config).map_err(ResolveError::InvalidInput)?;
        Ok(config)
    }

    /// Default window of a block.
    pub fn block_window(&self, block: Block) -> TimeWindow {
        match block {
            Block::Am => self.am_window,
            Block::Pm => self.pm_window,
        }
    }

    /// Window of a lunch sub-slot.
    pub fn lunch_slot_window(&self, slot: LunchSlot) -> TimeWindow {
        let (first, second) = self.lunch_window.halves();
        match slot {
            LunchSlot::First => first,
            LunchSlot::Second => second,
        }
    }

    pub fn with_block_windows(mut self, am: TimeWindow, pm: TimeWindow) -> Self {
        self.am_window = am;
        self.pm_window = pm;
        self
    }

    pub fn with_lunch_window(mut self, window: TimeWindow) -> Self {
        self.lunch_window = window;
        self
    }

    pub fn with_tenure_protection_days(mut self, days: i64) -> Self {
        self.tenure_protection_days = days;
        self
    }

    pub fn with_new_hire_protection_days(mut self, days: i64) -> Self {
        self.new_hire_protection_days = days;
        self
    }

    pub fn with_absence_skip_threshold(mut self, days: u32) -> Self {
        self.absence_skip_threshold = days;
        self
    }

    pub fn with_lead_reserve_capacity(mut self, capacity: usize) -> Self {
        self.lead_reserve_capacity = capacity;
        self
    }

    pub fn with_default_max_group_size(mut self, size: usize) -> Self {
        self.default_max_group_size = size;
        self
    }
}

//! Same-day exception model.
//!
//! Exceptions mark a staff member or client as out (or unexpectedly in) for
//! all or part of the resolved day. They never modify the template.

use serde::{Deserialize, Serialize};

use super::TimeWindow;

/// Entity an exception targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExceptionTarget {
    Staff,
    Client,
}

/// Direction of an exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExceptionMode {
    /// Unavailable.
    Out,
    /// Available despite the weekly calendar.
    In,
}

/// A day-specific deviation for one staff member or client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exception {
    pub target: ExceptionTarget,
    pub entity_id: String,
    pub mode: ExceptionMode,
    pub all_day: bool,
    /// Affected window when not all day.
    pub window: Option<TimeWindow>,
}

impl Exception {
    fn new(target: ExceptionTarget, entity_id: impl Into<String>, mode: ExceptionMode) -> Self {
        Self {
            target,
            entity_id: entity_id.into(),
            mode,
            all_day: true,
            window: None,
        }
    }

    /// Staff member out all day.
    pub fn staff_out(staff_id: impl Into<String>) -> Self {
        Self::new(ExceptionTarget::Staff, staff_id, ExceptionMode::Out)
    }

    /// Client out all day.
    pub fn client_out(client_id: impl Into<String>) -> Self {
        Self::new(ExceptionTarget::Client, client_id, ExceptionMode::Out)
    }

    /// Staff member in all day.
    pub fn staff_in(staff_id: impl Into<String>) -> Self {
        Self::new(ExceptionTarget::Staff, staff_id, ExceptionMode::In)
    }

    /// Client in all day.
    pub fn client_in(client_id: impl Into<String>) -> Self {
        Self::new(ExceptionTarget::Client, client_id, ExceptionMode::In)
    }

    /// Narrows the exception to a window.
    pub fn during(mut self, window: TimeWindow) -> Self {
        self.all_day = false;
        self.window = Some(window);
        self
    }

    /// Whether this exception targets the given entity.
    pub fn targets(&self, target: ExceptionTarget, entity_id: &str) -> bool {
        self.target == target && self.entity_id == entity_id
    }

    /// Whether this exception touches `window`.
    ///
    /// A non-all-day exception without a window is treated as all day.
    pub fn touches(&self, window: &TimeWindow) -> bool {
        if self.all_day {
            return true;
        }
        self.window.map_or(true, |w| w.overlaps(window))
    }
}

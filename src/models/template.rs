//! Weekly template model.
//!
//! The template is the baseline weekly plan: who works with whom in each
//! block of each weekday. A resolution run only looks at the assignments for
//! the day being resolved.

use serde::{Deserialize, Serialize};

use super::{Block, DayKey, TimeWindow};

/// One staff member's planned work for one block of one weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateAssignment {
    pub day: DayKey,
    pub block: Block,
    pub staff_id: String,
    /// Client served. `None` = non-client work (admin, supervision, ...).
    pub client_id: Option<String>,
    /// Precise start (minutes). `None` = block default.
    pub start_min: Option<u16>,
    /// Precise end (minutes). `None` = block default.
    pub end_min: Option<u16>,
    /// Locked assignments keep their staff even when the client is out.
    pub locked: bool,
}

impl TemplateAssignment {
    /// Creates an assignment of `staff_id` to `client_id`.
    pub fn new(
        day: DayKey,
        block: Block,
        staff_id: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            day,
            block,
            staff_id: staff_id.into(),
            client_id: Some(client_id.into()),
            start_min: None,
            end_min: None,
            locked: false,
        }
    }

    /// Creates a non-client assignment.
    pub fn unassigned(day: DayKey, block: Block, staff_id: impl Into<String>) -> Self {
        Self {
            day,
            block,
            staff_id: staff_id.into(),
            client_id: None,
            start_min: None,
            end_min: None,
            locked: false,
        }
    }

    /// Sets a precise start and end.
    pub fn with_times(mut self, start_min: u16, end_min: u16) -> Self {
        self.start_min = Some(start_min);
        self.end_min = Some(end_min);
        self
    }

    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    /// Effective window: precise times where given, block default otherwise.
    pub fn window(&self, block_default: &TimeWindow) -> TimeWindow {
        TimeWindow::new(
            self.start_min.unwrap_or(block_default.start_min),
            self.end_min.unwrap_or(block_default.end_min),
        )
    }
}

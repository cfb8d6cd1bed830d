//! Resolved day schedule model.
//!
//! The resolved schedule has one row per staff member. Each row lists its
//! block and lunch slots in display order, tagged with where the slot came
//! from so downstream consumers can render it and count it.

use serde::{Deserialize, Serialize};

use super::Period;

/// Where a slot's content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotSource {
    /// Template as authored.
    Template,
    /// Applied substitution.
    Sub,
    /// Applied Lead RBT coverage.
    Lead,
    /// Lunch break or lunch coverage.
    Lunch,
    /// Client session pending cancellation.
    Cancel,
    /// Client slot without resolved coverage.
    Unfilled,
    /// Staff member out; their client is covered elsewhere or absent.
    Out,
    /// No client work.
    Open,
}

impl SlotSource {
    /// Whether the slot represents a client session actually staffed.
    pub fn is_filled(&self) -> bool {
        matches!(self, SlotSource::Template | SlotSource::Sub | SlotSource::Lead)
    }
}

/// One slot of a staff row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSlot {
    pub period: Period,
    pub client_id: Option<String>,
    /// Text shown in the cell.
    pub display: String,
    pub source: SlotSource,
}

impl ScheduleSlot {
    pub fn new(
        period: Period,
        client_id: Option<String>,
        display: impl Into<String>,
        source: SlotSource,
    ) -> Self {
        Self {
            period,
            client_id,
            display: display.into(),
            source,
        }
    }
}

/// Overall state of a staff row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffStatus {
    /// Working their template.
    Normal,
    /// Holding at least one substitute, lead, or lunch-cover slot.
    Covering,
    /// Out for part of the day.
    PartialOut,
    /// Out for the whole day.
    Out,
    /// No client work today.
    Open,
}

/// One staff member's resolved day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffSchedule {
    pub staff_id: String,
    pub staff_name: String,
    pub status: StaffStatus,
    /// Slots in period order.
    pub slots: Vec<ScheduleSlot>,
}

impl StaffSchedule {
    /// Slot for a period, if present.
    pub fn slot(&self, period: Period) -> Option<&ScheduleSlot> {
        self.slots.iter().find(|s| s.period == period)
    }

    /// Slots carrying a given source.
    pub fn slots_with_source(&self, source: SlotSource) -> Vec<&ScheduleSlot> {
        self.slots.iter().filter(|s| s.source == source).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> StaffSchedule {
        StaffSchedule {
            staff_id: "S1".into(),
            staff_name: "Sam".into(),
            status: StaffStatus::Covering,
            slots: vec![
                ScheduleSlot::new(Period::Am, Some("C1".into()), "Casey", SlotSource::Template),
                ScheduleSlot::new(Period::LunchFirst, None, "Lunch", SlotSource::Lunch),
                ScheduleSlot::new(Period::Pm, Some("C2".into()), "Drew", SlotSource::Sub),
            ],
        }
    }

    #[test]
    fn test_slot_lookup() {
        let row = sample_row();
        assert_eq!(row.slot(Period::Pm).unwrap().display, "Drew");
        assert!(row.slot(Period::LunchSecond).is_none());
        assert_eq!(row.slots_with_source(SlotSource::Template).len(), 1);
    }

    #[test]
    fn test_filled_sources() {
        assert!(SlotSource::Template.is_filled());
        assert!(SlotSource::Sub.is_filled());
        assert!(SlotSource::Lead.is_filled());
        assert!(!SlotSource::Unfilled.is_filled());
        assert!(!SlotSource::Cancel.is_filled());
        assert!(!SlotSource::Lunch.is_filled());
    }
}

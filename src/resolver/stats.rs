//! Resolution statistics.
//!
//! Summarizes a resolved day from the slot source tags and the approval
//! queue, for dashboards and regression checks.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Slots by source | Count of schedule slots per source tag |
//! | Filled client slots | Block slots staffed from template, sub, or lead |
//! | Unfilled client slots | Block slots tagged unfilled or cancel |
//! | Fill rate | filled / (filled + unfilled), 1.0 when nothing is due |
//! | Pending / blocked approvals | Approval queue by status |
//! | Lunch errors | Clients without legal lunch coverage |

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{
    ApprovalRequest, ApprovalStatus, LunchCoverageError, Period, SlotSource, StaffSchedule,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolutionStats {
    pub slots_by_source: BTreeMap<SlotSource, usize>,
    pub filled_client_slots: usize,
    pub unfilled_client_slots: usize,
    /// Fraction of due client slots that are staffed (0.0..1.0).
    pub fill_rate: f64,
    pub pending_approvals: usize,
    pub blocked_approvals: usize,
    pub lunch_errors: usize,
}

impl ResolutionStats {
    /// Computes statistics from a resolved day.
    pub fn calculate(
        schedule: &[StaffSchedule],
        approvals: &[ApprovalRequest],
        lunch_errors: &[LunchCoverageError],
    ) -> Self {
        let mut slots_by_source = BTreeMap::new();
        let mut filled = 0;
        let mut unfilled = 0;

        for slot in schedule.iter().flat_map(|row| &row.slots) {
            *slots_by_source.entry(slot.source).or_insert(0) += 1;
            if !matches!(slot.period, Period::Am | Period::Pm) {
                continue;
            }
            if slot.source.is_filled() && slot.client_id.is_some() {
                filled += 1;
            } else if matches!(slot.source, SlotSource::Unfilled | SlotSource::Cancel) {
                unfilled += 1;
            }
        }

        let fill_rate = if filled + unfilled == 0 {
            1.0
        } else {
            filled as f64 / (filled + unfilled) as f64
        };

        let count = |status: ApprovalStatus| approvals.iter().filter(|r| r.status == status).count();

        Self {
            slots_by_source,
            filled_client_slots: filled,
            unfilled_client_slots: unfilled,
            fill_rate,
            pending_approvals: count(ApprovalStatus::Pending),
            blocked_approvals: count(ApprovalStatus::Blocked),
            lunch_errors: lunch_errors.len(),
        }
    }

    /// Slots carrying a given source.
    pub fn slots_with(&self, source: SlotSource) -> usize {
        self.slots_by_source.get(&source).copied().unwrap_or(0)
    }

    /// Whether the day needs no human attention.
    pub fn is_clean(&self) -> bool {
        self.unfilled_client_slots == 0
            && self.pending_approvals == 0
            && self.blocked_approvals == 0
            && self.lunch_errors == 0
    }
}

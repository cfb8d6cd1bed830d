//! Lunch coverage results.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::LunchSlot;

/// A client handed to another staff member while their own staff eats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LunchPairing {
    pub client_id: String,
    /// Staff member eating during `lunch_slot`.
    pub staff_id: String,
    /// Staff member covering the client during `lunch_slot`.
    pub covering_staff_id: String,
    pub lunch_slot: LunchSlot,
    /// Covered through a lunch-peer listing rather than general grouping.
    pub via_peer: bool,
}

/// Why a candidate could not take on lunch coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LunchBlocker {
    /// Nobody is working and free during the sub-slot.
    NoEligibleStaff,
    /// The client excludes the candidate.
    ExclusionConflict,
    /// The candidate may not cover lunches or crisis clients.
    CoverageRestricted,
    /// The client disallows substitutes and no peer listing applies.
    SubstitutionDisallowed,
    /// A client involved cannot be grouped, or refuses the combination.
    GroupingDisallowed,
    /// The group would exceed a client's size allowance.
    GroupTooLarge,
}

impl fmt::Display for LunchBlocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            LunchBlocker::NoEligibleStaff => "no eligible staff",
            LunchBlocker::ExclusionConflict => "exclusion conflict",
            LunchBlocker::CoverageRestricted => "coverage restricted",
            LunchBlocker::SubstitutionDisallowed => "substitution disallowed",
            LunchBlocker::GroupingDisallowed => "grouping disallowed",
            LunchBlocker::GroupTooLarge => "group too large",
        };
        f.write_str(text)
    }
}

/// A client left without legal lunch coverage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LunchCoverageError {
    pub client_id: String,
    pub client_name: String,
    /// Staff member eating, whose client is left uncovered.
    pub staff_id: String,
    pub lunch_slot: LunchSlot,
    /// The most specific blocker found.
    pub kind: LunchBlocker,
    pub reason: String,
}

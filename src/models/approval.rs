//! Approval queue models.
//!
//! The engine never commits a staffing change on its own. Every decision a
//! human must confirm (or a situation a human must resolve) is returned as an
//! [`ApprovalRequest`]. Once approved, the caller feeds substitutions back in
//! as [`ApprovedSub`] records on the next run.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Block;

/// A human-confirmed substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovedSub {
    pub client_id: String,
    pub sub_staff_id: String,
    pub block: Block,
}

impl ApprovedSub {
    pub fn new(client_id: impl Into<String>, sub_staff_id: impl Into<String>, block: Block) -> Self {
        Self {
            client_id: client_id.into(),
            sub_staff_id: sub_staff_id.into(),
            block,
        }
    }
}

/// Why a client was skipped instead of cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum SkipReason {
    /// Clients seen twice a week get one pass per cycle.
    TwoSessionsPerWeek,
    /// The client recently returned from a long absence.
    ReturningFromAbsence { absent_days: u32 },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::TwoSessionsPerWeek => {
                f.write_str("2 sessions/week rule: one cancellation skip per cycle")
            }
            SkipReason::ReturningFromAbsence { absent_days } => write!(
                f,
                "5-day absence rule: returning after {absent_days} consecutive absent days"
            ),
        }
    }
}

/// The decision a request asks a human to confirm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ApprovalKind {
    /// A sub-eligible staff member is proposed.
    SubStaffing {
        proposed_sub_id: String,
        proposed_sub_name: String,
        original_staff_id: String,
    },
    /// A free Lead RBT is proposed.
    LeadStaffing {
        proposed_sub_id: String,
        proposed_sub_name: String,
        original_staff_id: String,
    },
    /// A Lead RBT already working the block is proposed as a reserve.
    LeadReserve {
        proposed_sub_id: String,
        proposed_sub_name: String,
        original_staff_id: String,
    },
    /// One staff member holds the client for both blocks.
    AllDayStaffing { staff_id: String, staff_name: String },
    /// No coverage exists; the session should be cancelled.
    Cancellation { original_staff_ids: Vec<String> },
    /// No coverage exists, but the client is inside tenure protection.
    CancelProtected {
        original_staff_ids: Vec<String>,
        protected_until: NaiveDate,
    },
    /// No coverage exists; the client uses a one-time skip.
    CancelSkipped {
        original_staff_ids: Vec<String>,
        skip_reason: SkipReason,
    },
}

impl ApprovalKind {
    /// Stable snake_case name of the variant.
    pub fn name(&self) -> &'static str {
        match self {
            ApprovalKind::SubStaffing { .. } => "sub_staffing",
            ApprovalKind::LeadStaffing { .. } => "lead_staffing",
            ApprovalKind::LeadReserve { .. } => "lead_reserve",
            ApprovalKind::AllDayStaffing { .. } => "all_day_staffing",
            ApprovalKind::Cancellation { .. } => "cancellation",
            ApprovalKind::CancelProtected { .. } => "cancel_protected",
            ApprovalKind::CancelSkipped { .. } => "cancel_skipped",
        }
    }

    /// Whether this is one of the cancellation-family decisions.
    pub fn is_cancellation_family(&self) -> bool {
        matches!(
            self,
            ApprovalKind::Cancellation { .. }
                | ApprovalKind::CancelProtected { .. }
                | ApprovalKind::CancelSkipped { .. }
        )
    }

    /// The staff member a request is about, for id construction.
    fn proposed_staff_id(&self) -> Option<&str> {
        match self {
            ApprovalKind::SubStaffing { proposed_sub_id, .. }
            | ApprovalKind::LeadStaffing { proposed_sub_id, .. }
            | ApprovalKind::LeadReserve { proposed_sub_id, .. } => Some(proposed_sub_id),
            ApprovalKind::AllDayStaffing { staff_id, .. } => Some(staff_id),
            _ => None,
        }
    }
}

/// Review state of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    /// Awaiting a decision.
    Pending,
    /// Confirmed.
    Approved,
    /// The engine refuses to proceed; a human must intervene.
    Blocked,
}

/// A decision awaiting human judgment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRequest {
    /// Deterministic id, stable across identical runs.
    pub id: String,
    pub client_id: String,
    pub client_name: String,
    /// Affected block. `None` = the whole day.
    pub block: Option<Block>,
    pub kind: ApprovalKind,
    /// Human-readable explanation.
    pub reason: String,
    pub status: ApprovalStatus,
}

impl ApprovalRequest {
    /// Builds a request with a deterministic id.
    pub fn new(
        kind: ApprovalKind,
        client_id: impl Into<String>,
        client_name: impl Into<String>,
        block: Option<Block>,
        reason: impl Into<String>,
        status: ApprovalStatus,
    ) -> Self {
        let client_id = client_id.into();
        let scope = block.map_or("day", |b| b.as_str());
        let id = match kind.proposed_staff_id() {
            Some(staff) => format!("{}:{}:{}:{}", kind.name(), client_id, scope, staff),
            None => format!("{}:{}:{}", kind.name(), client_id, scope),
        };
        Self {
            id,
            client_id,
            client_name: client_name.into(),
            block,
            kind,
            reason: reason.into(),
            status,
        }
    }

    /// Staff member proposed for the slot, if any.
    pub fn proposed_sub_id(&self) -> Option<&str> {
        match &self.kind {
            ApprovalKind::SubStaffing { proposed_sub_id, .. }
            | ApprovalKind::LeadStaffing { proposed_sub_id, .. }
            | ApprovalKind::LeadReserve { proposed_sub_id, .. } => Some(proposed_sub_id),
            _ => None,
        }
    }

    /// Skip rule cited, for skip decisions.
    pub fn skip_reason(&self) -> Option<SkipReason> {
        match &self.kind {
            ApprovalKind::CancelSkipped { skip_reason, .. } => Some(*skip_reason),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_is_deterministic() {
        let kind = ApprovalKind::SubStaffing {
            proposed_sub_id: "S2".into(),
            proposed_sub_name: "Sub".into(),
            original_staff_id: "S1".into(),
        };
        let a = ApprovalRequest::new(
            kind.clone(),
            "C1",
            "Casey",
            Some(Block::Am),
            "S1 out",
            ApprovalStatus::Pending,
        );
        let b = ApprovalRequest::new(kind, "C1", "Casey", Some(Block::Am), "S1 out", ApprovalStatus::Pending);
        assert_eq!(a.id, "sub_staffing:C1:AM:S2");
        assert_eq!(a, b);
        assert_eq!(a.proposed_sub_id(), Some("S2"));
        assert!(a.skip_reason().is_none());
    }

    #[test]
    fn test_whole_day_scope() {
        let r = ApprovalRequest::new(
            ApprovalKind::Cancellation {
                original_staff_ids: vec!["S1".into()],
            },
            "C1",
            "Casey",
            None,
            "no coverage",
            ApprovalStatus::Pending,
        );
        assert_eq!(r.id, "cancellation:C1:day");
        assert!(r.kind.is_cancellation_family());
        assert_eq!(r.kind_name(), "cancellation");
    }

    #[test]
    fn test_skip_reason_text() {
        assert!(SkipReason::TwoSessionsPerWeek.to_string().contains("2 sessions/week"));
        assert!(SkipReason::ReturningFromAbsence { absent_days: 6 }
            .to_string()
            .contains("5-day absence"));
    }

    #[test]
    fn test_kind_serializes_tagged() {
        let kind = ApprovalKind::CancelSkipped {
            original_staff_ids: vec![],
            skip_reason: SkipReason::TwoSessionsPerWeek,
        };
        let json = serde_json::to_string(&kind).unwrap();
        assert!(json.contains("\"type\":\"cancel_skipped\""));
        assert!(json.contains("two_sessions_per_week"));
    }
}

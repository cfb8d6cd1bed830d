//! Cancellation decisions for clients whose coverage is exhausted.
//!
//! Each client reaching this stage receives exactly one decision, checked in
//! order:
//!
//! 1. **Tenure protection**: `cancel_protected`, status `blocked`.
//! 2. **Skip**: `cancel_skipped`, status `pending`, when the skip is unused
//!    and either the sessions-per-week rule or the returning-from-absence rule
//!    applies.
//! 3. **Cancellation**: `cancellation`, status `pending`, ordered by
//!    `last_canceled_date` ascending (never cancelled first), then client id.
//!
//! The client's cancellation and skip history is read, never written.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Days, NaiveDate};
use log::debug;

use super::coverage::ExhaustedSlot;
use super::day::DayContext;
use crate::config::ResolverConfig;
use crate::eligibility::{is_protected_by_tenure, tenure_protected_until};
use crate::models::{
    ApprovalKind, ApprovalRequest, ApprovalStatus, Block, Client, ClientLocation, SkipReason,
};

/// What happens to a client nobody can cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancellationDecision {
    /// Inside tenure protection until the given date.
    Protected { until: NaiveDate },
    /// A one-time skip applies.
    Skipped(SkipReason),
    /// The session is cancelled.
    Cancel,
}

/// Decides the fate of one client.
pub fn decide_for_client(
    client: &Client,
    today: NaiveDate,
    locations: &[ClientLocation],
    config: &ResolverConfig,
) -> CancellationDecision {
    if is_protected_by_tenure(client, today, locations, config) {
        if let Some(until) = tenure_protected_until(client, locations, config) {
            return CancellationDecision::Protected { until };
        }
    }
    match skip_reason(client, today, config) {
        Some(reason) => CancellationDecision::Skipped(reason),
        None => CancellationDecision::Cancel,
    }
}

/// The skip rule a client qualifies for, if any.
pub fn skip_reason(client: &Client, today: NaiveDate, config: &ResolverConfig) -> Option<SkipReason> {
    if client.cancel_skip_used {
        return None;
    }
    if client.sessions_per_week == config.skip_sessions_per_week {
        return Some(SkipReason::TwoSessionsPerWeek);
    }
    if client.consecutive_absent_days >= config.absence_skip_threshold
        && !skipped_since_return(client, today)
    {
        return Some(SkipReason::ReturningFromAbsence {
            absent_days: client.consecutive_absent_days,
        });
    }
    None
}

/// A return date before the calendar's range counts as earlier than any skip.
fn skipped_since_return(client: &Client, today: NaiveDate) -> bool {
    let returned = today.checked_sub_days(Days::new(u64::from(client.days_back_since_absence)));
    client
        .last_skipped_date
        .is_some_and(|d| returned.map_or(true, |r| d >= r))
}

/// Emits one decision per affected client, in output order.
pub(crate) fn decide(day: &DayContext<'_>, exhausted: &[ExhaustedSlot]) -> Vec<ApprovalRequest> {
    let mut per_client: BTreeMap<&str, (BTreeSet<Block>, BTreeSet<&str>)> = BTreeMap::new();
    for slot in exhausted {
        let entry = per_client.entry(slot.client_id.as_str()).or_default();
        entry.0.insert(slot.block);
        entry
            .1
            .extend(slot.original_staff_ids.iter().map(String::as_str));
    }

    let mut protected = Vec::new();
    let mut skipped = Vec::new();
    let mut cancelled = Vec::new();

    for (client_id, (blocks, staff)) in per_client {
        let Some(client) = day.client(client_id) else {
            continue;
        };
        let block = match blocks.len() {
            1 => blocks.into_iter().next(),
            _ => None,
        };
        let scope = block.map_or_else(|| "all day".to_string(), |b| b.to_string());
        let original_staff_ids: Vec<String> = staff.iter().map(|s| s.to_string()).collect();
        let names = staff.iter().copied().collect::<Vec<_>>().join(", ");

        let decision = decide_for_client(client, day.date(), &day.request.client_locations, day.config);
        debug!("{} {}: {:?}", client.id, scope, decision);

        match decision {
            CancellationDecision::Protected { until } => protected.push(ApprovalRequest::new(
                ApprovalKind::CancelProtected {
                    original_staff_ids,
                    protected_until: until,
                },
                client.id.clone(),
                client.name.clone(),
                block,
                format!(
                    "No coverage for {} ({scope}, {names} out); client is protected until {until}",
                    client.name
                ),
                ApprovalStatus::Blocked,
            )),
            CancellationDecision::Skipped(skip_reason) => skipped.push(ApprovalRequest::new(
                ApprovalKind::CancelSkipped {
                    original_staff_ids,
                    skip_reason,
                },
                client.id.clone(),
                client.name.clone(),
                block,
                format!("No coverage for {} ({scope}, {names} out); {skip_reason}", client.name),
                ApprovalStatus::Pending,
            )),
            CancellationDecision::Cancel => cancelled.push((
                client.last_canceled_date,
                ApprovalRequest::new(
                    ApprovalKind::Cancellation { original_staff_ids },
                    client.id.clone(),
                    client.name.clone(),
                    block,
                    format!(
                        "No coverage for {} ({scope}, {names} out); last cancelled {}",
                        client.name,
                        client
                            .last_canceled_date
                            .map_or_else(|| "never".to_string(), |d| d.to_string())
                    ),
                    ApprovalStatus::Pending,
                ),
            )),
        }
    }

    // Oldest cancellation first; `None` (never cancelled) sorts before any date.
    cancelled.sort_by(|(da, a), (db, b)| da.cmp(db).then_with(|| a.client_id.cmp(&b.client_id)));

    protected
        .into_iter()
        .chain(skipped)
        .chain(cancelled.into_iter().map(|(_, r)| r))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DayKey;
    use crate::resolver::DayRequest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2024, 3, 4)
    }

    fn cfg() -> ResolverConfig {
        ResolverConfig::default()
    }

    #[test]
    fn test_protected_client() {
        let c = Client::new("C1").with_service_start(date(2024, 2, 20));
        assert_eq!(
            decide_for_client(&c, today(), &[], &cfg()),
            CancellationDecision::Protected { until: date(2024, 3, 21) }
        );
    }

    #[test]
    fn test_protection_expires_after_thirty_days() {
        let c = Client::new("C1").with_service_start(date(2024, 2, 3));
        assert_eq!(decide_for_client(&c, today(), &[], &cfg()), CancellationDecision::Cancel);
    }

    #[test]
    fn test_location_move_restarts_protection() {
        let c = Client::new("C1").with_service_start(date(2023, 1, 1));
        let moved = vec![ClientLocation::new("C1", "north", date(2024, 3, 1))];
        assert!(matches!(
            decide_for_client(&c, today(), &moved, &cfg()),
            CancellationDecision::Protected { .. }
        ));
    }

    #[test]
    fn test_two_sessions_skip() {
        let c = Client::new("C1").with_sessions_per_week(2);
        assert_eq!(
            decide_for_client(&c, today(), &[], &cfg()),
            CancellationDecision::Skipped(SkipReason::TwoSessionsPerWeek)
        );
        let used = c.with_cancel_skip_used(true);
        assert_eq!(decide_for_client(&used, today(), &[], &cfg()), CancellationDecision::Cancel);
    }

    #[test]
    fn test_absence_skip() {
        let c = Client::new("C1").with_absence(5, 1);
        assert_eq!(
            skip_reason(&c, today(), &cfg()),
            Some(SkipReason::ReturningFromAbsence { absent_days: 5 })
        );
        assert_eq!(skip_reason(&Client::new("C2").with_absence(4, 1), today(), &cfg()), None);
    }

    #[test]
    fn test_absence_skip_only_once_since_return() {
        // Returned two days ago and was skipped yesterday.
        let c = Client::new("C1")
            .with_absence(6, 2)
            .with_last_skipped(date(2024, 3, 3));
        assert_eq!(skip_reason(&c, today(), &cfg()), None);

        // Skipped before the absence; still eligible.
        let earlier = Client::new("C1")
            .with_absence(6, 2)
            .with_last_skipped(date(2024, 1, 10));
        assert!(skip_reason(&earlier, today(), &cfg()).is_some());
    }

    #[test]
    fn test_absence_return_beyond_calendar() {
        let c = Client::new("C1").with_absence(6, u32::MAX);
        assert_eq!(
            decide_for_client(&c, today(), &[], &cfg()),
            CancellationDecision::Skipped(SkipReason::ReturningFromAbsence { absent_days: 6 })
        );
        let skipped = c.with_last_skipped(date(2024, 1, 10));
        assert_eq!(decide_for_client(&skipped, today(), &[], &cfg()), CancellationDecision::Cancel);
    }

    #[test]
    fn test_protection_beats_skip() {
        let c = Client::new("C1")
            .with_sessions_per_week(2)
            .with_service_start(date(2024, 3, 1));
        assert!(matches!(
            decide_for_client(&c, today(), &[], &cfg()),
            CancellationDecision::Protected { .. }
        ));
    }

    fn exhausted(client: &str, block: Block, staff: &str) -> ExhaustedSlot {
        ExhaustedSlot {
            client_id: client.into(),
            block,
            original_staff_ids: vec![staff.into()],
        }
    }

    #[test]
    fn test_fairness_order_and_grouping() {
        let req = DayRequest::new(today()).with_clients(vec![
            Client::new("RECENT").with_last_canceled(date(2024, 2, 28)),
            Client::new("OLD").with_last_canceled(date(2024, 1, 4)),
            Client::new("NEVER"),
            Client::new("PROT").with_service_start(date(2024, 3, 1)),
        ]);
        let config = cfg();
        let day = DayContext::new(&req, DayKey::Mon, &config);
        let out = decide(
            &day,
            &[
                exhausted("RECENT", Block::Am, "S1"),
                exhausted("RECENT", Block::Pm, "S1"),
                exhausted("OLD", Block::Am, "S2"),
                exhausted("NEVER", Block::Pm, "S3"),
                exhausted("PROT", Block::Am, "S4"),
            ],
        );
        let order: Vec<(&str, &str)> = out
            .iter()
            .map(|r| (r.kind_name(), r.client_id.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("cancel_protected", "PROT"),
                ("cancellation", "NEVER"),
                ("cancellation", "OLD"),
                ("cancellation", "RECENT"),
            ]
        );
        assert_eq!(out[0].status, ApprovalStatus::Blocked);
        assert_eq!(out[3].block, None);
        assert_eq!(out[3].id, "cancellation:RECENT:day");
        assert_eq!(out[2].block, Some(Block::Am));
    }
}

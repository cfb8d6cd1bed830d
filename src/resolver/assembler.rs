//! Schedule assembly.
//!
//! Merges coverage, cancellation, and lunch results into one row per staff
//! member. Every slot that should hold a client but does not is kept and
//! tagged `unfilled` or `cancel`; nothing is dropped.

use std::collections::BTreeMap;

use super::coverage::{CoverageOutcome, SlotOutcome};
use super::day::DayContext;
use super::lunch::LunchOutcome;
use crate::models::{
    ApprovalKind, ApprovalRequest, Block, Period, ScheduleSlot, SlotSource, StaffMember,
    StaffSchedule, StaffStatus,
};

pub(crate) fn assemble(
    day: &DayContext<'_>,
    coverage: &CoverageOutcome,
    decisions: &[ApprovalRequest],
    lunch: &LunchOutcome,
) -> Vec<StaffSchedule> {
    let decided: BTreeMap<&str, &ApprovalKind> = decisions
        .iter()
        .map(|r| (r.client_id.as_str(), &r.kind))
        .collect();

    day.all_staff()
        .filter(|s| {
            day.on_template(&s.id)
                || coverage.placements.iter().any(|p| p.staff_id == s.id)
                || coverage
                    .proposals
                    .iter()
                    .any(|r| r.proposed_sub_id() == Some(s.id.as_str()))
        })
        .map(|staff| row(day, coverage, &decided, lunch, staff))
        .collect()
}

fn row(
    day: &DayContext<'_>,
    coverage: &CoverageOutcome,
    decided: &BTreeMap<&str, &ApprovalKind>,
    lunch: &LunchOutcome,
    staff: &StaffMember,
) -> StaffSchedule {
    let mut slots = Vec::new();
    for block in Block::BOTH {
        slots.extend(block_slots(day, coverage, decided, staff, block));
    }
    slots.extend(lunch_slots(lunch, &staff.id));
    slots.sort_by(|a, b| a.period.cmp(&b.period).then_with(|| a.client_id.cmp(&b.client_id)));

    let out_blocks = Block::BOTH
        .iter()
        .filter(|&&b| !day.staff_present(staff, b))
        .count();
    let covering = slots.iter().any(|s| {
        matches!(s.source, SlotSource::Sub | SlotSource::Lead)
            || (s.source == SlotSource::Lunch && s.client_id.is_some())
    });
    let status = if out_blocks == Block::BOTH.len() {
        StaffStatus::Out
    } else if out_blocks > 0 {
        StaffStatus::PartialOut
    } else if covering {
        StaffStatus::Covering
    } else if slots.iter().any(|s| s.source == SlotSource::Template && s.client_id.is_some()) {
        StaffStatus::Normal
    } else {
        StaffStatus::Open
    };

    StaffSchedule {
        staff_id: staff.id.clone(),
        staff_name: staff.name.clone(),
        status,
        slots,
    }
}

fn block_slots(
    day: &DayContext<'_>,
    coverage: &CoverageOutcome,
    decided: &BTreeMap<&str, &ApprovalKind>,
    staff: &StaffMember,
    block: Block,
) -> Vec<ScheduleSlot> {
    let period = Period::from(block);

    let placed: Vec<ScheduleSlot> = coverage
        .placements_for(&staff.id, block)
        .map(|p| {
            let display = match p.source {
                SlotSource::Template => p.client_id.clone(),
                _ => format!("{} ({})", p.client_id, source_label(p.source)),
            };
            ScheduleSlot::new(period, Some(p.client_id.clone()), display, p.source)
        })
        .collect();
    if !placed.is_empty() {
        return placed;
    }

    let template_clients: Vec<&str> = day
        .assignments(block)
        .filter(|a| a.staff_id == staff.id)
        .filter_map(|a| a.client_id.as_deref())
        .collect();

    if !day.staff_present(staff, block) {
        if template_clients.is_empty() {
            return vec![ScheduleSlot::new(period, None, "OUT", SlotSource::Out)];
        }
        return template_clients
            .into_iter()
            .map(|client_id| {
                let (display, source) = absent_staff_slot(coverage, decided, client_id, block);
                ScheduleSlot::new(period, Some(client_id.to_string()), display, source)
            })
            .collect();
    }

    let locked_with_absent_client = day
        .assignments(block)
        .find(|a| a.staff_id == staff.id && a.locked && a.client_id.is_some());
    if let Some(client_id) = locked_with_absent_client.and_then(|a| a.client_id.as_deref()) {
        return vec![ScheduleSlot::new(
            period,
            Some(client_id.to_string()),
            format!("{client_id} (client out)"),
            SlotSource::Template,
        )];
    }

    let display = match coverage.proposed_client(&staff.id, block) {
        Some(client_id) => format!("open (proposed for {client_id})"),
        None => match template_clients.first() {
            Some(client_id) => format!("open ({client_id} out)"),
            None => "open".to_string(),
        },
    };
    vec![ScheduleSlot::new(period, None, display, SlotSource::Open)]
}

/// What an out staff member's client slot shows.
fn absent_staff_slot(
    coverage: &CoverageOutcome,
    decided: &BTreeMap<&str, &ApprovalKind>,
    client_id: &str,
    block: Block,
) -> (String, SlotSource) {
    match coverage.outcome(client_id, block) {
        Some(SlotOutcome::Proposed { staff_id }) => (
            format!("{client_id} (pending {staff_id})"),
            SlotSource::Unfilled,
        ),
        Some(SlotOutcome::Exhausted) => match decided.get(client_id) {
            Some(ApprovalKind::Cancellation { .. }) => {
                (format!("{client_id} (cancel pending)"), SlotSource::Cancel)
            }
            Some(ApprovalKind::CancelProtected { .. }) => {
                (format!("{client_id} (protected, uncovered)"), SlotSource::Unfilled)
            }
            Some(ApprovalKind::CancelSkipped { .. }) => {
                (format!("{client_id} (skipped)"), SlotSource::Unfilled)
            }
            _ => (format!("{client_id} (uncovered)"), SlotSource::Unfilled),
        },
        Some(SlotOutcome::Approved { staff_id }) => {
            (format!("OUT ({client_id} with {staff_id})"), SlotSource::Out)
        }
        _ => ("OUT".to_string(), SlotSource::Out),
    }
}

fn lunch_slots(lunch: &LunchOutcome, staff_id: &str) -> Vec<ScheduleSlot> {
    let mut slots = Vec::new();

    if let Some(&slot) = lunch.eating.get(staff_id) {
        let period = Period::from(slot);
        let uncovered: Vec<&str> = lunch
            .errors
            .iter()
            .filter(|e| e.staff_id == staff_id && e.lunch_slot == slot)
            .map(|e| e.client_id.as_str())
            .collect();
        if uncovered.is_empty() {
            slots.push(ScheduleSlot::new(period, None, "lunch", SlotSource::Lunch));
        } else {
            slots.push(ScheduleSlot::new(
                period,
                None,
                format!("lunch ({} uncovered)", uncovered.join(", ")),
                SlotSource::Unfilled,
            ));
        }
    }

    for p in lunch.pairings.iter().filter(|p| p.covering_staff_id == staff_id) {
        slots.push(ScheduleSlot::new(
            Period::from(p.lunch_slot),
            Some(p.client_id.clone()),
            format!("{} (lunch for {})", p.client_id, p.staff_id),
            SlotSource::Lunch,
        ));
    }
    slots
}

fn source_label(source: SlotSource) -> &'static str {
    match source {
        SlotSource::Sub => "sub",
        SlotSource::Lead => "lead",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolverConfig;
    use crate::models::{ApprovedSub, Client, DayKey, Exception, TemplateAssignment, TimeWindow};
    use crate::resolver::{cancellation, coverage, lunch, training, DayRequest};
    use chrono::NaiveDate;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    }

    fn run(req: &DayRequest) -> Vec<StaffSchedule> {
        let config = ResolverConfig::default();
        let day = DayContext::new(req, DayKey::Mon, &config);
        let impact = training::assess(&day);
        let cov = coverage::resolve(&day, &impact);
        let decisions = cancellation::decide(&day, &cov.exhausted);
        let lun = lunch::resolve(&day, &cov.placements);
        assemble(&day, &cov, &decisions, &lun)
    }

    fn find<'a>(rows: &'a [StaffSchedule], id: &str) -> &'a StaffSchedule {
        rows.iter().find(|r| r.staff_id == id).unwrap()
    }

    fn am(staff: &str, client: &str) -> TemplateAssignment {
        TemplateAssignment::new(DayKey::Mon, Block::Am, staff, client)
    }

    #[test]
    fn test_normal_row() {
        let req = DayRequest::new(monday())
            .with_staff(vec![StaffMember::rbt("S1")])
            .with_clients(vec![Client::new("C1")])
            .with_template(vec![am("S1", "C1")]);
        let rows = run(&req);
        let r = find(&rows, "S1");
        assert_eq!(r.status, StaffStatus::Normal);
        assert_eq!(r.slot(Period::Am).map(|s| s.source), Some(SlotSource::Template));
        assert_eq!(r.slot(Period::Pm).map(|s| s.source), Some(SlotSource::Open));
    }

    #[test]
    fn test_unfilled_slot_kept_for_out_staff() {
        let req = DayRequest::new(monday())
            .with_staff(vec![StaffMember::rbt("S1"), StaffMember::rbt("S2").sub_eligible()])
            .with_clients(vec![Client::new("C1")])
            .with_template(vec![am("S1", "C1"), TemplateAssignment::unassigned(DayKey::Mon, Block::Am, "S2")])
            .with_exceptions(vec![Exception::staff_out("S1")]);
        let rows = run(&req);
        let out = find(&rows, "S1");
        assert_eq!(out.status, StaffStatus::Out);
        let slot = out.slot(Period::Am).unwrap();
        assert_eq!(slot.source, SlotSource::Unfilled);
        assert!(slot.display.contains("pending S2"));
        let s2 = find(&rows, "S2");
        assert!(s2.slot(Period::Am).unwrap().display.contains("proposed for C1"));
    }

    #[test]
    fn test_cancel_slot() {
        let req = DayRequest::new(monday())
            .with_staff(vec![StaffMember::rbt("S1")])
            .with_clients(vec![Client::new("C1")])
            .with_template(vec![am("S1", "C1")])
            .with_exceptions(vec![Exception::staff_out("S1")]);
        let rows = run(&req);
        assert_eq!(
            find(&rows, "S1").slot(Period::Am).map(|s| s.source),
            Some(SlotSource::Cancel)
        );
    }

    #[test]
    fn test_sub_row_is_covering() {
        let req = DayRequest::new(monday())
            .with_staff(vec![StaffMember::rbt("S1"), StaffMember::rbt("S2")])
            .with_clients(vec![Client::new("C1")])
            .with_template(vec![am("S1", "C1")])
            .with_exceptions(vec![Exception::staff_out("S1").during(TimeWindow::hm(9, 0, 10, 0))])
            .with_approved_subs(vec![ApprovedSub::new("C1", "S2", Block::Am)]);
        let rows = run(&req);
        let sub = find(&rows, "S2");
        assert_eq!(sub.status, StaffStatus::Covering);
        assert_eq!(sub.slot(Period::Am).map(|s| s.source), Some(SlotSource::Sub));
        let out = find(&rows, "S1");
        assert_eq!(out.status, StaffStatus::PartialOut);
        assert_eq!(out.slot(Period::Am).map(|s| s.source), Some(SlotSource::Out));
    }

    #[test]
    fn test_lunch_slots_in_period_order() {
        let req = DayRequest::new(monday())
            .with_staff(vec![StaffMember::rbt("S1")])
            .with_clients(vec![Client::new("C1")])
            .with_template(vec![
                am("S1", "C1"),
                TemplateAssignment::new(DayKey::Mon, Block::Pm, "S1", "C1"),
            ]);
        let rows = run(&req);
        let r = find(&rows, "S1");
        let periods: Vec<Period> = r.slots.iter().map(|s| s.period).collect();
        assert_eq!(periods, vec![Period::Am, Period::LunchFirst, Period::Pm]);
        // Nobody else to cover: the lunch slot is unfilled, not dropped.
        assert_eq!(r.slot(Period::LunchFirst).map(|s| s.source), Some(SlotSource::Unfilled));
    }
}

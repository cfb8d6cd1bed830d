//! Primitive eligibility predicates.
//!
//! Stateless answers to "is this person here" and "is this person protected".
//! Rules in [`super::rules`] are thin wrappers around these; the composite
//! `is_eligible_*` checks delegate to the rule sets.

use chrono::{Duration, NaiveDate};

use super::{EligibilityContext, RuleSet};
use crate::config::ResolverConfig;
use crate::models::{
    Block, Client, ClientLocation, DayKey, Exception, ExceptionMode, ExceptionTarget, StaffMember,
    TimeWindow,
};

/// Whether a staff member is available for a block.
///
/// An `out` exception touching the block wins. Otherwise an `in` exception
/// touching the block makes the staff member available regardless of their
/// weekly calendar. Otherwise the weekly calendar must cover the block.
pub fn is_available(
    staff: &StaffMember,
    day: DayKey,
    block: Block,
    exceptions: &[Exception],
    config: &ResolverConfig,
) -> bool {
    is_available_during(staff, day, &config.block_window(block), exceptions)
}

/// Whether a staff member is available for an explicit window, such as an
/// assignment with precise start and end times.
pub fn is_available_during(
    staff: &StaffMember,
    day: DayKey,
    window: &TimeWindow,
    exceptions: &[Exception],
) -> bool {
    entity_available(
        ExceptionTarget::Staff,
        &staff.id,
        exceptions,
        window,
        |w| staff.availability.covers(day, w),
    )
}

/// Whether a client attends a block.
///
/// Same precedence as [`is_available`], except that a service window only
/// needs to overlap the block: partial-block clients still attend.
pub fn is_client_available(
    client: &Client,
    day: DayKey,
    block: Block,
    exceptions: &[Exception],
    config: &ResolverConfig,
) -> bool {
    let window = config.block_window(block);
    entity_available(
        ExceptionTarget::Client,
        &client.id,
        exceptions,
        &window,
        |w| client.service.overlaps(day, w),
    )
}

fn entity_available(
    target: ExceptionTarget,
    id: &str,
    exceptions: &[Exception],
    window: &TimeWindow,
    calendar_check: impl Fn(&TimeWindow) -> bool,
) -> bool {
    let mut came_in = false;
    for e in exceptions
        .iter()
        .filter(|e| e.targets(target, id) && e.touches(window))
    {
        match e.mode {
            ExceptionMode::Out => return false,
            ExceptionMode::In => came_in = true,
        }
    }
    came_in || calendar_check(window)
}

/// Whether the client's exclusion list names the staff member.
pub fn is_excluded(client: &Client, staff: &StaffMember) -> bool {
    client.excluded_staff_ids.iter().any(|id| *id == staff.id)
}

/// Whether the staff member may be proposed as a substitute for the client.
///
/// Requires `allow_sub` on the client, a sub-eligible staff member who is not
/// excluded and is available, plus the supplementary float, certification,
/// crisis, new-hire, and all-day rules of [`RuleSet::sub_coverage`].
pub fn is_eligible_sub(client: &Client, staff: &StaffMember, ctx: &EligibilityContext<'_>) -> bool {
    RuleSet::sub_coverage().permits(staff, client, ctx)
}

/// Whether the staff member may be proposed as Lead coverage for the client.
///
/// Requires `lead_rbts_allowed` on the client, an empty lead allow-list or one
/// naming the staff member, the Lead tier role, availability, and no
/// exclusion. See [`RuleSet::lead_coverage`].
pub fn is_eligible_lead(client: &Client, staff: &StaffMember, ctx: &EligibilityContext<'_>) -> bool {
    RuleSet::lead_coverage().permits(staff, client, ctx)
}

/// Start of the client's current tenure: the latest of the service start and
/// any location start.
pub fn tenure_start(client: &Client, locations: &[ClientLocation]) -> Option<NaiveDate> {
    locations
        .iter()
        .filter(|l| l.client_id == client.id)
        .map(|l| l.start_date)
        .chain(client.service_start_date)
        .max()
}

/// Last protected day + 1, if the client has a known tenure start.
///
/// Saturates at [`NaiveDate::MAX`] when the protection length runs past the
/// calendar.
pub fn tenure_protected_until(
    client: &Client,
    locations: &[ClientLocation],
    config: &ResolverConfig,
) -> Option<NaiveDate> {
    tenure_start(client, locations).map(|start| {
        Duration::try_days(config.tenure_protection_days)
            .and_then(|length| start.checked_add_signed(length))
            .unwrap_or(NaiveDate::MAX)
    })
}

/// Whether the client is still inside tenure protection on `today`.
pub fn is_protected_by_tenure(
    client: &Client,
    today: NaiveDate,
    locations: &[ClientLocation],
    config: &ResolverConfig,
) -> bool {
    tenure_start(client, locations)
        .is_some_and(|start| (today - start).num_days() < config.tenure_protection_days)
}

/// Whether the staff member is still inside new-hire protection on `today`.
pub fn is_protected_by_new_hire(staff: &StaffMember, today: NaiveDate, config: &ResolverConfig) -> bool {
    if staff.new_hire_override {
        return false;
    }
    staff
        .hire_date
        .is_some_and(|hired| (today - hired).num_days() < config.new_hire_protection_days)
}

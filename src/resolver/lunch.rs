//! Lunch coverage.
//!
//! Staff holding clients in both blocks eat in one half of the lunch window
//! and need someone to hold their client meanwhile:
//!
//! - AM placement ends at or before the lunch start: eat in the second
//!   sub-slot, leaving the PM client to cover.
//! - Otherwise the commitment runs through lunch and either half works. These
//!   staff are spread over the two sub-slots in id order, each taking the
//!   half with fewer eaters so far (first on a tie). Eating first leaves the
//!   AM client to cover, eating second the PM client.
//!
//! A covering staff member must be working, available, not eating in the same
//! sub-slot, and pass the lunch eligibility rules. Their group is every client
//! they are with during the sub-slot. Pairing is legal through either path:
//!
//! | Path | Condition |
//! |------|-----------|
//! | Peer | a client in the group lists the covered client as a lunch peer |
//! | Default | substitution allowed (or focus staff), everyone groupable, no refused combination, size within every allowance |
//!
//! Candidates rank peer first, focus next, smaller group, then id.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use super::coverage::Placement;
use super::day::DayContext;
use super::ranking::{CandidateRanker, RankingContext};
use crate::eligibility::{EligibilityContext, RuleSet};
use crate::models::{
    Block, Client, LunchBlocker, LunchCoverageError, LunchPairing, LunchSlot, StaffMember,
    TimeWindow,
};

#[derive(Debug, Clone, Default)]
pub(crate) struct LunchOutcome {
    pub pairings: Vec<LunchPairing>,
    pub errors: Vec<LunchCoverageError>,
    /// Sub-slot each lunch-spanning staff member eats in.
    pub eating: BTreeMap<String, LunchSlot>,
}

/// A client left alone while their staff eats.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct LunchNeed {
    slot: LunchSlot,
    eater: String,
    client_id: String,
}

pub(crate) fn resolve(day: &DayContext<'_>, placements: &[Placement]) -> LunchOutcome {
    let mut out = LunchOutcome::default();
    let lunch_start = day.config.lunch_window.start_min;

    let mut by_staff: BTreeMap<&str, BTreeMap<Block, Vec<&Placement>>> = BTreeMap::new();
    for p in placements {
        by_staff
            .entry(p.staff_id.as_str())
            .or_default()
            .entry(p.block)
            .or_default()
            .push(p);
    }

    let spanning: Vec<(&str, &[&Placement], &[&Placement])> = by_staff
        .iter()
        .filter_map(|(staff_id, blocks)| {
            let am = blocks.get(&Block::Am)?;
            let pm = blocks.get(&Block::Pm)?;
            Some((*staff_id, am.as_slice(), pm.as_slice()))
        })
        .collect();

    let mut flexible = Vec::new();
    for (staff_id, am, _) in &spanning {
        let am_end = am.iter().map(|p| p.window.end_min).max().unwrap_or(lunch_start);
        if am_end <= lunch_start {
            out.eating.insert(staff_id.to_string(), LunchSlot::Second);
        } else {
            flexible.push(*staff_id);
        }
    }
    for staff_id in flexible {
        let eaters = |slot: LunchSlot| out.eating.values().filter(|s| **s == slot).count();
        let slot = if eaters(LunchSlot::First) <= eaters(LunchSlot::Second) {
            LunchSlot::First
        } else {
            LunchSlot::Second
        };
        out.eating.insert(staff_id.to_string(), slot);
    }

    let mut needs = BTreeSet::new();
    for (staff_id, am, pm) in &spanning {
        let Some(&slot) = out.eating.get(*staff_id) else {
            continue;
        };
        let window = day.config.lunch_slot_window(slot);
        let held = if slot == LunchSlot::First { am } else { pm };
        for p in held.iter().filter(|p| p.window.overlaps(&window)) {
            let Some(client) = day.client(&p.client_id) else {
                continue;
            };
            if !client.service.overlaps(day.day, &window) {
                debug!("{} is not in service during {}; no lunch cover needed", client.id, slot);
                continue;
            }
            needs.insert(LunchNeed {
                slot,
                eater: staff_id.to_string(),
                client_id: client.id.clone(),
            });
        }
    }

    for need in needs {
        let Some(client) = day.client(&need.client_id) else {
            continue;
        };
        match find_cover(day, placements, &out, client, &need) {
            Ok(pairing) => {
                debug!(
                    "{} covered by {} during {} while {} eats",
                    client.id, pairing.covering_staff_id, need.slot, need.eater
                );
                out.pairings.push(pairing);
            }
            Err(error) => {
                debug!("{} has no lunch cover during {}: {}", client.id, need.slot, error.kind);
                out.errors.push(error);
            }
        }
    }

    out
}

fn find_cover(
    day: &DayContext<'_>,
    placements: &[Placement],
    out: &LunchOutcome,
    client: &Client,
    need: &LunchNeed,
) -> Result<LunchPairing, LunchCoverageError> {
    let window = day.config.lunch_slot_window(need.slot);
    let block = need.slot.block();
    let ctx = day.eligibility(block);
    let rules = RuleSet::lunch_coverage();

    let mut legal: Vec<&StaffMember> = Vec::new();
    let mut peers = BTreeSet::new();
    let mut load = BTreeMap::new();
    let mut rejected: Vec<(String, LunchBlocker)> = Vec::new();

    for cand in day.all_staff() {
        if cand.id == need.eater || out.eating.get(&cand.id) == Some(&need.slot) {
            continue;
        }
        let working = day.on_template(&cand.id) || placements.iter().any(|p| p.staff_id == cand.id);
        if !working || !day.staff_available(cand, block) {
            continue;
        }

        let group = group_of(placements, out, &cand.id, need.slot, &window);
        match check_pairing(day, &rules, &ctx, client, cand, &group) {
            Ok(via_peer) => {
                if via_peer {
                    peers.insert(cand.id.clone());
                }
                load.insert(cand.id.clone(), group.len());
                legal.push(cand);
            }
            Err(blocker) => rejected.push((cand.id.clone(), blocker)),
        }
    }

    let ranking = RankingContext::new(client)
        .with_load(load)
        .with_peers(peers);
    if let Some(cover) = CandidateRanker::lunch().select_best(legal, &ranking) {
        return Ok(LunchPairing {
            client_id: client.id.clone(),
            staff_id: need.eater.clone(),
            covering_staff_id: cover.id.clone(),
            lunch_slot: need.slot,
            via_peer: ranking.peers.contains(&cover.id),
        });
    }

    let kind = rejected
        .iter()
        .map(|(_, b)| *b)
        .max()
        .unwrap_or(LunchBlocker::NoEligibleStaff);
    let reason = if rejected.is_empty() {
        format!(
            "No staff free to cover {} during {} while {} eats",
            client.name,
            need.slot,
            day.staff_name(&need.eater)
        )
    } else {
        let detail = rejected
            .iter()
            .map(|(id, b)| format!("{id} ({b})"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "No legal lunch coverage for {} during {} while {} eats: {detail}",
            client.name,
            need.slot,
            day.staff_name(&need.eater)
        )
    };
    Err(LunchCoverageError {
        client_id: client.id.clone(),
        client_name: client.name.clone(),
        staff_id: need.eater.clone(),
        lunch_slot: need.slot,
        kind,
        reason,
    })
}

/// Clients a staff member is with during a sub-slot.
fn group_of<'p>(
    placements: &'p [Placement],
    out: &'p LunchOutcome,
    staff_id: &str,
    slot: LunchSlot,
    window: &TimeWindow,
) -> BTreeSet<&'p str> {
    placements
        .iter()
        .filter(|p| p.staff_id == staff_id && p.window.overlaps(window))
        .map(|p| p.client_id.as_str())
        .chain(
            out.pairings
                .iter()
                .filter(|lp| lp.covering_staff_id == staff_id && lp.lunch_slot == slot)
                .map(|lp| lp.client_id.as_str()),
        )
        .collect()
}

/// `Ok(true)` for the peer path, `Ok(false)` for the default path.
fn check_pairing(
    day: &DayContext<'_>,
    rules: &RuleSet,
    ctx: &EligibilityContext<'_>,
    client: &Client,
    cand: &StaffMember,
    group: &BTreeSet<&str>,
) -> Result<bool, LunchBlocker> {
    if let Some(rule) = rules.first_failure(cand, client, ctx) {
        return Err(match rule {
            "available" => LunchBlocker::NoEligibleStaff,
            "not_excluded" => LunchBlocker::ExclusionConflict,
            _ => LunchBlocker::CoverageRestricted,
        });
    }
    if group.contains(client.id.as_str()) {
        return Ok(false);
    }

    let members: Vec<&Client> = group.iter().filter_map(|id| day.client(id)).collect();
    if members.iter().any(|m| m.lists_lunch_peer(&client.id)) {
        return Ok(true);
    }
    if !client.allow_sub && !client.is_focus(&cand.id) {
        return Err(LunchBlocker::SubstitutionDisallowed);
    }
    if !members.is_empty() {
        if !client.can_be_grouped || members.iter().any(|m| !m.can_be_grouped) {
            return Err(LunchBlocker::GroupingDisallowed);
        }
        if members
            .iter()
            .any(|m| m.refuses_group_with(&client.id) || client.refuses_group_with(&m.id))
        {
            return Err(LunchBlocker::GroupingDisallowed);
        }
    }

    let default_size = day.config.default_max_group_size;
    let limit = std::iter::once(client)
        .chain(members.iter().copied())
        .map(|c| c.max_group_size.unwrap_or(default_size))
        .min()
        .unwrap_or(default_size);
    if members.len() + 1 > limit {
        return Err(LunchBlocker::GroupTooLarge);
    }
    Ok(false)
}

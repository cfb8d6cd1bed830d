//! Coverage resolution.
//!
//! # Algorithm
//!
//! 1. Place every present staff member with their present template client.
//! 2. For each (client, block) in AM-then-client-id order whose assigned
//!    staff are all out, try in strict priority order:
//!    an approved substitution on file, a sub-eligible staff member
//!    (`sub_staffing`), a free Lead RBT (`lead_staffing`), a working Lead RBT
//!    below reserve capacity (`lead_reserve`).
//! 3. Anything left is exhausted and handed to the cancellation stage.
//! 4. Every (staff, client) pair held in both blocks gets an
//!    `all_day_staffing` confirmation.
//!
//! A staff member proposed for a slot counts as committed for that block for
//! the rest of the run, so one person is never proposed twice.
//!
//! # Complexity
//! O(c * s * r) for c affected slots, s staff, r eligibility rules.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, warn};

use super::day::DayContext;
use super::ranking::{CandidateRanker, RankingContext};
use super::training::TrainingImpact;
use crate::eligibility::RuleSet;
use crate::models::{
    ApprovalKind, ApprovalRequest, ApprovalStatus, Block, Client, SlotSource, StaffMember,
    TemplateAssignment, TimeWindow,
};

/// A staff member realized with a client for a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Placement {
    pub staff_id: String,
    pub client_id: String,
    pub block: Block,
    pub window: TimeWindow,
    pub source: SlotSource,
}

/// How a (client, block) slot was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SlotOutcome {
    /// Every assigned staff member is present.
    Staffed,
    /// The client is out; nothing to cover.
    ClientOut,
    /// Another assigned staff member is present.
    Shared,
    /// An approved substitution was applied.
    Approved { staff_id: String },
    /// A proposal awaits approval.
    Proposed { staff_id: String },
    /// No coverage exists.
    Exhausted,
}

/// A slot no one can cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ExhaustedSlot {
    pub client_id: String,
    pub block: Block,
    pub original_staff_ids: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct CoverageOutcome {
    pub placements: Vec<Placement>,
    /// `sub_staffing`, `lead_staffing` and `lead_reserve` requests.
    pub proposals: Vec<ApprovalRequest>,
    /// `all_day_staffing` confirmations.
    pub all_day: Vec<ApprovalRequest>,
    pub exhausted: Vec<ExhaustedSlot>,
    pub outcomes: BTreeMap<(String, Block), SlotOutcome>,
}

impl CoverageOutcome {
    pub fn placements_for<'s>(
        &'s self,
        staff_id: &'s str,
        block: Block,
    ) -> impl Iterator<Item = &'s Placement> + 's {
        self.placements
            .iter()
            .filter(move |p| p.staff_id == staff_id && p.block == block)
    }

    pub fn outcome(&self, client_id: &str, block: Block) -> Option<&SlotOutcome> {
        self.outcomes.get(&(client_id.to_string(), block))
    }

    /// Client a staff member is proposed for in a block.
    pub fn proposed_client(&self, staff_id: &str, block: Block) -> Option<&str> {
        self.proposals
            .iter()
            .find(|r| r.block == Some(block) && r.proposed_sub_id() == Some(staff_id))
            .map(|r| r.client_id.as_str())
    }
}

/// Who is busy, per block.
#[derive(Debug, Default)]
struct Commitments {
    /// Holds or is proposed for a client, or is otherwise held.
    committed: BTreeSet<(Block, String)>,
    /// Held by a locked assignment or a training session; never a reserve.
    reserved: BTreeSet<(Block, String)>,
    /// Clients held or proposed, per block and staff.
    load: BTreeMap<(Block, String), usize>,
}

impl Commitments {
    fn is_committed(&self, block: Block, staff_id: &str) -> bool {
        self.committed.contains(&(block, staff_id.to_string()))
    }

    fn is_reserved(&self, block: Block, staff_id: &str) -> bool {
        self.reserved.contains(&(block, staff_id.to_string()))
    }

    fn load(&self, block: Block, staff_id: &str) -> usize {
        self.load
            .get(&(block, staff_id.to_string()))
            .copied()
            .unwrap_or(0)
    }

    fn take(&mut self, block: Block, staff_id: &str) {
        self.committed.insert((block, staff_id.to_string()));
        *self.load.entry((block, staff_id.to_string())).or_insert(0) += 1;
    }

    fn reserve(&mut self, block: Block, staff_id: &str) {
        self.committed.insert((block, staff_id.to_string()));
        self.reserved.insert((block, staff_id.to_string()));
    }

    fn loads_in(&self, block: Block) -> BTreeMap<String, usize> {
        self.load
            .iter()
            .filter(|((b, _), _)| *b == block)
            .map(|((_, id), n)| (id.clone(), *n))
            .collect()
    }
}

pub(crate) fn resolve(day: &DayContext<'_>, training: &TrainingImpact) -> CoverageOutcome {
    let mut out = CoverageOutcome::default();
    let mut busy = Commitments::default();

    let mut slots: BTreeMap<(Block, &str), Vec<&TemplateAssignment>> = BTreeMap::new();
    for block in Block::BOTH {
        for a in day.assignments(block) {
            let Some(client_id) = a.client_id.as_deref() else {
                continue;
            };
            slots.entry((block, client_id)).or_default().push(a);

            if !day.assignee_available(a) {
                continue;
            }
            if day.client_id_available(client_id, block) {
                busy.take(block, &a.staff_id);
                out.placements.push(Placement {
                    staff_id: a.staff_id.clone(),
                    client_id: client_id.to_string(),
                    block,
                    window: day.assignment_window(a),
                    source: SlotSource::Template,
                });
            } else if a.locked {
                busy.reserve(block, &a.staff_id);
            }
        }
        if let Some(ids) = training.committed.get(&block) {
            for id in ids {
                busy.reserve(block, id);
            }
        }
    }

    for ((block, client_id), assigned) in slots {
        let Some(client) = day.client(client_id) else {
            continue;
        };
        let outcome = resolve_slot(day, client, block, &assigned, &mut busy, &mut out);
        out.outcomes.insert((client_id.to_string(), block), outcome);
    }

    out.all_day = all_day_confirmations(day, &out);
    out
}

fn resolve_slot(
    day: &DayContext<'_>,
    client: &Client,
    block: Block,
    assigned: &[&TemplateAssignment],
    busy: &mut Commitments,
    out: &mut CoverageOutcome,
) -> SlotOutcome {
    if !day.client_available(client, block) {
        return SlotOutcome::ClientOut;
    }

    let absent: Vec<String> = assigned
        .iter()
        .filter(|a| !day.assignee_available(a))
        .map(|a| a.staff_id.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if absent.is_empty() {
        return SlotOutcome::Staffed;
    }
    if absent.len() < assigned.len() {
        debug!("{} {}: another assigned staff member is present", client.id, block);
        return SlotOutcome::Shared;
    }
    let original = absent.join(", ");
    let original_id = absent[0].clone();

    if let Some(staff) = approved_sub(day, client, block) {
        debug!("{} {}: applying approved sub {}", client.id, block, staff.id);
        busy.take(block, &staff.id);
        out.placements.push(Placement {
            staff_id: staff.id.clone(),
            client_id: client.id.clone(),
            block,
            window: day.config.block_window(block),
            source: if staff.role.is_lead() {
                SlotSource::Lead
            } else {
                SlotSource::Sub
            },
        });
        return SlotOutcome::Approved {
            staff_id: staff.id.clone(),
        };
    }

    let ctx = day
        .eligibility(block)
        .with_other_block_holders(holders(day, out, client, block.other()));

    let free: Vec<&StaffMember> = day
        .all_staff()
        .filter(|s| !busy.is_committed(block, &s.id))
        .collect();
    let subs = RuleSet::sub_coverage().filter(free, client, &ctx);
    if let Some(sub) = CandidateRanker::subs().select_best(subs, &RankingContext::new(client)) {
        let kind = ApprovalKind::SubStaffing {
            proposed_sub_id: sub.id.clone(),
            proposed_sub_name: sub.name.clone(),
            original_staff_id: original_id,
        };
        let reason = format!("{original} out in {block}; {} is sub-eligible and free", sub.name);
        return propose(day, client, block, sub, kind, reason, busy, out);
    }

    let leads: Vec<&StaffMember> = day
        .all_staff()
        .filter(|s| !busy.is_reserved(block, &s.id))
        .collect();
    let leads = RuleSet::lead_coverage().filter(leads, client, &ctx);
    let (free_leads, working_leads): (Vec<&StaffMember>, Vec<&StaffMember>) = leads
        .into_iter()
        .partition(|s| !busy.is_committed(block, &s.id));
    let ranking = RankingContext::new(client).with_load(busy.loads_in(block));

    if let Some(lead) = CandidateRanker::leads().select_best(free_leads, &ranking) {
        let kind = ApprovalKind::LeadStaffing {
            proposed_sub_id: lead.id.clone(),
            proposed_sub_name: lead.name.clone(),
            original_staff_id: original_id,
        };
        let reason = format!("{original} out in {block}; no sub available, Lead {} is free", lead.name);
        return propose(day, client, block, lead, kind, reason, busy, out);
    }

    let capacity = day.config.lead_reserve_capacity;
    let reserves: Vec<&StaffMember> = working_leads
        .into_iter()
        .filter(|s| busy.load(block, &s.id) < capacity)
        .collect();
    if let Some(lead) = CandidateRanker::leads().select_best(reserves, &ranking) {
        let held = busy.load(block, &lead.id);
        let kind = ApprovalKind::LeadReserve {
            proposed_sub_id: lead.id.clone(),
            proposed_sub_name: lead.name.clone(),
            original_staff_id: original_id,
        };
        let reason = format!(
            "{original} out in {block}; no free sub or Lead, Lead {} already holds {held} client(s)",
            lead.name
        );
        return propose(day, client, block, lead, kind, reason, busy, out);
    }

    debug!("{} {}: coverage exhausted", client.id, block);
    out.exhausted.push(ExhaustedSlot {
        client_id: client.id.clone(),
        block,
        original_staff_ids: absent,
    });
    SlotOutcome::Exhausted
}

/// First approved substitution for the slot whose staff can actually come.
fn approved_sub<'a>(day: &DayContext<'a>, client: &Client, block: Block) -> Option<&'a StaffMember> {
    for sub in day
        .request
        .approved_subs
        .iter()
        .filter(|s| s.client_id == client.id && s.block == block)
    {
        match day.staff(&sub.sub_staff_id) {
            Some(staff) if day.staff_available(staff, block) => return Some(staff),
            _ => warn!(
                "Approved sub {} for {} {} is unavailable; searching for coverage",
                sub.sub_staff_id, client.id, block
            ),
        }
    }
    None
}

#[allow(clippy::too_many_arguments)]
fn propose(
    day: &DayContext<'_>,
    client: &Client,
    block: Block,
    staff: &StaffMember,
    kind: ApprovalKind,
    reason: String,
    busy: &mut Commitments,
    out: &mut CoverageOutcome,
) -> SlotOutcome {
    debug!("{} {}: proposing {} ({})", client.id, block, staff.id, kind.name());
    busy.take(block, &staff.id);
    out.proposals.push(ApprovalRequest::new(
        kind,
        client.id.clone(),
        day.client_name(&client.id),
        Some(block),
        reason,
        ApprovalStatus::Pending,
    ));
    SlotOutcome::Proposed {
        staff_id: staff.id.clone(),
    }
}

/// Staff with the client in `block`: present template staff and placements.
fn holders(day: &DayContext<'_>, out: &CoverageOutcome, client: &Client, block: Block) -> Vec<String> {
    let mut ids: BTreeSet<String> = day
        .assignments(block)
        .filter(|a| a.client_id.as_deref() == Some(client.id.as_str()))
        .filter(|a| day.assignee_available(a))
        .map(|a| a.staff_id.clone())
        .collect();
    ids.extend(
        out.placements
            .iter()
            .filter(|p| p.block == block && p.client_id == client.id)
            .map(|p| p.staff_id.clone()),
    );
    ids.into_iter().collect()
}

fn all_day_confirmations(day: &DayContext<'_>, out: &CoverageOutcome) -> Vec<ApprovalRequest> {
    let mut held: BTreeSet<(String, String, Block)> = out
        .placements
        .iter()
        .map(|p| (p.client_id.clone(), p.staff_id.clone(), p.block))
        .collect();
    for r in &out.proposals {
        if let (Some(staff_id), Some(block)) = (r.proposed_sub_id(), r.block) {
            held.insert((r.client_id.clone(), staff_id.to_string(), block));
        }
    }

    held.iter()
        .filter(|(_, _, block)| *block == Block::Am)
        .filter(|(c, s, _)| held.contains(&(c.clone(), s.clone(), Block::Pm)))
        .map(|(client_id, staff_id, _)| {
            let staff_name = day.staff_name(staff_id);
            let client_name = day.client_name(client_id);
            ApprovalRequest::new(
                ApprovalKind::AllDayStaffing {
                    staff_id: staff_id.clone(),
                    staff_name: staff_name.clone(),
                },
                client_id.clone(),
                client_name.clone(),
                None,
                format!("{staff_name} is with {client_name} for both AM and PM"),
                ApprovalStatus::Pending,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolverConfig;
    use crate::models::{ApprovedSub, DayKey, Exception, TrainingSession};
    use crate::resolver::training;
    use crate::resolver::DayRequest;
    use chrono::NaiveDate;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    }

    fn run(req: &DayRequest) -> CoverageOutcome {
        let config = ResolverConfig::default();
        let day = DayContext::new(req, DayKey::Mon, &config);
        let impact = training::assess(&day);
        resolve(&day, &impact)
    }

    fn am(staff: &str, client: &str) -> TemplateAssignment {
        TemplateAssignment::new(DayKey::Mon, Block::Am, staff, client)
    }

    fn pm(staff: &str, client: &str) -> TemplateAssignment {
        TemplateAssignment::new(DayKey::Mon, Block::Pm, staff, client)
    }

    fn base() -> DayRequest {
        DayRequest::new(monday())
            .with_staff(vec![
                StaffMember::rbt("S1"),
                StaffMember::rbt("S2").sub_eligible(),
                StaffMember::rbt("S3").sub_eligible(),
            ])
            .with_clients(vec![Client::new("C1"), Client::new("C2")])
            .with_template(vec![am("S1", "C1")])
    }

    #[test]
    fn test_no_exceptions_places_template() {
        let out = run(&base());
        assert_eq!(out.placements.len(), 1);
        assert_eq!(out.placements[0].source, SlotSource::Template);
        assert!(out.proposals.is_empty());
        assert_eq!(out.outcome("C1", Block::Am), Some(&SlotOutcome::Staffed));
    }

    #[test]
    fn test_precise_times_ignore_exception_outside_assignment() {
        let mut req = base().with_exceptions(vec![
            Exception::staff_out("S1").during(TimeWindow::hm(11, 0, 11, 30)),
        ]);
        req.template = vec![am("S1", "C1").with_times(480, 600)];
        let out = run(&req);
        assert!(out.proposals.is_empty());
        assert_eq!(out.outcome("C1", Block::Am), Some(&SlotOutcome::Staffed));
        assert_eq!(out.placements.len(), 1);
        assert_eq!(out.placements[0].window, TimeWindow::new(480, 600));

        req.template = vec![am("S1", "C1").with_times(480, 690)];
        let out = run(&req);
        assert_eq!(out.proposals.len(), 1);
        assert!(out.placements.is_empty());
    }

    #[test]
    fn test_sub_proposed_by_id() {
        let req = base().with_exceptions(vec![Exception::staff_out("S1")]);
        let out = run(&req);
        assert_eq!(out.proposals.len(), 1);
        let r = &out.proposals[0];
        assert_eq!(r.kind_name(), "sub_staffing");
        assert_eq!(r.proposed_sub_id(), Some("S2"));
        assert_eq!(r.status, ApprovalStatus::Pending);
        assert_eq!(r.id, "sub_staffing:C1:AM:S2");
    }

    #[test]
    fn test_focus_sub_preferred() {
        let mut req = base().with_exceptions(vec![Exception::staff_out("S1")]);
        req.clients[0] = Client::new("C1").with_focus("S3");
        let out = run(&req);
        assert_eq!(out.proposals[0].proposed_sub_id(), Some("S3"));
    }

    #[test]
    fn test_client_out_needs_nothing() {
        let req = base().with_exceptions(vec![
            Exception::staff_out("S1"),
            Exception::client_out("C1"),
        ]);
        let out = run(&req);
        assert!(out.proposals.is_empty());
        assert_eq!(out.outcome("C1", Block::Am), Some(&SlotOutcome::ClientOut));
    }

    #[test]
    fn test_shared_client_needs_nothing() {
        let req = base()
            .with_template(vec![am("S1", "C1"), am("S3", "C1")])
            .with_exceptions(vec![Exception::staff_out("S1")]);
        let out = run(&req);
        assert!(out.proposals.is_empty());
        assert_eq!(out.outcome("C1", Block::Am), Some(&SlotOutcome::Shared));
    }

    #[test]
    fn test_approved_sub_applied_without_approval() {
        let req = base()
            .with_exceptions(vec![Exception::staff_out("S1")])
            .with_approved_subs(vec![ApprovedSub::new("C1", "S3", Block::Am)]);
        let out = run(&req);
        assert!(out.proposals.is_empty());
        assert!(out
            .placements
            .iter()
            .any(|p| p.staff_id == "S3" && p.source == SlotSource::Sub));
    }

    #[test]
    fn test_unavailable_approved_sub_ignored() {
        let req = base()
            .with_exceptions(vec![Exception::staff_out("S1"), Exception::staff_out("S3")])
            .with_approved_subs(vec![ApprovedSub::new("C1", "S3", Block::Am)]);
        let out = run(&req);
        assert_eq!(out.proposals[0].proposed_sub_id(), Some("S2"));
    }

    #[test]
    fn test_busy_staff_not_proposed() {
        let req = base()
            .with_template(vec![am("S1", "C1"), am("S2", "C2")])
            .with_exceptions(vec![Exception::staff_out("S1")]);
        let out = run(&req);
        assert_eq!(out.proposals[0].proposed_sub_id(), Some("S3"));
    }

    #[test]
    fn test_one_sub_per_block() {
        let req = DayRequest::new(monday())
            .with_staff(vec![
                StaffMember::rbt("S1"),
                StaffMember::rbt("S2"),
                StaffMember::rbt("S3").sub_eligible(),
            ])
            .with_clients(vec![Client::new("C1"), Client::new("C2")])
            .with_template(vec![am("S1", "C1"), am("S2", "C2")])
            .with_exceptions(vec![Exception::staff_out("S1"), Exception::staff_out("S2")]);
        let out = run(&req);
        assert_eq!(out.proposals.len(), 1);
        assert_eq!(out.proposals[0].client_id, "C1");
        assert_eq!(out.exhausted.len(), 1);
        assert_eq!(out.exhausted[0].client_id, "C2");
    }

    #[test]
    fn test_lead_after_subs() {
        let req = DayRequest::new(monday())
            .with_staff(vec![
                StaffMember::rbt("S1"),
                StaffMember::lead("L2", 2),
                StaffMember::lead("L1", 1),
            ])
            .with_clients(vec![Client::new("C1")])
            .with_template(vec![am("S1", "C1")])
            .with_exceptions(vec![Exception::staff_out("S1")]);
        let out = run(&req);
        assert_eq!(out.proposals[0].kind_name(), "lead_staffing");
        assert_eq!(out.proposals[0].proposed_sub_id(), Some("L1"));
    }

    #[test]
    fn test_lead_reserve_when_leads_busy() {
        let req = DayRequest::new(monday())
            .with_staff(vec![StaffMember::rbt("S1"), StaffMember::lead("L1", 1)])
            .with_clients(vec![Client::new("C1"), Client::new("C2")])
            .with_template(vec![am("S1", "C1"), am("L1", "C2")])
            .with_exceptions(vec![Exception::staff_out("S1")]);
        let out = run(&req);
        assert_eq!(out.proposals[0].kind_name(), "lead_reserve");
        assert_eq!(out.proposals[0].proposed_sub_id(), Some("L1"));
    }

    #[test]
    fn test_lead_reserve_capacity() {
        let config = ResolverConfig::default().with_lead_reserve_capacity(1);
        let req = DayRequest::new(monday())
            .with_staff(vec![StaffMember::rbt("S1"), StaffMember::lead("L1", 1)])
            .with_clients(vec![Client::new("C1"), Client::new("C2")])
            .with_template(vec![am("S1", "C1"), am("L1", "C2")])
            .with_exceptions(vec![Exception::staff_out("S1")]);
        let day = DayContext::new(&req, DayKey::Mon, &config);
        let out = resolve(&day, &TrainingImpact::default());
        assert!(out.proposals.is_empty());
        assert_eq!(out.exhausted.len(), 1);
    }

    #[test]
    fn test_lead_allow_list_respected() {
        let req = DayRequest::new(monday())
            .with_staff(vec![StaffMember::rbt("S1"), StaffMember::lead("L1", 1)])
            .with_clients(vec![Client::new("C1").with_leads(true, vec!["L9".into()])])
            .with_template(vec![am("S1", "C1")])
            .with_exceptions(vec![Exception::staff_out("S1")]);
        let out = run(&req);
        assert!(out.proposals.is_empty());
        assert_eq!(out.outcome("C1", Block::Am), Some(&SlotOutcome::Exhausted));
    }

    #[test]
    fn test_training_commitments_hold_staff() {
        let req = base()
            .with_exceptions(vec![Exception::staff_out("S1")])
            .with_training_sessions(vec![TrainingSession::new("T1", "S2", "S3", "C2", monday())]);
        let out = run(&req);
        assert!(out.proposals.is_empty());
        assert_eq!(out.exhausted.len(), 1);
    }

    #[test]
    fn test_freed_staff_can_sub() {
        let req = DayRequest::new(monday())
            .with_staff(vec![StaffMember::rbt("S1"), StaffMember::rbt("S2").sub_eligible()])
            .with_clients(vec![Client::new("C1"), Client::new("C2")])
            .with_template(vec![am("S1", "C1"), am("S2", "C2")])
            .with_exceptions(vec![Exception::staff_out("S1"), Exception::client_out("C2")]);
        let out = run(&req);
        assert_eq!(out.proposals[0].proposed_sub_id(), Some("S2"));
    }

    #[test]
    fn test_locked_staff_stay_put() {
        let req = DayRequest::new(monday())
            .with_staff(vec![StaffMember::rbt("S1"), StaffMember::rbt("S2").sub_eligible()])
            .with_clients(vec![Client::new("C1"), Client::new("C2")])
            .with_template(vec![am("S1", "C1"), am("S2", "C2").locked()])
            .with_exceptions(vec![Exception::staff_out("S1"), Exception::client_out("C2")]);
        let out = run(&req);
        assert!(out.proposals.is_empty());
    }

    #[test]
    fn test_all_day_confirmation_for_template_pair() {
        let req = base().with_template(vec![am("S1", "C1"), pm("S1", "C1")]);
        let out = run(&req);
        assert_eq!(out.all_day.len(), 1);
        assert_eq!(out.all_day[0].kind_name(), "all_day_staffing");
        assert_eq!(out.all_day[0].block, None);
        assert_eq!(out.all_day[0].id, "all_day_staffing:C1:day:S1");
    }

    #[test]
    fn test_strict_client_avoids_same_staff_sub() {
        let mut req = base()
            .with_template(vec![am("S2", "C1"), pm("S1", "C1")])
            .with_exceptions(vec![Exception::staff_out("S1").during(TimeWindow::hm(13, 0, 14, 0))]);
        req.clients[0] = Client::new("C1").with_allow_all_day_same_staff(false);
        let out = run(&req);
        assert_eq!(out.proposals[0].proposed_sub_id(), Some("S3"));
    }
}

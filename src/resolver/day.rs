//! Per-run lookup state shared by the resolution stages.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::DayRequest;
use crate::config::ResolverConfig;
use crate::eligibility::{
    is_available, is_available_during, is_client_available, EligibilityContext,
};
use crate::models::{Block, Client, DayKey, Exception, StaffMember, TemplateAssignment, TimeWindow};

/// Indexed view of one day's request.
///
/// Staff and clients are keyed by id in sorted maps, so every iteration a
/// stage performs runs in id order.
#[derive(Debug)]
pub(crate) struct DayContext<'a> {
    pub request: &'a DayRequest,
    pub config: &'a ResolverConfig,
    pub day: DayKey,
    staff: BTreeMap<&'a str, &'a StaffMember>,
    clients: BTreeMap<&'a str, &'a Client>,
    assignments: Vec<&'a TemplateAssignment>,
}

impl<'a> DayContext<'a> {
    pub fn new(request: &'a DayRequest, day: DayKey, config: &'a ResolverConfig) -> Self {
        let staff = request.staff.iter().map(|s| (s.id.as_str(), s)).collect();
        let clients = request.clients.iter().map(|c| (c.id.as_str(), c)).collect();
        let mut assignments: Vec<&TemplateAssignment> =
            request.template.iter().filter(|a| a.day == day).collect();
        assignments.sort_by(|a, b| {
            (a.block, &a.staff_id, &a.client_id).cmp(&(b.block, &b.staff_id, &b.client_id))
        });
        Self {
            request,
            config,
            day,
            staff,
            clients,
            assignments,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.request.date
    }

    pub fn exceptions(&self) -> &'a [Exception] {
        &self.request.exceptions
    }

    pub fn staff(&self, id: &str) -> Option<&'a StaffMember> {
        self.staff.get(id).copied()
    }

    pub fn client(&self, id: &str) -> Option<&'a Client> {
        self.clients.get(id).copied()
    }

    /// Every staff member, in id order.
    pub fn all_staff(&self) -> impl Iterator<Item = &'a StaffMember> + '_ {
        self.staff.values().copied()
    }

    /// Today's template assignments for a block, ordered by staff id.
    pub fn assignments(&self, block: Block) -> impl Iterator<Item = &'a TemplateAssignment> + '_ {
        self.assignments.iter().copied().filter(move |a| a.block == block)
    }

    /// Whether a staff member appears anywhere in today's template.
    pub fn on_template(&self, staff_id: &str) -> bool {
        self.assignments.iter().any(|a| a.staff_id == staff_id)
    }

    pub fn staff_available(&self, staff: &StaffMember, block: Block) -> bool {
        is_available(staff, self.day, block, self.exceptions(), self.config)
    }

    /// Availability by id; unknown ids are unavailable.
    pub fn staff_id_available(&self, id: &str, block: Block) -> bool {
        self.staff(id).is_some_and(|s| self.staff_available(s, block))
    }

    /// Whether the assigned staff member is available for the assignment's
    /// own window. Precise start/end times replace the block default.
    pub fn assignee_available(&self, assignment: &TemplateAssignment) -> bool {
        self.staff(&assignment.staff_id).is_some_and(|s| {
            is_available_during(s, self.day, &self.assignment_window(assignment), self.exceptions())
        })
    }

    /// Whether a staff member is present for their work in a block: every
    /// assignment they hold is checked against its own window, and a staff
    /// member with no assignment is checked against the block window.
    pub fn staff_present(&self, staff: &StaffMember, block: Block) -> bool {
        let mut held = self.assignments(block).filter(|a| a.staff_id == staff.id).peekable();
        if held.peek().is_none() {
            return self.staff_available(staff, block);
        }
        held.all(|a| self.assignee_available(a))
    }

    pub fn client_available(&self, client: &Client, block: Block) -> bool {
        is_client_available(client, self.day, block, self.exceptions(), self.config)
    }

    pub fn client_id_available(&self, id: &str, block: Block) -> bool {
        self.client(id).is_some_and(|c| self.client_available(c, block))
    }

    /// Eligibility context for one block of the day.
    pub fn eligibility(&self, block: Block) -> EligibilityContext<'a> {
        EligibilityContext::new(self.date(), self.day, block, self.exceptions(), self.config)
    }

    /// Effective window of an assignment.
    pub fn assignment_window(&self, assignment: &TemplateAssignment) -> TimeWindow {
        assignment.window(&self.config.block_window(assignment.block))
    }

    pub fn staff_name(&self, id: &str) -> String {
        self.staff(id).map_or_else(|| id.to_string(), |s| s.name.clone())
    }

    pub fn client_name(&self, id: &str) -> String {
        self.client(id).map_or_else(|| id.to_string(), |c| c.name.clone())
    }
}

//! Daily schedule resolution.
//!
//! Given one day's template, exceptions, and approved substitutions, the
//! resolver produces the realized per-staff schedule and everything a human
//! must look at: the approval queue, lunch coverage errors, and training
//! session updates.
//!
//! # Pipeline
//!
//! 1. Validate the request (malformed input is the only hard failure).
//! 2. Map the weekday; weekends resolve to an empty result.
//! 3. Training impact: propose blocked/disrupted sessions, commit the
//!    trainees and trainers of sessions that proceed.
//! 4. Coverage: approved subs, sub proposals, Lead proposals, exhaustion.
//! 5. Cancellation: protection, skip, fairness-ordered cancellation.
//! 6. Lunch coverage over the realized placements.
//! 7. Assembly and statistics.
//!
//! The run is a pure function of its input: no I/O, no shared state, and
//! every output collection is ordered, so identical requests serialize to
//! identical bytes.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use u_staffing::models::{Block, Client, DayKey, Exception, StaffMember, TemplateAssignment};
//! use u_staffing::resolver::{DayRequest, DayResolver};
//!
//! let monday = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
//! let request = DayRequest::new(monday)
//!     .with_staff(vec![StaffMember::rbt("S1"), StaffMember::rbt("S2").sub_eligible()])
//!     .with_clients(vec![Client::new("C1")])
//!     .with_template(vec![TemplateAssignment::new(DayKey::Mon, Block::Am, "S1", "C1")])
//!     .with_exceptions(vec![Exception::staff_out("S1")]);
//!
//! let resolution = DayResolver::new().resolve(&request).unwrap();
//! assert_eq!(resolution.approvals[0].kind_name(), "sub_staffing");
//! assert_eq!(resolution.approvals[0].proposed_sub_id(), Some("S2"));
//! ```

mod assembler;
pub mod cancellation;
mod coverage;
mod day;
mod lunch;
pub mod ranking;
mod stats;
mod training;

pub use cancellation::{decide_for_client, CancellationDecision};
pub use stats::ResolutionStats;

use chrono::{Datelike, NaiveDate};
use log::info;
use serde::{Deserialize, Serialize};

use crate::config::ResolverConfig;
use crate::error::{ResolveError, ResolveResult};
use crate::models::{
    ApprovalRequest, ApprovedSub, Client, ClientLocation, DayKey, Exception, LunchCoverageError,
    LunchPairing, StaffMember, StaffSchedule, TemplateAssignment, TrainingSession,
    TrainingSessionUpdate,
};
use crate::validation::{validate_config, validate_input};
use day::DayContext;

/// Input container for one day's resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayRequest {
    /// Date being resolved.
    pub date: NaiveDate,
    /// Weekday index, 0 = Sunday .. 6 = Saturday.
    pub weekday_index: u8,
    pub staff: Vec<StaffMember>,
    pub clients: Vec<Client>,
    /// Weekly template; only assignments for the resolved weekday are used.
    pub template: Vec<TemplateAssignment>,
    pub exceptions: Vec<Exception>,
    pub approved_subs: Vec<ApprovedSub>,
    pub training_sessions: Vec<TrainingSession>,
    pub client_locations: Vec<ClientLocation>,
}

impl DayRequest {
    /// Creates an empty request; the weekday index follows the date.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            weekday_index: date.weekday().num_days_from_sunday() as u8,
            staff: Vec::new(),
            clients: Vec::new(),
            template: Vec::new(),
            exceptions: Vec::new(),
            approved_subs: Vec::new(),
            training_sessions: Vec::new(),
            client_locations: Vec::new(),
        }
    }

    /// Overrides the weekday index.
    pub fn with_weekday_index(mut self, index: u8) -> Self {
        self.weekday_index = index;
        self
    }

    pub fn with_staff(mut self, staff: Vec<StaffMember>) -> Self {
        self.staff = staff;
        self
    }

    pub fn with_clients(mut self, clients: Vec<Client>) -> Self {
        self.clients = clients;
        self
    }

    pub fn with_template(mut self, template: Vec<TemplateAssignment>) -> Self {
        self.template = template;
        self
    }

    pub fn with_exceptions(mut self, exceptions: Vec<Exception>) -> Self {
        self.exceptions = exceptions;
        self
    }

    pub fn with_approved_subs(mut self, approved_subs: Vec<ApprovedSub>) -> Self {
        self.approved_subs = approved_subs;
        self
    }

    pub fn with_training_sessions(mut self, sessions: Vec<TrainingSession>) -> Self {
        self.training_sessions = sessions;
        self
    }

    pub fn with_client_locations(mut self, locations: Vec<ClientLocation>) -> Self {
        self.client_locations = locations;
        self
    }

    /// Resolvable day key, `None` on weekends.
    pub fn day_key(&self) -> Option<DayKey> {
        DayKey::from_index(self.weekday_index)
    }
}

/// Everything a resolution run returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayResolution {
    pub date: NaiveDate,
    /// `None` when the date is not a resolvable weekday.
    pub day: Option<DayKey>,
    /// One row per working staff member, in staff id order.
    pub schedule: Vec<StaffSchedule>,
    /// Coverage proposals, all-day confirmations, then cancellation-family
    /// decisions (protected, skipped, fairness-ordered cancellations).
    pub approvals: Vec<ApprovalRequest>,
    pub lunch_pairings: Vec<LunchPairing>,
    pub lunch_errors: Vec<LunchCoverageError>,
    pub training_updates: Vec<TrainingSessionUpdate>,
    pub stats: ResolutionStats,
}

impl DayResolution {
    /// A resolution with nothing in it.
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            day: None,
            schedule: Vec::new(),
            approvals: Vec::new(),
            lunch_pairings: Vec::new(),
            lunch_errors: Vec::new(),
            training_updates: Vec::new(),
            stats: ResolutionStats::calculate(&[], &[], &[]),
        }
    }

    /// Approvals of one kind, in output order.
    pub fn approvals_of_kind(&self, kind: &str) -> Vec<&ApprovalRequest> {
        self.approvals
            .iter()
            .filter(|r| r.kind_name() == kind)
            .collect()
    }

    /// Approvals about one client.
    pub fn approvals_for_client(&self, client_id: &str) -> Vec<&ApprovalRequest> {
        self.approvals
            .iter()
            .filter(|r| r.client_id == client_id)
            .collect()
    }

    pub fn staff_schedule(&self, staff_id: &str) -> Option<&StaffSchedule> {
        self.schedule.iter().find(|s| s.staff_id == staff_id)
    }

    /// Lunch errors about one client.
    pub fn lunch_errors_for(&self, client_id: &str) -> Vec<&LunchCoverageError> {
        self.lunch_errors
            .iter()
            .filter(|e| e.client_id == client_id)
            .collect()
    }
}

/// Daily schedule resolver.
#[derive(Debug, Clone, Default)]
pub struct DayResolver {
    config: ResolverConfig,
}

impl DayResolver {
    /// Creates a resolver with the default policy.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolves one day.
    ///
    /// # Errors
    /// [`ResolveError::InvalidInput`] when the request references unknown
    /// staff or clients, repeats ids, or carries empty time windows, or when
    /// the configured windows are empty.
    pub fn resolve(&self, request: &DayRequest) -> ResolveResult<DayResolution> {
        validate_config(&self.config).map_err(ResolveError::InvalidInput)?;
        validate_input(request).map_err(ResolveError::InvalidInput)?;

        let Some(day_key) = request.day_key() else {
            info!(
                "{}: weekday index {} is not a resolvable day",
                request.date, request.weekday_index
            );
            return Ok(DayResolution::empty(request.date));
        };

        let day = DayContext::new(request, day_key, &self.config);

        let training = training::assess(&day);
        let coverage = coverage::resolve(&day, &training);
        let decisions = cancellation::decide(&day, &coverage.exhausted);
        let lunch = lunch::resolve(&day, &coverage.placements);
        let schedule = assembler::assemble(&day, &coverage, &decisions, &lunch);

        let approvals: Vec<ApprovalRequest> = coverage
            .proposals
            .iter()
            .chain(&coverage.all_day)
            .chain(&decisions)
            .cloned()
            .collect();
        let stats = ResolutionStats::calculate(&schedule, &approvals, &lunch.errors);

        info!(
            "{} ({}): {} approvals, {} lunch pairings, {} lunch errors, {} training updates, fill rate {:.2}",
            request.date,
            day_key,
            approvals.len(),
            lunch.pairings.len(),
            lunch.errors.len(),
            training.updates.len(),
            stats.fill_rate
        );

        Ok(DayResolution {
            date: request.date,
            day: Some(day_key),
            schedule,
            approvals,
            lunch_pairings: lunch.pairings,
            lunch_errors: lunch.errors,
            training_updates: training.updates,
            stats,
        })
    }
}

/// Resolves one day with the default policy.
pub fn resolve_day(request: &DayRequest) -> ResolveResult<DayResolution> {
    DayResolver::new().resolve(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Block, Exception, TimeWindow};

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    }

    #[test]
    fn test_weekday_from_date() {
        assert_eq!(DayRequest::new(monday()).day_key(), Some(DayKey::Mon));
        let saturday = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(DayRequest::new(saturday).day_key(), None);
        assert_eq!(
            DayRequest::new(monday()).with_weekday_index(5).day_key(),
            Some(DayKey::Fri)
        );
    }

    #[test]
    fn test_weekend_is_noop() {
        let req = DayRequest::new(monday())
            .with_staff(vec![StaffMember::rbt("S1")])
            .with_clients(vec![Client::new("C1")])
            .with_template(vec![TemplateAssignment::new(DayKey::Mon, Block::Am, "S1", "C1")])
            .with_exceptions(vec![Exception::staff_out("S1")])
            .with_weekday_index(0);
        let res = resolve_day(&req).unwrap();
        assert_eq!(res, DayResolution::empty(monday()));
    }

    #[test]
    fn test_invalid_input_fails_fast() {
        let req = DayRequest::new(monday())
            .with_template(vec![TemplateAssignment::new(DayKey::Mon, Block::Am, "S1", "C1")]);
        let err = resolve_day(&req).unwrap_err();
        assert!(matches!(err, ResolveError::InvalidInput(ref errors) if errors.len() == 2));
        assert!(err.to_string().contains("unknown staff"));
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let config = ResolverConfig::default().with_lunch_window(TimeWindow::new(750, 690));
        let req = DayRequest::new(monday())
            .with_staff(vec![StaffMember::rbt("S1")])
            .with_clients(vec![Client::new("C1")]);
        let err = DayResolver::new().with_config(config).resolve(&req).unwrap_err();
        assert!(err.to_string().contains("lunch_window"));
    }

    #[test]
    fn test_template_for_other_days_ignored() {
        let req = DayRequest::new(monday())
            .with_staff(vec![StaffMember::rbt("S1")])
            .with_clients(vec![Client::new("C1")])
            .with_template(vec![TemplateAssignment::new(DayKey::Tue, Block::Am, "S1", "C1")])
            .with_exceptions(vec![Exception::staff_out("S1")]);
        let res = resolve_day(&req).unwrap();
        assert!(res.approvals.is_empty());
        assert!(res.schedule.is_empty());
    }

    #[test]
    fn test_query_helpers() {
        let req = DayRequest::new(monday())
            .with_staff(vec![StaffMember::rbt("S1")])
            .with_clients(vec![Client::new("C1")])
            .with_template(vec![TemplateAssignment::new(DayKey::Mon, Block::Am, "S1", "C1")])
            .with_exceptions(vec![Exception::staff_out("S1")]);
        let res = resolve_day(&req).unwrap();
        assert_eq!(res.approvals_of_kind("cancellation").len(), 1);
        assert_eq!(res.approvals_for_client("C1").len(), 1);
        assert!(res.staff_schedule("S1").is_some());
        assert!(res.lunch_errors_for("C1").is_empty());
    }
}

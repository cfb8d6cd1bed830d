//! Rule sets for eligibility checks.
//!
//! Composes eligibility rules into named policies. A rule set admits a
//! staff member only if every rule admits them; evaluation stops at the
//! first failing rule so callers can report why.

use std::sync::Arc;

use super::rules;
use super::{EligibilityContext, EligibilityRule};
use crate::models::{Client, StaffMember};

/// A conjunction of eligibility rules.
///
/// # Example
/// ```
/// use u_staffing::eligibility::{rules, RuleSet};
///
/// let policy = RuleSet::new()
///     .with_rule(rules::Available)
///     .with_rule(rules::NotExcluded);
/// assert_eq!(policy.len(), 2);
/// ```
#[derive(Clone, Default)]
pub struct RuleSet {
    rules: Vec<Arc<dyn EligibilityRule>>,
}

impl RuleSet {
    /// Creates an empty rule set (admits everyone).
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Appends a rule.
    pub fn with_rule<R: EligibilityRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Policy for ad-hoc substitutes.
    pub fn sub_coverage() -> Self {
        Self::new()
            .with_rule(rules::Available)
            .with_rule(rules::SubAllowed)
            .with_rule(rules::SubEligibleStaff)
            .with_rule(rules::NotLeadTier)
            .with_rule(rules::NotExcluded)
            .with_rule(rules::FloatAllowed)
            .with_rule(rules::CertificationCurrent)
            .with_rule(rules::CrisisQualified)
            .with_rule(rules::NewHireRestricted)
            .with_rule(rules::AllDaySameStaff)
    }

    /// Policy for Lead RBT coverage.
    pub fn lead_coverage() -> Self {
        Self::new()
            .with_rule(rules::Available)
            .with_rule(rules::LeadAllowed)
            .with_rule(rules::LeadTier)
            .with_rule(rules::NotExcluded)
            .with_rule(rules::CertificationCurrent)
            .with_rule(rules::CrisisQualified)
            .with_rule(rules::AllDaySameStaff)
    }

    /// Policy for lunch coverage. Grouping is checked separately.
    pub fn lunch_coverage() -> Self {
        Self::new()
            .with_rule(rules::Available)
            .with_rule(rules::NotExcluded)
            .with_rule(rules::LunchCoverageAllowed)
            .with_rule(rules::CrisisQualified)
    }

    /// Whether every rule admits the staff member.
    pub fn permits(&self, staff: &StaffMember, client: &Client, ctx: &EligibilityContext<'_>) -> bool {
        self.first_failure(staff, client, ctx).is_none()
    }

    /// Name of the first rule that rejects the staff member.
    pub fn first_failure(
        &self,
        staff: &StaffMember,
        client: &Client,
        ctx: &EligibilityContext<'_>,
    ) -> Option<&'static str> {
        self.rules
            .iter()
            .find(|r| !r.check(staff, client, ctx))
            .map(|r| r.name())
    }

    /// Filters candidates down to those every rule admits, keeping order.
    pub fn filter<'s>(
        &self,
        candidates: impl IntoIterator<Item = &'s StaffMember>,
        client: &Client,
        ctx: &EligibilityContext<'_>,
    ) -> Vec<&'s StaffMember> {
        candidates
            .into_iter()
            .filter(|s| self.permits(s, client, ctx))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleSet")
            .field(
                "rules",
                &self.rules.iter().map(|r| r.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

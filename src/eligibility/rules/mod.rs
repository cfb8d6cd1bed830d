//! Built-in eligibility rules.
//!
//! # Categories
//!
//! - **Presence**: Available
//! - **Client policy**: NotExcluded, SubAllowed, FloatAllowed, LeadAllowed,
//!   AllDaySameStaff, CrisisQualified
//! - **Staff qualification**: SubEligibleStaff, NotLeadTier, LeadTier,
//!   CertificationCurrent, NewHireRestricted, LunchCoverageAllowed
//!
//! # Convention
//! `check` returns `true` when the rule admits the staff member.

use super::predicates::{is_available, is_excluded, is_protected_by_new_hire};
use super::{EligibilityContext, EligibilityRule};
use crate::models::{Client, StaffMember};

// ======================== Presence ========================

/// Staff member is available for the block.
#[derive(Debug, Clone, Copy)]
pub struct Available;

impl EligibilityRule for Available {
    fn name(&self) -> &'static str {
        "available"
    }

    fn check(&self, staff: &StaffMember, _client: &Client, ctx: &EligibilityContext<'_>) -> bool {
        is_available(staff, ctx.day, ctx.block, ctx.exceptions, ctx.config)
    }

    fn description(&self) -> &'static str {
        "Not out and inside weekly availability"
    }
}

// ======================== Client policy ========================

/// Client has not excluded the staff member.
#[derive(Debug, Clone, Copy)]
pub struct NotExcluded;

impl EligibilityRule for NotExcluded {
    fn name(&self) -> &'static str {
        "not_excluded"
    }

    fn check(&self, staff: &StaffMember, client: &Client, _ctx: &EligibilityContext<'_>) -> bool {
        !is_excluded(client, staff)
    }

    fn description(&self) -> &'static str {
        "Not on the client's exclusion list"
    }
}

/// Client accepts ad-hoc substitutes.
#[derive(Debug, Clone, Copy)]
pub struct SubAllowed;

impl EligibilityRule for SubAllowed {
    fn name(&self) -> &'static str {
        "sub_allowed"
    }

    fn check(&self, _staff: &StaffMember, client: &Client, _ctx: &EligibilityContext<'_>) -> bool {
        client.allow_sub
    }

    fn description(&self) -> &'static str {
        "Client allows substitutes"
    }
}

/// Float RBTs only go to clients that accept them.
///
/// Non-float staff always pass.
#[derive(Debug, Clone, Copy)]
pub struct FloatAllowed;

impl EligibilityRule for FloatAllowed {
    fn name(&self) -> &'static str {
        "float_allowed"
    }

    fn check(&self, staff: &StaffMember, client: &Client, _ctx: &EligibilityContext<'_>) -> bool {
        if !staff.is_float {
            return true;
        }
        client.float_rbts_allowed
            && (client.allowed_float_rbt_ids.is_empty()
                || client.allowed_float_rbt_ids.iter().any(|id| *id == staff.id))
    }

    fn description(&self) -> &'static str {
        "Client accepts this float RBT"
    }
}

/// Client accepts this Lead RBT.
#[derive(Debug, Clone, Copy)]
pub struct LeadAllowed;

impl EligibilityRule for LeadAllowed {
    fn name(&self) -> &'static str {
        "lead_allowed"
    }

    fn check(&self, staff: &StaffMember, client: &Client, _ctx: &EligibilityContext<'_>) -> bool {
        client.lead_rbts_allowed
            && (client.allowed_lead_rbt_ids.is_empty()
                || client.allowed_lead_rbt_ids.iter().any(|id| *id == staff.id))
    }

    fn description(&self) -> &'static str {
        "Client accepts this Lead RBT"
    }
}

/// A client that forbids same-staff days is not given the staff member who
/// already holds them in the other block.
#[derive(Debug, Clone, Copy)]
pub struct AllDaySameStaff;

impl EligibilityRule for AllDaySameStaff {
    fn name(&self) -> &'static str {
        "all_day_same_staff"
    }

    fn check(&self, staff: &StaffMember, client: &Client, ctx: &EligibilityContext<'_>) -> bool {
        client.allow_all_day_same_staff || !ctx.holds_other_block(&staff.id)
    }

    fn description(&self) -> &'static str {
        "Same staff for both blocks only where the client allows it"
    }
}

/// Crisis clients need staff without the no-crisis flag.
#[derive(Debug, Clone, Copy)]
pub struct CrisisQualified;

impl EligibilityRule for CrisisQualified {
    fn name(&self) -> &'static str {
        "crisis_qualified"
    }

    fn check(&self, staff: &StaffMember, client: &Client, _ctx: &EligibilityContext<'_>) -> bool {
        !(client.is_crisis && staff.no_crisis)
    }
}

// ======================== Staff qualification ========================

/// Staff member carries the sub-eligible flag.
#[derive(Debug, Clone, Copy)]
pub struct SubEligibleStaff;

impl EligibilityRule for SubEligibleStaff {
    fn name(&self) -> &'static str {
        "sub_eligible"
    }

    fn check(&self, staff: &StaffMember, _client: &Client, _ctx: &EligibilityContext<'_>) -> bool {
        staff.sub_eligible
    }
}

/// Staff member is not in the Lead tier (leads are kept in reserve).
#[derive(Debug, Clone, Copy)]
pub struct NotLeadTier;

impl EligibilityRule for NotLeadTier {
    fn name(&self) -> &'static str {
        "not_lead_tier"
    }

    fn check(&self, staff: &StaffMember, _client: &Client, _ctx: &EligibilityContext<'_>) -> bool {
        !staff.role.is_lead()
    }
}

/// Staff member is in the Lead tier.
#[derive(Debug, Clone, Copy)]
pub struct LeadTier;

impl EligibilityRule for LeadTier {
    fn name(&self) -> &'static str {
        "lead_tier"
    }

    fn check(&self, staff: &StaffMember, _client: &Client, _ctx: &EligibilityContext<'_>) -> bool {
        staff.role.is_lead()
    }
}

/// Certification has not lapsed.
#[derive(Debug, Clone, Copy)]
pub struct CertificationCurrent;

impl EligibilityRule for CertificationCurrent {
    fn name(&self) -> &'static str {
        "certification_current"
    }

    fn check(&self, staff: &StaffMember, _client: &Client, ctx: &EligibilityContext<'_>) -> bool {
        !staff.certification_lapsed(ctx.date)
    }
}

/// New hires stay with their focus clients.
#[derive(Debug, Clone, Copy)]
pub struct NewHireRestricted;

impl EligibilityRule for NewHireRestricted {
    fn name(&self) -> &'static str {
        "new_hire_restricted"
    }

    fn check(&self, staff: &StaffMember, client: &Client, ctx: &EligibilityContext<'_>) -> bool {
        client.is_focus(&staff.id) || !is_protected_by_new_hire(staff, ctx.date, ctx.config)
    }

    fn description(&self) -> &'static str {
        "New hires are not floated to unfamiliar clients"
    }
}

/// Staff member may be used as lunch coverage.
#[derive(Debug, Clone, Copy)]
pub struct LunchCoverageAllowed;

impl EligibilityRule for LunchCoverageAllowed {
    fn name(&self) -> &'static str {
        "lunch_coverage_allowed"
    }

    fn check(&self, staff: &StaffMember, _client: &Client, _ctx: &EligibilityContext<'_>) -> bool {
        !staff.no_lunch_coverage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolverConfig;
    use crate::models::{Block, DayKey, Exception};
    use chrono::NaiveDate;

    fn ctx<'a>(exceptions: &'a [Exception], config: &'a ResolverConfig) -> EligibilityContext<'a> {
        EligibilityContext::new(
            NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            DayKey::Mon,
            Block::Am,
            exceptions,
            config,
        )
    }

    #[test]
    fn test_available_rule() {
        let config = ResolverConfig::default();
        let ex = vec![Exception::staff_out("S1")];
        let c = ctx(&ex, &config);
        let client = Client::new("C1");
        assert!(!Available.check(&StaffMember::rbt("S1"), &client, &c));
        assert!(Available.check(&StaffMember::rbt("S2"), &client, &c));
    }

    #[test]
    fn test_float_rules() {
        let config = ResolverConfig::default();
        let c = ctx(&[], &config);
        let float = StaffMember::rbt("F1").float();
        let plain = StaffMember::rbt("S1");

        let no_floats = Client::new("C1").with_floats(false, vec![]);
        assert!(!FloatAllowed.check(&float, &no_floats, &c));
        assert!(FloatAllowed.check(&plain, &no_floats, &c));

        let listed = Client::new("C2").with_floats(true, vec!["F2".into()]);
        assert!(!FloatAllowed.check(&float, &listed, &c));

        let any = Client::new("C3").with_floats(true, vec![]);
        assert!(FloatAllowed.check(&float, &any, &c));
    }

    #[test]
    fn test_lead_allow_list() {
        let config = ResolverConfig::default();
        let c = ctx(&[], &config);
        let lead = StaffMember::lead("L1", 1);
        assert!(LeadAllowed.check(&lead, &Client::new("C1"), &c));
        assert!(!LeadAllowed.check(&lead, &Client::new("C2").with_leads(false, vec![]), &c));
        assert!(!LeadAllowed.check(&lead, &Client::new("C3").with_leads(true, vec!["L2".into()]), &c));
        assert!(LeadAllowed.check(&lead, &Client::new("C4").with_leads(true, vec!["L1".into()]), &c));
    }

    #[test]
    fn test_all_day_same_staff_rule() {
        let config = ResolverConfig::default();
        let c = ctx(&[], &config).with_other_block_holders(vec!["S1".into()]);
        let strict = Client::new("C1").with_allow_all_day_same_staff(false);
        let relaxed = Client::new("C2");
        assert!(!AllDaySameStaff.check(&StaffMember::rbt("S1"), &strict, &c));
        assert!(AllDaySameStaff.check(&StaffMember::rbt("S2"), &strict, &c));
        assert!(AllDaySameStaff.check(&StaffMember::rbt("S1"), &relaxed, &c));
    }

    #[test]
    fn test_crisis_rule() {
        let config = ResolverConfig::default();
        let c = ctx(&[], &config);
        let crisis = Client::new("C1").with_crisis();
        assert!(!CrisisQualified.check(&StaffMember::rbt("S1").with_no_crisis(), &crisis, &c));
        assert!(CrisisQualified.check(&StaffMember::rbt("S2"), &crisis, &c));
        assert!(CrisisQualified.check(&StaffMember::rbt("S1").with_no_crisis(), &Client::new("C2"), &c));
    }

    #[test]
    fn test_new_hire_rule_allows_focus_client() {
        let config = ResolverConfig::default();
        let c = ctx(&[], &config);
        let new_hire = StaffMember::rbt("S1")
            .with_hire_date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert!(!NewHireRestricted.check(&new_hire, &Client::new("C1"), &c));
        assert!(NewHireRestricted.check(&new_hire, &Client::new("C2").with_focus("S1"), &c));
    }

    #[test]
    fn test_certification_rule() {
        let config = ResolverConfig::default();
        let c = ctx(&[], &config);
        let lapsed = StaffMember::rbt("S1")
            .with_certification_expires(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert!(!CertificationCurrent.check(&lapsed, &Client::new("C1"), &c));
    }
}

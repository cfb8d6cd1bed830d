//! Eligibility rules: who may cover whom, and who is protected.
//!
//! Every later stage asks its eligibility questions through this module.
//! The primitive predicates answer presence and protection questions; the
//! [`EligibilityRule`] trait and [`RuleSet`] compose client and staff flags
//! into named coverage policies.
//!
//! # Usage
//!
//! ```
//! use chrono::NaiveDate;
//! use u_staffing::config::ResolverConfig;
//! use u_staffing::eligibility::{is_eligible_sub, EligibilityContext};
//! use u_staffing::models::{Block, Client, DayKey, StaffMember};
//!
//! let config = ResolverConfig::default();
//! let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
//! let ctx = EligibilityContext::new(date, DayKey::Mon, Block::Am, &[], &config);
//!
//! let sub = StaffMember::rbt("S2").sub_eligible();
//! assert!(is_eligible_sub(&Client::new("C1"), &sub, &ctx));
//! ```

mod context;
mod engine;
mod predicates;
pub mod rules;

pub use context::EligibilityContext;
pub use engine::RuleSet;
pub use predicates::{
    is_available, is_available_during, is_client_available, is_eligible_lead, is_eligible_sub,
    is_excluded, is_protected_by_new_hire, is_protected_by_tenure, tenure_protected_until, tenure_start,
};

use crate::models::{Client, StaffMember};
use std::fmt::Debug;

/// A single eligibility rule.
///
/// # Convention
/// `check` returns `true` when the staff member is admitted.
pub trait EligibilityRule: Send + Sync + Debug {
    /// Rule name (e.g., "available", "not_excluded").
    fn name(&self) -> &'static str;

    /// Whether `staff` may cover `client` in the context's block.
    fn check(&self, staff: &StaffMember, client: &Client, ctx: &EligibilityContext<'_>) -> bool;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}

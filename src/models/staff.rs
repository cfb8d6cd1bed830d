//! Staff model.
//!
//! Staff members are the people who cover client sessions. Each has a role,
//! a weekly availability calendar, and a handful of flags restricting which
//! kinds of coverage they may take on.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{DayKey, TimeWindow, WeeklyCalendar};

/// Staff role.
///
/// The Lead tier carries a numeric level; lower levels are proposed first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    /// Registered behavior technician.
    Rbt,
    /// Lead RBT, usable as last-resort coverage.
    Lead { level: u8 },
    /// Supervising analyst.
    Bcba,
    /// Non-clinical staff.
    Admin,
}

impl StaffRole {
    /// Whether this role is in the Lead tier.
    pub fn is_lead(&self) -> bool {
        matches!(self, StaffRole::Lead { .. })
    }

    /// Lead level, if this role is in the Lead tier.
    pub fn lead_level(&self) -> Option<u8> {
        match self {
            StaffRole::Lead { level } => Some(*level),
            _ => None,
        }
    }
}

/// A staff member. Immutable input for one resolution run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffMember {
    /// Unique staff identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    pub role: StaffRole,
    /// May be proposed as an ad-hoc substitute on non-focus clients.
    pub sub_eligible: bool,
    /// Float RBTs may only cover clients that allow floats.
    pub is_float: bool,
    /// Per-weekday availability. Empty = always available.
    pub availability: WeeklyCalendar,
    /// First working day, for new-hire protection.
    pub hire_date: Option<NaiveDate>,
    /// Disables new-hire protection.
    pub new_hire_override: bool,
    /// Certification expiry date. `None` = no expiry on file.
    pub certification_expires: Option<NaiveDate>,
    /// Must not be placed with crisis clients.
    pub no_crisis: bool,
    /// Must not be used as lunch coverage.
    pub no_lunch_coverage: bool,
}

impl StaffMember {
    /// Creates a staff member with the given ID and role.
    pub fn new(id: impl Into<String>, role: StaffRole) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            role,
            sub_eligible: false,
            is_float: false,
            availability: WeeklyCalendar::new(),
            hire_date: None,
            new_hire_override: false,
            certification_expires: None,
            no_crisis: false,
            no_lunch_coverage: false,
        }
    }

    /// Creates an RBT.
    pub fn rbt(id: impl Into<String>) -> Self {
        Self::new(id, StaffRole::Rbt)
    }

    /// Creates a Lead RBT at the given level.
    pub fn lead(id: impl Into<String>, level: u8) -> Self {
        Self::new(id, StaffRole::Lead { level })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Marks the staff member as sub-eligible.
    pub fn sub_eligible(mut self) -> Self {
        self.sub_eligible = true;
        self
    }

    /// Marks the staff member as a float RBT.
    pub fn float(mut self) -> Self {
        self.is_float = true;
        self
    }

    /// Declares the availability window for a weekday.
    pub fn with_availability(mut self, day: DayKey, window: TimeWindow) -> Self {
        self.availability = self.availability.with_day(day, window);
        self
    }

    pub fn with_hire_date(mut self, date: NaiveDate) -> Self {
        self.hire_date = Some(date);
        self
    }

    pub fn with_new_hire_override(mut self) -> Self {
        self.new_hire_override = true;
        self
    }

    pub fn with_certification_expires(mut self, date: NaiveDate) -> Self {
        self.certification_expires = Some(date);
        self
    }

    pub fn with_no_crisis(mut self) -> Self {
        self.no_crisis = true;
        self
    }

    pub fn with_no_lunch_coverage(mut self) -> Self {
        self.no_lunch_coverage = true;
        self
    }

    /// Whether the staff member's certification has lapsed by `today`.
    pub fn certification_lapsed(&self, today: NaiveDate) -> bool {
        self.certification_expires.is_some_and(|d| d < today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staff_builder() {
        let s = StaffMember::rbt("S1")
            .with_name("Sam")
            .sub_eligible()
            .float()
            .with_no_crisis();
        assert_eq!(s.id, "S1");
        assert_eq!(s.name, "Sam");
        assert!(s.sub_eligible);
        assert!(s.is_float);
        assert!(s.no_crisis);
        assert!(!s.role.is_lead());
    }

    #[test]
    fn test_name_defaults_to_id() {
        assert_eq!(StaffMember::rbt("S9").name, "S9");
    }

    #[test]
    fn test_lead_role() {
        let l = StaffMember::lead("L1", 2);
        assert!(l.role.is_lead());
        assert_eq!(l.role.lead_level(), Some(2));
        assert_eq!(StaffRole::Rbt.lead_level(), None);
    }

    #[test]
    fn test_certification_lapsed() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let s = StaffMember::rbt("S1")
            .with_certification_expires(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert!(s.certification_lapsed(today));
        assert!(!StaffMember::rbt("S2").certification_lapsed(today));
    }
}

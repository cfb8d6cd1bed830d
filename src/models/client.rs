//! Client model.
//!
//! A client receives staffed sessions. Besides a weekly service calendar the
//! client carries its eligibility configuration (who may substitute), its
//! cancellation/skip history, and its lunch grouping preferences.
//!
//! The cancellation/skip history is advanced by the caller's finalize step
//! between days. Within a resolution run it is read-only.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{DayKey, TimeWindow, WeeklyCalendar};

/// A client receiving staffed sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    /// Unique client identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Per-weekday service window. Empty = attends whenever scheduled.
    pub service: WeeklyCalendar,
    /// First day of service, for tenure protection.
    pub service_start_date: Option<NaiveDate>,

    // Eligibility configuration.
    /// Ad-hoc substitutes are permitted.
    pub allow_sub: bool,
    /// Float RBTs may cover this client.
    pub float_rbts_allowed: bool,
    /// Restricts floats to these ids. Empty = any float.
    pub allowed_float_rbt_ids: Vec<String>,
    /// Lead RBTs may cover this client.
    pub lead_rbts_allowed: bool,
    /// Restricts leads to these ids. Empty = any lead.
    pub allowed_lead_rbt_ids: Vec<String>,
    /// Staff who must never be placed with this client.
    pub excluded_staff_ids: Vec<String>,
    /// Staff normally assigned to this client.
    pub focus_staff_ids: Vec<String>,
    /// The same staff member may work both blocks without restriction.
    pub allow_all_day_same_staff: bool,
    /// Requires crisis-qualified staff.
    pub is_crisis: bool,

    // Cancellation and skip state.
    pub sessions_per_week: u32,
    pub last_canceled_date: Option<NaiveDate>,
    pub cancel_skip_used: bool,
    pub last_skipped_date: Option<NaiveDate>,
    pub consecutive_absent_days: u32,
    /// Days since the client returned from their last absence.
    pub days_back_since_absence: u32,

    // Lunch grouping.
    pub can_be_grouped: bool,
    /// Clients that may share lunch coverage with this one regardless of
    /// substitution or grouping settings.
    pub allowed_lunch_peer_ids: Vec<String>,
    /// Clients this one must never be grouped with.
    pub no_group_with_ids: Vec<String>,
    /// Largest lunch group this client tolerates. `None` = configured default.
    pub max_group_size: Option<usize>,
}

impl Client {
    /// Creates a client with permissive defaults.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            service: WeeklyCalendar::new(),
            service_start_date: None,
            allow_sub: true,
            float_rbts_allowed: true,
            allowed_float_rbt_ids: Vec::new(),
            lead_rbts_allowed: true,
            allowed_lead_rbt_ids: Vec::new(),
            excluded_staff_ids: Vec::new(),
            focus_staff_ids: Vec::new(),
            allow_all_day_same_staff: true,
            is_crisis: false,
            sessions_per_week: 5,
            last_canceled_date: None,
            cancel_skip_used: false,
            last_skipped_date: None,
            consecutive_absent_days: 0,
            days_back_since_absence: 0,
            can_be_grouped: true,
            allowed_lunch_peer_ids: Vec::new(),
            no_group_with_ids: Vec::new(),
            max_group_size: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Declares the service window for a weekday.
    pub fn with_service(mut self, day: DayKey, window: TimeWindow) -> Self {
        self.service = self.service.with_day(day, window);
        self
    }

    pub fn with_service_start(mut self, date: NaiveDate) -> Self {
        self.service_start_date = Some(date);
        self
    }

    pub fn with_allow_sub(mut self, allow: bool) -> Self {
        self.allow_sub = allow;
        self
    }

    /// Configures floats: `allowed` gates all floats, `ids` narrows them.
    pub fn with_floats(mut self, allowed: bool, ids: Vec<String>) -> Self {
        self.float_rbts_allowed = allowed;
        self.allowed_float_rbt_ids = ids;
        self
    }

    /// Configures leads: `allowed` gates all leads, `ids` narrows them.
    pub fn with_leads(mut self, allowed: bool, ids: Vec<String>) -> Self {
        self.lead_rbts_allowed = allowed;
        self.allowed_lead_rbt_ids = ids;
        self
    }

    pub fn with_excluded(mut self, staff_id: impl Into<String>) -> Self {
        self.excluded_staff_ids.push(staff_id.into());
        self
    }

    pub fn with_focus(mut self, staff_id: impl Into<String>) -> Self {
        self.focus_staff_ids.push(staff_id.into());
        self
    }

    pub fn with_allow_all_day_same_staff(mut self, allow: bool) -> Self {
        self.allow_all_day_same_staff = allow;
        self
    }

    pub fn with_crisis(mut self) -> Self {
        self.is_crisis = true;
        self
    }

    pub fn with_sessions_per_week(mut self, sessions: u32) -> Self {
        self.sessions_per_week = sessions;
        self
    }

    pub fn with_last_canceled(mut self, date: NaiveDate) -> Self {
        self.last_canceled_date = Some(date);
        self
    }

    pub fn with_cancel_skip_used(mut self, used: bool) -> Self {
        self.cancel_skip_used = used;
        self
    }

    pub fn with_last_skipped(mut self, date: NaiveDate) -> Self {
        self.last_skipped_date = Some(date);
        self
    }

    /// Records a past absence: how long it lasted and how long ago it ended.
    pub fn with_absence(mut self, consecutive_days: u32, days_back: u32) -> Self {
        self.consecutive_absent_days = consecutive_days;
        self.days_back_since_absence = days_back;
        self
    }

    pub fn with_grouping(mut self, can_be_grouped: bool) -> Self {
        self.can_be_grouped = can_be_grouped;
        self
    }

    pub fn with_lunch_peer(mut self, client_id: impl Into<String>) -> Self {
        self.allowed_lunch_peer_ids.push(client_id.into());
        self
    }

    pub fn with_no_group_with(mut self, client_id: impl Into<String>) -> Self {
        self.no_group_with_ids.push(client_id.into());
        self
    }

    pub fn with_max_group_size(mut self, size: usize) -> Self {
        self.max_group_size = Some(size);
        self
    }

    /// Whether `staff_id` is one of this client's focus staff.
    pub fn is_focus(&self, staff_id: &str) -> bool {
        self.focus_staff_ids.iter().any(|s| s == staff_id)
    }

    /// Whether this client names `client_id` as a lunch peer.
    pub fn lists_lunch_peer(&self, client_id: &str) -> bool {
        self.allowed_lunch_peer_ids.iter().any(|c| c == client_id)
    }

    /// Whether this client refuses to be grouped with `client_id`.
    pub fn refuses_group_with(&self, client_id: &str) -> bool {
        self.no_group_with_ids.iter().any(|c| c == client_id)
    }
}

/// A client's enrollment at a service location.
///
/// A move to a new location restarts tenure protection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientLocation {
    pub client_id: String,
    pub location_id: String,
    /// First day of service at this location.
    pub start_date: NaiveDate,
}

impl ClientLocation {
    pub fn new(
        client_id: impl Into<String>,
        location_id: impl Into<String>,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            location_id: location_id.into(),
            start_date,
        }
    }
}

//! Staffing domain models.
//!
//! Provides the input records a resolution run consumes (staff, clients,
//! template, exceptions, approved substitutions, training sessions) and the
//! records it returns (approvals, lunch results, training updates, the
//! per-staff day schedule).
//!
//! # Domain Mappings
//!
//! | u-staffing | Clinic | Tutoring | Home care |
//! |------------|--------|----------|-----------|
//! | StaffMember | RBT | Tutor | Caregiver |
//! | Client | Learner | Student | Patient |
//! | TemplateAssignment | Weekly session plan | Timetable | Visit plan |
//! | Exception | Call-out | Absence | Missed visit |

mod approval;
mod calendar;
mod client;
mod exception;
mod lunch;
mod schedule;
mod staff;
mod template;
mod training;

pub use approval::{ApprovalKind, ApprovalRequest, ApprovalStatus, ApprovedSub, SkipReason};
pub use calendar::{Block, DayKey, LunchSlot, Period, TimeWindow, WeeklyCalendar};
pub use client::{Client, ClientLocation};
pub use exception::{Exception, ExceptionMode, ExceptionTarget};
pub use lunch::{LunchBlocker, LunchCoverageError, LunchPairing};
pub use schedule::{ScheduleSlot, SlotSource, StaffSchedule, StaffStatus};
pub use staff::{StaffMember, StaffRole};
pub use template::TemplateAssignment;
pub use training::{TrainingSession, TrainingSessionUpdate, TrainingStatus};

//! Daily staffing resolution for the U-Engine ecosystem.
//!
//! Turns a weekly staffing template plus one day's exceptions into a realized
//! schedule and a queue of decisions for a human to confirm. The engine is
//! rule-driven and deterministic: it never commits a change on its own, and
//! identical input always yields identical output.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `StaffMember`, `Client`, `TemplateAssignment`,
//!   `Exception`, `ApprovedSub`, `TrainingSession`, and the outputs
//!   `ApprovalRequest`, `LunchCoverageError`, `TrainingSessionUpdate`,
//!   `StaffSchedule`
//! - **`eligibility`**: Who may cover whom (`RuleSet`, `EligibilityRule`) and
//!   who is protected (tenure, new hire)
//! - **`resolver`**: The resolution pipeline (`DayResolver`, `resolve_day`)
//! - **`validation`**: Input integrity checks (duplicate IDs, unknown refs,
//!   empty windows)
//! - **`config`**: Policy constants (`ResolverConfig`)
//!
//! # Architecture
//!
//! This crate sits at Layer 3 (Frameworks) in the U-Engine ecosystem. It
//! performs no I/O and keeps no state between runs: persistence, the approval
//! UI, and the end-of-day finalize step that advances cancellation history
//! belong to the caller.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use u_staffing::models::{Block, Client, DayKey, StaffMember, TemplateAssignment};
//! use u_staffing::resolver::{resolve_day, DayRequest};
//!
//! let request = DayRequest::new(NaiveDate::from_ymd_opt(2024, 3, 4).unwrap())
//!     .with_staff(vec![StaffMember::rbt("S1")])
//!     .with_clients(vec![Client::new("C1")])
//!     .with_template(vec![TemplateAssignment::new(DayKey::Mon, Block::Am, "S1", "C1")]);
//!
//! let resolution = resolve_day(&request).unwrap();
//! assert!(resolution.approvals.is_empty());
//! assert_eq!(resolution.schedule.len(), 1);
//! ```

pub mod config;
pub mod eligibility;
pub mod error;
pub mod models;
pub mod resolver;
pub mod validation;

pub use config::ResolverConfig;
pub use error::{ResolveError, ResolveResult};
pub use resolver::{resolve_day, DayRequest, DayResolution, DayResolver};

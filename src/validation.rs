//! Input validation for resolution runs.
//!
//! Checks structural integrity of a day request before any stage runs.
//! Detects:
//! - Duplicate staff, client, and training session IDs
//! - Template assignments, exceptions, approved subs, training sessions,
//!   and client locations that reference unknown staff or clients
//! - Empty or inverted time windows
//!
//! [`validate_config`] applies the same window check to a configuration.
//!
//! Anything caught here is a caller bug. Operational problems (no coverage,
//! no lunch pairing) are never validation errors.

use std::collections::HashSet;

use crate::config::ResolverConfig;
use crate::models::{ExceptionTarget, TimeWindow};
use crate::resolver::DayRequest;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A record references a staff member that doesn't exist.
    UnknownStaff,
    /// A record references a client that doesn't exist.
    UnknownClient,
    /// A time window is empty or inverted.
    InvalidTimeWindow,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the input data for a resolution run.
///
/// Checks:
/// 1. No duplicate staff, client, or training session IDs
/// 2. Every staff/client reference resolves (template, exceptions,
///    approved subs, training sessions, client locations)
/// 3. Every explicit time window is non-empty
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(request: &DayRequest) -> ValidationResult {
    let mut errors = Vec::new();

    let mut staff_ids = HashSet::new();
    for s in &request.staff {
        if !staff_ids.insert(s.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate staff ID: {}", s.id),
            ));
        }
    }

    let mut client_ids = HashSet::new();
    for c in &request.clients {
        if !client_ids.insert(c.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate client ID: {}", c.id),
            ));
        }
    }

    let mut session_ids = HashSet::new();
    for t in &request.training_sessions {
        if !session_ids.insert(t.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate training session ID: {}", t.id),
            ));
        }
    }

    for a in &request.template {
        let what = format!("Template assignment {} {} for '{}'", a.day, a.block, a.staff_id);
        check_staff(&mut errors, &staff_ids, &a.staff_id, &what);
        if let Some(client_id) = &a.client_id {
            check_client(&mut errors, &client_ids, client_id, &what);
        }
        if let (Some(start), Some(end)) = (a.start_min, a.end_min) {
            check_window(&mut errors, &TimeWindow::new(start, end), &what);
        }
    }

    for e in &request.exceptions {
        let what = format!("Exception for '{}'", e.entity_id);
        match e.target {
            ExceptionTarget::Staff => check_staff(&mut errors, &staff_ids, &e.entity_id, &what),
            ExceptionTarget::Client => check_client(&mut errors, &client_ids, &e.entity_id, &what),
        }
        if let (false, Some(w)) = (e.all_day, e.window) {
            check_window(&mut errors, &w, &what);
        }
    }

    for sub in &request.approved_subs {
        let what = format!("Approved sub for '{}' {}", sub.client_id, sub.block);
        check_staff(&mut errors, &staff_ids, &sub.sub_staff_id, &what);
        check_client(&mut errors, &client_ids, &sub.client_id, &what);
    }

    for t in &request.training_sessions {
        let what = format!("Training session '{}'", t.id);
        check_staff(&mut errors, &staff_ids, &t.trainee_id, &what);
        check_staff(&mut errors, &staff_ids, &t.trainer_id, &what);
        check_client(&mut errors, &client_ids, &t.client_id, &what);
    }

    for loc in &request.client_locations {
        let what = format!("Location '{}'", loc.location_id);
        check_client(&mut errors, &client_ids, &loc.client_id, &what);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates a resolver configuration.
///
/// Checks that both block windows are non-empty and that the lunch window
/// splits into two non-empty sub-slots.
pub fn validate_config(config: &ResolverConfig) -> ValidationResult {
    let mut errors = Vec::new();
    check_window(&mut errors, &config.am_window, "Config am_window");
    check_window(&mut errors, &config.pm_window, "Config pm_window");
    let (first, second) = config.lunch_window.halves();
    if !first.is_valid() || !second.is_valid() {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidTimeWindow,
            format!(
                "Config lunch_window {} does not split into two lunch sub-slots",
                config.lunch_window
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_staff(errors: &mut Vec<ValidationError>, known: &HashSet<&str>, id: &str, what: &str) {
    if !known.contains(id) {
        errors.push(ValidationError::new(
            ValidationErrorKind::UnknownStaff,
            format!("{what} references unknown staff '{id}'"),
        ));
    }
}

fn check_client(errors: &mut Vec<ValidationError>, known: &HashSet<&str>, id: &str, what: &str) {
    if !known.contains(id) {
        errors.push(ValidationError::new(
            ValidationErrorKind::UnknownClient,
            format!("{what} references unknown client '{id}'"),
        ));
    }
}

fn check_window(errors: &mut Vec<ValidationError>, window: &TimeWindow, what: &str) {
    if !window.is_valid() {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidTimeWindow,
            format!("{what} has an empty time window {window}"),
        ));
    }
}

//! Training session impact.
//!
//! Checks each of the day's open training sessions against the exceptions:
//!
//! | Who is unavailable | Proposed status | Reason names |
//! |--------------------|-----------------|--------------|
//! | trainee | blocked | trainee |
//! | client (trainee present) | blocked | client |
//! | trainer only | disrupted | trainer |
//!
//! A session that can still proceed keeps its trainee (and trainer, when
//! present) committed for the session's blocks, so the coverage stage does
//! not pull them away as substitutes.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use super::day::DayContext;
use crate::models::{Block, TrainingSession, TrainingSessionUpdate, TrainingStatus};

/// Result of the training stage.
#[derive(Debug, Clone, Default)]
pub(crate) struct TrainingImpact {
    pub updates: Vec<TrainingSessionUpdate>,
    /// Staff held by sessions that proceed, per block.
    pub committed: BTreeMap<Block, BTreeSet<String>>,
}

pub(crate) fn assess(day: &DayContext<'_>) -> TrainingImpact {
    let mut impact = TrainingImpact::default();

    let mut sessions: Vec<&TrainingSession> = day
        .request
        .training_sessions
        .iter()
        .filter(|t| t.date == day.date() && t.status.is_open())
        .collect();
    sessions.sort_by(|a, b| a.id.cmp(&b.id));

    for session in sessions {
        let blocks = session.blocks();
        let present = |id: &str| blocks.iter().all(|&b| day.staff_id_available(id, b));
        let client_present = blocks
            .iter()
            .all(|&b| day.client_id_available(&session.client_id, b));
        let trainer_present = present(&session.trainer_id);

        let proposed = if !present(&session.trainee_id) {
            Some((
                TrainingStatus::Blocked,
                format!("Trainee {} is unavailable", day.staff_name(&session.trainee_id)),
            ))
        } else if !client_present {
            Some((
                TrainingStatus::Blocked,
                format!("Client {} is unavailable", day.client_name(&session.client_id)),
            ))
        } else if !trainer_present {
            Some((
                TrainingStatus::Disrupted,
                format!("Trainer {} is unavailable", day.staff_name(&session.trainer_id)),
            ))
        } else {
            None
        };

        let effective = proposed.as_ref().map_or(session.status, |(s, _)| *s);
        if effective != TrainingStatus::Blocked {
            for &block in &blocks {
                let ids = impact.committed.entry(block).or_default();
                ids.insert(session.trainee_id.clone());
                if trainer_present {
                    ids.insert(session.trainer_id.clone());
                }
            }
        }

        if let Some((new_status, reason)) = proposed {
            if new_status != session.status {
                debug!("Training session {} -> {:?}: {}", session.id, new_status, reason);
                impact.updates.push(TrainingSessionUpdate {
                    session_id: session.id.clone(),
                    new_status,
                    reason,
                });
            }
        }
    }

    impact
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolverConfig;
    use crate::models::{Client, DayKey, Exception, StaffMember};
    use crate::resolver::DayRequest;
    use chrono::NaiveDate;

    impl TrainingImpact {
        fn is_committed(&self, block: Block, staff_id: &str) -> bool {
            self.committed
                .get(&block)
                .is_some_and(|ids| ids.contains(staff_id))
        }
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    }

    fn request(exceptions: Vec<Exception>, sessions: Vec<TrainingSession>) -> DayRequest {
        DayRequest::new(monday())
            .with_staff(vec![
                StaffMember::rbt("TRAINEE").with_name("Tia"),
                StaffMember::rbt("TRAINER").with_name("Tom"),
            ])
            .with_clients(vec![Client::new("C1").with_name("Cal")])
            .with_exceptions(exceptions)
            .with_training_sessions(sessions)
    }

    fn run(req: &DayRequest) -> TrainingImpact {
        let config = ResolverConfig::default();
        let day = DayContext::new(req, DayKey::Mon, &config);
        assess(&day)
    }

    fn session() -> TrainingSession {
        TrainingSession::new("T1", "TRAINEE", "TRAINER", "C1", monday())
    }

    #[test]
    fn test_no_exceptions_no_updates() {
        let impact = run(&request(vec![], vec![session()]));
        assert!(impact.updates.is_empty());
        assert!(impact.is_committed(Block::Am, "TRAINEE"));
        assert!(impact.is_committed(Block::Pm, "TRAINER"));
    }

    #[test]
    fn test_trainee_out_blocks() {
        let impact = run(&request(vec![Exception::staff_out("TRAINEE")], vec![session()]));
        assert_eq!(impact.updates.len(), 1);
        assert_eq!(impact.updates[0].new_status, TrainingStatus::Blocked);
        assert!(impact.updates[0].reason.contains("Trainee"));
        assert!(impact.updates[0].reason.contains("Tia"));
        assert!(!impact.is_committed(Block::Am, "TRAINER"));
    }

    #[test]
    fn test_client_out_blocks() {
        let impact = run(&request(vec![Exception::client_out("C1")], vec![session()]));
        assert_eq!(impact.updates[0].new_status, TrainingStatus::Blocked);
        assert!(impact.updates[0].reason.contains("Client"));
    }

    #[test]
    fn test_trainer_out_disrupts() {
        let impact = run(&request(vec![Exception::staff_out("TRAINER")], vec![session()]));
        assert_eq!(impact.updates[0].new_status, TrainingStatus::Disrupted);
        assert!(impact.updates[0].reason.contains("Trainer"));
        assert!(impact.is_committed(Block::Am, "TRAINEE"));
        assert!(!impact.is_committed(Block::Am, "TRAINER"));
    }

    #[test]
    fn test_trainee_wins_over_trainer() {
        let impact = run(&request(
            vec![Exception::staff_out("TRAINER"), Exception::staff_out("TRAINEE")],
            vec![session()],
        ));
        assert_eq!(impact.updates[0].new_status, TrainingStatus::Blocked);
        assert!(impact.updates[0].reason.contains("Trainee"));
    }

    #[test]
    fn test_block_scoped_session() {
        let out_pm = Exception::staff_out("TRAINEE").during(crate::models::TimeWindow::hm(13, 0, 14, 0));
        let impact = run(&request(vec![out_pm], vec![session().in_block(Block::Am)]));
        assert!(impact.updates.is_empty());
        assert!(impact.is_committed(Block::Am, "TRAINEE"));
        assert!(!impact.is_committed(Block::Pm, "TRAINEE"));
    }

    #[test]
    fn test_ignores_other_dates_and_closed_sessions() {
        let other_day = TrainingSession::new("T2", "TRAINEE", "TRAINER", "C1", monday().succ_opt().unwrap());
        let done = session().with_status(TrainingStatus::Completed);
        let impact = run(&request(vec![Exception::staff_out("TRAINEE")], vec![other_day, done]));
        assert!(impact.updates.is_empty());
    }

    #[test]
    fn test_unchanged_status_not_reemitted() {
        let already = session().with_status(TrainingStatus::Disrupted);
        let impact = run(&request(vec![Exception::staff_out("TRAINER")], vec![already]));
        assert!(impact.updates.is_empty());
    }
}

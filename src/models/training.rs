//! Training session model.
//!
//! Training sessions pair a trainee with a trainer on a client. The records
//! live outside the engine; the engine only proposes status transitions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Block;

/// Lifecycle state of a training session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingStatus {
    Scheduled,
    InProgress,
    /// Cannot proceed at all.
    Blocked,
    /// Can proceed without supervision or be rescheduled.
    Disrupted,
    Completed,
    Cancelled,
}

impl TrainingStatus {
    /// Whether a session in this state is still subject to impact checks.
    pub fn is_open(&self) -> bool {
        !matches!(self, TrainingStatus::Completed | TrainingStatus::Cancelled)
    }
}

/// A scheduled training session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingSession {
    pub id: String,
    pub trainee_id: String,
    pub trainer_id: String,
    pub client_id: String,
    pub date: NaiveDate,
    /// Session block. `None` = the whole day.
    pub block: Option<Block>,
    pub status: TrainingStatus,
}

impl TrainingSession {
    pub fn new(
        id: impl Into<String>,
        trainee_id: impl Into<String>,
        trainer_id: impl Into<String>,
        client_id: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            trainee_id: trainee_id.into(),
            trainer_id: trainer_id.into(),
            client_id: client_id.into(),
            date,
            block: None,
            status: TrainingStatus::Scheduled,
        }
    }

    pub fn in_block(mut self, block: Block) -> Self {
        self.block = Some(block);
        self
    }

    pub fn with_status(mut self, status: TrainingStatus) -> Self {
        self.status = status;
        self
    }

    /// Blocks the session occupies.
    pub fn blocks(&self) -> Vec<Block> {
        match self.block {
            Some(b) => vec![b],
            None => Block::BOTH.to_vec(),
        }
    }
}

/// A proposed status transition for a training session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingSessionUpdate {
    pub session_id: String,
    pub new_status: TrainingStatus,
    pub reason: String,
}

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// A persisted unit of work, due at `completed_at`.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: Uuid,
    pub player_id: Uuid,
    /// The village the job writes to.
    pub village_id: u32,
    pub task: JobPayload,
    pub status: JobStatus,
    /// Failed runs so far.
    pub attempts: u32,
    pub completed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn new(player_id: Uuid, village_id: u32, duration: i64, task: JobPayload) -> Self {
        let now = Utc::now();
        let completed_at = now
            .checked_add_signed(Duration::seconds(duration))
            .unwrap_or(now);
        Self::with_deadline_internal(player_id, village_id, task, completed_at, now)
    }

    pub fn with_deadline(
        player_id: Uuid,
        village_id: u32,
        task: JobPayload,
        completed_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self::with_deadline_internal(player_id, village_id, task, completed_at, now)
    }

    fn with_deadline_internal(
        player_id: Uuid,
        village_id: u32,
        task: JobPayload,
        completed_at: DateTime<Utc>,
        baseline: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            player_id,
            village_id,
            task,
            status: JobStatus::Pending,
            attempts: 0,
            completed_at,
            created_at: baseline,
            updated_at: baseline,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == JobStatus::Pending && self.completed_at <= now
    }
}

/// Represents the data payload for any job, it holds data for the task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPayload {
    /// A string key used to find the correct handler in the registry.
    /// e.g., "GameTick", "Attack", "ArmyReturn"
    pub task_type: String,

    /// The full JSON data for the task payload.
    pub data: Value,
}

impl JobPayload {
    pub fn new(task_type: &str, data: Value) -> Self {
        Self {
            task_type: task_type.to_string(),
            data,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Pending or already picked up by a worker.
    pub fn is_active(&self) -> bool {
        matches!(self, JobStatus::Pending | JobStatus::Processing)
    }
}

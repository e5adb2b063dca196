use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

/// Stored rows. Aggregates are kept as JSON documents, the way they cross
/// the persistence boundary.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: Uuid,
    pub username: String,
    pub attack_points: i64,
    pub defense_points: i64,
    pub last_seen_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Village {
    pub id: i64,
    pub player_id: Uuid,
    pub data: Value,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Clone)]
pub struct Job {
    pub id: Uuid,
    pub player_id: Uuid,
    pub village_id: i64,
    pub task: Value,
    pub status: JobStatus,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub completed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct BattleReport {
    pub id: Uuid,
    pub attacker_village_id: i64,
    pub defender_village_id: i64,
    pub attacker_player_id: Uuid,
    pub defender_player_id: Uuid,
    pub result: Value,
    pub created_at: DateTime<Utc>,
}

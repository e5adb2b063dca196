use chrono::{DateTime, Utc};
use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models as db_models;

/// Committed state.
#[derive(Debug, Default)]
pub(crate) struct Tables {
    pub players: HashMap<Uuid, db_models::Player>,
    pub villages: BTreeMap<i64, db_models::Village>,
    pub jobs: HashMap<Uuid, db_models::Job>,
    pub reports: Vec<db_models::BattleReport>,
}

#[derive(Debug, Clone)]
pub(crate) enum JobUpdate {
    Completed,
    Failed(String),
    Rescheduled {
        run_at: DateTime<Utc>,
        error: String,
    },
}

/// Writes of an open unit of work, applied together on commit.
#[derive(Debug, Default)]
pub(crate) struct Staged {
    pub players: HashMap<Uuid, db_models::Player>,
    /// (attack, defense) added on commit on top of the committed player.
    pub credits: HashMap<Uuid, (i64, i64)>,
    /// Latest activity per player, kept if newer than the committed one.
    pub seen: HashMap<Uuid, DateTime<Utc>>,
    pub villages: BTreeMap<i64, db_models::Village>,
    pub new_jobs: Vec<db_models::Job>,
    pub job_updates: Vec<(Uuid, JobUpdate)>,
    pub reports: Vec<db_models::BattleReport>,
}

impl Staged {
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
            && self.credits.is_empty()
            && self.seen.is_empty()
            && self.villages.is_empty()
            && self.new_jobs.is_empty()
            && self.job_updates.is_empty()
            && self.reports.is_empty()
    }
}

impl Tables {
    /// Applies staged writes. Every referenced row was checked when staged,
    /// and rows are never deleted, so nothing here can fail halfway.
    pub(crate) fn apply(&mut self, staged: Staged) {
        let now = Utc::now();

        self.players.extend(staged.players);
        for (player_id, (attack, defense)) in staged.credits {
            if let Some(player) = self.players.get_mut(&player_id) {
                player.attack_points = player.attack_points.saturating_add(attack);
                player.defense_points = player.defense_points.saturating_add(defense);
            }
        }
        for (player_id, seen_at) in staged.seen {
            if let Some(player) = self.players.get_mut(&player_id) {
                player.last_seen_at = player.last_seen_at.max(seen_at);
            }
        }

        self.villages.extend(staged.villages);

        for job in staged.new_jobs {
            self.jobs.insert(job.id, job);
        }
        for (job_id, update) in staged.job_updates {
            if let Some(job) = self.jobs.get_mut(&job_id) {
                match update {
                    JobUpdate::Completed => job.status = db_models::JobStatus::Completed,
                    JobUpdate::Failed(error) => {
                        job.status = db_models::JobStatus::Failed;
                        job.last_error = Some(error);
                    }
                    JobUpdate::Rescheduled { run_at, error } => {
                        job.status = db_models::JobStatus::Pending;
                        job.attempts = job.attempts.saturating_add(1);
                        job.completed_at = run_at;
                        job.last_error = Some(error);
                    }
                }
                job.updated_at = now;
            }
        }

        self.reports.extend(staged.reports);
    }
}

/// Shared in-memory database. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    pub(crate) tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn villages_count(&self) -> usize {
        self.tables.lock().await.villages.len()
    }

    pub async fn jobs_count(&self) -> usize {
        self.tables.lock().await.jobs.len()
    }
}

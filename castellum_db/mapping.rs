use castellum_app::jobs::{Job, JobStatus};
use castellum_game::{
    battle::BattleReport,
    models::{player::Player, village::Village},
};
use castellum_types::errors::ApplicationError;

use crate::models as db_models;

impl From<db_models::JobStatus> for JobStatus {
    fn from(status: db_models::JobStatus) -> Self {
        match status {
            db_models::JobStatus::Pending => JobStatus::Pending,
            db_models::JobStatus::Processing => JobStatus::Processing,
            db_models::JobStatus::Completed => JobStatus::Completed,
            db_models::JobStatus::Failed => JobStatus::Failed,
        }
    }
}

impl From<JobStatus> for db_models::JobStatus {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Pending => db_models::JobStatus::Pending,
            JobStatus::Processing => db_models::JobStatus::Processing,
            JobStatus::Completed => db_models::JobStatus::Completed,
            JobStatus::Failed => db_models::JobStatus::Failed,
        }
    }
}

impl From<db_models::Player> for Player {
    fn from(player: db_models::Player) -> Self {
        Player {
            id: player.id,
            username: player.username,
            attack_points: player.attack_points.max(0) as u64,
            defense_points: player.defense_points.max(0) as u64,
            last_seen_at: player.last_seen_at,
            created_at: player.created_at,
        }
    }
}

impl From<&Player> for db_models::Player {
    fn from(player: &Player) -> Self {
        db_models::Player {
            id: player.id,
            username: player.username.clone(),
            attack_points: i64::try_from(player.attack_points).unwrap_or(i64::MAX),
            defense_points: i64::try_from(player.defense_points).unwrap_or(i64::MAX),
            last_seen_at: player.last_seen_at,
            created_at: player.created_at,
        }
    }
}

impl TryFrom<db_models::Village> for Village {
    type Error = ApplicationError;

    fn try_from(village: db_models::Village) -> Result<Self, Self::Error> {
        Ok(serde_json::from_value(village.data)?)
    }
}

impl TryFrom<&Village> for db_models::Village {
    type Error = ApplicationError;

    fn try_from(village: &Village) -> Result<Self, Self::Error> {
        Ok(db_models::Village {
            id: village.id as i64,
            player_id: village.player_id,
            data: serde_json::to_value(village)?,
            updated_at: chrono::Utc::now(),
        })
    }
}

impl TryFrom<db_models::Job> for Job {
    type Error = ApplicationError;

    fn try_from(job: db_models::Job) -> Result<Self, Self::Error> {
        Ok(Job {
            id: job.id,
            player_id: job.player_id,
            village_id: job.village_id as u32,
            task: serde_json::from_value(job.task)?,
            status: job.status.into(),
            attempts: job.attempts.max(0) as u32,
            completed_at: job.completed_at,
            created_at: job.created_at,
            updated_at: job.updated_at,
        })
    }
}

impl TryFrom<&Job> for db_models::Job {
    type Error = ApplicationError;

    fn try_from(job: &Job) -> Result<Self, Self::Error> {
        Ok(db_models::Job {
            id: job.id,
            player_id: job.player_id,
            village_id: job.village_id as i64,
            task: serde_json::to_value(&job.task)?,
            status: job.status.into(),
            attempts: i32::try_from(job.attempts).unwrap_or(i32::MAX),
            last_error: None,
            completed_at: job.completed_at,
            created_at: job.created_at,
            updated_at: job.updated_at,
        })
    }
}

impl TryFrom<db_models::BattleReport> for BattleReport {
    type Error = ApplicationError;

    fn try_from(report: db_models::BattleReport) -> Result<Self, Self::Error> {
        Ok(BattleReport {
            id: report.id,
            attacker_village_id: report.attacker_village_id as u32,
            defender_village_id: report.defender_village_id as u32,
            attacker_player_id: report.attacker_player_id,
            defender_player_id: report.defender_player_id,
            result: serde_json::from_value(report.result)?,
            created_at: report.created_at,
        })
    }
}

impl TryFrom<&BattleReport> for db_models::BattleReport {
    type Error = ApplicationError;

    fn try_from(report: &BattleReport) -> Result<Self, Self::Error> {
        Ok(db_models::BattleReport {
            id: report.id,
            attacker_village_id: report.attacker_village_id as i64,
            defender_village_id: report.defender_village_id as i64,
            attacker_player_id: report.attacker_player_id,
            defender_player_id: report.defender_player_id,
            result: serde_json::to_value(&report.result)?,
            created_at: report.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    use castellum_app::jobs::JobPayload;
    use castellum_game::test_utils::{VillageFactoryOptions, village_factory};
    use castellum_types::common::ResourceAmounts;

    use super::*;

    #[test]
    fn test_village_row_keeps_the_aggregate() {
        let village = village_factory(VillageFactoryOptions {
            amounts: Some(ResourceAmounts::new(1, 2, 3, 4)),
            ..Default::default()
        });

        let row = db_models::Village::try_from(&village).unwrap();
        assert_eq!(row.id, village.id as i64);
        assert_eq!(row.data["resources"]["amounts"]["clay"], json!(2));

        let back = Village::try_from(row).unwrap();
        assert_eq!(back, village);
    }

    #[test]
    fn test_corrupted_village_row_is_an_error() {
        let row = db_models::Village {
            id: 1,
            player_id: Uuid::new_v4(),
            data: json!({ "id": "not a number" }),
            updated_at: Utc::now(),
        };
        assert!(matches!(
            Village::try_from(row),
            Err(ApplicationError::Json(_))
        ));
    }

    #[test]
    fn test_job_row_keeps_status_and_attempts() {
        let mut job = Job::new(Uuid::new_v4(), 5, 60, JobPayload::new("GameTick", json!({})));
        job.status = JobStatus::Processing;
        job.attempts = 2;

        let row = db_models::Job::try_from(&job).unwrap();
        assert_eq!(row.task["task_type"], json!("GameTick"));

        let back = Job::try_from(row).unwrap();
        assert_eq!(back.status, JobStatus::Processing);
        assert_eq!(back.attempts, 2);
        assert_eq!(back.village_id, 5);
    }
}

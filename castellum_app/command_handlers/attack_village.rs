use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::info;

use castellum_types::errors::{ApplicationError, GameError};

use crate::{
    command_handlers::helpers::load_owned_village,
    config::Config,
    cqrs::{CommandHandler, commands::AttackVillage},
    jobs::{Job, JobPayload, tasks::AttackTask},
    uow::UnitOfWork,
};

pub struct AttackVillageCommandHandler {}

impl AttackVillageCommandHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait::async_trait]
impl CommandHandler<AttackVillage> for AttackVillageCommandHandler {
    async fn handle(
        &self,
        command: AttackVillage,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        config: &Arc<Config>,
    ) -> Result<(), ApplicationError> {
        if command.village_id == command.target_village_id {
            return Err(GameError::SameVillageAttack.into());
        }

        let village_repo = uow.villages();
        let mut attacker_village =
            load_owned_village(uow, command.village_id, command.player_id, config.speed).await?;
        attacker_village.deploy_troops(&command.troops)?;

        // Fetch target village to calculate travel time
        let defender_village = village_repo.get_by_id(command.target_village_id).await?;
        let travel_time_secs = attacker_village.position.travel_time_secs(
            &defender_village.position,
            command.troops.speed(),
            config.speed,
        ) as i64;

        village_repo.save(&attacker_village).await?;

        let now = Utc::now();
        let arrives_at = now
            .checked_add_signed(Duration::seconds(travel_time_secs))
            .unwrap_or(now);
        let attack_payload = AttackTask {
            attacker_village_id: attacker_village.id,
            attacker_player_id: command.player_id,
            target_village_id: defender_village.id,
            troops: command.troops,
            attack_type: command.attack_type,
            arrives_at,
        };
        let job_payload =
            JobPayload::new(AttackTask::TASK_TYPE, serde_json::to_value(&attack_payload)?);
        // the battle writes to the target, so the job belongs to it
        let new_job = Job::with_deadline(
            command.player_id,
            defender_village.id,
            job_payload,
            arrives_at,
        );
        uow.jobs().add(&new_job).await?;
        uow.players().touch(command.player_id, now).await?;

        info!(
            attack_job_id = %new_job.id,
            arrival_at = %new_job.completed_at,
            "Attack job planned."
        );

        Ok(())
    }
}

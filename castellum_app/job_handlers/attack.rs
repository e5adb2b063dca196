use async_trait::async_trait;
use chrono::Duration;
use tracing::{info, instrument};

use castellum_game::{
    battle::{BattleInput, BattleReport, CombatResolver},
    events::GameEvent,
};
use castellum_types::errors::ApplicationError;

use crate::jobs::{
    Job, JobPayload,
    handler::{JobHandler, JobHandlerContext},
    tasks::{ArmyReturnTask, AttackTask},
};

pub struct AttackJobHandler {
    payload: AttackTask,
}

impl AttackJobHandler {
    pub fn new(payload: AttackTask) -> Self {
        Self { payload }
    }
}

#[async_trait]
impl JobHandler for AttackJobHandler {
    fn locked_villages(&self, _job: &Job) -> Vec<u32> {
        // the attacker's troops already left, only the target is written to
        vec![self.payload.target_village_id]
    }

    #[instrument(skip_all, fields(
        task_type = "Attack",
        attacker_village_id = self.payload.attacker_village_id,
        target_village_id = self.payload.target_village_id,
    ))]
    async fn handle<'ctx, 'a>(
        &'ctx self,
        ctx: &'ctx JobHandlerContext<'a>,
        _job: &'ctx Job,
    ) -> Result<(), ApplicationError> {
        info!("Execute Attack Job");
        let arrives_at = self.payload.arrives_at;

        let village_repo = ctx.uow.villages();
        let atk_village = village_repo
            .get_by_id(self.payload.attacker_village_id)
            .await?;
        let mut def_village = village_repo
            .get_by_id(self.payload.target_village_id)
            .await?;

        // the defender keeps what it produced until the army arrived
        def_village.catch_up(arrives_at, ctx.config.speed)?;

        let travel_secs = atk_village.position.travel_time_secs(
            &def_village.position,
            self.payload.troops.speed(),
            ctx.config.speed,
        );

        let outcome = CombatResolver::resolve(&BattleInput {
            attacker: self.payload.troops,
            defender: def_village.troops,
            village: def_village.resources.clone(),
            attack_type: self.payload.attack_type,
            duration: Some(travel_secs),
        })?;
        let result = outcome.result;

        def_village.troops = outcome.defender_survivors;
        def_village.remove_resources(&result.loot);
        village_repo.save(&def_village).await?;

        let report = BattleReport::new(
            atk_village.id,
            def_village.id,
            self.payload.attacker_player_id,
            def_village.player_id,
            result.clone(),
        );
        ctx.uow.reports().add(&report).await?;

        let player_repo = ctx.uow.players();
        player_repo
            .credit_points(report.attacker_player_id, result.attacker_points as u64, 0)
            .await?;
        player_repo
            .credit_points(report.defender_player_id, 0, result.defender_points as u64)
            .await?;

        info!(
            report_id = %report.id,
            status = ?result.status,
            attacker_losses = result.attacker_losses,
            defender_losses = result.defender_losses,
            loot = result.loot.total(),
            "Battle resolved"
        );

        ctx.emit_all([
            GameEvent::BattleReportReceived {
                village_id: atk_village.id,
                player_id: report.attacker_player_id,
                report_id: report.id,
                report: Box::new(result.clone()),
            },
            GameEvent::BattleReportReceived {
                village_id: def_village.id,
                player_id: report.defender_player_id,
                report_id: report.id,
                report: Box::new(result.clone()),
            },
        ])
        .await;

        if outcome.attacker_survivors.is_empty() {
            info!("No survivors, nothing returns home");
            return Ok(());
        }

        let return_travel_time = def_village.position.travel_time_secs(
            &atk_village.position,
            outcome.attacker_survivors.speed(),
            ctx.config.speed,
        ) as i64;

        let return_payload = ArmyReturnTask {
            troops: outcome.attacker_survivors,
            loot: result.loot,
            destination_village_id: atk_village.id,
            from_village_id: def_village.id,
        };

        let job_payload = JobPayload::new(
            ArmyReturnTask::TASK_TYPE,
            serde_json::to_value(&return_payload)?,
        );
        let returns_at = arrives_at
            .checked_add_signed(Duration::seconds(return_travel_time))
            .unwrap_or(arrives_at);
        let return_job = Job::with_deadline(
            self.payload.attacker_player_id,
            atk_village.id,
            job_payload,
            returns_at,
        );
        ctx.uow.jobs().add(&return_job).await?;

        info!(
            return_job_id = %return_job.id,
            arrival_at = %return_job.completed_at,
            "Army return job planned."
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use serde_json::json;
    use std::sync::Arc;

    use castellum_game::test_utils::{
        PlayerFactoryOptions, VillageFactoryOptions, player_factory, troops_factory,
        village_factory,
    };
    use castellum_types::{
        Result,
        army::UnitKind,
        battle::{AttackType, BattleStatus},
        common::ResourceAmounts,
        map::Coordinates,
    };

    use super::*;
    use crate::{config::Config, test_utils::tests::MockUnitOfWork, uow::UnitOfWork};

    struct Setup {
        ctx: JobHandlerContext<'static>,
        task: AttackTask,
        job: Job,
    }

    async fn setup(
        attackers: &[(UnitKind, u32)],
        defenders: &[(UnitKind, u32)],
        attack_type: AttackType,
    ) -> Result<Setup> {
        let attacker = player_factory(PlayerFactoryOptions {
            username: Some("attacker"),
            ..Default::default()
        });
        let defender = player_factory(PlayerFactoryOptions {
            username: Some("defender"),
            ..Default::default()
        });
        let now = Utc::now();

        let atk_village = village_factory(VillageFactoryOptions {
            id: Some(1),
            player: Some(attacker.clone()),
            position: Some(Coordinates::new(0, 0)),
            last_tick_at: Some(now),
            ..Default::default()
        });
        let def_village = village_factory(VillageFactoryOptions {
            id: Some(2),
            player: Some(defender.clone()),
            position: Some(Coordinates::new(3, 4)),
            amounts: Some(ResourceAmounts::new(400, 300, 200, 100)),
            production: Some(ResourceAmounts::zero()),
            troops: Some(troops_factory(defenders)),
            last_tick_at: Some(now),
            ..Default::default()
        });

        let uow: Box<dyn UnitOfWork<'static> + 'static> = Box::new(MockUnitOfWork::new());
        uow.players().save(&attacker).await?;
        uow.players().save(&defender).await?;
        uow.villages().save(&atk_village).await?;
        uow.villages().save(&def_village).await?;

        let task = AttackTask {
            attacker_village_id: atk_village.id,
            attacker_player_id: attacker.id,
            target_village_id: def_village.id,
            troops: troops_factory(attackers),
            attack_type,
            arrives_at: now + Duration::seconds(1),
        };
        let job = Job::with_deadline(
            attacker.id,
            def_village.id,
            JobPayload::new(AttackTask::TASK_TYPE, json!(task)),
            task.arrives_at,
        );

        Ok(Setup {
            ctx: JobHandlerContext::new(uow, Arc::new(Config::default())),
            task,
            job,
        })
    }

    #[tokio::test]
    async fn test_victorious_attack_loots_and_returns() -> Result<()> {
        let Setup { ctx, task, job } =
            setup(&[(UnitKind::Cavalry, 100)], &[(UnitKind::Spearmen, 5)], AttackType::Normal)
                .await?;

        AttackJobHandler::new(task.clone()).handle(&ctx, &job).await?;

        let reports = ctx.uow.reports().list_by_village(2, 10).await?;
        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        assert_eq!(report.result.status, BattleStatus::Victory);
        assert_eq!(report.attacker_village_id, 1);
        assert_eq!(report.defender_village_id, 2);

        let def_village = ctx.uow.villages().get_by_id(2).await?;
        assert!(def_village.troops.is_empty());
        assert_eq!(
            def_village.resources.amounts(),
            ResourceAmounts::new(400, 300, 200, 100).subtract(&report.result.loot)
        );

        let attacker = ctx.uow.players().get_by_id(task.attacker_player_id).await?;
        assert_eq!(attacker.attack_points, report.result.attacker_points as u64);
        let defender = ctx.uow.players().get_by_id(report.defender_player_id).await?;
        assert_eq!(defender.defense_points, report.result.defender_points as u64);

        let jobs = ctx.uow.jobs().list_by_village_id(1).await?;
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].task.task_type, ArmyReturnTask::TASK_TYPE);
        let back: ArmyReturnTask = serde_json::from_value(jobs[0].task.data.clone())?;
        assert_eq!(back.loot, report.result.loot);
        assert_eq!(back.from_village_id, 2);
        assert_eq!(back.destination_village_id, 1);

        let events = ctx.events.lock().await;
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.name() == "battleReportReceived"));
        assert_eq!(events[0].village_id(), 1);
        assert_eq!(events[1].village_id(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_retried_attack_fights_at_arrival_time() -> Result<()> {
        let Setup { ctx, task, mut job } =
            setup(&[(UnitKind::Cavalry, 100)], &[], AttackType::Raid).await?;
        // a retry pushed the job back, the army still arrived on time
        job.completed_at = task.arrives_at + Duration::minutes(5);

        AttackJobHandler::new(task.clone()).handle(&ctx, &job).await?;

        let def_village = ctx.uow.villages().get_by_id(2).await?;
        assert_eq!(def_village.last_tick_at, task.arrives_at);

        let back = &ctx.uow.jobs().list_by_village_id(1).await?[0];
        let travel = Coordinates::new(3, 4).travel_time_secs(
            &Coordinates::new(0, 0),
            UnitKind::Cavalry.stats().speed,
            ctx.config.speed,
        ) as i64;
        assert_eq!(back.completed_at, task.arrives_at + Duration::seconds(travel));

        Ok(())
    }

    #[tokio::test]
    async fn test_wiped_out_attack_schedules_no_return() -> Result<()> {
        let Setup { ctx, task, job } =
            setup(&[(UnitKind::Spearmen, 1)], &[(UnitKind::Spearmen, 500)], AttackType::Normal)
                .await?;

        AttackJobHandler::new(task).handle(&ctx, &job).await?;

        let reports = ctx.uow.reports().list_by_village(1, 10).await?;
        assert_eq!(reports[0].result.status, BattleStatus::Defeat);
        assert!(reports[0].result.loot.is_empty());
        assert!(ctx.uow.jobs().list_by_village_id(1).await?.is_empty());

        Ok(())
    }

    #[test]
    fn test_locks_only_the_target() {
        let task = AttackTask {
            attacker_village_id: 1,
            attacker_player_id: uuid::Uuid::new_v4(),
            target_village_id: 9,
            troops: troops_factory(&[(UnitKind::Archers, 1)]),
            attack_type: AttackType::Raid,
            arrives_at: Utc::now(),
        };
        let job = Job::new(
            task.attacker_player_id,
            9,
            0,
            JobPayload::new(AttackTask::TASK_TYPE, json!(task)),
        );
        assert_eq!(AttackJobHandler::new(task).locked_villages(&job), vec![9]);
    }
}

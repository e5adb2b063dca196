mod test_utils;

#[cfg(test)]
pub mod tests {
    use castellum_app::{
        command_handlers::AttackVillageCommandHandler,
        cqrs::{
            commands::AttackVillage,
            queries::{GetBattleReports, GetPlayerStats},
        },
        jobs::{
            JobStatus,
            tasks::{ArmyReturnTask, AttackTask},
            worker::JobOutcome,
        },
        queries_handlers::{GetBattleReportsHandler, GetPlayerStatsHandler},
    };
    use castellum_game::{events::GameEvent, test_utils::troops_factory};
    use castellum_types::{
        Result,
        army::UnitKind,
        battle::{AttackType, BattleStatus},
        common::ResourceAmounts,
        errors::{ApplicationError, GameError},
    };

    use super::test_utils::tests::{
        PartyOptions, get_village, setup_app, setup_player_party, village_jobs,
    };

    #[tokio::test]
    async fn test_full_attack_flow() -> Result<()> {
        let app = setup_app();
        let mut events = app.publisher.subscribe();

        let (attacker, attacker_village) = setup_player_party(
            &app.uow_provider,
            PartyOptions {
                troops: troops_factory(&[(UnitKind::Cavalry, 100)]),
                amounts: Some(ResourceAmounts::zero()),
                ..PartyOptions::new(1, 0, 0)
            },
        )
        .await?;
        let (defender, defender_village) =
            setup_player_party(&app.uow_provider, PartyOptions::new(2, 3, 4)).await?;

        let troops = troops_factory(&[(UnitKind::Cavalry, 100)]);
        app.app_bus
            .execute(
                AttackVillage {
                    player_id: attacker.id,
                    village_id: attacker_village.id,
                    target_village_id: defender_village.id,
                    troops,
                    attack_type: AttackType::Raid,
                },
                AttackVillageCommandHandler::new(),
            )
            .await?;

        let home = get_village(&app.uow_provider, attacker_village.id).await?;
        assert!(home.troops.is_empty(), "Troops should have left");

        let jobs = village_jobs(&app.uow_provider, defender_village.id).await?;
        assert_eq!(jobs.len(), 1);
        let attack_job = jobs[0].clone();
        assert_eq!(attack_job.task.task_type, AttackTask::TASK_TYPE);
        assert_eq!(attack_job.player_id, attacker.id);
        assert!(attack_job.completed_at > attack_job.created_at);

        let payload: AttackTask = serde_json::from_value(attack_job.task.data.clone())?;
        assert_eq!(payload.troops, troops);
        assert_eq!(payload.attacker_village_id, attacker_village.id);

        // the army arrives
        let outcomes = app.worker.process_jobs(&[attack_job.clone()]).await?;
        assert_eq!(outcomes, vec![JobOutcome::Completed]);

        let reports = app
            .app_bus
            .query(
                GetBattleReports {
                    village_id: attacker_village.id,
                    limit: 10,
                },
                GetBattleReportsHandler::new(),
            )
            .await?;
        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        assert_eq!(report.result.status, BattleStatus::Victory);
        assert_eq!(report.defender_player_id, defender.id);
        assert!(report.result.loot.total() > 0, "An empty village is raided");

        let uow = app.uow_provider.begin().await?;
        assert_eq!(uow.reports().get_by_id(report.id).await?.id, report.id);
        uow.rollback().await?;

        let raided = get_village(&app.uow_provider, defender_village.id).await?;
        assert!(raided.resources.amounts().total() < defender_village.resources.amounts().total());
        assert_eq!(
            village_jobs(&app.uow_provider, defender_village.id).await?[0].status,
            JobStatus::Completed
        );

        let received: Vec<GameEvent> = std::iter::from_fn(|| events.try_recv().ok()).collect();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0].village_id(), attacker_village.id);
        assert_eq!(received[1].village_id(), defender_village.id);
        assert!(
            received
                .iter()
                .all(|e| matches!(e, GameEvent::BattleReportReceived { report_id, .. } if *report_id == report.id))
        );

        // the survivors walk home with the loot
        let jobs = village_jobs(&app.uow_provider, attacker_village.id).await?;
        assert_eq!(jobs.len(), 1);
        let return_job = jobs[0].clone();
        assert_eq!(return_job.task.task_type, ArmyReturnTask::TASK_TYPE);
        let payload: ArmyReturnTask = serde_json::from_value(return_job.task.data.clone())?;
        assert_eq!(payload.loot, report.result.loot);

        let outcomes = app.worker.process_jobs(&[return_job]).await?;
        assert_eq!(outcomes, vec![JobOutcome::Completed]);

        let home = get_village(&app.uow_provider, attacker_village.id).await?;
        assert_eq!(home.troops, payload.troops);
        assert_eq!(
            payload.troops.total() + report.result.attacker_losses as u64,
            troops.total()
        );
        assert_eq!(home.resources.amounts(), report.result.loot);

        let stats = app
            .app_bus
            .query(
                GetPlayerStats {
                    player_id: attacker.id,
                },
                GetPlayerStatsHandler::new(),
            )
            .await?;
        assert_eq!(stats.villages_count, 1);
        assert_eq!(stats.attack_points, report.result.attacker_points as u64);

        Ok(())
    }

    #[tokio::test]
    async fn test_attack_with_missing_troops_is_rolled_back() -> Result<()> {
        let app = setup_app();
        let (attacker, attacker_village) = setup_player_party(
            &app.uow_provider,
            PartyOptions {
                troops: troops_factory(&[(UnitKind::Spearmen, 5)]),
                ..PartyOptions::new(1, 0, 0)
            },
        )
        .await?;
        setup_player_party(&app.uow_provider, PartyOptions::new(2, 1, 1)).await?;

        let result = app
            .app_bus
            .execute(
                AttackVillage {
                    player_id: attacker.id,
                    village_id: attacker_village.id,
                    target_village_id: 2,
                    troops: troops_factory(&[(UnitKind::Spearmen, 50)]),
                    attack_type: AttackType::Normal,
                },
                AttackVillageCommandHandler::new(),
            )
            .await;

        assert!(matches!(
            result,
            Err(ApplicationError::Game(GameError::NotEnoughUnits))
        ));
        let home = get_village(&app.uow_provider, attacker_village.id).await?;
        assert_eq!(home.troops.get(UnitKind::Spearmen), 5);
        assert_eq!(app.store.jobs_count().await, 0);
        Ok(())
    }
}

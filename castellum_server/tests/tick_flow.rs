mod test_utils;

#[cfg(test)]
pub mod tests {
    use chrono::{Duration, Utc};
    use std::sync::Arc;

    use castellum_app::{
        jobs::{JobStatus, tasks::GameTickTask, worker::JobOutcome},
        scheduler::TickScheduler,
    };
    use castellum_db::bootstrap_world;
    use castellum_game::{events::GameEvent, models::village::field_production};
    use castellum_types::{Result, common::ResourceAmounts};

    use super::test_utils::tests::{
        PartyOptions, get_village, setup_app, setup_player_party, village_jobs,
    };

    #[tokio::test]
    async fn test_full_game_tick_flow() -> Result<()> {
        let app = setup_app();
        let mut events = app.publisher.subscribe();
        let start = Utc::now() - Duration::hours(1);

        let (_player, village) = setup_player_party(
            &app.uow_provider,
            PartyOptions {
                amounts: Some(ResourceAmounts::zero()),
                last_tick_at: Some(start),
                ..PartyOptions::new(1, 0, 0)
            },
        )
        .await?;

        let scheduler = Arc::new(TickScheduler::new(
            app.uow_provider.clone(),
            app.config.clone(),
        ));
        let tick_at = start + Duration::hours(1);
        assert_eq!(scheduler.schedule_game_ticks(tick_at).await?, Some(1));

        let jobs = village_jobs(&app.uow_provider, village.id).await?;
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].task.task_type, GameTickTask::TASK_TYPE);
        assert_eq!(jobs[0].player_id, village.player_id);

        let outcomes = app.worker.process_due_jobs().await?;
        assert_eq!(outcomes, vec![JobOutcome::Completed]);

        let village = get_village(&app.uow_provider, village.id).await?;
        let hourly = field_production(1, app.config.speed);
        assert_eq!(village.resources.amounts(), ResourceAmounts::uniform(hourly));
        assert_eq!(village.last_tick_at, tick_at);

        let jobs = village_jobs(&app.uow_provider, village.id).await?;
        assert_eq!(jobs[0].status, JobStatus::Completed);

        let mut updates = 0;
        while let Ok(event) = events.try_recv() {
            assert_eq!(event.village_id(), village.id);
            if let GameEvent::ResourceUpdated { amount, .. } = event {
                assert_eq!(amount, hourly);
                updates += 1;
            }
        }
        assert_eq!(updates, 4);

        // same instant again: a new job runs, nothing is credited twice
        assert_eq!(scheduler.schedule_game_ticks(tick_at).await?, Some(1));
        app.worker.process_due_jobs().await?;
        let village = get_village(&app.uow_provider, village.id).await?;
        assert_eq!(village.resources.amounts(), ResourceAmounts::uniform(hourly));

        Ok(())
    }

    #[tokio::test]
    async fn test_pending_tick_is_not_enqueued_twice() -> Result<()> {
        let app = setup_app();
        setup_player_party(&app.uow_provider, PartyOptions::new(1, 0, 0)).await?;

        let scheduler = TickScheduler::new(app.uow_provider.clone(), app.config.clone());
        let later = Utc::now() + Duration::minutes(5);
        assert_eq!(scheduler.schedule_game_ticks(later).await?, Some(1));
        assert_eq!(scheduler.schedule_game_ticks(later).await?, Some(0));
        assert_eq!(app.store.jobs_count().await, 1);

        // not due yet
        assert!(app.worker.process_due_jobs().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_bootstrapped_world_gets_ticks() -> Result<()> {
        let app = setup_app();
        assert!(bootstrap_world(app.uow_provider.as_ref(), 10, 5, 1).await?);
        assert!(!bootstrap_world(app.uow_provider.as_ref(), 10, 5, 1).await?);
        assert_eq!(app.store.villages_count().await, 5);

        let scheduler = TickScheduler::new(app.uow_provider.clone(), app.config.clone());
        assert_eq!(scheduler.schedule_training(Utc::now()).await?, Some(5));

        let outcomes = app.worker.process_due_jobs().await?;
        assert_eq!(outcomes.len(), 5);
        assert!(outcomes.iter().all(|o| *o == JobOutcome::Completed));
        Ok(())
    }
}

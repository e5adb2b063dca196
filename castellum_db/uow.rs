use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use castellum_app::{
    repository::*,
    uow::{UnitOfWork, UnitOfWorkProvider},
};
use castellum_types::errors::ApplicationError;

use crate::{
    repository::*,
    store::{InMemoryStore, Staged},
};

#[derive(Debug, Clone, Default)]
pub struct InMemoryUnitOfWorkProvider {
    store: InMemoryStore,
}

impl InMemoryUnitOfWorkProvider {
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &InMemoryStore {
        &self.store
    }
}

#[async_trait::async_trait]
impl UnitOfWorkProvider for InMemoryUnitOfWorkProvider {
    async fn begin<'p>(&'p self) -> Result<Box<dyn UnitOfWork<'p> + 'p>, ApplicationError> {
        Ok(Box::new(InMemoryUnitOfWork {
            store: self.store.clone(),
            staged: Arc::new(Mutex::new(Staged::default())),
        }))
    }
}

/// Reads see committed rows plus this unit's own staged writes.
/// Claiming due jobs is the only write that bypasses staging.
#[derive(Debug, Clone)]
pub struct InMemoryUnitOfWork {
    store: InMemoryStore,
    staged: Arc<Mutex<Staged>>,
}

#[async_trait::async_trait]
impl<'a> UnitOfWork<'a> for InMemoryUnitOfWork {
    fn players(&self) -> Arc<dyn PlayerRepository + 'a> {
        Arc::new(InMemoryPlayerRepository::new(
            self.store.clone(),
            self.staged.clone(),
        ))
    }

    fn villages(&self) -> Arc<dyn VillageRepository + 'a> {
        Arc::new(InMemoryVillageRepository::new(
            self.store.clone(),
            self.staged.clone(),
        ))
    }

    fn jobs(&self) -> Arc<dyn JobRepository + 'a> {
        Arc::new(InMemoryJobRepository::new(
            self.store.clone(),
            self.staged.clone(),
        ))
    }

    fn reports(&self) -> Arc<dyn ReportRepository + 'a> {
        Arc::new(InMemoryReportRepository::new(
            self.store.clone(),
            self.staged.clone(),
        ))
    }

    async fn commit(self: Box<Self>) -> Result<(), ApplicationError> {
        let staged = std::mem::take(&mut *self.staged.lock().await);
        if staged.is_empty() {
            return Ok(());
        }

        self.store.tables.lock().await.apply(staged);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), ApplicationError> {
        let staged = std::mem::take(&mut *self.staged.lock().await);
        if !staged.is_empty() {
            debug!("Discarding staged writes");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use serde_json::json;
    use uuid::Uuid;

    use castellum_app::jobs::{Job, JobPayload, JobStatus};
    use castellum_game::test_utils::{
        PlayerFactoryOptions, VillageFactoryOptions, player_factory, village_factory,
    };
    use castellum_types::{Result, errors::DbError};

    use super::*;

    fn provider() -> InMemoryUnitOfWorkProvider {
        InMemoryUnitOfWorkProvider::new(InMemoryStore::new())
    }

    #[tokio::test]
    async fn test_writes_are_visible_after_commit_only() -> Result<()> {
        let provider = provider();
        let village = village_factory(VillageFactoryOptions {
            id: Some(1),
            ..Default::default()
        });

        let writer = provider.begin().await?;
        writer.villages().save(&village).await?;
        // read your own writes
        assert_eq!(writer.villages().get_by_id(1).await?, village);

        let reader = provider.begin().await?;
        assert!(matches!(
            reader.villages().get_by_id(1).await,
            Err(ApplicationError::Db(DbError::VillageNotFound(1)))
        ));

        writer.commit().await?;
        assert_eq!(reader.villages().get_by_id(1).await?, village);
        Ok(())
    }

    #[tokio::test]
    async fn test_rollback_discards_writes() -> Result<()> {
        let provider = provider();
        let uow = provider.begin().await?;
        uow.villages().save(&village_factory(Default::default())).await?;
        uow.rollback().await?;

        assert_eq!(provider.store().villages_count().await, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_credits_add_up() -> Result<()> {
        let provider = provider();
        let player = player_factory(PlayerFactoryOptions::default());
        let setup = provider.begin().await?;
        setup.players().save(&player).await?;
        setup.commit().await?;

        let first = provider.begin().await?;
        let second = provider.begin().await?;
        first.players().credit_points(player.id, 10, 0).await?;
        second.players().credit_points(player.id, 5, 3).await?;
        assert_eq!(first.players().get_by_id(player.id).await?.attack_points, 10);

        first.commit().await?;
        second.commit().await?;

        let reader = provider.begin().await?;
        let stored = reader.players().get_by_id(player.id).await?;
        assert_eq!(stored.attack_points, 15);
        assert_eq!(stored.defense_points, 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_credit_unknown_player() -> Result<()> {
        let provider = provider();
        let uow = provider.begin().await?;
        let result = uow.players().credit_points(Uuid::new_v4(), 1, 1).await;
        assert!(matches!(
            result,
            Err(ApplicationError::Db(DbError::PlayerNotFound(_)))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_touch_only_moves_last_seen_forward() -> Result<()> {
        let provider = provider();
        let long_ago = Utc::now() - Duration::days(3);
        let player = player_factory(PlayerFactoryOptions {
            last_seen_at: Some(long_ago),
            ..Default::default()
        });
        let setup = provider.begin().await?;
        setup.players().save(&player).await?;
        setup.commit().await?;

        let now = Utc::now();
        let first = provider.begin().await?;
        let second = provider.begin().await?;
        first.players().touch(player.id, now).await?;
        first.players().touch(player.id, now - Duration::hours(1)).await?;
        second.players().touch(player.id, now - Duration::minutes(5)).await?;
        second.players().credit_points(player.id, 7, 0).await?;
        assert_eq!(first.players().get_by_id(player.id).await?.last_seen_at, now);

        first.commit().await?;
        second.commit().await?;

        let reader = provider.begin().await?;
        let stored = reader.players().get_by_id(player.id).await?;
        assert_eq!(stored.last_seen_at, now);
        assert_eq!(stored.attack_points, 7);

        assert!(matches!(
            reader.players().touch(Uuid::new_v4(), now).await,
            Err(ApplicationError::Db(DbError::PlayerNotFound(_)))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_due_jobs_are_claimed_once() -> Result<()> {
        let provider = provider();
        let setup = provider.begin().await?;
        let player_id = Uuid::new_v4();
        let due = Job::new(player_id, 1, 0, JobPayload::new("GameTick", json!({})));
        let later = Job::new(player_id, 2, 3600, JobPayload::new("GameTick", json!({})));
        setup.jobs().add(&due).await?;
        setup.jobs().add(&later).await?;
        setup.commit().await?;

        let first = provider.begin().await?;
        let second = provider.begin().await?;
        let claimed = first.jobs().find_and_lock_due_jobs(10).await?;
        assert_eq!(claimed.len(), 1);
        assert_eq!(claimed[0].id, due.id);
        assert_eq!(claimed[0].status, JobStatus::Processing);
        assert!(second.jobs().find_and_lock_due_jobs(10).await?.is_empty());

        assert!(second.jobs().exists_active(1, "GameTick").await?);
        assert!(!second.jobs().exists_active(1, "Attack").await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_job_status_changes_apply_on_commit() -> Result<()> {
        let provider = provider();
        let job = Job::new(Uuid::new_v4(), 1, 0, JobPayload::new("GameTick", json!({})));
        let setup = provider.begin().await?;
        setup.jobs().add(&job).await?;
        setup.commit().await?;

        let uow = provider.begin().await?;
        let run_at = Utc::now() + Duration::seconds(30);
        uow.jobs().reschedule(job.id, run_at, "village locked").await?;
        uow.commit().await?;

        let reader = provider.begin().await?;
        let stored = reader.jobs().get_by_id(job.id).await?;
        assert_eq!(stored.status, JobStatus::Pending);
        assert_eq!(stored.attempts, 1);
        assert_eq!(stored.completed_at, run_at);

        let uow = provider.begin().await?;
        uow.jobs().mark_as_completed(job.id).await?;
        uow.rollback().await?;
        assert_eq!(
            reader.jobs().get_by_id(job.id).await?.status,
            JobStatus::Pending
        );

        let missing = reader.jobs().mark_as_failed(Uuid::new_v4(), "boom").await;
        assert!(matches!(
            missing,
            Err(ApplicationError::Db(DbError::JobNotFound(_)))
        ));
        Ok(())
    }
}

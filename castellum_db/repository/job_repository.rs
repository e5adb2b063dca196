use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use castellum_app::{jobs::Job, repository::JobRepository};
use castellum_types::errors::{ApplicationError, DbError};

use crate::{
    models as db_models,
    store::{InMemoryStore, JobUpdate, Staged},
};

#[derive(Clone)]
pub struct InMemoryJobRepository {
    store: InMemoryStore,
    staged: Arc<Mutex<Staged>>,
}

impl InMemoryJobRepository {
    pub(crate) fn new(store: InMemoryStore, staged: Arc<Mutex<Staged>>) -> Self {
        Self { store, staged }
    }

    async fn stage_update(&self, job_id: Uuid, update: JobUpdate) -> Result<(), ApplicationError> {
        let mut staged = self.staged.lock().await;
        let exists = staged.new_jobs.iter().any(|j| j.id == job_id)
            || self.store.tables.lock().await.jobs.contains_key(&job_id);
        if !exists {
            return Err(ApplicationError::Db(DbError::JobNotFound(job_id)));
        }

        staged.job_updates.push((job_id, update));
        Ok(())
    }

    /// Committed and staged rows matching `filter`, oldest deadline first.
    async fn select(
        &self,
        filter: impl Fn(&db_models::Job) -> bool,
    ) -> Result<Vec<Job>, ApplicationError> {
        let staged = self.staged.lock().await;
        let tables = self.store.tables.lock().await;

        let mut rows: Vec<&db_models::Job> = tables
            .jobs
            .values()
            .chain(staged.new_jobs.iter())
            .filter(|j| filter(j))
            .collect();
        rows.sort_by_key(|j| (j.completed_at, j.created_at));

        rows.into_iter().cloned().map(Job::try_from).collect()
    }
}

#[async_trait::async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn add(&self, job: &Job) -> Result<(), ApplicationError> {
        let row = db_models::Job::try_from(job)?;
        self.staged.lock().await.new_jobs.push(row);
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Job, ApplicationError> {
        self.select(|j| j.id == id)
            .await?
            .pop()
            .ok_or(ApplicationError::Db(DbError::JobNotFound(id)))
    }

    async fn list_by_player_id(&self, id: Uuid) -> Result<Vec<Job>, ApplicationError> {
        self.select(|j| j.player_id == id).await
    }

    async fn list_by_village_id(&self, village_id: u32) -> Result<Vec<Job>, ApplicationError> {
        let village_id = village_id as i64;
        self.select(|j| j.village_id == village_id).await
    }

    async fn exists_active(
        &self,
        village_id: u32,
        task_type: &str,
    ) -> Result<bool, ApplicationError> {
        let village_id = village_id as i64;
        let active = self
            .select(|j| {
                j.village_id == village_id
                    && matches!(
                        j.status,
                        db_models::JobStatus::Pending | db_models::JobStatus::Processing
                    )
                    && j.task["task_type"] == task_type
            })
            .await?;
        Ok(!active.is_empty())
    }

    async fn find_and_lock_due_jobs(&self, limit: usize) -> Result<Vec<Job>, ApplicationError> {
        let now = Utc::now();
        let mut tables = self.store.tables.lock().await;

        let mut due: Vec<&mut db_models::Job> = tables
            .jobs
            .values_mut()
            .filter(|j| j.status == db_models::JobStatus::Pending && j.completed_at <= now)
            .collect();
        due.sort_by_key(|j| (j.completed_at, j.created_at));

        // claimed right away, under the table lock, so no two workers get the same job
        due.into_iter()
            .take(limit)
            .map(|job| {
                job.status = db_models::JobStatus::Processing;
                job.updated_at = now;
                Job::try_from(job.clone())
            })
            .collect()
    }

    async fn mark_as_completed(&self, job_id: Uuid) -> Result<(), ApplicationError> {
        self.stage_update(job_id, JobUpdate::Completed).await
    }

    async fn mark_as_failed(
        &self,
        job_id: Uuid,
        error_message: &str,
    ) -> Result<(), ApplicationError> {
        self.stage_update(job_id, JobUpdate::Failed(error_message.to_string()))
            .await
    }

    async fn reschedule(
        &self,
        job_id: Uuid,
        run_at: DateTime<Utc>,
        error_message: &str,
    ) -> Result<(), ApplicationError> {
        self.stage_update(
            job_id,
            JobUpdate::Rescheduled {
                run_at,
                error: error_message.to_string(),
            },
        )
        .await
    }
}

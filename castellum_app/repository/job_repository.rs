use chrono::{DateTime, Utc};
use uuid::Uuid;

use castellum_types::errors::ApplicationError;

use crate::jobs::Job;

#[async_trait::async_trait]
pub trait JobRepository: Send + Sync {
    /// Stores a new job. Visible to workers once the unit of work commits.
    async fn add(&self, job: &Job) -> Result<(), ApplicationError>;

    /// Find a job by id.
    async fn get_by_id(&self, id: Uuid) -> Result<Job, ApplicationError>;

    /// Lists jobs created by a player.
    async fn list_by_player_id(&self, id: Uuid) -> Result<Vec<Job>, ApplicationError>;

    /// Lists all jobs of a village, oldest deadline first.
    async fn list_by_village_id(&self, village_id: u32) -> Result<Vec<Job>, ApplicationError>;

    /// Whether a pending or processing job of `task_type` exists for the village.
    async fn exists_active(
        &self,
        village_id: u32,
        task_type: &str,
    ) -> Result<bool, ApplicationError>;

    /// Finds and locks atomically overdue jobs, setting the status to "Processing".
    /// This prevents several workers getting the same job.
    async fn find_and_lock_due_jobs(&self, limit: usize) -> Result<Vec<Job>, ApplicationError>;

    /// Set job status to "Completed".
    async fn mark_as_completed(&self, job_id: Uuid) -> Result<(), ApplicationError>;

    /// Set job status to "Failed", possibly with an error message.
    async fn mark_as_failed(&self, job_id: Uuid, error_message: &str)
    -> Result<(), ApplicationError>;

    /// Puts a job back to "Pending", due at `run_at`, counting one more attempt.
    async fn reschedule(
        &self,
        job_id: Uuid,
        run_at: DateTime<Utc>,
        error_message: &str,
    ) -> Result<(), ApplicationError>;
}

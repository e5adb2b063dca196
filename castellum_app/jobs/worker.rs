use chrono::{Duration as ChronoDuration, Utc};
use std::{sync::Arc, time::Duration};
use tokio::{task::JoinSet, time};
use tracing::{debug, error, info, instrument, warn};

use castellum_game::events::GameEvent;
use castellum_types::errors::ApplicationError;

use crate::{
    config::Config,
    events::EventPublisher,
    jobs::{
        Job,
        handler::{JobHandler, JobHandlerContext, JobRegistry},
    },
    locks::VillageLocks,
    uow::UnitOfWorkProvider,
};

/// What happened to a single job run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Completed,
    Rescheduled,
    Failed,
}

/// Responsible for polling and executing due jobs.
pub struct JobWorker {
    uow_provider: Arc<dyn UnitOfWorkProvider>,
    registry: Arc<dyn JobRegistry>,
    config: Arc<Config>,
    locks: VillageLocks,
    publisher: Arc<dyn EventPublisher>,
}

impl JobWorker {
    pub fn new(
        uow_provider: Arc<dyn UnitOfWorkProvider>,
        registry: Arc<dyn JobRegistry>,
        config: Arc<Config>,
        locks: VillageLocks,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            uow_provider,
            registry,
            config,
            locks,
            publisher,
        }
    }

    /// Runs the polling loop inside a tokio task.
    pub fn run(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = time::interval(Duration::from_secs(1));
            info!("Job Worker started.");

            loop {
                interval.tick().await;
                if let Err(e) = self.process_due_jobs().await {
                    error!(error = %e, "Error while processing jobs");
                }
            }
        })
    }

    /// Claims up to `worker_batch_size` due jobs and runs them.
    pub async fn process_due_jobs(self: &Arc<Self>) -> Result<Vec<JobOutcome>, ApplicationError> {
        let uow = self.uow_provider.begin().await?;
        let due_jobs = uow
            .jobs()
            .find_and_lock_due_jobs(self.config.worker_batch_size)
            .await?;
        uow.commit().await?;

        if due_jobs.is_empty() {
            return Ok(vec![]);
        }
        debug!(count = due_jobs.len(), "Found due jobs");

        self.process_jobs(&due_jobs).await
    }

    /// Runs `jobs` concurrently. Jobs touching the same village are serialized
    /// by the village locks: the loser is retried later.
    ///
    /// Every job runs to the end even if another one errors. The first error
    /// is returned once all of them are done.
    pub async fn process_jobs(
        self: &Arc<Self>,
        jobs: &[Job],
    ) -> Result<Vec<JobOutcome>, ApplicationError> {
        let mut set = JoinSet::new();
        for job in jobs.iter().cloned() {
            let worker = Arc::clone(self);
            set.spawn(async move { worker.process_job(job).await });
        }

        let mut outcomes = Vec::with_capacity(jobs.len());
        let mut first_error = None;
        while let Some(joined) = set.join_next().await {
            let result = joined
                .map_err(|e| ApplicationError::Unknown(format!("job task aborted: {e}")))
                .and_then(|outcome| outcome);
            match result {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    error!(error = %e, "Job run failed");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(outcomes),
        }
    }

    #[instrument(skip_all, fields(
        job_id = %job.id,
        task_type = %job.task.task_type,
        village_id = job.village_id,
        attempt = job.attempts + 1,
    ))]
    async fn process_job(&self, job: Job) -> Result<JobOutcome, ApplicationError> {
        let handler = match self
            .registry
            .get_handler(&job.task.task_type, &job.task.data)
        {
            Ok(handler) => handler,
            Err(e) => return self.handle_failure(&job, e).await,
        };

        let villages = handler.locked_villages(&job);
        let guards = match self.locks.try_lock_many(&villages) {
            Ok(guards) => guards,
            Err(e) => return self.handle_failure(&job, e).await,
        };

        let result = self.execute(handler.as_ref(), &job).await;
        drop(guards);

        match result {
            Ok(events) => {
                info!(events = events.len(), "Job completed");
                if !events.is_empty() {
                    self.publisher.publish(events).await;
                }
                Ok(JobOutcome::Completed)
            }
            Err(e) => self.handle_failure(&job, e).await,
        }
    }

    /// Runs the handler inside one unit of work. The job is marked completed in
    /// the same unit of work, so a committed job never runs twice.
    async fn execute(
        &self,
        handler: &dyn JobHandler,
        job: &Job,
    ) -> Result<Vec<GameEvent>, ApplicationError> {
        let uow = self.uow_provider.begin().await?;
        let ctx = JobHandlerContext::new(uow, self.config.clone());

        let outcome = match handler.handle(&ctx, job).await {
            Ok(()) => ctx.uow.jobs().mark_as_completed(job.id).await,
            Err(e) => Err(e),
        };

        let JobHandlerContext { uow, events, .. } = ctx;
        match outcome {
            Ok(()) => {
                uow.commit().await?;
                Ok(events.into_inner())
            }
            Err(e) => {
                uow.rollback().await?;
                Err(e)
            }
        }
    }

    async fn handle_failure(
        &self,
        job: &Job,
        error: ApplicationError,
    ) -> Result<JobOutcome, ApplicationError> {
        let uow = self.uow_provider.begin().await?;
        let message = error.to_string();

        let outcome = if error.is_transient() && job.attempts < self.config.job_max_retries {
            let backoff = self
                .config
                .retry_backoff_secs
                .saturating_mul(job.attempts as u64 + 1);
            let run_at = Utc::now() + ChronoDuration::seconds(backoff as i64);
            warn!(error = %message, %run_at, "Job rescheduled");
            uow.jobs().reschedule(job.id, run_at, &message).await?;
            JobOutcome::Rescheduled
        } else {
            error!(error = %message, "Job has failed");
            uow.jobs().mark_as_failed(job.id, &message).await?;
            JobOutcome::Failed
        };

        uow.commit().await?;
        Ok(outcome)
    }
}

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use castellum_types::errors::ApplicationError;

use crate::{
    config::Config,
    jobs::{
        Job, JobPayload,
        tasks::{GameTickTask, TrainingQueueTask},
    },
    uow::UnitOfWorkProvider,
};

/// Enqueues periodic per-village jobs: game ticks and training queue runs.
pub struct TickScheduler {
    uow_provider: Arc<dyn UnitOfWorkProvider>,
    config: Arc<Config>,
    ticks_in_flight: AtomicBool,
    training_in_flight: AtomicBool,
}

/// Clears an in-flight flag when a round ends, even on error.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl TickScheduler {
    pub fn new(uow_provider: Arc<dyn UnitOfWorkProvider>, config: Arc<Config>) -> Self {
        Self {
            uow_provider,
            config,
            ticks_in_flight: AtomicBool::new(false),
            training_in_flight: AtomicBool::new(false),
        }
    }

    /// Starts both interval loops. Each fire runs in its own task, so a slow
    /// round makes the next fire skip instead of delaying the timer.
    pub fn run(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticks = time::interval(Duration::from_secs(self.config.tick_interval_secs));
            let mut training =
                time::interval(Duration::from_secs(self.config.training_interval_secs));
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
            training.set_missed_tick_behavior(MissedTickBehavior::Skip);

            info!(
                tick_interval_secs = self.config.tick_interval_secs,
                training_interval_secs = self.config.training_interval_secs,
                "Tick Scheduler started."
            );

            loop {
                tokio::select! {
                    _ = ticks.tick() => {
                        let scheduler = Arc::clone(&self);
                        tokio::spawn(async move {
                            if let Err(e) = scheduler.schedule_game_ticks(Utc::now()).await {
                                error!(error = %e, "Failed to schedule game ticks");
                            }
                        });
                    }
                    _ = training.tick() => {
                        let scheduler = Arc::clone(&self);
                        tokio::spawn(async move {
                            if let Err(e) = scheduler.schedule_training(Utc::now()).await {
                                error!(error = %e, "Failed to schedule training queues");
                            }
                        });
                    }
                }
            }
        })
    }

    /// Enqueues a `GameTick` for every village without one pending.
    /// Returns `None` when the previous round is still running.
    pub async fn schedule_game_ticks(
        &self,
        tick_at: DateTime<Utc>,
    ) -> Result<Option<usize>, ApplicationError> {
        let Some(_in_flight) = InFlight::acquire(&self.ticks_in_flight) else {
            warn!("Previous game tick round still running, skipping");
            return Ok(None);
        };

        let data = serde_json::to_value(GameTickTask { tick_at })?;
        self.enqueue_round(GameTickTask::TASK_TYPE, data, tick_at)
            .await
            .map(Some)
    }

    /// Enqueues a `ProcessTrainingQueue` for every village without one pending.
    pub async fn schedule_training(
        &self,
        tick_at: DateTime<Utc>,
    ) -> Result<Option<usize>, ApplicationError> {
        let Some(_in_flight) = InFlight::acquire(&self.training_in_flight) else {
            warn!("Previous training round still running, skipping");
            return Ok(None);
        };

        let data = serde_json::to_value(TrainingQueueTask { tick_at })?;
        self.enqueue_round(TrainingQueueTask::TASK_TYPE, data, tick_at)
            .await
            .map(Some)
    }

    async fn enqueue_round(
        &self,
        task_type: &str,
        data: Value,
        run_at: DateTime<Utc>,
    ) -> Result<usize, ApplicationError> {
        let uow = self.uow_provider.begin().await?;
        let village_repo = uow.villages();
        let job_repo = uow.jobs();

        let mut enqueued = 0;
        for village_id in village_repo.list_ids().await? {
            if job_repo.exists_active(village_id, task_type).await? {
                continue;
            }

            let village = village_repo.get_by_id(village_id).await?;
            let job = Job::with_deadline(
                village.player_id,
                village_id,
                JobPayload::new(task_type, data.clone()),
                run_at,
            );
            job_repo.add(&job).await?;
            enqueued += 1;
        }

        uow.commit().await?;
        debug!(task_type, enqueued, "Scheduled village jobs");
        Ok(enqueued)
    }
}

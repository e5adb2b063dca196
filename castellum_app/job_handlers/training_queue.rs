use async_trait::async_trait;
use tracing::{info, instrument};

use castellum_game::events::GameEvent;
use castellum_types::errors::ApplicationError;

use crate::jobs::{
    Job,
    handler::{JobHandler, JobHandlerContext},
    tasks::TrainingQueueTask,
};

pub struct TrainingQueueJobHandler {
    payload: TrainingQueueTask,
}

impl TrainingQueueJobHandler {
    pub fn new(payload: TrainingQueueTask) -> Self {
        Self { payload }
    }
}

#[async_trait]
impl JobHandler for TrainingQueueJobHandler {
    #[instrument(skip_all, fields(
        task_type = "ProcessTrainingQueue",
        village_id = job.village_id,
    ))]
    async fn handle<'ctx, 'a>(
        &'ctx self,
        ctx: &'ctx JobHandlerContext<'a>,
        job: &'ctx Job,
    ) -> Result<(), ApplicationError> {
        let village_repo = ctx.uow.villages();
        let mut village = village_repo.get_by_id(job.village_id).await?;

        if village.training_queue.is_empty() {
            return Ok(());
        }

        let delivered = village.process_training(self.payload.tick_at);
        if delivered.is_empty() {
            return Ok(());
        }

        village_repo.save(&village).await?;

        for (unit, quantity) in delivered {
            info!(unit = unit.key(), quantity, "Units trained");
            ctx.emit(GameEvent::TroopsTrained {
                village_id: village.id,
                unit,
                quantity,
            })
            .await;
        }

        Ok(())
    }
}

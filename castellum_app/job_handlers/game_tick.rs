use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use castellum_game::events::GameEvent;
use castellum_types::{common::ResourceType, errors::ApplicationError};

use crate::jobs::{
    Job,
    handler::{JobHandler, JobHandlerContext},
    tasks::GameTickTask,
};

pub struct GameTickJobHandler {
    payload: GameTickTask,
}

impl GameTickJobHandler {
    pub fn new(payload: GameTickTask) -> Self {
        Self { payload }
    }
}

#[async_trait]
impl JobHandler for GameTickJobHandler {
    #[instrument(skip_all, fields(
        task_type = "GameTick",
        village_id = job.village_id,
        tick_at = %self.payload.tick_at,
    ))]
    async fn handle<'ctx, 'a>(
        &'ctx self,
        ctx: &'ctx JobHandlerContext<'a>,
        job: &'ctx Job,
    ) -> Result<(), ApplicationError> {
        let tick_at = self.payload.tick_at;
        let speed = ctx.config.speed;
        let village_repo = ctx.uow.villages();
        let mut village = village_repo.get_by_id(job.village_id).await?;

        if tick_at <= village.last_tick_at {
            debug!(last_tick_at = %village.last_tick_at, "Tick already applied, skipping");
            return Ok(());
        }

        let caught_up = village.catch_up(tick_at, speed)?;
        if !caught_up.wasted.is_empty() {
            warn!(wasted = caught_up.wasted.total(), "Storage full, production wasted");
        }

        let mut events: Vec<GameEvent> = caught_up
            .completed
            .iter()
            .map(|order| {
                info!(resource = %order.resource, level = order.target_level, "Field upgrade completed");
                GameEvent::BuildingCompleted {
                    village_id: village.id,
                    resource: order.resource,
                    level: order.target_level,
                }
            })
            .collect();

        for resource in ResourceType::ALL {
            let status = village.resources.status(resource);
            events.push(GameEvent::ResourceUpdated {
                village_id: village.id,
                resource,
                amount: status.amount,
                is_full: status.is_full,
            });
        }

        village_repo.save(&village).await?;
        ctx.emit_all(events).await;

        Ok(())
    }
}

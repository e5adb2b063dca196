use async_trait::async_trait;
use tracing::{info, instrument, warn};

use castellum_types::errors::ApplicationError;

use crate::jobs::{
    Job,
    handler::{JobHandler, JobHandlerContext},
    tasks::ArmyReturnTask,
};

pub struct ArmyReturnJobHandler {
    payload: ArmyReturnTask,
}

impl ArmyReturnJobHandler {
    pub fn new(payload: ArmyReturnTask) -> Self {
        Self { payload }
    }
}

#[async_trait]
impl JobHandler for ArmyReturnJobHandler {
    fn locked_villages(&self, _job: &Job) -> Vec<u32> {
        vec![self.payload.destination_village_id]
    }

    #[instrument(skip_all, fields(
        task_type = "ArmyReturn",
        player_id = %job.player_id,
        village_id = self.payload.destination_village_id,
        from_village_id = self.payload.from_village_id,
    ))]
    async fn handle<'ctx, 'a>(
        &'ctx self,
        ctx: &'ctx JobHandlerContext<'a>,
        job: &'ctx Job,
    ) -> Result<(), ApplicationError> {
        info!("Executing ArmyReturn job");

        let village_repo = ctx.uow.villages();
        let mut village = village_repo
            .get_by_id(self.payload.destination_village_id)
            .await?;

        village.receive_troops(&self.payload.troops);
        let wasted = village.store_resources(&self.payload.loot);
        if !wasted.is_empty() {
            warn!(wasted = wasted.total(), "Loot exceeded storage capacity");
        }

        village_repo.save(&village).await?;

        Ok(())
    }
}

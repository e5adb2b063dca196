use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use castellum_types::errors::ApplicationError;

use crate::{
    command_handlers::helpers::load_owned_village,
    config::Config,
    cqrs::{CommandHandler, commands::UpgradeResourceField},
    uow::UnitOfWork,
};

pub struct UpgradeResourceFieldCommandHandler {}

impl UpgradeResourceFieldCommandHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait::async_trait]
impl CommandHandler<UpgradeResourceField> for UpgradeResourceFieldCommandHandler {
    async fn handle(
        &self,
        command: UpgradeResourceField,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        config: &Arc<Config>,
    ) -> Result<(), ApplicationError> {
        let mut village =
            load_owned_village(uow, command.village_id, command.player_id, config.speed).await?;

        let now = Utc::now();
        let order = village.enqueue_field_upgrade(command.resource, now, config.speed)?;
        uow.villages().save(&village).await?;
        uow.players().touch(command.player_id, now).await?;

        // completion is picked up by the first game tick past `completes_at`
        info!(
            village_id = village.id,
            resource = %order.resource,
            level = order.target_level,
            completes_at = %order.completes_at,
            "Field upgrade started."
        );

        Ok(())
    }
}

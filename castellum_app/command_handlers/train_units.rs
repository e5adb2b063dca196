use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use castellum_types::errors::ApplicationError;

use crate::{
    command_handlers::helpers::load_owned_village,
    config::Config,
    cqrs::{CommandHandler, commands::TrainUnits},
    uow::UnitOfWork,
};

pub struct TrainUnitsCommandHandler {}

impl TrainUnitsCommandHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait::async_trait]
impl CommandHandler<TrainUnits> for TrainUnitsCommandHandler {
    async fn handle(
        &self,
        command: TrainUnits,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        config: &Arc<Config>,
    ) -> Result<(), ApplicationError> {
        let mut village =
            load_owned_village(uow, command.village_id, command.player_id, config.speed).await?;

        let now = Utc::now();
        let order = village.enqueue_training(command.unit, command.quantity, now, config.speed)?;
        uow.villages().save(&village).await?;
        uow.players().touch(command.player_id, now).await?;

        info!(
            village_id = village.id,
            unit = order.unit.key(),
            quantity = order.quantity,
            finishes_at = %order.finishes_at(),
            "Training queued."
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use castellum_game::test_utils::{
        PlayerFactoryOptions, VillageFactoryOptions, player_factory, village_factory,
    };
    use castellum_types::{
        Result,
        army::UnitKind,
        common::ResourceAmounts,
        errors::{AppError, GameError},
    };

    use super::*;
    use crate::test_utils::tests::MockUnitOfWork;

    #[tokio::test]
    async fn test_train_units_queues_and_pays() -> Result<()> {
        let mock_uow: Box<dyn UnitOfWork<'_> + '_> = Box::new(MockUnitOfWork::new());
        let config = Arc::new(Config::default());
        let player = player_factory(PlayerFactoryOptions::default());
        let village = village_factory(VillageFactoryOptions {
            player: Some(player.clone()),
            amounts: Some(ResourceAmounts::uniform(5_000)),
            capacity: Some(ResourceAmounts::uniform(5_000)),
            production: Some(ResourceAmounts::zero()),
            ..Default::default()
        });
        mock_uow.players().save(&player).await?;
        mock_uow.villages().save(&village).await?;

        let command = TrainUnits {
            player_id: player.id,
            village_id: village.id,
            unit: UnitKind::Archers,
            quantity: 3,
        };
        TrainUnitsCommandHandler::new()
            .handle(command, &mock_uow, &config)
            .await?;

        let updated = mock_uow.villages().get_by_id(village.id).await?;
        assert_eq!(updated.training_queue.len(), 1);
        assert_eq!(updated.training_queue[0].quantity, 3);
        let cost = UnitKind::Archers.stats().cost.multiply(3.0);
        assert_eq!(
            updated.resources.amounts(),
            ResourceAmounts::uniform(5_000).subtract(&cost)
        );
        let seen = mock_uow.players().get_by_id(player.id).await?.last_seen_at;
        assert!(seen >= updated.training_queue[0].started_at);

        Ok(())
    }

    #[tokio::test]
    async fn test_train_units_in_foreign_village() -> Result<()> {
        let mock_uow: Box<dyn UnitOfWork<'_> + '_> = Box::new(MockUnitOfWork::new());
        let config = Arc::new(Config::default());
        let village = village_factory(Default::default());
        mock_uow.villages().save(&village).await?;

        let intruder = uuid::Uuid::new_v4();
        let result = TrainUnitsCommandHandler::new()
            .handle(
                TrainUnits {
                    player_id: intruder,
                    village_id: village.id,
                    unit: UnitKind::Spearmen,
                    quantity: 1,
                },
                &mock_uow,
                &config,
            )
            .await;

        assert!(matches!(
            result,
            Err(ApplicationError::App(AppError::VillageNotOwned { player_id, .. })) if player_id == intruder
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_train_units_without_resources() -> Result<()> {
        let mock_uow: Box<dyn UnitOfWork<'_> + '_> = Box::new(MockUnitOfWork::new());
        let config = Arc::new(Config::default());
        let village = village_factory(VillageFactoryOptions {
            amounts: Some(ResourceAmounts::zero()),
            production: Some(ResourceAmounts::zero()),
            ..Default::default()
        });
        mock_uow.villages().save(&village).await?;

        let result = TrainUnitsCommandHandler::new()
            .handle(
                TrainUnits {
                    player_id: village.player_id,
                    village_id: village.id,
                    unit: UnitKind::Catapults,
                    quantity: 1,
                },
                &mock_uow,
                &config,
            )
            .await;

        assert!(matches!(
            result,
            Err(ApplicationError::Game(GameError::NotEnoughResources))
        ));
        Ok(())
    }
}

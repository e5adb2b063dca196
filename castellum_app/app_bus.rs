use std::sync::Arc;
use tracing::debug;

use castellum_types::errors::ApplicationError;

use crate::{
    config::Config,
    cqrs::{Command, CommandHandler, Query, QueryHandler},
    locks::VillageLocks,
    uow::UnitOfWorkProvider,
};

/// AppBus (Mediator)
/// The entry point for all application logic. It holds no business logic:
/// it manages unit of work lifecycles and dispatches commands and queries
/// to their handlers.
pub struct AppBus {
    config: Arc<Config>,
    uow_provider: Arc<dyn UnitOfWorkProvider>,
    locks: VillageLocks,
}

impl AppBus {
    pub fn new(
        config: Arc<Config>,
        uow_provider: Arc<dyn UnitOfWorkProvider>,
        locks: VillageLocks,
    ) -> Self {
        Self {
            config,
            uow_provider,
            locks,
        }
    }

    /// Executes a command inside a unit of work: commit on success,
    /// rollback on failure. The villages the command writes to stay locked
    /// until the unit of work is closed.
    pub async fn execute<C, H>(&self, cmd: C, handler: H) -> Result<(), ApplicationError>
    where
        C: Command,
        H: CommandHandler<C>,
    {
        let _guards = self.locks.lock_many(&cmd.locked_villages()).await?;
        let uow = self.uow_provider.begin().await?;

        match handler.handle(cmd, &uow, &self.config).await {
            Ok(_) => {
                uow.commit().await?;
                Ok(())
            }
            Err(e) => {
                debug!(error = %e, "Command failed, rolling back");
                uow.rollback().await?;
                Err(e)
            }
        }
    }

    /// Executes a query. The unit of work is always rolled back.
    pub async fn query<Q, H>(&self, query: Q, handler: H) -> Result<Q::Output, ApplicationError>
    where
        Q: Query,
        H: QueryHandler<Q>,
    {
        let uow = self.uow_provider.begin().await?;

        let result = handler.handle(query, &uow, &self.config).await;

        // Always rollback a query, as it should never write data.
        uow.rollback().await?;

        result
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
        errors::GameError,
    };

    use super::*;
    use crate::{
        command_handlers::TrainUnitsCommandHandler,
        cqrs::{commands::TrainUnits, queries::GetVillage},
        queries_handlers::GetVillageHandler,
        test_utils::tests::{MockUnitOfWork, MockUnitOfWorkProvider},
        uow::UnitOfWork,
    };

    async fn bus_with_village(
        amounts: ResourceAmounts,
    ) -> Result<(AppBus, MockUnitOfWork, u32, uuid::Uuid)> {
        let uow = MockUnitOfWork::new();
        let player = player_factory(PlayerFactoryOptions::default());
        uow.players().save(&player).await?;
        let village = village_factory(VillageFactoryOptions {
            player: Some(player),
            amounts: Some(amounts),
            production: Some(ResourceAmounts::zero()),
            ..Default::default()
        });
        uow.villages().save(&village).await?;

        let bus = AppBus::new(
            Arc::new(Config::default()),
            Arc::new(MockUnitOfWorkProvider::with_uow(uow.clone())),
            VillageLocks::new(),
        );
        Ok((bus, uow, village.id, village.player_id))
    }

    #[tokio::test]
    async fn test_successful_command_commits() -> Result<()> {
        let (bus, uow, village_id, player_id) =
            bus_with_village(ResourceAmounts::uniform(750)).await?;

        bus.execute(
            TrainUnits {
                player_id,
                village_id,
                unit: UnitKind::Spearmen,
                quantity: 1,
            },
            TrainUnitsCommandHandler::new(),
        )
        .await?;

        assert!(uow.is_committed());
        assert!(!uow.is_rolled_back());
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_command_rolls_back() -> Result<()> {
        let (bus, uow, village_id, player_id) = bus_with_village(ResourceAmounts::zero()).await?;

        let result = bus
            .execute(
                TrainUnits {
                    player_id,
                    village_id,
                    unit: UnitKind::Spearmen,
                    quantity: 1,
                },
                TrainUnitsCommandHandler::new(),
            )
            .await;

        assert!(matches!(
            result,
            Err(ApplicationError::Game(GameError::NotEnoughResources))
        ));
        assert!(uow.is_rolled_back());
        assert!(!uow.is_committed());
        Ok(())
    }

    #[tokio::test]
    async fn test_query_always_rolls_back() -> Result<()> {
        let (bus, uow, village_id, _) = bus_with_village(ResourceAmounts::zero()).await?;

        let village = bus
            .query(GetVillage { village_id }, GetVillageHandler::new())
            .await?;

        assert_eq!(village.id, village_id);
        assert!(uow.is_rolled_back());
        assert!(!uow.is_committed());
        Ok(())
    }
}

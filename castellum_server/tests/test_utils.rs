#[cfg(test)]
pub mod tests {
    use chrono::{DateTime, Utc};
    use std::sync::Arc;

    use castellum_app::{
        app_bus::AppBus,
        config::Config,
        events::BroadcastEventPublisher,
        job_registry::AppJobRegistry,
        jobs::{Job, worker::JobWorker},
        locks::VillageLocks,
        uow::UnitOfWorkProvider,
    };
    use castellum_db::{InMemoryStore, uow::InMemoryUnitOfWorkProvider};
    use castellum_game::{
        models::{player::Player, troops::TroopCounts, village::Village},
        test_utils::{PlayerFactoryOptions, VillageFactoryOptions, player_factory, village_factory},
    };
    use castellum_types::{Result, common::ResourceAmounts, map::Coordinates};

    pub struct TestApp {
        pub config: Arc<Config>,
        pub uow_provider: Arc<dyn UnitOfWorkProvider>,
        pub store: InMemoryStore,
        pub app_bus: Arc<AppBus>,
        pub worker: Arc<JobWorker>,
        pub locks: VillageLocks,
        pub publisher: Arc<BroadcastEventPublisher>,
    }

    pub fn setup_app() -> TestApp {
        let config = Arc::new(Config::default());
        let store = InMemoryStore::new();
        let uow_provider: Arc<dyn UnitOfWorkProvider> =
            Arc::new(InMemoryUnitOfWorkProvider::new(store.clone()));
        let locks = VillageLocks::new();
        let publisher = Arc::new(BroadcastEventPublisher::new(256));

        let app_bus = Arc::new(AppBus::new(
            config.clone(),
            uow_provider.clone(),
            locks.clone(),
        ));
        let worker = Arc::new(JobWorker::new(
            uow_provider.clone(),
            Arc::new(AppJobRegistry::new()),
            config.clone(),
            locks.clone(),
            publisher.clone(),
        ));

        TestApp {
            config,
            uow_provider,
            store,
            app_bus,
            worker,
            locks,
            publisher,
        }
    }

    pub struct PartyOptions {
        pub village_id: u32,
        pub position: Coordinates,
        pub troops: TroopCounts,
        pub amounts: Option<ResourceAmounts>,
        pub last_tick_at: Option<DateTime<Utc>>,
        pub last_seen_at: Option<DateTime<Utc>>,
    }

    impl PartyOptions {
        pub fn new(village_id: u32, x: i32, y: i32) -> Self {
            Self {
                village_id,
                position: Coordinates::new(x, y),
                troops: TroopCounts::new(),
                amounts: None,
                last_tick_at: None,
                last_seen_at: None,
            }
        }
    }

    /// Stores a player with one village.
    pub async fn setup_player_party(
        uow_provider: &Arc<dyn UnitOfWorkProvider>,
        options: PartyOptions,
    ) -> Result<(Player, Village)> {
        let player = player_factory(PlayerFactoryOptions {
            last_seen_at: options.last_seen_at,
            ..Default::default()
        });
        let village = village_factory(VillageFactoryOptions {
            id: Some(options.village_id),
            player: Some(player.clone()),
            position: Some(options.position),
            troops: Some(options.troops),
            amounts: options.amounts,
            last_tick_at: options.last_tick_at,
            ..Default::default()
        });

        let uow = uow_provider.begin().await?;
        uow.players().save(&player).await?;
        uow.villages().save(&village).await?;
        uow.commit().await?;

        Ok((player, village))
    }

    pub async fn get_village(uow_provider: &Arc<dyn UnitOfWorkProvider>, id: u32) -> Result<Village> {
        let uow = uow_provider.begin().await?;
        let village = uow.villages().get_by_id(id).await?;
        uow.rollback().await?;
        Ok(village)
    }

    pub async fn village_jobs(
        uow_provider: &Arc<dyn UnitOfWorkProvider>,
        village_id: u32,
    ) -> Result<Vec<Job>> {
        let uow = uow_provider.begin().await?;
        let jobs = uow.jobs().list_by_village_id(village_id).await?;
        uow.rollback().await?;
        Ok(jobs)
    }
}

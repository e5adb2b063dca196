use std::sync::Arc;
use tracing::{error, info};

use castellum_app::{
    config::Config, events::BroadcastEventPublisher, job_registry::AppJobRegistry,
    jobs::worker::JobWorker, locks::VillageLocks, scheduler::TickScheduler,
};
use castellum_db::{InMemoryStore, bootstrap_world, uow::InMemoryUnitOfWorkProvider};
use castellum_types::{Result, errors::ApplicationError};

mod logs;
use logs::setup_logging;

const EVENTS_CAPACITY: usize = 1024;

struct App {
    worker: Arc<JobWorker>,
    scheduler: Arc<TickScheduler>,
    publisher: Arc<BroadcastEventPublisher>,
}

#[tokio::main]
#[cfg(not(tarpaulin_include))]
async fn main() -> anyhow::Result<()> {
    let _log_guard = setup_logging();
    let app = setup_app().await?;

    let mut events = app.publisher.subscribe();
    let event_log = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            info!(event = event.name(), village_id = event.village_id(), "Game event");
        }
    });

    let worker = app.worker.run();
    let scheduler = app.scheduler.run();

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");

    scheduler.abort();
    worker.abort();
    event_log.abort();
    Ok(())
}

async fn setup_app() -> Result<App, ApplicationError> {
    let config = Arc::new(Config::from_env());
    let store = InMemoryStore::new();
    let uow_provider = Arc::new(InMemoryUnitOfWorkProvider::new(store));

    setup_world(uow_provider.as_ref(), &config).await?;

    // commands entering through an AppBus must share these locks with the worker
    let locks = VillageLocks::new();
    let publisher = Arc::new(BroadcastEventPublisher::new(EVENTS_CAPACITY));
    let worker = Arc::new(JobWorker::new(
        uow_provider.clone(),
        Arc::new(AppJobRegistry::new()),
        config.clone(),
        locks,
        publisher.clone(),
    ));
    let scheduler = Arc::new(TickScheduler::new(uow_provider, config));

    Ok(App {
        worker,
        scheduler,
        publisher,
    })
}

async fn setup_world(
    uow_provider: &InMemoryUnitOfWorkProvider,
    config: &Config,
) -> Result<(), ApplicationError> {
    match bootstrap_world(
        uow_provider,
        config.world_size,
        config.seed_villages,
        config.speed,
    )
    .await
    {
        Ok(true) => info!(villages = config.seed_villages, "World successfully bootstrapped."),
        Ok(false) => info!("World already set or no villages to seed. Skipping bootstrap."),
        Err(e) => {
            error!("Error during world initialization: {e}");
            return Err(e);
        }
    }

    Ok(())
}

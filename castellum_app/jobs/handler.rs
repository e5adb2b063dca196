use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

use castellum_game::events::GameEvent;
use castellum_types::errors::ApplicationError;

use crate::{config::Config, jobs::Job, uow::UnitOfWork};

/// Context which contains JobHandler dependencies.
pub struct JobHandlerContext<'a> {
    pub uow: Box<dyn UnitOfWork<'a> + 'a>,
    pub config: Arc<Config>,
    /// Events raised by the handler, published only once the unit of work commits.
    pub events: Mutex<Vec<GameEvent>>,
}

impl<'a> JobHandlerContext<'a> {
    pub fn new(uow: Box<dyn UnitOfWork<'a> + 'a>, config: Arc<Config>) -> Self {
        Self {
            uow,
            config,
            events: Mutex::new(vec![]),
        }
    }

    pub async fn emit(&self, event: GameEvent) {
        self.events.lock().await.push(event);
    }

    pub async fn emit_all(&self, events: impl IntoIterator<Item = GameEvent>) {
        self.events.lock().await.extend(events);
    }
}

#[async_trait]
pub trait JobHandler: Send + Sync {
    /// Villages this job writes to. The worker holds their locks while it runs.
    fn locked_villages(&self, job: &Job) -> Vec<u32> {
        vec![job.village_id]
    }

    async fn handle<'ctx, 'a>(
        &'ctx self,
        ctx: &'ctx JobHandlerContext<'a>,
        job: &'ctx Job,
    ) -> Result<(), ApplicationError>;
}

/// Maps task types to handlers.
pub trait JobRegistry: Send + Sync {
    fn get_handler(
        &self,
        task_type: &str,
        data: &Value,
    ) -> Result<Box<dyn JobHandler>, ApplicationError>;
}

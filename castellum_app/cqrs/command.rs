use async_trait::async_trait;
use castellum_types::errors::ApplicationError;
use std::sync::Arc;

use crate::{config::Config, uow::UnitOfWork};

/// Commands are operations that change the state of the system.
pub trait Command: Send + Sync {
    /// Villages the command writes to. The bus holds their locks while the
    /// command runs, so it never interleaves with a job on the same village.
    fn locked_villages(&self) -> Vec<u32> {
        vec![]
    }
}

/// Executes a command inside the unit of work it receives.
/// Commit and rollback are up to the `AppBus`.
#[async_trait]
pub trait CommandHandler<C: Command> {
    async fn handle(
        &self,
        cmd: C,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        config: &Arc<Config>,
    ) -> Result<(), ApplicationError>;
}

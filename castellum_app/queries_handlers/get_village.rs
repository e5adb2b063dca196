use async_trait::async_trait;
use std::sync::Arc;

use castellum_types::errors::ApplicationError;

use crate::{
    config::Config,
    cqrs::{Query, QueryHandler, queries::GetVillage},
    uow::UnitOfWork,
};

pub struct GetVillageHandler {}

impl GetVillageHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait]
impl QueryHandler<GetVillage> for GetVillageHandler {
    async fn handle(
        &self,
        query: GetVillage,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        _config: &Arc<Config>,
    ) -> Result<<GetVillage as Query>::Output, ApplicationError> {
        let repo = uow.villages();
        repo.get_by_id(query.village_id).await
    }
}

use async_trait::async_trait;
use std::sync::Arc;

use castellum_types::errors::ApplicationError;

use crate::{
    config::Config,
    cqrs::{Query, QueryHandler, queries::GetBattleReports},
    uow::UnitOfWork,
};

pub struct GetBattleReportsHandler {}

impl GetBattleReportsHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait]
impl QueryHandler<GetBattleReports> for GetBattleReportsHandler {
    async fn handle(
        &self,
        query: GetBattleReports,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        _config: &Arc<Config>,
    ) -> Result<<GetBattleReports as Query>::Output, ApplicationError> {
        // make sure the village exists, an unknown id is not an empty history
        uow.villages().get_by_id(query.village_id).await?;
        uow.reports()
            .list_by_village(query.village_id, query.limit)
            .await
    }
}

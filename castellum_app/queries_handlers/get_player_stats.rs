use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use castellum_game::models::player::PlayerStats;
use castellum_types::errors::ApplicationError;

use crate::{
    config::Config,
    cqrs::{Query, QueryHandler, queries::GetPlayerStats},
    uow::UnitOfWork,
};

pub struct GetPlayerStatsHandler {}

impl GetPlayerStatsHandler {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait]
impl QueryHandler<GetPlayerStats> for GetPlayerStatsHandler {
    async fn handle(
        &self,
        query: GetPlayerStats,
        uow: &Box<dyn UnitOfWork<'_> + '_>,
        _config: &Arc<Config>,
    ) -> Result<<GetPlayerStats as Query>::Output, ApplicationError> {
        let player = uow.players().get_by_id(query.player_id).await?;
        let villages = uow.villages().list_by_player_id(query.player_id).await?;

        Ok(PlayerStats::from_player(&player, &villages, Utc::now()))
    }
}

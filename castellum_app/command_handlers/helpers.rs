use chrono::Utc;
use uuid::Uuid;

use castellum_game::models::village::Village;
use castellum_types::errors::{AppError, ApplicationError};

use crate::uow::UnitOfWork;

/// Loads a village on behalf of `player_id`, with production credited up to now.
pub async fn load_owned_village(
    uow: &Box<dyn UnitOfWork<'_> + '_>,
    village_id: u32,
    player_id: Uuid,
    server_speed: u8,
) -> Result<Village, ApplicationError> {
    let mut village = uow.villages().get_by_id(village_id).await?;
    if village.player_id != player_id {
        return Err(AppError::VillageNotOwned {
            village_id,
            player_id,
        }
        .into());
    }

    village.catch_up(Utc::now(), server_speed)?;
    Ok(village)
}

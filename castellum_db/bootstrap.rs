use chrono::Utc;
use rand::Rng;
use std::collections::HashSet;
use tracing::info;

use castellum_app::uow::UnitOfWorkProvider;
use castellum_game::models::{player::Player, village::Village};
use castellum_types::{errors::ApplicationError, map::Coordinates};

/// Seeds `villages` villages, one player each, at distinct random coordinates
/// within `[-world_size, world_size]`. Does nothing when the world already has villages.
/// Returns whether the world was seeded.
pub async fn bootstrap_world(
    uow_provider: &dyn UnitOfWorkProvider,
    world_size: i32,
    villages: u32,
    server_speed: u8,
) -> Result<bool, ApplicationError> {
    let uow = uow_provider.begin().await?;
    if villages == 0 || !uow.villages().list_ids().await?.is_empty() {
        uow.rollback().await?;
        return Ok(false);
    }

    let world_size = world_size.max(1);
    let side = (2 * world_size + 1) as u64;
    if villages as u64 > side * side {
        uow.rollback().await?;
        return Err(ApplicationError::Unknown(format!(
            "cannot place {villages} villages on a {side}x{side} map"
        )));
    }

    info!(villages, world_size, "Generating new world");
    let positions = random_positions(world_size, villages as usize);
    let now = Utc::now();

    for (index, position) in positions.into_iter().enumerate() {
        let id = index as u32 + 1;
        let player = Player::new(format!("player_{id}"), now);
        let village = Village::new(
            id,
            player.id,
            format!("Village {id}"),
            position,
            server_speed,
            now,
        );

        uow.players().save(&player).await?;
        uow.villages().save(&village).await?;
    }

    uow.commit().await?;
    Ok(true)
}

fn random_positions(world_size: i32, count: usize) -> Vec<Coordinates> {
    let mut rng = rand::thread_rng();
    let mut taken = HashSet::with_capacity(count);
    let mut positions = Vec::with_capacity(count);

    while positions.len() < count {
        let x = rng.gen_range(-world_size..=world_size);
        let y = rng.gen_range(-world_size..=world_size);
        if taken.insert((x, y)) {
            positions.push(Coordinates::new(x, y));
        }
    }
    positions
}

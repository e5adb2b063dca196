use thiserror::Error;
use uuid::Uuid;

/// Errors for app logic.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("No job handler for {0}")]
    NoJobHandler(String),

    #[error("Village {0} is being updated by another worker")]
    VillageLocked(u32),

    #[error("Village {village_id} not owned by player {player_id}")]
    VillageNotOwned { village_id: u32, player_id: Uuid },
}

use chrono::{DateTime, Utc};
use uuid::Uuid;

use castellum_game::models::player::Player;
use castellum_types::errors::ApplicationError;

#[async_trait::async_trait]
pub trait PlayerRepository: Send + Sync {
    async fn get_by_id(&self, player_id: Uuid) -> Result<Player, ApplicationError>;

    async fn save(&self, player: &Player) -> Result<(), ApplicationError>;

    /// Adds battle points to a player. Credits from concurrent units of work
    /// add up instead of overwriting each other.
    async fn credit_points(
        &self,
        player_id: Uuid,
        attack_points: u64,
        defense_points: u64,
    ) -> Result<(), ApplicationError>;

    /// Records player activity. `last_seen_at` only moves forward.
    async fn touch(&self, player_id: Uuid, now: DateTime<Utc>) -> Result<(), ApplicationError>;
}

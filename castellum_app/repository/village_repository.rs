use uuid::Uuid;

use castellum_game::models::village::Village;
use castellum_types::errors::ApplicationError;

#[async_trait::async_trait]
pub trait VillageRepository: Send + Sync {
    async fn get_by_id(&self, village_id: u32) -> Result<Village, ApplicationError>;

    /// Ids of every village in the world, ascending.
    async fn list_ids(&self) -> Result<Vec<u32>, ApplicationError>;

    async fn list_by_player_id(&self, player_id: Uuid) -> Result<Vec<Village>, ApplicationError>;

    async fn save(&self, village: &Village) -> Result<(), ApplicationError>;
}

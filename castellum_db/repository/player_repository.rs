use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use castellum_app::repository::PlayerRepository;
use castellum_game::models::player::Player;
use castellum_types::errors::{ApplicationError, DbError};

use crate::{
    models as db_models,
    store::{InMemoryStore, Staged},
};

#[derive(Clone)]
pub struct InMemoryPlayerRepository {
    store: InMemoryStore,
    staged: Arc<Mutex<Staged>>,
}

impl InMemoryPlayerRepository {
    pub(crate) fn new(store: InMemoryStore, staged: Arc<Mutex<Staged>>) -> Self {
        Self { store, staged }
    }

    /// Staged writes are locked before the tables, like everywhere else.
    async fn ensure_exists(&self, staged: &Staged, player_id: Uuid) -> Result<(), ApplicationError> {
        let exists = staged.players.contains_key(&player_id)
            || self
                .store
                .tables
                .lock()
                .await
                .players
                .contains_key(&player_id);
        if exists {
            Ok(())
        } else {
            Err(ApplicationError::Db(DbError::PlayerNotFound(player_id)))
        }
    }
}

#[async_trait::async_trait]
impl PlayerRepository for InMemoryPlayerRepository {
    async fn get_by_id(&self, player_id: Uuid) -> Result<Player, ApplicationError> {
        let staged = self.staged.lock().await;
        let mut row = match staged.players.get(&player_id) {
            Some(row) => row.clone(),
            None => self
                .store
                .tables
                .lock()
                .await
                .players
                .get(&player_id)
                .cloned()
                .ok_or(ApplicationError::Db(DbError::PlayerNotFound(player_id)))?,
        };

        // pending credits of this unit of work
        if let Some((attack, defense)) = staged.credits.get(&player_id) {
            row.attack_points = row.attack_points.saturating_add(*attack);
            row.defense_points = row.defense_points.saturating_add(*defense);
        }
        if let Some(seen_at) = staged.seen.get(&player_id) {
            row.last_seen_at = row.last_seen_at.max(*seen_at);
        }

        Ok(row.into())
    }

    async fn save(&self, player: &Player) -> Result<(), ApplicationError> {
        let mut staged = self.staged.lock().await;
        staged.credits.remove(&player.id);
        staged.seen.remove(&player.id);
        staged
            .players
            .insert(player.id, db_models::Player::from(player));
        Ok(())
    }

    async fn credit_points(
        &self,
        player_id: Uuid,
        attack_points: u64,
        defense_points: u64,
    ) -> Result<(), ApplicationError> {
        let mut staged = self.staged.lock().await;
        self.ensure_exists(&staged, player_id).await?;

        let attack = i64::try_from(attack_points).unwrap_or(i64::MAX);
        let defense = i64::try_from(defense_points).unwrap_or(i64::MAX);
        let credit = staged.credits.entry(player_id).or_insert((0, 0));
        credit.0 = credit.0.saturating_add(attack);
        credit.1 = credit.1.saturating_add(defense);
        Ok(())
    }

    async fn touch(&self, player_id: Uuid, now: DateTime<Utc>) -> Result<(), ApplicationError> {
        let mut staged = self.staged.lock().await;
        self.ensure_exists(&staged, player_id).await?;

        let seen_at = staged.seen.entry(player_id).or_insert(now);
        *seen_at = (*seen_at).max(now);
        Ok(())
    }
}

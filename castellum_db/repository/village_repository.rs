use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use castellum_app::repository::VillageRepository;
use castellum_game::models::village::Village;
use castellum_types::errors::{ApplicationError, DbError};

use crate::{
    models as db_models,
    store::{InMemoryStore, Staged},
};

#[derive(Clone)]
pub struct InMemoryVillageRepository {
    store: InMemoryStore,
    staged: Arc<Mutex<Staged>>,
}

impl InMemoryVillageRepository {
    pub(crate) fn new(store: InMemoryStore, staged: Arc<Mutex<Staged>>) -> Self {
        Self { store, staged }
    }
}

#[async_trait::async_trait]
impl VillageRepository for InMemoryVillageRepository {
    async fn get_by_id(&self, village_id: u32) -> Result<Village, ApplicationError> {
        let key = village_id as i64;
        let staged = self.staged.lock().await;
        let row = match staged.villages.get(&key) {
            Some(row) => row.clone(),
            None => self
                .store
                .tables
                .lock()
                .await
                .villages
                .get(&key)
                .cloned()
                .ok_or(ApplicationError::Db(DbError::VillageNotFound(village_id)))?,
        };

        row.try_into()
    }

    async fn list_ids(&self) -> Result<Vec<u32>, ApplicationError> {
        let staged = self.staged.lock().await;
        let tables = self.store.tables.lock().await;

        let mut ids: Vec<u32> = tables
            .villages
            .keys()
            .chain(staged.villages.keys())
            .map(|id| *id as u32)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }

    async fn list_by_player_id(&self, player_id: Uuid) -> Result<Vec<Village>, ApplicationError> {
        let staged = self.staged.lock().await;
        let tables = self.store.tables.lock().await;

        let mut rows = tables.villages.clone();
        rows.extend(
            staged
                .villages
                .iter()
                .map(|(id, row)| (*id, row.clone())),
        );

        rows.into_values()
            .filter(|row| row.player_id == player_id)
            .map(Village::try_from)
            .collect()
    }

    async fn save(&self, village: &Village) -> Result<(), ApplicationError> {
        let row = db_models::Village::try_from(village)?;
        self.staged.lock().await.villages.insert(row.id, row);
        Ok(())
    }
}

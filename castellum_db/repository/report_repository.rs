use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use castellum_app::repository::ReportRepository;
use castellum_game::battle::BattleReport;
use castellum_types::errors::{ApplicationError, DbError};

use crate::{
    models as db_models,
    store::{InMemoryStore, Staged},
};

#[derive(Clone)]
pub struct InMemoryReportRepository {
    store: InMemoryStore,
    staged: Arc<Mutex<Staged>>,
}

impl InMemoryReportRepository {
    pub(crate) fn new(store: InMemoryStore, staged: Arc<Mutex<Staged>>) -> Self {
        Self { store, staged }
    }
}

#[async_trait::async_trait]
impl ReportRepository for InMemoryReportRepository {
    async fn add(&self, report: &BattleReport) -> Result<(), ApplicationError> {
        let row = db_models::BattleReport::try_from(report)?;
        self.staged.lock().await.reports.push(row);
        Ok(())
    }

    async fn get_by_id(&self, report_id: Uuid) -> Result<BattleReport, ApplicationError> {
        let staged = self.staged.lock().await;
        let tables = self.store.tables.lock().await;

        tables
            .reports
            .iter()
            .chain(staged.reports.iter())
            .find(|r| r.id == report_id)
            .cloned()
            .ok_or(ApplicationError::Db(DbError::ReportNotFound(report_id)))?
            .try_into()
    }

    async fn list_by_village(
        &self,
        village_id: u32,
        limit: usize,
    ) -> Result<Vec<BattleReport>, ApplicationError> {
        let village_id = village_id as i64;
        let staged = self.staged.lock().await;
        let tables = self.store.tables.lock().await;

        let mut rows: Vec<&db_models::BattleReport> = tables
            .reports
            .iter()
            .chain(staged.reports.iter())
            .filter(|r| r.attacker_village_id == village_id || r.defender_village_id == village_id)
            .collect();
        // newest first, insertion order breaks ties
        rows.reverse();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        rows.into_iter()
            .take(limit)
            .cloned()
            .map(BattleReport::try_from)
            .collect()
    }
}

use uuid::Uuid;

use castellum_game::battle::BattleReport;
use castellum_types::errors::ApplicationError;

#[async_trait::async_trait]
pub trait ReportRepository: Send + Sync {
    async fn add(&self, report: &BattleReport) -> Result<(), ApplicationError>;

    async fn get_by_id(&self, report_id: Uuid) -> Result<BattleReport, ApplicationError>;

    /// Reports where the village attacked or defended, newest first.
    async fn list_by_village(
        &self,
        village_id: u32,
        limit: usize,
    ) -> Result<Vec<BattleReport>, ApplicationError>;
}

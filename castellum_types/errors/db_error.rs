use thiserror::Error;
use uuid::Uuid;

/// Errors for storage.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Village with ID {0} not found")]
    VillageNotFound(u32),

    #[error("Player with ID {0} not found")]
    PlayerNotFound(Uuid),

    #[error("Job with ID {0} not found")]
    JobNotFound(Uuid),

    #[error("Report with ID {0} not found")]
    ReportNotFound(Uuid),

    #[error("Transaction error: {0}")]
    Transaction(String),
}

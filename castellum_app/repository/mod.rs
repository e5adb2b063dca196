mod job_repository;
mod player_repository;
mod report_repository;
mod village_repository;

pub use job_repository::JobRepository;
pub use player_repository::PlayerRepository;
pub use report_repository::ReportRepository;
pub use village_repository::VillageRepository;

mod job_repository;
mod player_repository;
mod report_repository;
mod village_repository;

pub use job_repository::InMemoryJobRepository;
pub use player_repository::InMemoryPlayerRepository;
pub use report_repository::InMemoryReportRepository;
pub use village_repository::InMemoryVillageRepository;

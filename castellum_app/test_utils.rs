#[cfg(any(test, feature = "test-utils"))]
#[cfg(not(tarpaulin_include))]
pub mod tests {
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::{
        collections::HashMap,
        sync::{Arc, Mutex},
    };
    use uuid::Uuid;

    use castellum_game::{
        battle::BattleReport,
        events::GameEvent,
        models::{player::Player, village::Village},
    };
    use castellum_types::errors::{ApplicationError, DbError};

    use crate::{
        events::EventPublisher,
        jobs::{Job, JobStatus},
        repository::{JobRepository, PlayerRepository, ReportRepository, VillageRepository},
        uow::{UnitOfWork, UnitOfWorkProvider},
    };

    #[derive(Default, Clone)]
    pub struct MockJobRepository {
        jobs: Arc<Mutex<Vec<Job>>>,
    }

    impl MockJobRepository {
        pub fn new() -> Self {
            Self::default()
        }

        fn update(&self, job_id: Uuid, f: impl FnOnce(&mut Job)) -> Result<(), ApplicationError> {
            let mut jobs = self.jobs.lock().unwrap();
            let job = jobs
                .iter_mut()
                .find(|j| j.id == job_id)
                .ok_or(ApplicationError::Db(DbError::JobNotFound(job_id)))?;
            f(job);
            job.updated_at = Utc::now();
            Ok(())
        }
    }

    #[async_trait]
    impl JobRepository for MockJobRepository {
        async fn add(&self, job: &Job) -> Result<(), ApplicationError> {
            self.jobs.lock().unwrap().push(job.clone());
            Ok(())
        }

        async fn get_by_id(&self, id: Uuid) -> Result<Job, ApplicationError> {
            self.jobs
                .lock()
                .unwrap()
                .iter()
                .find(|j| j.id == id)
                .cloned()
                .ok_or(ApplicationError::Db(DbError::JobNotFound(id)))
        }

        async fn list_by_player_id(&self, id: Uuid) -> Result<Vec<Job>, ApplicationError> {
            let jobs = self.jobs.lock().unwrap();
            Ok(jobs.iter().filter(|j| j.player_id == id).cloned().collect())
        }

        async fn list_by_village_id(&self, village_id: u32) -> Result<Vec<Job>, ApplicationError> {
            let jobs = self.jobs.lock().unwrap();
            let mut found: Vec<Job> = jobs
                .iter()
                .filter(|j| j.village_id == village_id)
                .cloned()
                .collect();
            found.sort_by_key(|j| j.completed_at);
            Ok(found)
        }

        async fn exists_active(
            &self,
            village_id: u32,
            task_type: &str,
        ) -> Result<bool, ApplicationError> {
            let jobs = self.jobs.lock().unwrap();
            Ok(jobs.iter().any(|j| {
                j.village_id == village_id && j.task.task_type == task_type && j.status.is_active()
            }))
        }

        async fn find_and_lock_due_jobs(&self, limit: usize) -> Result<Vec<Job>, ApplicationError> {
            let now = Utc::now();
            let mut jobs = self.jobs.lock().unwrap();
            let mut locked = vec![];
            for job in jobs.iter_mut().filter(|j| j.is_due(now)).take(limit) {
                job.status = JobStatus::Processing;
                locked.push(job.clone());
            }
            Ok(locked)
        }

        async fn mark_as_completed(&self, job_id: Uuid) -> Result<(), ApplicationError> {
            self.update(job_id, |job| job.status = JobStatus::Completed)
        }

        async fn mark_as_failed(
            &self,
            job_id: Uuid,
            _error_message: &str,
        ) -> Result<(), ApplicationError> {
            self.update(job_id, |job| job.status = JobStatus::Failed)
        }

        async fn reschedule(
            &self,
            job_id: Uuid,
            run_at: DateTime<Utc>,
            _error_message: &str,
        ) -> Result<(), ApplicationError> {
            self.update(job_id, |job| {
                job.status = JobStatus::Pending;
                job.attempts += 1;
                job.completed_at = run_at;
            })
        }
    }

    #[derive(Default, Clone)]
    pub struct MockVillageRepository {
        villages: Arc<Mutex<HashMap<u32, Village>>>,
    }

    #[async_trait]
    impl VillageRepository for MockVillageRepository {
        async fn get_by_id(&self, village_id: u32) -> Result<Village, ApplicationError> {
            let villages = self.villages.lock().unwrap();
            villages
                .get(&village_id)
                .cloned()
                .ok_or(ApplicationError::Db(DbError::VillageNotFound(village_id)))
        }

        async fn list_ids(&self) -> Result<Vec<u32>, ApplicationError> {
            let mut ids: Vec<u32> = self.villages.lock().unwrap().keys().copied().collect();
            ids.sort_unstable();
            Ok(ids)
        }

        async fn list_by_player_id(
            &self,
            player_id: Uuid,
        ) -> Result<Vec<Village>, ApplicationError> {
            let mut villages: Vec<Village> = vec![];

            for v in self.villages.lock().unwrap().values() {
                if v.player_id == player_id {
                    villages.push(v.clone());
                }
            }
            villages.sort_by_key(|v| v.id);

            Ok(villages)
        }

        async fn save(&self, village: &Village) -> Result<(), ApplicationError> {
            self.villages
                .lock()
                .unwrap()
                .insert(village.id, village.clone());
            Ok(())
        }
    }

    #[derive(Default, Clone)]
    pub struct MockPlayerRepository {
        players: Arc<Mutex<HashMap<Uuid, Player>>>,
    }

    #[async_trait]
    impl PlayerRepository for MockPlayerRepository {
        async fn get_by_id(&self, player_id: Uuid) -> Result<Player, ApplicationError> {
            let players = self.players.lock().unwrap();
            players
                .get(&player_id)
                .cloned()
                .ok_or(ApplicationError::Db(DbError::PlayerNotFound(player_id)))
        }

        async fn save(&self, player: &Player) -> Result<(), ApplicationError> {
            self.players
                .lock()
                .unwrap()
                .insert(player.id, player.clone());
            Ok(())
        }

        async fn credit_points(
            &self,
            player_id: Uuid,
            attack_points: u64,
            defense_points: u64,
        ) -> Result<(), ApplicationError> {
            let mut players = self.players.lock().unwrap();
            let player = players
                .get_mut(&player_id)
                .ok_or(ApplicationError::Db(DbError::PlayerNotFound(player_id)))?;
            player.add_attack_points(attack_points);
            player.add_defense_points(defense_points);
            Ok(())
        }

        async fn touch(&self, player_id: Uuid, now: DateTime<Utc>) -> Result<(), ApplicationError> {
            self.players
                .lock()
                .unwrap()
                .get_mut(&player_id)
                .ok_or(ApplicationError::Db(DbError::PlayerNotFound(player_id)))?
                .touch(now);
            Ok(())
        }
    }

    #[derive(Default, Clone)]
    pub struct MockReportRepository {
        reports: Arc<Mutex<Vec<BattleReport>>>,
    }

    #[async_trait]
    impl ReportRepository for MockReportRepository {
        async fn add(&self, report: &BattleReport) -> Result<(), ApplicationError> {
            self.reports.lock().unwrap().push(report.clone());
            Ok(())
        }

        async fn get_by_id(&self, report_id: Uuid) -> Result<BattleReport, ApplicationError> {
            self.reports
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.id == report_id)
                .cloned()
                .ok_or(ApplicationError::Db(DbError::ReportNotFound(report_id)))
        }

        async fn list_by_village(
            &self,
            village_id: u32,
            limit: usize,
        ) -> Result<Vec<BattleReport>, ApplicationError> {
            let reports = self.reports.lock().unwrap();
            Ok(reports
                .iter()
                .rev()
                .filter(|r| r.involves_village(village_id))
                .take(limit)
                .cloned()
                .collect())
        }
    }

    /// Repositories share state across clones, so a test can keep a handle
    /// on the same data the code under test writes to.
    #[derive(Default, Clone)]
    pub struct MockUnitOfWork {
        players: Arc<MockPlayerRepository>,
        villages: Arc<MockVillageRepository>,
        jobs: Arc<MockJobRepository>,
        reports: Arc<MockReportRepository>,

        // Flags to check if commit/rollback was called
        committed: Arc<Mutex<bool>>,
        rolled_back: Arc<Mutex<bool>>,
    }

    impl MockUnitOfWork {
        pub fn new() -> Self {
            Default::default()
        }

        pub fn is_committed(&self) -> bool {
            *self.committed.lock().unwrap()
        }

        pub fn is_rolled_back(&self) -> bool {
            *self.rolled_back.lock().unwrap()
        }
    }

    #[async_trait]
    impl<'a> UnitOfWork<'a> for MockUnitOfWork {
        fn players(&self) -> Arc<dyn PlayerRepository + 'a> {
            self.players.clone()
        }

        fn villages(&self) -> Arc<dyn VillageRepository + 'a> {
            self.villages.clone()
        }

        fn jobs(&self) -> Arc<dyn JobRepository + 'a> {
            self.jobs.clone()
        }

        fn reports(&self) -> Arc<dyn ReportRepository + 'a> {
            self.reports.clone()
        }

        async fn commit(self: Box<Self>) -> Result<(), ApplicationError> {
            *self.committed.lock().unwrap() = true;
            Ok(())
        }

        async fn rollback(self: Box<Self>) -> Result<(), ApplicationError> {
            *self.rolled_back.lock().unwrap() = true;
            Ok(())
        }
    }

    /// Hands out clones of one shared mock unit of work.
    #[derive(Default, Clone)]
    pub struct MockUnitOfWorkProvider {
        uow: MockUnitOfWork,
    }

    impl MockUnitOfWorkProvider {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_uow(uow: MockUnitOfWork) -> Self {
            Self { uow }
        }

        pub fn uow(&self) -> &MockUnitOfWork {
            &self.uow
        }
    }

    #[async_trait]
    impl UnitOfWorkProvider for MockUnitOfWorkProvider {
        async fn begin<'p>(&'p self) -> Result<Box<dyn UnitOfWork<'p> + 'p>, ApplicationError> {
            let uow: Box<dyn UnitOfWork<'_> + '_> = Box::new(self.uow.clone());
            Ok(uow)
        }
    }

    /// Records every published event.
    #[derive(Default, Clone)]
    pub struct MockEventPublisher {
        events: Arc<Mutex<Vec<GameEvent>>>,
    }

    impl MockEventPublisher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn published(&self) -> Vec<GameEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EventPublisher for MockEventPublisher {
        async fn publish(&self, events: Vec<GameEvent>) {
            self.events.lock().unwrap().extend(events);
        }
    }
}

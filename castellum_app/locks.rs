use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use castellum_types::errors::{AppError, ApplicationError};

/// Guards held while a job or command writes to a set of villages.
/// Dropping it releases every village at once.
#[derive(Debug)]
pub struct VillageGuards {
    village_ids: Vec<u32>,
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl VillageGuards {
    pub fn village_ids(&self) -> &[u32] {
        &self.village_ids
    }
}

/// Per-village mutual exclusion shared by the worker and the bus.
#[derive(Debug, Default, Clone)]
pub struct VillageLocks {
    inner: Arc<Mutex<HashMap<u32, Arc<AsyncMutex<()>>>>>,
}

impl VillageLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes all the villages or none of them. A village already held by
    /// someone else fails with `AppError::VillageLocked`.
    pub fn try_lock_many(&self, village_ids: &[u32]) -> Result<VillageGuards, ApplicationError> {
        let village_ids = normalize(village_ids);
        let mut guards = Vec::with_capacity(village_ids.len());

        for (village_id, lock) in village_ids.iter().zip(self.handles(&village_ids)?) {
            match lock.try_lock_owned() {
                Ok(guard) => guards.push(guard),
                // guards taken so far are released on return
                Err(_) => return Err(AppError::VillageLocked(*village_id).into()),
            }
        }

        Ok(VillageGuards {
            village_ids,
            _guards: guards,
        })
    }

    /// Waits for every village, always locking in ascending id order.
    pub async fn lock_many(&self, village_ids: &[u32]) -> Result<VillageGuards, ApplicationError> {
        let village_ids = normalize(village_ids);
        let mut guards = Vec::with_capacity(village_ids.len());

        for lock in self.handles(&village_ids)? {
            guards.push(lock.lock_owned().await);
        }

        Ok(VillageGuards {
            village_ids,
            _guards: guards,
        })
    }

    pub fn is_locked(&self, village_id: u32) -> bool {
        self.inner
            .lock()
            .ok()
            .and_then(|map| map.get(&village_id).cloned())
            .is_some_and(|lock| lock.try_lock().is_err())
    }

    fn handles(&self, village_ids: &[u32]) -> Result<Vec<Arc<AsyncMutex<()>>>, ApplicationError> {
        let mut map = self
            .inner
            .lock()
            .map_err(|e| ApplicationError::Unknown(format!("village locks poisoned: {e}")))?;

        Ok(village_ids
            .iter()
            .map(|id| map.entry(*id).or_default().clone())
            .collect())
    }
}

fn normalize(village_ids: &[u32]) -> Vec<u32> {
    let mut ids = village_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_try_lock_many_is_all_or_nothing() {
        let locks = VillageLocks::new();

        let held = locks.try_lock_many(&[2]).unwrap();
        let err = locks.try_lock_many(&[1, 2, 3]).unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::App(AppError::VillageLocked(2))
        ));
        assert!(err.is_transient());

        // village 1 was released when the attempt failed
        assert!(!locks.is_locked(1));
        assert!(locks.is_locked(2));

        drop(held);
        let guards = locks.try_lock_many(&[3, 1, 2, 1]).unwrap();
        assert_eq!(guards.village_ids(), &[1, 2, 3]);
    }

    #[test]
    fn test_guards_release_on_drop() {
        let locks = VillageLocks::new();
        {
            let _guards = locks.try_lock_many(&[7]).unwrap();
            assert!(locks.is_locked(7));
        }
        assert!(!locks.is_locked(7));
    }

    #[tokio::test]
    async fn test_lock_many_waits_for_release() {
        let locks = VillageLocks::new();
        let held = locks.try_lock_many(&[5]).unwrap();

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                locks
                    .lock_many(&[5, 6])
                    .await
                    .map(|g| g.village_ids().to_vec())
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(held);
        let ids = waiter.await.unwrap().unwrap();
        assert_eq!(ids, vec![5, 6]);
    }
}

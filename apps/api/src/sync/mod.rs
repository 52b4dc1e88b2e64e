pub mod handlers;
pub mod orchestrator;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

/// Per-user sync leases. A lease is held for the whole sync call so two
/// concurrent syncs for the same user cannot double-advance the checkpoint.
#[derive(Clone, Default)]
pub struct SyncLeases {
    inner: Arc<Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>>,
}

impl SyncLeases {
    /// Returns `None` when a sync for this user is already running.
    pub fn try_acquire(&self, user_id: Uuid) -> Option<OwnedMutexGuard<()>> {
        let lease = {
            let mut leases = self.inner.lock().expect("sync lease registry poisoned");
            leases
                .entry(user_id)
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };
        lease.try_lock_owned().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_for_same_user_is_rejected() {
        let leases = SyncLeases::default();
        let user = Uuid::new_v4();

        let held = leases.try_acquire(user);
        assert!(held.is_some());
        assert!(leases.try_acquire(user).is_none());

        drop(held);
        assert!(leases.try_acquire(user).is_some());
    }

    #[test]
    fn test_different_users_do_not_contend() {
        let leases = SyncLeases::default();
        let _a = leases.try_acquire(Uuid::new_v4()).unwrap();
        assert!(leases.try_acquire(Uuid::new_v4()).is_some());
    }
}

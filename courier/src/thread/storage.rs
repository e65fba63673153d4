use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use courier_api::{ActorError, ActorResult};

use crate::thread::wake::lock;

type Slot = Arc<dyn Any + Send + Sync>;

/// Per-actor key/value store.
///
/// Ownership checks happen in `ThreadActorRef`; by the time a call reaches
/// this type the caller is the owning actor, so the only contention is with
/// itself and `compute` may run without the lock held.
#[derive(Debug, Default)]
pub(crate) struct LocalStorage {
    slots: Mutex<HashMap<String, Slot>>,
}

fn downcast_slot<T: Any + Send + Sync>(key: &str, slot: Slot) -> ActorResult<Arc<T>> {
    slot.downcast::<T>().map_err(|_| ActorError::StorageType {
        key: key.to_string(),
    })
}

impl LocalStorage {
    pub(crate) fn get<T: Any + Send + Sync>(&self, key: &str) -> ActorResult<Option<Arc<T>>> {
        let slot = lock(&self.slots).get(key).cloned();
        slot.map(|slot| downcast_slot(key, slot)).transpose()
    }

    pub(crate) fn set<T: Any + Send + Sync>(&self, key: &str, value: T) {
        lock(&self.slots).insert(key.to_string(), Arc::new(value));
    }

    pub(crate) fn get_or_init<T, F>(&self, key: &str, compute: F) -> ActorResult<Arc<T>>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        if let Some(existing) = self.get(key)? {
            return Ok(existing);
        }

        let computed: Slot = Arc::new(compute());
        let slot = Arc::clone(
            lock(&self.slots)
                .entry(key.to_string())
                .or_insert(computed),
        );
        downcast_slot(key, slot)
    }

    pub(crate) fn remove(&self, key: &str) -> bool {
        lock(&self.slots).remove(key).is_some()
    }
}

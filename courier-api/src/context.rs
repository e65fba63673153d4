use std::any::Any;
use std::sync::Arc;

use crate::actor::ActorRef;
use crate::types::{ActorResult, BoxedMessage};

/// What a running actor can do to itself.
///
/// A context is only handed to the actor's own work, so operations that are
/// restricted to the owning actor need no further checks here.
pub trait ActorContext {
    type Actor: ActorRef;

    /// Handle to the actor executing this work.
    fn actor(&self) -> &Self::Actor;

    /// Blocking pop from the actor's own in-mailbox.
    fn receive(&self) -> ActorResult<BoxedMessage>;

    /// Returns the stored value for `key`, computing and storing it first if
    /// absent. `compute` runs at most once per key.
    fn store_if_absent<T, F>(&self, key: &str, compute: F) -> ActorResult<Arc<T>>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T;
}

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use courier_api::{ActorContext, ActorResult, BoxedMessage};

use crate::thread::actor::ThreadActorRef;
use crate::thread::system::ThreadRuntime;

thread_local! {
    static CURRENT: RefCell<Option<ThreadActorRef>> = const { RefCell::new(None) };
}

/// Marks the calling thread as running `actor` until dropped.
pub(crate) struct CurrentGuard {
    previous: Option<ThreadActorRef>,
}

impl Drop for CurrentGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CURRENT.with(|current| *current.borrow_mut() = previous);
    }
}

pub(crate) fn enter(actor: ThreadActorRef) -> CurrentGuard {
    let previous = CURRENT.with(|current| current.borrow_mut().replace(actor));
    CurrentGuard { previous }
}

/// The spawned actor whose work is running on this thread, if any.
pub fn current_actor() -> Option<ThreadActorRef> {
    CURRENT.with(|current| current.borrow().clone())
}

/// Context handed to an actor's work.
///
/// Everything here acts on the running actor itself; `runtime()` gives access
/// to spawning, ports and `select`.
pub struct ThreadContext {
    actor: ThreadActorRef,
    runtime: ThreadRuntime,
}

impl ThreadContext {
    pub(crate) fn new(actor: ThreadActorRef, runtime: ThreadRuntime) -> Self {
        Self { actor, runtime }
    }

    pub fn actor(&self) -> &ThreadActorRef {
        &self.actor
    }

    pub fn runtime(&self) -> &ThreadRuntime {
        &self.runtime
    }

    pub fn receive(&self) -> ActorResult<BoxedMessage> {
        self.actor.receive()
    }

    pub fn receive_as<T: Any>(&self) -> ActorResult<T> {
        self.actor.receive_as()
    }

    pub fn receive_timeout(&self, timeout: Duration) -> ActorResult<BoxedMessage> {
        self.actor.receive_timeout(timeout)
    }

    pub fn try_receive(&self) -> ActorResult<Option<BoxedMessage>> {
        self.actor.try_receive()
    }

    pub fn store_if_absent<T, F>(&self, key: &str, compute: F) -> ActorResult<Arc<T>>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        self.actor.store_if_absent(key, compute)
    }

    pub fn storage_get<T: Any + Send + Sync>(&self, key: &str) -> ActorResult<Option<Arc<T>>> {
        self.actor.storage_get(key)
    }

    pub fn storage_set<T: Any + Send + Sync>(&self, key: &str, value: T) -> ActorResult<()> {
        self.actor.storage_set(key, value)
    }
}

impl fmt::Debug for ThreadContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadContext")
            .field("actor", &self.actor)
            .finish()
    }
}

impl ActorContext for ThreadContext {
    type Actor = ThreadActorRef;

    fn actor(&self) -> &ThreadActorRef {
        ThreadContext::actor(self)
    }

    fn receive(&self) -> ActorResult<BoxedMessage> {
        ThreadContext::receive(self)
    }

    fn store_if_absent<T, F>(&self, key: &str, compute: F) -> ActorResult<Arc<T>>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        ThreadContext::store_if_absent(self, key, compute)
    }
}

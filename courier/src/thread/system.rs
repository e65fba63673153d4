//! # Thread Runtime
//!
//! `ThreadRuntime` is the process-wide context object of the thread backend.
//! It replaces class-level globals: the wake hub used by `select`, the
//! live-actor counter, the id counter and the registry of running actors all
//! live here and are handed to every actor, port and mailbox it creates.
//!
//! ## Key Concepts
//! - One OS thread per spawned actor; there is no shared event loop
//! - A main actor standing for every thread not running spawned work
//! - Teardown through `shutdown`, which closes every live actor's mailboxes

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::Location;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use courier_api::{
    downcast_message, ActorError, ActorId, ActorResult, ActorRuntime, BoxError, BoxedMessage,
};
use tracing::{debug, error, info, warn};

use crate::log_lifecycle;
use crate::thread::actor::{self, ThreadActorRef};
use crate::thread::config::{ActorConfig, RuntimeConfig};
use crate::thread::context::{current_actor, ThreadContext};
use crate::thread::mailbox::Mailbox;
use crate::thread::port::ThreadPort;
use crate::thread::select::{self, Patience, SelectResult, SelectSource};
use crate::thread::wake::{lock, WakeHub};

struct RuntimeInner {
    config: RuntimeConfig,
    hub: Arc<WakeHub>,
    next_id: AtomicU64,
    main: ThreadActorRef,
    /// Spawned actors whose thread has not finished yet.
    registry: Mutex<HashMap<ActorId, ThreadActorRef>>,
}

/// Thread-per-actor implementation of the Courier runtime.
///
/// Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct ThreadRuntime {
    inner: Arc<RuntimeInner>,
}

impl Default for ThreadRuntime {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}

impl fmt::Debug for ThreadRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadRuntime")
            .field("config", &self.inner.config)
            .field("live_actors", &self.live_actor_count())
            .finish()
    }
}

impl ThreadRuntime {
    /// Create a new runtime. The main actor is live from here on.
    pub fn new(config: RuntimeConfig) -> Self {
        let hub = Arc::new(WakeHub::new());
        let next_id = AtomicU64::new(1);
        let main_id = ActorId::new(next_id.fetch_add(1, Ordering::Relaxed));
        let main = ThreadActorRef::main(main_id, Arc::clone(&hub));
        hub.actor_started();

        debug!(?config, "thread runtime created");

        Self {
            inner: Arc::new(RuntimeInner {
                config,
                hub,
                next_id,
                main,
                registry: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Get a reference to the runtime configuration
    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    fn next_id(&self) -> ActorId {
        ActorId::new(self.inner.next_id.fetch_add(1, Ordering::Relaxed))
    }

    // --- Spawning ---

    /// Starts `work` on its own thread with `args`.
    #[track_caller]
    pub fn spawn<A, F, R, E>(&self, args: A, work: F) -> ActorResult<ThreadActorRef>
    where
        A: Send + 'static,
        F: FnOnce(&ThreadContext, A) -> Result<R, E> + Send + 'static,
        R: Any + Send,
        E: Into<BoxError>,
    {
        self.spawn_with(ActorConfig::default(), args, work)
    }

    /// Like `spawn`, with a name and thread options.
    #[track_caller]
    pub fn spawn_with<A, F, R, E>(
        &self,
        config: ActorConfig,
        args: A,
        work: F,
    ) -> ActorResult<ThreadActorRef>
    where
        A: Send + 'static,
        F: FnOnce(&ThreadContext, A) -> Result<R, E> + Send + 'static,
        R: Any + Send,
        E: Into<BoxError>,
    {
        let origin = Location::caller();
        let config = self.inner.config.merge_with_actor_config(&config)?;

        let id = self.next_id();
        let actor = ThreadActorRef::spawned(id, config.name, origin, Arc::clone(&self.inner.hub));
        let ctx = ThreadContext::new(actor.clone(), self.clone());

        let mut builder =
            thread::Builder::new().name(format!("{}-{}", self.inner.config.thread_name_prefix, id));
        if let Some(stack_size) = config.stack_size {
            builder = builder.stack_size(stack_size);
        }

        self.inner.hub.actor_started();
        lock(&self.inner.registry).insert(id, actor.clone());

        let runtime = self.clone();
        let thread_actor = actor.clone();
        let spawned = builder.spawn(move || {
            actor::run(thread_actor, ctx, args, work);
            runtime.deregister(id);
        });

        match spawned {
            Ok(handle) => {
                actor.attach_thread(handle);
                log_lifecycle!(id.get(), "spawned", origin = %origin);
                Ok(actor)
            }
            Err(err) => {
                error!(actor_id = id.get(), error = %err, "failed to start actor thread");
                self.deregister(id);
                self.inner.hub.actor_stopped();
                Err(ActorError::Spawn(err.to_string()))
            }
        }
    }

    fn deregister(&self, id: ActorId) {
        lock(&self.inner.registry).remove(&id);
    }

    // --- Ports and mailboxes ---

    /// Creates a port whose pushes wake this runtime's `select` waiters.
    pub fn port(&self) -> ThreadPort {
        ThreadPort::new(self.mailbox())
    }

    /// Creates a bare mailbox bound to this runtime.
    pub fn mailbox<T>(&self) -> Mailbox<T> {
        Mailbox::new(Arc::clone(&self.inner.hub))
    }

    // --- Current actor ---

    pub fn main_actor(&self) -> &ThreadActorRef {
        &self.inner.main
    }

    /// The actor executing on the calling thread; the main actor outside of
    /// spawned work.
    pub fn current(&self) -> ThreadActorRef {
        current_actor().unwrap_or_else(|| self.inner.main.clone())
    }

    pub fn is_main(&self) -> bool {
        self.current() == self.inner.main
    }

    /// Blocking receive on the current actor's in-mailbox.
    pub fn receive(&self) -> ActorResult<BoxedMessage> {
        self.current().receive()
    }

    pub fn receive_as<T: Any>(&self) -> ActorResult<T> {
        downcast_message(self.receive()?)
    }

    pub fn store_if_absent<T, F>(&self, key: &str, compute: F) -> ActorResult<Arc<T>>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        self.current().store_if_absent(key, compute)
    }

    // --- Select ---

    /// Blocks until one of `sources` has a ready message and returns it with
    /// its source. Sources are scanned in order on every wake.
    pub fn select(&self, sources: &[SelectSource]) -> ActorResult<SelectResult> {
        select::select(&self.inner.hub, sources, Patience::Block)
    }

    /// Scans `sources` once. Fails with `ActorError::NotReady` if none of
    /// them has a message queued.
    pub fn try_select(&self, sources: &[SelectSource]) -> ActorResult<SelectResult> {
        select::select(&self.inner.hub, sources, Patience::Poll)
    }

    pub fn select_timeout(
        &self,
        sources: &[SelectSource],
        timeout: Duration,
    ) -> ActorResult<SelectResult> {
        select::select(&self.inner.hub, sources, Patience::within(timeout))
    }

    // --- Liveness ---

    /// Number of live actors, the main actor included.
    pub fn live_actor_count(&self) -> usize {
        self.inner.hub.live_actors()
    }

    /// Waits until at most `target` actors are live. Returns `false` on
    /// timeout.
    pub fn wait_for_live_count(&self, target: usize, timeout: Duration) -> bool {
        self.inner.hub.wait_for_live_actors(target, timeout)
    }

    /// Closes the mailboxes of every running actor and waits for them to
    /// terminate.
    ///
    /// Work blocked on its mailboxes wakes up with `Closed`; work that never
    /// touches them cannot be interrupted, so this may time out.
    pub fn shutdown(&self) -> ActorResult<()> {
        let actors: Vec<ThreadActorRef> = lock(&self.inner.registry).values().cloned().collect();
        info!(actors = actors.len(), "shutting down thread runtime");

        for actor in &actors {
            actor.close();
        }

        let timeout = self.inner.config.shutdown_timeout;
        if self.wait_for_live_count(1, timeout) {
            info!("thread runtime shut down");
            Ok(())
        } else {
            warn!(live = self.live_actor_count(), "actors still running after shutdown timeout");
            Err(ActorError::Timeout(timeout))
        }
    }
}

impl ActorRuntime for ThreadRuntime {
    type Actor = ThreadActorRef;
    type Port = ThreadPort;
    type Context = ThreadContext;

    #[track_caller]
    fn spawn<A, F, R, E>(&self, args: A, work: F) -> ActorResult<ThreadActorRef>
    where
        A: Send + 'static,
        F: FnOnce(&ThreadContext, A) -> Result<R, E> + Send + 'static,
        R: Any + Send,
        E: Into<BoxError>,
    {
        ThreadRuntime::spawn(self, args, work)
    }

    fn port(&self) -> ThreadPort {
        ThreadRuntime::port(self)
    }

    fn current(&self) -> ThreadActorRef {
        ThreadRuntime::current(self)
    }

    fn select(&self, sources: &[SelectSource]) -> ActorResult<SelectResult> {
        ThreadRuntime::select(self, sources)
    }

    fn live_actor_count(&self) -> usize {
        ThreadRuntime::live_actor_count(self)
    }
}

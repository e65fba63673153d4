use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe, Location};
use std::sync::{Arc, Mutex, OnceLock};
use std::thread::JoinHandle;
use std::time::Duration;

use courier_api::{
    downcast_message, into_message, ActorError, ActorId, ActorRef, ActorResult, ActorStatus,
    BoxError, BoxedMessage, RemoteError, SharedError,
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::thread::context::{self, ThreadContext};
use crate::thread::error::MailboxError;
use crate::thread::mailbox::Mailbox;
use crate::thread::monitor::TerminationLock;
use crate::thread::port::ThreadPort;
use crate::thread::storage::LocalStorage;
use crate::thread::wake::{lock, WakeHub};
use crate::{actor_span, log_lifecycle};

/// Failure captured when an actor's work panics instead of returning.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("actor panicked: {message}")]
pub struct ActorPanic {
    message: String,
}

impl ActorPanic {
    fn from_payload(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else {
            "Unknown panic".to_string()
        };
        Self { message }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActorKind {
    /// Stands for every thread that is not running spawned work.
    Main,
    Spawned,
}

struct ActorCell {
    id: ActorId,
    name: Option<String>,
    origin: Option<&'static Location<'static>>,
    kind: ActorKind,
    inbox: Mailbox<BoxedMessage>,
    outbox: Mailbox<BoxedMessage>,
    termination: TerminationLock,
    /// Set once, before the mailboxes close, if the work failed.
    failure: OnceLock<SharedError>,
    storage: LocalStorage,
    thread: Mutex<Option<JoinHandle<()>>>,
    hub: Arc<WakeHub>,
}

/// Handle to an actor of a `ThreadRuntime`.
///
/// Clones refer to the same actor. Other parties may push to its in-mailbox,
/// pop from its out-mailbox (through `value` or `select`) and close either;
/// receiving and local storage are reserved to the actor itself.
#[derive(Clone)]
pub struct ThreadActorRef {
    cell: Arc<ActorCell>,
}

impl ThreadActorRef {
    fn with_kind(
        id: ActorId,
        name: Option<String>,
        origin: Option<&'static Location<'static>>,
        kind: ActorKind,
        hub: Arc<WakeHub>,
    ) -> Self {
        Self {
            cell: Arc::new(ActorCell {
                id,
                name,
                origin,
                kind,
                inbox: Mailbox::new(Arc::clone(&hub)),
                outbox: Mailbox::new(Arc::clone(&hub)),
                termination: TerminationLock::new(),
                failure: OnceLock::new(),
                storage: LocalStorage::default(),
                thread: Mutex::new(None),
                hub,
            }),
        }
    }

    pub(crate) fn main(id: ActorId, hub: Arc<WakeHub>) -> Self {
        Self::with_kind(id, None, None, ActorKind::Main, hub)
    }

    pub(crate) fn spawned(
        id: ActorId,
        name: Option<String>,
        origin: &'static Location<'static>,
        hub: Arc<WakeHub>,
    ) -> Self {
        Self::with_kind(id, name, Some(origin), ActorKind::Spawned, hub)
    }

    pub(crate) fn attach_thread(&self, handle: JoinHandle<()>) {
        *lock(&self.cell.thread) = Some(handle);
    }

    pub(crate) fn outbox(&self) -> &Mailbox<BoxedMessage> {
        &self.cell.outbox
    }

    /// The captured failure as seen by an observer. Never blocks.
    pub(crate) fn remote_failure(&self) -> Option<RemoteError> {
        self.cell
            .failure
            .get()
            .map(|cause| RemoteError::new(self.cell.id, self.cell.name.clone(), Arc::clone(cause)))
    }

    pub fn id(&self) -> ActorId {
        self.cell.id
    }

    pub fn name(&self) -> Option<&str> {
        self.cell.name.as_deref()
    }

    /// Where the actor was spawned from. `None` for the main actor.
    pub fn origin(&self) -> Option<&'static Location<'static>> {
        self.cell.origin
    }

    pub fn status(&self) -> ActorStatus {
        self.cell.termination.status()
    }

    pub fn is_terminated(&self) -> bool {
        self.status() == ActorStatus::Terminated
    }

    pub fn is_main(&self) -> bool {
        self.cell.kind == ActorKind::Main
    }

    /// Whether the calling thread is executing as this actor.
    pub fn is_current(&self) -> bool {
        match context::current_actor() {
            Some(current) => current == *self,
            None => self.is_main(),
        }
    }

    fn ensure_current(&self, operation: &str) -> ActorResult<()> {
        if self.is_current() {
            Ok(())
        } else {
            Err(ActorError::Access(format!(
                "cannot {} non-current actor #{}",
                operation, self.cell.id
            )))
        }
    }

    // --- Messaging ---

    pub fn send<M: Any + Send>(&self, message: M) -> ActorResult<&Self> {
        self.send_boxed(into_message(message))
    }

    pub fn send_boxed(&self, message: BoxedMessage) -> ActorResult<&Self> {
        if self.is_terminated() {
            return Err(ActorError::Closed);
        }
        self.cell.inbox.push(message)?;
        Ok(self)
    }

    /// Blocking pop from this actor's in-mailbox. Owner only.
    pub fn receive(&self) -> ActorResult<BoxedMessage> {
        self.ensure_current("receive from")?;
        Ok(self.cell.inbox.pop()?)
    }

    pub fn receive_as<T: Any>(&self) -> ActorResult<T> {
        downcast_message(self.receive()?)
    }

    pub fn receive_timeout(&self, timeout: Duration) -> ActorResult<BoxedMessage> {
        self.ensure_current("receive from")?;
        Ok(self.cell.inbox.pop_timeout(timeout)?)
    }

    pub fn try_receive(&self) -> ActorResult<Option<BoxedMessage>> {
        self.ensure_current("receive from")?;
        match self.cell.inbox.try_pop() {
            Ok(message) => Ok(Some(message)),
            Err(MailboxError::Empty) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub fn close_incoming(&self) -> &Self {
        self.cell.inbox.close();
        self
    }

    pub fn close_outgoing(&self) -> &Self {
        self.cell.outbox.close();
        self
    }

    pub fn close(&self) -> &Self {
        self.close_incoming();
        self.close_outgoing()
    }

    // --- Monitoring ---

    pub fn monitor(&self, port: &ThreadPort) -> bool {
        self.cell.termination.monitor(port)
    }

    pub fn unmonitor(&self, port: &ThreadPort) {
        self.cell.termination.unmonitor(port);
    }

    /// Number of ports still waiting for this actor's termination.
    pub fn monitor_count(&self) -> usize {
        self.cell.termination.monitor_count()
    }

    // --- Completion ---

    /// Blocks until the actor's work completed.
    ///
    /// Any number of threads may join; all of them observe the same outcome.
    /// A captured failure comes back as `ActorError::Remote` with the original
    /// failure as its source.
    pub fn join(&self) -> ActorResult<&Self> {
        if self.is_main() {
            return Err(ActorError::Argument("the main actor cannot be joined".to_string()));
        }
        if self.is_current() {
            return Err(ActorError::Argument(format!(
                "actor #{} cannot join itself",
                self.cell.id
            )));
        }

        self.cell.termination.wait();

        let thread = lock(&self.cell.thread).take();
        if let Some(thread) = thread {
            if thread.join().is_err() {
                warn!(actor_id = self.cell.id.get(), "actor thread panicked outside of its work");
            }
        }

        match self.remote_failure() {
            Some(remote) => Err(remote.into()),
            None => Ok(self),
        }
    }

    /// Joins, then takes the final value.
    ///
    /// The value is a single message: whichever of `value`, `select` or a
    /// direct out-mailbox pop comes first gets it, later calls fail with
    /// `ActorError::ValueTaken`. If the out-mailbox was closed before the
    /// work returned, the value is kept aside and `value` still gets it.
    pub fn value(&self) -> ActorResult<BoxedMessage> {
        self.join()?;
        match self.cell.outbox.try_pop() {
            Ok(message) => Ok(message),
            Err(_) => self
                .cell
                .termination
                .take_retained()
                .ok_or(ActorError::ValueTaken { actor: self.cell.id }),
        }
    }

    pub fn value_as<T: Any>(&self) -> ActorResult<T> {
        downcast_message(self.value()?)
    }

    // --- Local storage ---

    pub fn storage_get<T: Any + Send + Sync>(&self, key: &str) -> ActorResult<Option<Arc<T>>> {
        self.ensure_current("read local storage of")?;
        self.cell.storage.get(key)
    }

    pub fn storage_set<T: Any + Send + Sync>(&self, key: &str, value: T) -> ActorResult<()> {
        self.ensure_current("write local storage of")?;
        self.cell.storage.set(key, value);
        Ok(())
    }

    pub fn storage_remove(&self, key: &str) -> ActorResult<bool> {
        self.ensure_current("write local storage of")?;
        Ok(self.cell.storage.remove(key))
    }

    /// Returns the value stored under `key`, running `compute` and storing its
    /// result first if the key is absent.
    pub fn store_if_absent<T, F>(&self, key: &str, compute: F) -> ActorResult<Arc<T>>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        self.ensure_current("initialize local storage of")?;
        self.cell.storage.get_or_init(key, compute)
    }

    // --- Lifecycle ---

    fn finish(&self, failure: Option<SharedError>, retained: Option<BoxedMessage>) {
        let failed = failure.is_some();
        if let Some(err) = failure {
            debug!(actor_id = self.cell.id.get(), error = %err, "actor work failed, failure captured");
            let _ = self.cell.failure.set(err);
        }

        self.cell.inbox.close();
        self.cell.outbox.close();

        if let Some(tag) = self.cell.termination.terminate(failed, retained, &self.cell.hub) {
            log_lifecycle!(self.cell.id.get(), "terminated", tag = %tag);
        }
    }
}

/// Thread body of a spawned actor.
pub(crate) fn run<A, F, R, E>(actor: ThreadActorRef, ctx: ThreadContext, args: A, work: F)
where
    F: FnOnce(&ThreadContext, A) -> Result<R, E>,
    R: Any + Send,
    E: Into<BoxError>,
{
    let _current = context::enter(actor.clone());
    let span = actor_span!(actor.id().get(), name = ?actor.name());
    let _entered = span.enter();
    log_lifecycle!(actor.id().get(), "started");

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| work(&ctx, args)));
    let (failure, retained): (Option<BoxError>, Option<BoxedMessage>) = match outcome {
        Ok(Ok(value)) => match actor.cell.outbox.offer(into_message(value)) {
            Ok(()) => (None, None),
            Err(value) => {
                debug!(actor_id = actor.id().get(), "out-mailbox closed, keeping final value for value()");
                (None, Some(value))
            }
        },
        Ok(Err(err)) => (Some(err.into()), None),
        Err(payload) => (Some(Box::new(ActorPanic::from_payload(payload.as_ref())) as BoxError), None),
    };

    actor.finish(failure.map(Arc::from), retained);
}

impl PartialEq for ThreadActorRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }
}

impl Eq for ThreadActorRef {}

impl fmt::Debug for ThreadActorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadActorRef")
            .field("id", &self.cell.id)
            .field("name", &self.cell.name)
            .field("status", &self.status())
            .finish()
    }
}

impl fmt::Display for ThreadActorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<Actor:#{}", self.cell.id)?;
        if let Some(name) = &self.cell.name {
            write!(f, " {}", name)?;
        }
        if let Some(origin) = self.cell.origin {
            write!(f, " {}:{}", origin.file(), origin.line())?;
        }
        write!(f, " {}>", self.status())
    }
}

impl ActorRef for ThreadActorRef {
    type Port = ThreadPort;

    fn id(&self) -> ActorId {
        ThreadActorRef::id(self)
    }

    fn name(&self) -> Option<&str> {
        ThreadActorRef::name(self)
    }

    fn status(&self) -> ActorStatus {
        ThreadActorRef::status(self)
    }

    fn send_boxed(&self, message: BoxedMessage) -> ActorResult<&Self> {
        ThreadActorRef::send_boxed(self, message)
    }

    fn close_incoming(&self) -> &Self {
        ThreadActorRef::close_incoming(self)
    }

    fn close_outgoing(&self) -> &Self {
        ThreadActorRef::close_outgoing(self)
    }

    fn monitor(&self, port: &ThreadPort) -> bool {
        ThreadActorRef::monitor(self, port)
    }

    fn unmonitor(&self, port: &ThreadPort) {
        ThreadActorRef::unmonitor(self, port)
    }

    fn join(&self) -> ActorResult<&Self> {
        ThreadActorRef::join(self)
    }

    fn value(&self) -> ActorResult<BoxedMessage> {
        ThreadActorRef::value(self)
    }
}

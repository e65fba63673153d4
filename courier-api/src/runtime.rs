use std::any::Any;

use crate::actor::ActorRef;
use crate::context::ActorContext;
use crate::port::MessagePort;
use crate::types::{ActorResult, BoxError, BoxedMessage};

/// One candidate of a `select` call.
#[derive(Debug, Clone)]
pub enum Source<A, P> {
    /// Waits on the actor's out-mailbox.
    Actor(A),
    /// Waits on the port's mailbox.
    Port(P),
}

impl<A, P> Source<A, P> {
    pub fn as_actor(&self) -> Option<&A> {
        match self {
            Source::Actor(actor) => Some(actor),
            Source::Port(_) => None,
        }
    }
}

impl<A: PartialEq, P: PartialEq> PartialEq for Source<A, P> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Source::Actor(a), Source::Actor(b)) => a == b,
            (Source::Port(a), Source::Port(b)) => a == b,
            _ => false,
        }
    }
}

/// The source that produced a message, and the message itself.
pub type Selected<A, P> = (Source<A, P>, BoxedMessage);

/// Capability set of an actor runtime backend.
pub trait ActorRuntime: Clone + Send + Sync + 'static {
    type Actor: ActorRef<Port = Self::Port>;
    type Port: MessagePort;
    type Context: ActorContext<Actor = Self::Actor>;

    /// Starts `work` concurrently with `args`.
    ///
    /// A normal return value becomes the actor's final value; an `Err` (or a
    /// panic) is captured and surfaces from `join`/`value`.
    fn spawn<A, F, R, E>(&self, args: A, work: F) -> ActorResult<Self::Actor>
    where
        A: Send + 'static,
        F: FnOnce(&Self::Context, A) -> Result<R, E> + Send + 'static,
        R: Any + Send,
        E: Into<BoxError>;

    /// Creates a new port bound to this runtime.
    fn port(&self) -> Self::Port;

    /// The actor executing on the calling thread.
    fn current(&self) -> Self::Actor;

    /// Blocks until one of `sources` has a ready message.
    fn select(
        &self,
        sources: &[Source<Self::Actor, Self::Port>],
    ) -> ActorResult<Selected<Self::Actor, Self::Port>>;

    /// Number of actors that have not terminated yet.
    fn live_actor_count(&self) -> usize;
}

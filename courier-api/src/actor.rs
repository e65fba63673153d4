use std::fmt;

use crate::message::into_message;
use crate::port::MessagePort;
use crate::types::{ActorId, ActorResult, BoxedMessage};

/// Lifecycle status of an actor. Transitions `Running -> Terminated` once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorStatus {
    Running,
    Terminated,
}

impl fmt::Display for ActorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActorStatus::Running => f.write_str("running"),
            ActorStatus::Terminated => f.write_str("terminated"),
        }
    }
}

/// Tag delivered to monitor ports when the watched actor terminates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonitorTag {
    /// Work returned normally.
    Exited,
    /// Work failed and the failure was captured.
    Aborted,
}

impl MonitorTag {
    pub fn for_outcome(failed: bool) -> Self {
        if failed {
            MonitorTag::Aborted
        } else {
            MonitorTag::Exited
        }
    }
}

impl fmt::Display for MonitorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorTag::Exited => f.write_str("exited"),
            MonitorTag::Aborted => f.write_str("aborted"),
        }
    }
}

/// Handle to a spawned actor.
///
/// Handles are cheap to clone; every clone refers to the same actor.
/// Everything except [`ActorRef::join`] and [`ActorRef::value`] returns
/// immediately.
pub trait ActorRef: Clone + Send + Sync + fmt::Debug + 'static {
    /// Port type accepted for termination monitoring.
    type Port: MessagePort;

    fn id(&self) -> ActorId;

    fn name(&self) -> Option<&str>;

    fn status(&self) -> ActorStatus;

    fn is_terminated(&self) -> bool {
        self.status() == ActorStatus::Terminated
    }

    /// Pushes an already boxed message to the actor's in-mailbox.
    ///
    /// Fails with `ActorError::Closed` once the actor terminated or its
    /// in-mailbox was closed.
    fn send_boxed(&self, message: BoxedMessage) -> ActorResult<&Self>;

    /// Boxes `message` and pushes it to the in-mailbox. A `BoxedMessage` is
    /// sent as is.
    fn send<M>(&self, message: M) -> ActorResult<&Self>
    where
        M: std::any::Any + Send,
    {
        self.send_boxed(into_message(message))
    }

    fn close_incoming(&self) -> &Self;

    /// Closes the out-mailbox and wakes select waiters.
    fn close_outgoing(&self) -> &Self;

    fn close(&self) -> &Self {
        self.close_incoming();
        self.close_outgoing()
    }

    /// Registers `port` for the termination tag.
    ///
    /// Returns `false` if the actor already terminated, in which case the
    /// tag was delivered synchronously.
    fn monitor(&self, port: &Self::Port) -> bool;

    fn unmonitor(&self, port: &Self::Port);

    /// Blocks until the actor's work completed.
    fn join(&self) -> ActorResult<&Self>;

    /// Blocks until completion, then takes the actor's final value.
    fn value(&self) -> ActorResult<BoxedMessage>;
}

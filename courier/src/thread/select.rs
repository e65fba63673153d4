//! # Select Coordinator
//!
//! Blocks on the first ready message across a set of actors and ports.
//!
//! The waiter holds the runtime's hub lock while it scans its sources with
//! non-blocking pops, in the order given. If nothing is ready it waits on the
//! hub condition variable, which atomically releases the lock, and rescans
//! on every wake. Every mailbox push and close of the runtime takes the same
//! lock and broadcasts on the same condition, so a message can never arrive
//! between a failed scan and the wait.

use std::sync::Arc;
use std::time::{Duration, Instant};

use courier_api::{ActorError, ActorResult, BoxedMessage, Selected, Source};
use tracing::trace;

use crate::thread::actor::ThreadActorRef;
use crate::thread::error::MailboxError;
use crate::thread::mailbox::Mailbox;
use crate::thread::port::ThreadPort;
use crate::thread::wake::WakeHub;

/// A `select` candidate of the thread runtime.
pub type SelectSource = Source<ThreadActorRef, ThreadPort>;

/// What `select` hands back: the source that was ready, and its message.
pub type SelectResult = Selected<ThreadActorRef, ThreadPort>;

impl From<ThreadActorRef> for Source<ThreadActorRef, ThreadPort> {
    fn from(actor: ThreadActorRef) -> Self {
        Source::Actor(actor)
    }
}

impl From<ThreadPort> for Source<ThreadActorRef, ThreadPort> {
    fn from(port: ThreadPort) -> Self {
        Source::Port(port)
    }
}

fn outlet(source: &SelectSource) -> &Mailbox<BoxedMessage> {
    match source {
        Source::Actor(actor) => actor.outbox(),
        Source::Port(port) => port.mailbox(),
    }
}

fn validate(hub: &Arc<WakeHub>, sources: &[SelectSource]) -> ActorResult<()> {
    if sources.is_empty() {
        return Err(ActorError::Argument(
            "specify at least one actor or port".to_string(),
        ));
    }

    if let Some(index) = sources
        .iter()
        .position(|source| !Arc::ptr_eq(outlet(source).hub(), hub))
    {
        return Err(ActorError::Argument(format!(
            "select source #{} belongs to a different runtime",
            index
        )));
    }

    Ok(())
}

/// How long `select` may block when nothing is ready.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Patience {
    Block,
    Until { deadline: Instant, timeout: Duration },
    /// Scan once and fail with `NotReady` instead of waiting.
    Poll,
}

impl Patience {
    pub(crate) fn within(timeout: Duration) -> Self {
        Patience::Until {
            deadline: Instant::now() + timeout,
            timeout,
        }
    }
}

/// Waits until one of `sources` yields a message, as long as `patience`
/// allows.
///
/// Sources that are closed and drained are skipped; if all of them are,
/// the call fails with `ActorError::Closed`. A skipped actor whose work
/// failed ends the select with its `ActorError::Remote` instead.
pub(crate) fn select(
    hub: &Arc<WakeHub>,
    sources: &[SelectSource],
    patience: Patience,
) -> ActorResult<SelectResult> {
    validate(hub, sources)?;

    let mut guard = hub.lock();
    let mut wakes = 0usize;

    loop {
        let mut pending = false;
        for source in sources {
            match outlet(source).try_pop() {
                Ok(message) => {
                    trace!(wakes, "select satisfied");
                    return Ok((source.clone(), message));
                }
                Err(MailboxError::Empty) => pending = true,
                Err(_) => {
                    if let Some(remote) = source.as_actor().and_then(ThreadActorRef::remote_failure) {
                        trace!(actor_id = remote.actor().get(), "select hit a failed actor");
                        return Err(remote.into());
                    }
                }
            }
        }

        if !pending {
            return Err(ActorError::Closed);
        }

        guard = match patience {
            Patience::Block => hub.wait(guard),
            Patience::Until { deadline, timeout } => {
                let now = Instant::now();
                if now >= deadline {
                    return Err(ActorError::Timeout(timeout));
                }
                hub.wait_timeout(guard, deadline - now)
            }
            Patience::Poll => return Err(ActorError::NotReady),
        };
        wakes += 1;
    }
}

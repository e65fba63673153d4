//! # Termination Monitoring
//!
//! Every actor owns a `TerminationLock`: its status, whether its work failed,
//! a final value that could not be handed out, and the ports waiting for its
//! termination tag, all behind one mutex.
//!
//! Registration and termination both run under that mutex, which closes the
//! window between "is it terminated?" and "register me". A monitor
//! registered before termination gets the tag exactly once when the actor
//! terminates; one registered afterwards gets it synchronously and is never
//! stored.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use courier_api::{ActorStatus, BoxedMessage, MonitorTag};
use tracing::{debug, warn};

use crate::thread::port::ThreadPort;
use crate::thread::wake::{lock, WakeHub};

/// Ports interested in one actor's termination.
#[derive(Debug, Default)]
pub(crate) struct MonitorRegistry {
    ports: Vec<ThreadPort>,
}

impl MonitorRegistry {
    /// Adds `port` unless it is already registered.
    pub(crate) fn register(&mut self, port: &ThreadPort) {
        if !self.ports.contains(port) {
            self.ports.push(port.clone());
        }
    }

    pub(crate) fn unregister(&mut self, port: &ThreadPort) -> bool {
        let before = self.ports.len();
        self.ports.retain(|registered| registered != port);
        self.ports.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.ports.len()
    }

    /// Sends `tag` to every registered port and clears the registry.
    /// Returns how many ports accepted the tag.
    pub(crate) fn notify(&mut self, tag: MonitorTag) -> usize {
        self.ports
            .drain(..)
            .filter(|port| deliver(port, tag))
            .count()
    }
}

fn deliver(port: &ThreadPort, tag: MonitorTag) -> bool {
    match port.send(tag) {
        Ok(_) => true,
        Err(err) => {
            warn!(%tag, error = %err, "monitor port rejected termination tag");
            false
        }
    }
}

#[derive(Debug)]
struct Termination {
    status: ActorStatus,
    failed: bool,
    /// Final value of a successful actor whose out-mailbox was already closed.
    retained: Option<BoxedMessage>,
    monitors: MonitorRegistry,
}

impl Termination {
    fn tag(&self) -> MonitorTag {
        MonitorTag::for_outcome(self.failed)
    }
}

/// Status, outcome and monitor list of one actor.
#[derive(Debug)]
pub(crate) struct TerminationLock {
    state: Mutex<Termination>,
    finished: Condvar,
}

impl TerminationLock {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(Termination {
                status: ActorStatus::Running,
                failed: false,
                retained: None,
                monitors: MonitorRegistry::default(),
            }),
            finished: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Termination> {
        lock(&self.state)
    }

    pub(crate) fn status(&self) -> ActorStatus {
        self.lock().status
    }

    /// Registers `port`, or delivers the tag right away if the actor already
    /// terminated. Returns whether the port was registered.
    pub(crate) fn monitor(&self, port: &ThreadPort) -> bool {
        let mut state = self.lock();
        match state.status {
            ActorStatus::Terminated => {
                deliver(port, state.tag());
                false
            }
            ActorStatus::Running => {
                state.monitors.register(port);
                true
            }
        }
    }

    pub(crate) fn unmonitor(&self, port: &ThreadPort) {
        let mut state = self.lock();
        if state.status == ActorStatus::Running {
            state.monitors.unregister(port);
        }
    }

    pub(crate) fn monitor_count(&self) -> usize {
        self.lock().monitors.len()
    }

    /// Flips the status to terminated, releases the live-actor slot, notifies
    /// and clears the monitors, and wakes every joiner. Only the first call
    /// has any effect; it returns the tag that was delivered.
    pub(crate) fn terminate(
        &self,
        failed: bool,
        retained: Option<BoxedMessage>,
        hub: &WakeHub,
    ) -> Option<MonitorTag> {
        let mut state = self.lock();
        if state.status == ActorStatus::Terminated {
            return None;
        }

        state.status = ActorStatus::Terminated;
        state.failed = failed;
        state.retained = retained;
        hub.actor_stopped();

        let tag = state.tag();
        let notified = state.monitors.notify(tag);
        debug!(%tag, notified, "termination delivered to monitors");

        self.finished.notify_all();
        Some(tag)
    }

    /// Blocks until terminated.
    pub(crate) fn wait(&self) {
        let mut state = self.lock();
        while state.status == ActorStatus::Running {
            state = self
                .finished
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Hands out the retained final value, once.
    pub(crate) fn take_retained(&self) -> Option<BoxedMessage> {
        self.lock().retained.take()
    }
}

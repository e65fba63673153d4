//! # Wake Hub
//!
//! The process-wide synchronization point shared by every mailbox of a
//! runtime. One mutex guards the live-actor counter and serializes every
//! mailbox push and close; one condition variable is broadcast after each of
//! them. A `select` waiter scans its sources while holding the mutex and
//! releases it only inside `Condvar::wait`, so a push can never slip between
//! a failed scan and the wait.
//!
//! Lock order: hub, then mailbox state. Nothing holding a mailbox state lock
//! may take the hub.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Locks `mutex`, recovering the guard if a previous holder panicked.
///
/// Actor work never runs while a runtime lock is held, so the protected data
/// is never left half-updated.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
pub(crate) struct HubState {
    live_actors: usize,
}

#[derive(Debug, Default)]
pub(crate) struct WakeHub {
    state: Mutex<HubState>,
    signal: Condvar,
}

impl WakeHub {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, HubState> {
        lock(&self.state)
    }

    /// Wakes every waiter. Callers hold the hub lock.
    pub(crate) fn broadcast(&self) {
        self.signal.notify_all();
    }

    pub(crate) fn wait<'a>(&self, guard: MutexGuard<'a, HubState>) -> MutexGuard<'a, HubState> {
        self.signal.wait(guard).unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn wait_timeout<'a>(
        &self,
        guard: MutexGuard<'a, HubState>,
        timeout: Duration,
    ) -> MutexGuard<'a, HubState> {
        let (guard, _) = self
            .signal
            .wait_timeout(guard, timeout)
            .unwrap_or_else(PoisonError::into_inner);
        guard
    }

    pub(crate) fn live_actors(&self) -> usize {
        self.lock().live_actors
    }

    pub(crate) fn actor_started(&self) {
        let mut state = self.lock();
        state.live_actors += 1;
        self.broadcast();
    }

    pub(crate) fn actor_stopped(&self) {
        let mut state = self.lock();
        state.live_actors = state.live_actors.saturating_sub(1);
        self.broadcast();
    }

    /// Blocks until at most `target` actors are live. Returns `false` if the
    /// timeout elapsed first.
    pub(crate) fn wait_for_live_actors(&self, target: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.lock();
        while state.live_actors > target {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            state = self.wait_timeout(state, deadline - now);
        }
        true
    }
}

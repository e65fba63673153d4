use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::thread::error::MailboxError;
use crate::thread::wake::{lock, WakeHub};

struct MailboxState<T> {
    queue: VecDeque<T>,
    closed: bool,
}

struct MailboxInner<T> {
    state: Mutex<MailboxState<T>>,
    /// Wakes blocking pops on this mailbox only.
    ready: Condvar,
    /// Shared wake point of the owning runtime; broadcast on every push and close.
    hub: Arc<WakeHub>,
}

/// A thread-safe, closeable, unbounded FIFO queue.
///
/// Clones share the same queue. Messages pushed by one thread are popped in
/// push order. Once closed, a mailbox rejects pushes but still hands out the
/// messages it buffered; pops report `Closed` only when it is also empty.
pub struct Mailbox<T> {
    inner: Arc<MailboxInner<T>>,
}

impl<T> Clone for Mailbox<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Mailbox<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = lock(&self.inner.state);
        f.debug_struct("Mailbox")
            .field("len", &state.queue.len())
            .field("closed", &state.closed)
            .finish()
    }
}

impl<T> Mailbox<T> {
    pub(crate) fn new(hub: Arc<WakeHub>) -> Self {
        Self {
            inner: Arc::new(MailboxInner {
                state: Mutex::new(MailboxState {
                    queue: VecDeque::new(),
                    closed: false,
                }),
                ready: Condvar::new(),
                hub,
            }),
        }
    }

    /// Appends `msg`, failing with `Closed` if the mailbox was closed.
    pub fn push(&self, msg: T) -> Result<(), MailboxError> {
        self.offer(msg).map_err(|_| MailboxError::Closed)
    }

    /// Like `push`, but a closed mailbox hands `msg` back.
    pub fn offer(&self, msg: T) -> Result<(), T> {
        let _wake = self.inner.hub.lock();
        {
            let mut state = lock(&self.inner.state);
            if state.closed {
                return Err(msg);
            }
            state.queue.push_back(msg);
        }
        self.inner.ready.notify_all();
        self.inner.hub.broadcast();
        Ok(())
    }

    /// Blocks until a message is available, or fails with `Closed` once the
    /// mailbox is closed and drained.
    pub fn pop(&self) -> Result<T, MailboxError> {
        let mut state = lock(&self.inner.state);
        loop {
            if let Some(msg) = state.queue.pop_front() {
                return Ok(msg);
            }
            if state.closed {
                return Err(MailboxError::Closed);
            }
            state = self
                .inner
                .ready
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Like `pop`, but fails with `Timeout` once `timeout` elapsed.
    pub fn pop_timeout(&self, timeout: Duration) -> Result<T, MailboxError> {
        let deadline = Instant::now() + timeout;
        let mut state = lock(&self.inner.state);
        loop {
            if let Some(msg) = state.queue.pop_front() {
                return Ok(msg);
            }
            if state.closed {
                return Err(MailboxError::Closed);
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(MailboxError::Timeout(timeout));
            }
            state = self
                .inner
                .ready
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    /// Non-blocking pop. `Empty` means nothing is queued yet; `Closed` means
    /// nothing ever will be.
    pub fn try_pop(&self) -> Result<T, MailboxError> {
        let mut state = lock(&self.inner.state);
        match state.queue.pop_front() {
            Some(msg) => Ok(msg),
            None if state.closed => Err(MailboxError::Closed),
            None => Err(MailboxError::Empty),
        }
    }

    /// Closes the mailbox. Returns `true` if this call closed it.
    pub fn close(&self) -> bool {
        let _wake = self.inner.hub.lock();
        let newly_closed = {
            let mut state = lock(&self.inner.state);
            !std::mem::replace(&mut state.closed, true)
        };
        self.inner.ready.notify_all();
        self.inner.hub.broadcast();
        newly_closed
    }

    pub fn is_closed(&self) -> bool {
        lock(&self.inner.state).closed
    }

    pub fn len(&self) -> usize {
        lock(&self.inner.state).queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether both handles refer to the same queue.
    pub fn same_queue(&self, other: &Mailbox<T>) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn hub(&self) -> &Arc<WakeHub> {
        &self.inner.hub
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn mailbox<T>() -> Mailbox<T> {
        Mailbox::new(Arc::new(WakeHub::new()))
    }

    #[test]
    fn test_push_and_pop_fifo() {
        let mailbox = mailbox();
        for i in 0..5 {
            mailbox.push(i).unwrap();
        }

        let popped: Vec<i32> = (0..5).map(|_| mailbox.pop().unwrap()).collect();
        assert_eq!(popped, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_try_pop_on_empty_is_not_ready() {
        let mailbox = mailbox::<i32>();
        assert_eq!(mailbox.try_pop(), Err(MailboxError::Empty));
    }

    #[test]
    fn test_push_after_close_fails() {
        let mailbox = mailbox();
        assert!(mailbox.close());
        assert_eq!(mailbox.push(1), Err(MailboxError::Closed));
    }

    #[test]
    fn test_offer_hands_back_rejected_message() {
        let mailbox = mailbox();
        assert_eq!(mailbox.offer(String::from("kept")), Ok(()));
        mailbox.close();

        assert_eq!(mailbox.offer(String::from("late")), Err(String::from("late")));
        assert_eq!(mailbox.pop().unwrap(), "kept");
    }

    #[test]
    fn test_close_drains_before_reporting_closed() {
        let mailbox = mailbox();
        mailbox.push("a").unwrap();
        mailbox.push("b").unwrap();
        mailbox.close();

        assert_eq!(mailbox.pop(), Ok("a"));
        assert_eq!(mailbox.try_pop(), Ok("b"));
        assert_eq!(mailbox.pop(), Err(MailboxError::Closed));
        assert_eq!(mailbox.try_pop(), Err(MailboxError::Closed));
    }

    #[test]
    fn test_close_is_idempotent() {
        let mailbox = mailbox::<()>();
        assert!(mailbox.close());
        assert!(!mailbox.close());
        assert!(mailbox.is_closed());
    }

    #[test]
    fn test_blocking_pop_wakes_on_push() {
        let mailbox = mailbox();
        let producer = mailbox.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            producer.push(7).unwrap();
        });

        assert_eq!(mailbox.pop(), Ok(7));
        handle.join().unwrap();
    }

    #[test]
    fn test_blocking_pop_wakes_on_close() {
        let mailbox = mailbox::<u8>();
        let closer = mailbox.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            closer.close();
        });

        assert_eq!(mailbox.pop(), Err(MailboxError::Closed));
        handle.join().unwrap();
    }

    #[test]
    fn test_pop_timeout_elapses() {
        let mailbox = mailbox::<u8>();
        let timeout = Duration::from_millis(20);
        assert_eq!(mailbox.pop_timeout(timeout), Err(MailboxError::Timeout(timeout)));
    }

    #[test]
    fn test_single_sender_order_is_preserved_across_threads() {
        let mailbox = mailbox();
        let producer = mailbox.clone();
        let handle = thread::spawn(move || {
            for i in 0..1000 {
                producer.push(i).unwrap();
            }
            producer.close();
        });

        let mut expected = 0;
        while let Ok(i) = mailbox.pop() {
            assert_eq!(i, expected);
            expected += 1;
        }
        assert_eq!(expected, 1000);
        handle.join().unwrap();
    }

    #[test]
    fn test_same_queue() {
        let a = mailbox::<u8>();
        let b = a.clone();
        let c = mailbox::<u8>();
        assert!(a.same_queue(&b));
        assert!(!a.same_queue(&c));
    }
}

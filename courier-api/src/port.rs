use std::fmt;

use crate::message::into_message;
use crate::types::{ActorResult, BoxedMessage};

/// A shareable handle to one mailbox.
///
/// Clones share the same underlying queue; the queue lives as long as the
/// last handle.
pub trait MessagePort: Clone + Send + Sync + fmt::Debug + 'static {
    fn send_boxed(&self, message: BoxedMessage) -> ActorResult<&Self>;

    fn send<M>(&self, message: M) -> ActorResult<&Self>
    where
        M: std::any::Any + Send,
    {
        self.send_boxed(into_message(message))
    }

    /// Blocks until a message arrives, or fails with `Closed` once the port
    /// is closed and drained.
    fn receive(&self) -> ActorResult<BoxedMessage>;

    /// Returns `Ok(None)` when nothing is queued yet.
    fn try_receive(&self) -> ActorResult<Option<BoxedMessage>>;

    fn close(&self) -> &Self;

    fn is_closed(&self) -> bool;
}

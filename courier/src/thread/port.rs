use std::any::Any;
use std::fmt;
use std::time::Duration;

use courier_api::{downcast_message, into_message, ActorResult, BoxedMessage, MessagePort};

use crate::thread::error::MailboxError;
use crate::thread::mailbox::Mailbox;

/// An addressable endpoint wrapping one mailbox.
///
/// Every clone refers to the same mailbox, so a port can be handed to several
/// actors (for example as a monitor target) and read from anywhere.
#[derive(Clone)]
pub struct ThreadPort {
    mailbox: Mailbox<BoxedMessage>,
}

impl ThreadPort {
    pub(crate) fn new(mailbox: Mailbox<BoxedMessage>) -> Self {
        Self { mailbox }
    }

    pub fn send<M: Any + Send>(&self, message: M) -> ActorResult<&Self> {
        self.send_boxed(into_message(message))
    }

    pub fn send_boxed(&self, message: BoxedMessage) -> ActorResult<&Self> {
        self.mailbox.push(message)?;
        Ok(self)
    }

    pub fn receive(&self) -> ActorResult<BoxedMessage> {
        Ok(self.mailbox.pop()?)
    }

    pub fn receive_as<T: Any>(&self) -> ActorResult<T> {
        downcast_message(self.receive()?)
    }

    pub fn receive_timeout(&self, timeout: Duration) -> ActorResult<BoxedMessage> {
        Ok(self.mailbox.pop_timeout(timeout)?)
    }

    pub fn try_receive(&self) -> ActorResult<Option<BoxedMessage>> {
        match self.mailbox.try_pop() {
            Ok(message) => Ok(Some(message)),
            Err(MailboxError::Empty) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub fn close(&self) -> &Self {
        self.mailbox.close();
        self
    }

    pub fn is_closed(&self) -> bool {
        self.mailbox.is_closed()
    }

    /// Number of queued messages.
    pub fn len(&self) -> usize {
        self.mailbox.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mailbox.is_empty()
    }

    pub(crate) fn mailbox(&self) -> &Mailbox<BoxedMessage> {
        &self.mailbox
    }
}

impl PartialEq for ThreadPort {
    fn eq(&self, other: &Self) -> bool {
        self.mailbox.same_queue(&other.mailbox)
    }
}

impl Eq for ThreadPort {}

impl fmt::Debug for ThreadPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadPort")
            .field("len", &self.mailbox.len())
            .field("closed", &self.mailbox.is_closed())
            .finish()
    }
}

impl MessagePort for ThreadPort {
    fn send_boxed(&self, message: BoxedMessage) -> ActorResult<&Self> {
        ThreadPort::send_boxed(self, message)
    }

    fn receive(&self) -> ActorResult<BoxedMessage> {
        ThreadPort::receive(self)
    }

    fn try_receive(&self) -> ActorResult<Option<BoxedMessage>> {
        ThreadPort::try_receive(self)
    }

    fn close(&self) -> &Self {
        ThreadPort::close(self)
    }

    fn is_closed(&self) -> bool {
        ThreadPort::is_closed(self)
    }
}

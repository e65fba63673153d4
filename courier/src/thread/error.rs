use std::time::Duration;

use courier_api::ActorError;
use thiserror::Error;

/// Errors related to Mailbox operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MailboxError {
    #[error("Mailbox is closed")]
    Closed,
    #[error("Mailbox is empty")]
    Empty,
    #[error("Mailbox pop timed out after {0:?}")]
    Timeout(Duration),
}

impl From<MailboxError> for ActorError {
    fn from(err: MailboxError) -> Self {
        match err {
            MailboxError::Closed => ActorError::Closed,
            MailboxError::Empty => ActorError::NotReady,
            MailboxError::Timeout(after) => ActorError::Timeout(after),
        }
    }
}

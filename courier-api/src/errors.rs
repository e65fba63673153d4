//! # Actor Runtime Error Types
//!
//! This module defines the error taxonomy shared by every Courier backend.
//!
//! - `Closed`: sending to, or popping from a drained, closed mailbox.
//!   Recoverable by the caller.
//! - `Remote`: raised by `join`/`value` when the observed actor's work
//!   failed. Wraps the original failure as its source.
//! - `Argument`: invalid `select` or spawn invocation.
//! - `Access`: an owner-only operation (receive, local storage) invoked
//!   from a different actor.
//!
//! Failures inside an actor's work never crash the process. They are
//! captured and only surface to an observer that explicitly joins the
//! actor; if nobody does, the failure is absorbed.
//!
//! ## Usage Example
//!
//! ```rust
//! use courier_api::errors::ActorError;
//!
//! fn describe(error: &ActorError) -> &'static str {
//!     match error {
//!         ActorError::Closed => "mailbox closed",
//!         ActorError::Remote(_) => "remote actor failed",
//!         _ => "other",
//!     }
//! }
//!
//! assert_eq!(describe(&ActorError::Closed), "mailbox closed");
//! ```

use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::types::{ActorId, BoxError};

/// A captured failure shared by every observer of a terminated actor.
pub type SharedError = Arc<dyn Error + Send + Sync + 'static>;

/// Core error type for the actor runtime.
#[derive(Error, Debug, Clone)]
pub enum ActorError {
    /// The target mailbox or port was closed.
    #[error("The port was already closed")]
    Closed,

    /// The observed actor terminated with a failure.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// A non-blocking pop found nothing queued.
    #[error("No message is ready")]
    NotReady,

    /// Invalid invocation, e.g. `select` over an empty source list.
    #[error("Invalid argument: {0}")]
    Argument(String),

    /// Owner-only operation invoked from another actor.
    #[error("Access denied: {0}")]
    Access(String),

    /// The final value was already consumed by another observer.
    #[error("The value of actor #{actor} was already taken")]
    ValueTaken { actor: ActorId },

    /// A message could not be downcast to the requested type.
    #[error("Unexpected message type, expected {expected}")]
    UnexpectedMessage { expected: &'static str },

    /// A local storage slot holds a value of another type.
    #[error("Local storage entry {key:?} holds a value of a different type")]
    StorageType { key: String },

    /// A bounded wait elapsed.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// The underlying thread of execution could not be started.
    #[error("Failed to spawn actor: {0}")]
    Spawn(String),
}

/// Error raised to an observer when the target actor's work failed.
///
/// The original failure is exposed through [`Error::source`] and
/// [`RemoteError::cause`].
#[derive(Debug, Clone)]
pub struct RemoteError {
    actor: ActorId,
    name: Option<String>,
    cause: SharedError,
}

impl RemoteError {
    pub fn new(actor: ActorId, name: Option<String>, cause: SharedError) -> Self {
        Self { actor, name, cause }
    }

    /// Wraps a freshly boxed failure.
    pub fn from_boxed(actor: ActorId, name: Option<String>, cause: BoxError) -> Self {
        Self::new(actor, name, Arc::from(cause))
    }

    /// Id of the actor that failed.
    pub fn actor(&self) -> ActorId {
        self.actor
    }

    /// Name of the actor that failed, if it had one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The original failure.
    pub fn cause(&self) -> &(dyn Error + Send + Sync + 'static) {
        &*self.cause
    }

    /// Shared handle to the original failure.
    pub fn shared_cause(&self) -> SharedError {
        Arc::clone(&self.cause)
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "thrown by remote actor #{} ({})", self.actor, name),
            None => write!(f, "thrown by remote actor #{}", self.actor),
        }
    }
}

impl Error for RemoteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&*self.cause)
    }
}

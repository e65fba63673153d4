//! Boxing and unboxing of the dynamically typed messages carried by
//! mailboxes, ports and actor results.

use std::any::{type_name, Any};

use crate::errors::ActorError;
use crate::types::{ActorResult, BoxedMessage};

/// Boxes `value` as a message. An already boxed message is passed through
/// instead of being boxed twice.
pub fn into_message<M: Any + Send>(value: M) -> BoxedMessage {
    let boxed: BoxedMessage = Box::new(value);
    match boxed.downcast::<BoxedMessage>() {
        Ok(inner) => *inner,
        Err(boxed) => boxed,
    }
}

/// Takes a message out of its box as `T`.
pub fn downcast_message<T: Any>(message: BoxedMessage) -> ActorResult<T> {
    message
        .downcast::<T>()
        .map(|boxed| *boxed)
        .map_err(|_| ActorError::UnexpectedMessage {
            expected: type_name::<T>(),
        })
}

use crate::errors::ActorError;
use std::any::Any;
use std::error::Error;
use std::fmt;

// Type aliases for common types
pub type BoxedMessage = Box<dyn Any + Send>;
pub type BoxError = Box<dyn Error + Send + Sync>;
pub type ActorResult<T> = Result<T, ActorError>;

/// Return type for actor work that does not need a dedicated error type.
pub type WorkResult<T> = Result<T, BoxError>;

/// Process-unique actor identity, assigned from a monotonic counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(u64);

impl ActorId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

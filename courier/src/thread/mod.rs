#![doc = " Thread-per-actor backend of the Courier runtime."]

pub mod actor;
pub mod config;
pub mod context;
pub mod error;
pub mod mailbox;
mod monitor;
pub mod port;
pub mod select;
mod storage;
pub mod system;
mod wake;

// Re-export key types for easier usage
pub use actor::{ActorPanic, ThreadActorRef};
pub use config::{ActorConfig, RuntimeConfig};
pub use context::{current_actor, ThreadContext};
pub use error::MailboxError;
pub use mailbox::Mailbox;
pub use port::ThreadPort;
pub use select::{SelectResult, SelectSource};
pub use system::ThreadRuntime;

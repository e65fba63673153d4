// Courier Actor Runtime
//
// This crate provides the thread-per-actor implementation of the Courier
// actor API: actors with incoming and outgoing mailboxes, ports, multi-way
// select and termination monitoring.

pub mod logging;
pub mod thread;

// Re-export commonly used types
pub use courier_api::{
    downcast_message, into_message, ActorContext, ActorError, ActorId, ActorRef, ActorResult, ActorRuntime, ActorStatus, BoxError,
    BoxedMessage, MessagePort, MonitorTag, RemoteError, Selected, Source, WorkResult,
};
pub use thread::*;

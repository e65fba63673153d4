//! # Courier Actor Runtime API
//!
//! Courier is a lightweight actor runtime: independent units of execution
//! that communicate only through message-passing mailboxes, can wait on
//! several mailboxes at once, and can be notified when another actor
//! finishes or fails.
//!
//! This crate describes the capability set every backend provides. The
//! `courier` crate supplies the thread-per-actor implementation; there is
//! exactly one backend per build and no runtime switching between them.
//!
//! ## Core Components
//!
//! - **Runtime**: the process-wide context that spawns actors, creates ports
//!   and coordinates `select`
//! - **Actors**: units of work with an incoming and an outgoing mailbox
//! - **Ports**: shareable handles to a single mailbox, used for monitoring
//!   and for external send/receive channels
//! - **Monitoring**: one-shot termination notifications delivered to ports
//!
//! ## Module Organization
//!
//! - [`actor`]: actor handles, status and monitor tags
//! - [`port`]: message ports
//! - [`context`]: the view an actor has of itself while running
//! - [`runtime`]: spawning, selecting and liveness accounting
//! - [`errors`]: error taxonomy
//! - [`message`]: boxing and downcasting of messages
//! - [`types`]: common type definitions

pub mod actor;
pub mod context;
pub mod errors;
pub mod message;
pub mod port;
pub mod runtime;
pub mod types;

pub use actor::{ActorRef, ActorStatus, MonitorTag};
pub use context::ActorContext;
pub use errors::{ActorError, RemoteError, SharedError};
pub use message::{downcast_message, into_message};
pub use port::MessagePort;
pub use runtime::{ActorRuntime, Selected, Source};
pub use types::{ActorId, ActorResult, BoxError, BoxedMessage, WorkResult};

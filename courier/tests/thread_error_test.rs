// Integration tests for error types in courier::thread::error

use std::time::Duration;

use courier::thread::error::MailboxError;
use courier::{ActorError, ActorPanic, ThreadRuntime, WorkResult};

#[test]
fn test_mailbox_error_display() {
    assert_eq!(MailboxError::Closed.to_string(), "Mailbox is closed");
    assert_eq!(MailboxError::Empty.to_string(), "Mailbox is empty");
    assert_eq!(
        MailboxError::Timeout(Duration::from_millis(250)).to_string(),
        "Mailbox pop timed out after 250ms"
    );
}

#[test]
fn test_mailbox_error_conversion() {
    assert!(matches!(ActorError::from(MailboxError::Closed), ActorError::Closed));
    assert!(matches!(ActorError::from(MailboxError::Empty), ActorError::NotReady));
    assert!(matches!(
        ActorError::from(MailboxError::Timeout(Duration::from_secs(1))),
        ActorError::Timeout(after) if after == Duration::from_secs(1)
    ));
}

#[test]
fn test_actor_panic_display() {
    let runtime = ThreadRuntime::default();
    let actor = runtime
        .spawn((), |_ctx, ()| -> WorkResult<()> {
            panic!("formatted {}", 7)
        })
        .unwrap();

    let remote = match actor.join() {
        Err(ActorError::Remote(remote)) => remote,
        other => panic!("expected remote error, got {:?}", other),
    };
    let panic = remote.cause().downcast_ref::<ActorPanic>().unwrap();
    assert_eq!(panic.message(), "formatted 7");
    assert_eq!(panic.to_string(), "actor panicked: formatted 7");
}

// Integration tests for the thread runtime: liveness, main actor, shutdown.

use std::time::Duration;

use courier::logging;
use courier::{
    current_actor, into_message, ActorError, ActorRef, ActorRuntime, BoxedMessage, MessagePort,
    RuntimeConfig, ThreadPort, ThreadRuntime, WorkResult,
};

const WAIT: Duration = Duration::from_secs(5);

fn answer<R: ActorRuntime>(runtime: &R) -> i64 {
    let actor = runtime
        .spawn(20i64, |_ctx, n| -> WorkResult<i64> { Ok(n * 2 + 2) })
        .unwrap();
    let value = actor.value().unwrap();
    *value.downcast::<i64>().unwrap()
}

fn forward_to_port<P: MessagePort>(port: &P, message: BoxedMessage) {
    port.send(message).unwrap();
}

fn forward_to_actor<A: ActorRef>(actor: &A, message: BoxedMessage) {
    actor.send(message).unwrap();
}

#[test]
fn test_generic_send_keeps_boxed_messages_flat() {
    let runtime = ThreadRuntime::default();
    let port = runtime.port();

    forward_to_port(&port, into_message(11u32));
    assert_eq!(port.receive_as::<u32>().unwrap(), 11);

    forward_to_actor(runtime.main_actor(), into_message("boxed"));
    assert_eq!(runtime.receive_as::<&str>().unwrap(), "boxed");
}

#[test]
fn test_generic_runtime_usage() {
    logging::init_test();
    let runtime = ThreadRuntime::default();
    assert_eq!(answer(&runtime), 42);
}

#[test]
fn test_fresh_runtime_counts_main_actor() {
    let runtime = ThreadRuntime::default();
    assert_eq!(runtime.live_actor_count(), 1);
    assert_eq!(runtime.main_actor().id().get(), 1);
    assert!(runtime.is_main());
    assert_eq!(&runtime.current(), runtime.main_actor());
    assert!(current_actor().is_none());
}

#[test]
fn test_actors_do_not_leak() {
    let runtime = ThreadRuntime::default();
    let baseline = runtime.live_actor_count();

    let actors: Vec<_> = (0..10)
        .map(|i| runtime.spawn(i, |_ctx, i: u32| -> WorkResult<u32> { Ok(i) }).unwrap())
        .collect();
    for actor in &actors {
        actor.join().unwrap();
    }

    assert!(runtime.wait_for_live_count(baseline, WAIT));
    assert_eq!(runtime.live_actor_count(), baseline);
}

#[test]
fn test_failed_actors_do_not_leak() {
    let runtime = ThreadRuntime::default();
    let actor = runtime
        .spawn((), |_ctx, ()| -> WorkResult<()> { panic!("lost") })
        .unwrap();

    assert!(actor.join().is_err());
    assert_eq!(runtime.live_actor_count(), 1);
}

#[test]
fn test_current_inside_actor() {
    let runtime = ThreadRuntime::default();
    let actor = runtime
        .spawn((), |ctx, ()| -> WorkResult<bool> {
            let runtime = ctx.runtime();
            let current = current_actor();
            Ok(runtime.current() == *ctx.actor()
                && !runtime.is_main()
                && current.as_ref() == Some(ctx.actor()))
        })
        .unwrap();

    assert!(actor.value_as::<bool>().unwrap());
}

#[test]
fn test_main_actor_receives_messages() {
    let runtime = ThreadRuntime::default();
    let actor = runtime
        .spawn((), |ctx, ()| -> WorkResult<()> {
            ctx.runtime().main_actor().send("hello")?;
            Ok(())
        })
        .unwrap();

    assert_eq!(runtime.receive_as::<&str>().unwrap(), "hello");
    actor.join().unwrap();
}

#[test]
fn test_shutdown_closes_running_actors() {
    let runtime = ThreadRuntime::default();
    let actors: Vec<_> = (0..3)
        .map(|_| {
            runtime
                .spawn((), |ctx, ()| -> WorkResult<usize> {
                    let mut received = 0;
                    while ctx.receive().is_ok() {
                        received += 1;
                    }
                    Ok(received)
                })
                .unwrap()
        })
        .collect();

    runtime.shutdown().unwrap();

    assert_eq!(runtime.live_actor_count(), 1);
    for actor in &actors {
        assert!(actor.join().is_ok());
        assert!(actor.is_terminated());
    }
}

#[test]
fn test_shutdown_times_out_on_stuck_actor() {
    let runtime = ThreadRuntime::new(RuntimeConfig {
        shutdown_timeout: Duration::from_millis(50),
        ..RuntimeConfig::default()
    });
    let gate = runtime.port();
    let actor = runtime
        .spawn(gate.clone(), |_ctx, gate: ThreadPort| -> WorkResult<()> {
            gate.receive()?;
            Ok(())
        })
        .unwrap();

    assert!(matches!(runtime.shutdown(), Err(ActorError::Timeout(_))));

    gate.send(()).unwrap();
    actor.join().unwrap();
    assert!(runtime.wait_for_live_count(1, WAIT));
}

#[test]
fn test_standalone_mailbox() {
    let runtime = ThreadRuntime::default();
    let mailbox = runtime.mailbox::<u16>();

    mailbox.push(1).unwrap();
    mailbox.push(2).unwrap();
    mailbox.close();

    assert_eq!(mailbox.pop().unwrap(), 1);
    assert_eq!(mailbox.pop().unwrap(), 2);
    assert!(mailbox.pop().is_err());
}

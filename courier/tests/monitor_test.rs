// Integration tests for termination monitors.

use std::time::Duration;

use courier::{
    ActorError, MonitorTag, ThreadPort, ThreadRuntime, WorkResult,
};

const WAIT: Duration = Duration::from_secs(5);

#[test]
fn test_monitor_after_termination_delivers_immediately() {
    let runtime = ThreadRuntime::default();
    let port = runtime.port();
    let actor = runtime.spawn((), |_ctx, ()| -> WorkResult<()> { Ok(()) }).unwrap();
    actor.join().unwrap();

    assert!(!actor.monitor(&port));
    assert_eq!(port.receive_as::<MonitorTag>().unwrap(), MonitorTag::Exited);
    assert!(port.try_receive().unwrap().is_none());
}

#[test]
fn test_monitor_before_termination_delivers_once() {
    let runtime = ThreadRuntime::default();
    let gate = runtime.port();
    let port = runtime.port();
    let actor = runtime
        .spawn(gate.clone(), |_ctx, gate: ThreadPort| -> WorkResult<()> {
            gate.receive()?;
            Ok(())
        })
        .unwrap();

    assert!(actor.monitor(&port));
    assert!(actor.monitor(&port));
    assert_eq!(actor.monitor_count(), 1);

    gate.send(()).unwrap();
    assert_eq!(port.receive_as::<MonitorTag>().unwrap(), MonitorTag::Exited);
    assert!(matches!(
        port.receive_timeout(Duration::from_millis(50)),
        Err(ActorError::Timeout(_))
    ));
}

#[test]
fn test_failed_actor_reports_aborted() {
    let runtime = ThreadRuntime::default();
    let gate = runtime.port();
    let port = runtime.port();
    let actor = runtime
        .spawn(gate.clone(), |_ctx, gate: ThreadPort| -> WorkResult<()> {
            gate.receive()?;
            Err("gave up".into())
        })
        .unwrap();

    actor.monitor(&port);
    gate.send(()).unwrap();

    assert_eq!(port.receive_as::<MonitorTag>().unwrap(), MonitorTag::Aborted);
    assert!(actor.join().is_err());
    assert!(!actor.monitor(&port));
    assert_eq!(port.receive_as::<MonitorTag>().unwrap(), MonitorTag::Aborted);
}

#[test]
fn test_panicking_actor_reports_aborted() {
    let runtime = ThreadRuntime::default();
    let port = runtime.port();
    let actor = runtime
        .spawn((), |ctx, ()| -> WorkResult<()> {
            ctx.receive()?;
            panic!("unexpected")
        })
        .unwrap();

    actor.monitor(&port);
    actor.send(()).unwrap();
    assert_eq!(port.receive_as::<MonitorTag>().unwrap(), MonitorTag::Aborted);
}

#[test]
fn test_unmonitor_stops_delivery() {
    let runtime = ThreadRuntime::default();
    let port = runtime.port();
    let actor = runtime
        .spawn((), |ctx, ()| -> WorkResult<()> {
            ctx.receive()?;
            Ok(())
        })
        .unwrap();

    actor.monitor(&port);
    actor.unmonitor(&port);
    assert_eq!(actor.monitor_count(), 0);

    actor.send(()).unwrap();
    actor.join().unwrap();
    assert!(port.try_receive().unwrap().is_none());
}

#[test]
fn test_monitor_racing_termination_sees_exactly_one_tag() {
    let runtime = ThreadRuntime::default();
    let port = runtime.port();
    let actors: Vec<_> = (0..20)
        .map(|_| runtime.spawn((), |_ctx, ()| -> WorkResult<()> { Ok(()) }).unwrap())
        .collect();

    for actor in &actors {
        actor.monitor(&port);
    }

    for _ in &actors {
        let tag = port.receive_timeout(WAIT).unwrap();
        assert_eq!(*tag.downcast::<MonitorTag>().unwrap(), MonitorTag::Exited);
    }
    assert!(matches!(
        port.receive_timeout(Duration::from_millis(50)),
        Err(ActorError::Timeout(_))
    ));
}

#[test]
fn test_close_does_not_duplicate_notification() {
    let runtime = ThreadRuntime::default();
    let port = runtime.port();
    let actor = runtime
        .spawn((), |ctx, ()| -> WorkResult<()> {
            let _ = ctx.receive();
            Ok(())
        })
        .unwrap();

    actor.monitor(&port);
    actor.close();
    actor.close();
    actor.join().unwrap();

    assert_eq!(port.receive_as::<MonitorTag>().unwrap(), MonitorTag::Exited);
    assert!(port.try_receive().unwrap().is_none());
}

#[test]
fn test_closed_monitor_port_is_skipped() {
    let runtime = ThreadRuntime::default();
    let closed = runtime.port();
    let open = runtime.port();
    let actor = runtime
        .spawn((), |ctx, ()| -> WorkResult<()> {
            ctx.receive()?;
            Ok(())
        })
        .unwrap();

    actor.monitor(&closed);
    actor.monitor(&open);
    closed.close();

    actor.send(()).unwrap();
    actor.join().unwrap();
    assert_eq!(open.receive_as::<MonitorTag>().unwrap(), MonitorTag::Exited);
}

// Integration tests for per-actor local storage.

use std::cell::Cell;
use std::sync::Arc;

use courier::{ActorError, ThreadPort, ThreadRuntime, WorkResult};

#[test]
fn test_store_if_absent_computes_once() {
    let runtime = ThreadRuntime::default();
    let actor = runtime
        .spawn((), |ctx, ()| -> WorkResult<bool> {
            let calls = Cell::new(0);
            let first = ctx.store_if_absent("greeting", || {
                calls.set(calls.get() + 1);
                String::from("hello")
            })?;
            let second = ctx.store_if_absent("greeting", || {
                calls.set(calls.get() + 1);
                String::from("ignored")
            })?;

            Ok(calls.get() == 1 && Arc::ptr_eq(&first, &second) && first.as_str() == "hello")
        })
        .unwrap();

    assert!(actor.value_as::<bool>().unwrap());
}

#[test]
fn test_storage_is_private_per_actor() {
    let runtime = ThreadRuntime::default();
    let gate = runtime.port();
    let actor = runtime
        .spawn(gate.clone(), |ctx, gate: ThreadPort| -> WorkResult<u32> {
            ctx.storage_set("counter", 1u32)?;
            gate.receive()?;
            let counter = ctx.storage_get::<u32>("counter")?.map_or(0, |value| *value);
            Ok(counter)
        })
        .unwrap();

    assert!(matches!(actor.storage_get::<u32>("counter"), Err(ActorError::Access(_))));
    assert!(matches!(actor.storage_set("counter", 5u32), Err(ActorError::Access(_))));
    assert!(matches!(
        actor.store_if_absent("counter", || 9u32),
        Err(ActorError::Access(_))
    ));

    // The main actor's storage is separate.
    assert_eq!(*runtime.store_if_absent("counter", || 100u32).unwrap(), 100);

    gate.send(()).unwrap();
    assert_eq!(actor.value_as::<u32>().unwrap(), 1);
}

#[test]
fn test_actor_cannot_touch_main_storage() {
    let runtime = ThreadRuntime::default();
    let actor = runtime
        .spawn((), |ctx, ()| -> WorkResult<bool> {
            let main = ctx.runtime().main_actor();
            Ok(matches!(main.storage_set("key", 1i32), Err(ActorError::Access(_))))
        })
        .unwrap();

    assert!(actor.value_as::<bool>().unwrap());
}

#[test]
fn test_storage_type_mismatch() {
    let runtime = ThreadRuntime::default();

    runtime.store_if_absent("answer", || 42i64).unwrap();
    let err = runtime.store_if_absent("answer", || String::from("forty-two")).unwrap_err();

    assert!(matches!(err, ActorError::StorageType { key } if key == "answer"));
}

#[test]
fn test_storage_remove() {
    let runtime = ThreadRuntime::default();
    let main = runtime.main_actor();

    main.storage_set("temp", vec![1, 2, 3]).unwrap();
    assert_eq!(main.storage_get::<Vec<i32>>("temp").unwrap().as_deref(), Some(&vec![1, 2, 3]));
    assert!(main.storage_remove("temp").unwrap());
    assert!(!main.storage_remove("temp").unwrap());
    assert!(main.storage_get::<Vec<i32>>("temp").unwrap().is_none());
}

//! Supervision scenarios: child lifecycle, restart policies, intensity,
//! fan-out strategies, nesting, and registry integration.

use std::sync::Arc;
use std::time::{Duration, Instant};

use actorvisor::{
    exit_value, factory_fn, ActorError, ActorHandle, ChildMode, ChildSpec, EventKind, FactoryRef,
    InMemoryRegistry, Mailbox, RegistryRef, RestartStrategy, Runtime, RuntimeConfig, SpawnError,
    Supervisor, SupervisorDef,
};

/// Worker that counts received messages and reports the count on a
/// graceful shutdown.
fn echo_factory() -> FactoryRef {
    factory_fn(|mut mailbox: Mailbox| async move {
        let mut seen: u32 = 0;
        loop {
            match mailbox.recv().await {
                Ok(_msg) => seen += 1,
                Err(_shutdown) => return Ok(exit_value(seen)),
            }
        }
    })
}

/// Worker that fails as soon as it receives a message, but shuts down
/// gracefully when asked.
fn failing_factory() -> FactoryRef {
    factory_fn(|mut mailbox: Mailbox| async move {
        match mailbox.recv().await {
            Ok(_msg) => Err(ActorError::fail("ha!")),
            Err(_shutdown) => Ok(exit_value(0u32)),
        }
    })
}

fn setup() -> (Runtime, RegistryRef) {
    (Runtime::new(RuntimeConfig::default()), InMemoryRegistry::shared())
}

fn spec(name: &str, mode: ChildMode, factory: FactoryRef) -> ChildSpec {
    ChildSpec::new(name, mode, factory)
        .with_max_restarts(5)
        .with_restart_window(Duration::from_secs(1))
        .with_shutdown_deadline(Duration::from_secs(3))
}

/// Polls until a live (non-terminated) child instance appears under
/// `name`, mirroring how callers must treat restart as asynchronous.
async fn settled_child(sup: &Supervisor, name: &str, timeout: Duration) -> Option<ActorHandle> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(h) = sup.get_child(name).await {
            if !h.is_terminated() {
                return Some(h);
            }
        }
        if Instant::now() >= deadline {
            return None;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn child_counts_messages_and_reports_on_shutdown() {
    let (runtime, registry) = setup();
    let sup = Supervisor::start(
        &runtime,
        &registry,
        RestartStrategy::OneForOne,
        vec![spec("actor1", ChildMode::Permanent, echo_factory())],
    )
    .unwrap();

    let a = settled_child(&sup, "actor1", Duration::from_secs(1))
        .await
        .unwrap();
    for _ in 0..3 {
        a.send(Box::new(1u32));
    }
    a.send_shutdown_request();
    let cause = a.wait().await;
    assert_eq!(cause.value::<u32>(), Some(&3));

    sup.shutdown();
    assert!(sup.wait().await.is_normal());
}

#[tokio::test]
async fn permanent_child_is_restarted_after_graceful_exit() {
    let (runtime, registry) = setup();
    let sup = Supervisor::start(
        &runtime,
        &registry,
        RestartStrategy::OneForOne,
        vec![spec("actor1", ChildMode::Permanent, echo_factory())],
    )
    .unwrap();

    let a = settled_child(&sup, "actor1", Duration::from_secs(1))
        .await
        .unwrap();
    for _ in 0..3 {
        a.send(Box::new(1u32));
    }
    a.send_shutdown_request();
    assert_eq!(a.wait().await.value::<u32>(), Some(&3));

    // The successor is a fresh instance under the same name.
    let b = settled_child(&sup, "actor1", Duration::from_secs(1))
        .await
        .unwrap();
    assert_ne!(a.id(), b.id());
    for _ in 0..5 {
        b.send(Box::new(1u32));
    }
    b.send_shutdown_request();
    assert_eq!(b.wait().await.value::<u32>(), Some(&5));

    sup.shutdown();
    assert!(sup.wait().await.is_normal());
}

#[tokio::test]
async fn supervisor_gives_up_after_too_many_failures() {
    let (runtime, registry) = setup();
    let sup = Supervisor::start(
        &runtime,
        &registry,
        RestartStrategy::OneForOne,
        vec![
            spec("actor1", ChildMode::Permanent, failing_factory())
                .with_max_restarts(3)
                .with_restart_window(Duration::from_secs(10)),
        ],
    )
    .unwrap();

    let mut prev: Option<ActorHandle> = None;
    for _ in 0..4 {
        let a = settled_child(&sup, "actor1", Duration::from_secs(1))
            .await
            .unwrap();
        if let Some(prev) = &prev {
            assert_ne!(prev.id(), a.id());
        }
        a.send(Box::new(1u32));
        assert!(a.wait().await.is_failure());
        prev = Some(a);
    }

    // The fourth failure exceeds max_restarts=3: the supervisor terminates
    // abnormally and no fifth instance ever appears.
    let cause = sup
        .wait_timeout(Duration::from_secs(1))
        .await
        .expect("supervisor should have terminated");
    assert!(cause.is_failure());
    assert!(settled_child(&sup, "actor1", Duration::from_millis(100))
        .await
        .is_none());
}

#[tokio::test]
async fn temporary_child_is_not_restarted_after_graceful_exit() {
    let (runtime, registry) = setup();
    let sup = Supervisor::start(
        &runtime,
        &registry,
        RestartStrategy::OneForOne,
        vec![spec("actor1", ChildMode::Temporary, echo_factory())],
    )
    .unwrap();

    let a = settled_child(&sup, "actor1", Duration::from_secs(1))
        .await
        .unwrap();
    for _ in 0..3 {
        a.send(Box::new(1u32));
    }
    a.send_shutdown_request();
    assert_eq!(a.wait().await.value::<u32>(), Some(&3));

    assert!(settled_child(&sup, "actor1", Duration::from_millis(200))
        .await
        .is_none());

    sup.shutdown();
    assert!(sup.wait().await.is_normal());
}

#[tokio::test]
async fn temporary_child_is_not_restarted_after_failure() {
    let (runtime, registry) = setup();
    let sup = Supervisor::start(
        &runtime,
        &registry,
        RestartStrategy::OneForOne,
        vec![spec("actor1", ChildMode::Temporary, failing_factory())],
    )
    .unwrap();

    let a = settled_child(&sup, "actor1", Duration::from_secs(1))
        .await
        .unwrap();
    a.send(Box::new(1u32));
    assert!(a.wait().await.is_failure());

    assert!(settled_child(&sup, "actor1", Duration::from_millis(200))
        .await
        .is_none());

    sup.shutdown();
    assert!(sup.wait().await.is_normal());
}

#[tokio::test]
async fn transient_child_is_not_restarted_after_graceful_exit() {
    let (runtime, registry) = setup();
    let sup = Supervisor::start(
        &runtime,
        &registry,
        RestartStrategy::OneForOne,
        vec![spec("actor1", ChildMode::Transient, echo_factory())],
    )
    .unwrap();

    let a = settled_child(&sup, "actor1", Duration::from_secs(1))
        .await
        .unwrap();
    for _ in 0..3 {
        a.send(Box::new(1u32));
    }
    a.send_shutdown_request();
    assert_eq!(a.wait().await.value::<u32>(), Some(&3));

    assert!(settled_child(&sup, "actor1", Duration::from_millis(200))
        .await
        .is_none());

    sup.shutdown();
    assert!(sup.wait().await.is_normal());
}

#[tokio::test]
async fn transient_child_is_restarted_after_failure() {
    let (runtime, registry) = setup();
    let sup = Supervisor::start(
        &runtime,
        &registry,
        RestartStrategy::OneForOne,
        vec![spec("actor1", ChildMode::Transient, failing_factory())],
    )
    .unwrap();

    let a = settled_child(&sup, "actor1", Duration::from_secs(1))
        .await
        .unwrap();
    a.send(Box::new(1u32));
    assert!(a.wait().await.is_failure());

    let b = settled_child(&sup, "actor1", Duration::from_secs(1))
        .await
        .unwrap();
    assert_ne!(a.id(), b.id());

    sup.shutdown();
    assert!(sup.wait().await.is_normal());
}

#[tokio::test]
async fn add_child_spawns_dynamically_and_rejects_duplicates() {
    let (runtime, registry) = setup();
    let sup = Supervisor::start(&runtime, &registry, RestartStrategy::OneForOne, vec![]).unwrap();

    let a = sup
        .add_child(spec("actor1", ChildMode::Permanent, echo_factory()))
        .await
        .unwrap();
    for _ in 0..2 {
        a.send(Box::new(1u32));
    }
    a.send_shutdown_request();
    assert_eq!(a.wait().await.value::<u32>(), Some(&2));

    let dup = sup
        .add_child(spec("actor1", ChildMode::Permanent, echo_factory()))
        .await;
    assert!(matches!(
        dup,
        Err(actorvisor::SupervisorError::DuplicateName { .. })
    ));

    sup.shutdown();
    assert!(sup.wait().await.is_normal());
}

#[tokio::test]
async fn duplicate_names_in_the_initial_batch_terminate_the_supervisor() {
    let (runtime, registry) = setup();
    let sup = Supervisor::start(
        &runtime,
        &registry,
        RestartStrategy::OneForOne,
        vec![
            spec("actor1", ChildMode::Permanent, echo_factory()),
            spec("actor1", ChildMode::Permanent, echo_factory()),
        ],
    )
    .unwrap();

    let cause = sup
        .wait_timeout(Duration::from_secs(1))
        .await
        .expect("supervisor should reject the duplicate and terminate");
    assert!(cause.is_failure());

    // The first instance was torn down with the batch; nothing stays bound.
    assert!(registry.lookup("actor1").await.is_none());
}

#[tokio::test]
async fn group_fan_out_removes_temporary_and_restarts_transient_siblings() {
    let (runtime, registry) = setup();
    let sup = Supervisor::start(
        &runtime,
        &registry,
        RestartStrategy::OneForAll,
        vec![
            spec("bad", ChildMode::Permanent, failing_factory()),
            spec("temp", ChildMode::Temporary, echo_factory()),
            spec("trans", ChildMode::Transient, echo_factory()),
        ],
    )
    .unwrap();

    let bad = settled_child(&sup, "bad", Duration::from_secs(1))
        .await
        .unwrap();
    let trans = settled_child(&sup, "trans", Duration::from_secs(1))
        .await
        .unwrap();
    assert!(settled_child(&sup, "temp", Duration::from_secs(1))
        .await
        .is_some());

    bad.send(Box::new(1u32));
    assert!(bad.wait().await.is_failure());

    // The transient sibling is stopped gracefully (a Normal exit) as part
    // of the group, yet restarted unconditionally.
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        if let Some(nt) = settled_child(&sup, "trans", Duration::from_secs(1)).await {
            if nt.id() != trans.id() {
                break;
            }
        }
        assert!(
            Instant::now() < deadline,
            "transient sibling was not restarted"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    // The temporary sibling was stopped with the group and removed for
    // good.
    assert!(sup.get_child("temp").await.is_none());
    assert!(registry.lookup("temp").await.is_none());

    sup.shutdown();
    assert!(sup.wait().await.is_normal());
}

#[tokio::test]
async fn stubborn_child_is_killed_after_the_shutdown_deadline() {
    // Keeps running after the shutdown request instead of returning.
    let defiant: FactoryRef = factory_fn(|mut mailbox: Mailbox| async move {
        loop {
            match mailbox.recv().await {
                Ok(_msg) => {}
                Err(_shutdown) => continue,
            }
        }
    });

    let (runtime, registry) = setup();
    let mut events = runtime.subscribe();
    let sup = Supervisor::start(
        &runtime,
        &registry,
        RestartStrategy::OneForOne,
        vec![spec("defiant", ChildMode::Permanent, defiant)
            .with_shutdown_deadline(Duration::from_millis(100))],
    )
    .unwrap();

    let a = settled_child(&sup, "defiant", Duration::from_secs(1))
        .await
        .unwrap();

    sup.shutdown();
    assert!(sup.wait().await.is_normal());
    assert!(matches!(a.wait().await.error(), Some(ActorError::Killed)));

    let mut saw_timeout = false;
    while let Ok(ev) = events.try_recv() {
        if ev.kind == EventKind::ShutdownTimeout {
            saw_timeout = true;
        }
    }
    assert!(saw_timeout, "no shutdown-timeout event was published");
}

#[tokio::test]
async fn one_for_all_restarts_every_sibling() {
    let (runtime, registry) = setup();
    let sup = Supervisor::start(
        &runtime,
        &registry,
        RestartStrategy::OneForAll,
        vec![
            spec("bad", ChildMode::Permanent, failing_factory()),
            spec("echo", ChildMode::Permanent, echo_factory()),
        ],
    )
    .unwrap();

    let bad = settled_child(&sup, "bad", Duration::from_secs(1))
        .await
        .unwrap();
    let echo = settled_child(&sup, "echo", Duration::from_secs(1))
        .await
        .unwrap();

    bad.send(Box::new(1u32));
    assert!(bad.wait().await.is_failure());

    // Both the failing child and its healthy sibling get fresh instances.
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        let new_bad = settled_child(&sup, "bad", Duration::from_secs(1)).await;
        let new_echo = settled_child(&sup, "echo", Duration::from_secs(1)).await;
        if let (Some(nb), Some(ne)) = (new_bad, new_echo) {
            if nb.id() != bad.id() && ne.id() != echo.id() {
                break;
            }
        }
        assert!(Instant::now() < deadline, "siblings were not restarted");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    sup.shutdown();
    assert!(sup.wait().await.is_normal());
}

#[tokio::test]
async fn rest_for_one_leaves_earlier_siblings_untouched() {
    let (runtime, registry) = setup();
    let sup = Supervisor::start(
        &runtime,
        &registry,
        RestartStrategy::RestForOne,
        vec![
            spec("first", ChildMode::Permanent, echo_factory()),
            spec("bad", ChildMode::Permanent, failing_factory()),
            spec("last", ChildMode::Permanent, echo_factory()),
        ],
    )
    .unwrap();

    let first = settled_child(&sup, "first", Duration::from_secs(1))
        .await
        .unwrap();
    let bad = settled_child(&sup, "bad", Duration::from_secs(1))
        .await
        .unwrap();
    let last = settled_child(&sup, "last", Duration::from_secs(1))
        .await
        .unwrap();

    bad.send(Box::new(1u32));
    assert!(bad.wait().await.is_failure());

    // The failing child and the one started after it are replaced.
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        let new_bad = settled_child(&sup, "bad", Duration::from_secs(1)).await;
        let new_last = settled_child(&sup, "last", Duration::from_secs(1)).await;
        if let (Some(nb), Some(nl)) = (new_bad, new_last) {
            if nb.id() != bad.id() && nl.id() != last.id() {
                break;
            }
        }
        assert!(Instant::now() < deadline, "later siblings were not restarted");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    // The earlier sibling kept its instance the whole time.
    let same_first = settled_child(&sup, "first", Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(first.id(), same_first.id());

    sup.shutdown();
    assert!(sup.wait().await.is_normal());
}

#[tokio::test]
async fn group_strategies_share_one_intensity_budget() {
    let (runtime, registry) = setup();
    let sup = Supervisor::start(
        &runtime,
        &registry,
        RestartStrategy::OneForAll,
        vec![
            spec("bad", ChildMode::Permanent, failing_factory())
                .with_max_restarts(1)
                .with_restart_window(Duration::from_secs(60)),
            spec("echo", ChildMode::Permanent, echo_factory()),
        ],
    )
    .unwrap();

    // First failure: one group restart fits the budget.
    let bad = settled_child(&sup, "bad", Duration::from_secs(1))
        .await
        .unwrap();
    bad.send(Box::new(1u32));
    assert!(bad.wait().await.is_failure());

    let bad2 = {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            if let Some(h) = settled_child(&sup, "bad", Duration::from_secs(1)).await {
                if h.id() != bad.id() {
                    break h;
                }
            }
            assert!(Instant::now() < deadline);
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    };

    // Second failure within the window exceeds it: escalation.
    bad2.send(Box::new(1u32));
    assert!(bad2.wait().await.is_failure());

    let cause = sup
        .wait_timeout(Duration::from_secs(1))
        .await
        .expect("supervisor should have escalated");
    assert!(cause.is_failure());
}

#[tokio::test]
async fn inner_escalation_cascades_to_the_outer_supervisor() {
    let (runtime, registry) = setup();

    // Inner supervisor with no restart budget: the first failure of its
    // child escalates immediately.
    let inner = SupervisorDef::new(
        runtime.clone(),
        registry.clone(),
        RestartStrategy::OneForOne,
        vec![spec("boom", ChildMode::Permanent, failing_factory()).with_max_restarts(0)],
    )
    .into_factory();

    let outer = Supervisor::start(
        &runtime,
        &registry,
        RestartStrategy::OneForOne,
        vec![spec("inner", ChildMode::Transient, inner).with_max_restarts(0)],
    )
    .unwrap();

    // Reach the grandchild through the shared registry.
    let boom = {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            if let Some(h) = registry.lookup("boom").await {
                if !h.is_terminated() {
                    break h;
                }
            }
            assert!(Instant::now() < deadline, "grandchild never registered");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    };
    boom.send(Box::new(1u32));

    // Grandchild failure → inner escalates → outer observes the inner
    // supervisor's Failure and, with no budget of its own, escalates too.
    let cause = outer
        .wait_timeout(Duration::from_secs(2))
        .await
        .expect("outer supervisor should have escalated");
    assert!(cause.is_failure());
}

#[tokio::test]
async fn startup_fails_when_actor_capacity_is_exhausted() {
    // One slot: the supervisor itself takes it, so the child spawn fails.
    let runtime = Runtime::new(RuntimeConfig {
        max_actors: 1,
        ..RuntimeConfig::default()
    });
    let registry = InMemoryRegistry::shared();

    let sup = Supervisor::start(
        &runtime,
        &registry,
        RestartStrategy::OneForOne,
        vec![spec("actor1", ChildMode::Permanent, echo_factory())],
    )
    .unwrap();

    let cause = sup
        .wait_timeout(Duration::from_secs(1))
        .await
        .expect("supervisor should terminate when the first batch fails");
    assert!(matches!(
        cause.error(),
        Some(ActorError::Spawn(SpawnError::CapacityExhausted))
    ));
}

#[tokio::test]
async fn registry_tracks_children_across_the_supervisor_lifetime() {
    let (runtime, registry) = setup();
    let sup = Supervisor::start(
        &runtime,
        &registry,
        RestartStrategy::OneForOne,
        vec![spec("actor1", ChildMode::Permanent, echo_factory())],
    )
    .unwrap();

    let a = settled_child(&sup, "actor1", Duration::from_secs(1))
        .await
        .unwrap();
    let looked_up = registry.lookup("actor1").await.unwrap();
    assert_eq!(a.id(), looked_up.id());

    sup.shutdown();
    assert!(sup.wait().await.is_normal());
    assert!(registry.lookup("actor1").await.is_none());
}

#[tokio::test]
async fn unhandled_shutdown_request_terminates_with_failure() {
    // A worker that never handles its shutdown request: propagating the
    // request with `?` yields the runtime default, a Failure cause.
    let stubborn: FactoryRef = factory_fn(|mut mailbox: Mailbox| async move {
        loop {
            let _msg = mailbox.recv().await?;
        }
    });

    let (runtime, registry) = setup();
    let sup = Supervisor::start(
        &runtime,
        &registry,
        RestartStrategy::OneForOne,
        vec![spec("stubborn", ChildMode::Temporary, Arc::clone(&stubborn))],
    )
    .unwrap();

    let a = settled_child(&sup, "stubborn", Duration::from_secs(1))
        .await
        .unwrap();
    a.send_shutdown_request();
    let cause = a.wait().await;
    assert!(matches!(
        cause.error(),
        Some(ActorError::UnhandledShutdown)
    ));

    sup.shutdown();
    assert!(sup.wait().await.is_normal());
}

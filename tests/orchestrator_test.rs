use resource_lifecycle::framework::mock::MockInitializer;
use resource_lifecycle::framework::{resource_value, InitError, Registration, RegistryActor, ResourceManager};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

fn spawn_registry() -> ResourceManager {
    let (actor, manager) = RegistryActor::new(32);
    tokio::spawn(actor.run());
    manager
}

/// B reads A through the registry while it initializes.
#[tokio::test]
async fn test_dependent_reads_dependency_value() {
    let manager = spawn_registry();
    let handle = manager.clone();

    // Registered out of order on purpose
    manager.queue_registration(Registration::new("b").depends_on(["a"]).initializer(move || {
        let manager = handle.clone();
        async move {
            let a = manager.require::<u32>("a", Duration::from_secs(1)).await?;
            Ok(Some(resource_value(*a + 1)))
        }
    }));
    manager.queue_registration(Registration::new("a").initializer(|| async { Ok(Some(resource_value(1_u32))) }));

    let report = manager.initialize_all().await.unwrap().unwrap();
    assert_eq!(report.initialized, vec!["a", "b"]);
    assert!(report.is_clean());
    assert_eq!(report.resources, 2);

    let b = manager.get::<u32>("b", Duration::ZERO).await.unwrap();
    assert_eq!(*b, 2);
}

#[tokio::test]
async fn test_two_node_cycle_is_reported_and_terminates() {
    let manager = spawn_registry();
    for (name, other) in [("x", "y"), ("y", "x")] {
        let handle = manager.clone();
        manager.queue_registration(Registration::new(name).depends_on([other]).initializer(move || {
            let manager = handle.clone();
            async move {
                // The peer may not be ready yet; proceed without it
                let _ = manager.get::<u32>(other, Duration::from_millis(20)).await;
                Ok(Some(resource_value(0_u32)))
            }
        }));
    }

    manager.commit_all().await.unwrap();
    let resolved = manager.resolve_order().await.unwrap();
    assert!(resolved.order.is_empty());
    assert_eq!(resolved.cyclic, vec!["x", "y"]);

    let report = tokio::time::timeout(Duration::from_secs(5), manager.initialize_all())
        .await
        .expect("driver deadlocked")
        .unwrap()
        .unwrap();
    assert_eq!(report.cyclic, vec!["x", "y"]);
    assert!(report.failed.is_empty());
    assert!(report.cyclic_failed.is_empty());
    assert!(manager.is_ready("x").await);
    assert!(manager.is_ready("y").await);
}

#[tokio::test]
async fn test_cyclic_failures_are_kept_apart() {
    let manager = spawn_registry();
    let broken = MockInitializer::new();
    broken.expect_call().return_err("broken at runtime");
    let looped = MockInitializer::new();
    looped.expect_call().return_err("peer missing");
    let peer = MockInitializer::new();
    peer.expect_call().return_ok(None);

    manager.queue_registration(Registration::new("broken").initializer_from(broken.clone()));
    manager.queue_registration(Registration::new("p").depends_on(["q"]).initializer_from(looped.clone()));
    manager.queue_registration(Registration::new("q").depends_on(["p"]).initializer_from(peer.clone()));

    let report = manager.initialize_all().await.unwrap().unwrap();
    assert_eq!(report.failed, vec!["broken"]);
    assert_eq!(report.cyclic, vec!["p", "q"]);
    assert_eq!(report.cyclic_failed, vec!["p"]);
    assert_eq!(report.initialized, vec!["q"]);
    assert!(!report.is_clean());
    broken.verify();
    looped.verify();
    peer.verify();
}

#[tokio::test]
async fn test_dangling_dependency_is_dropped() {
    let manager = spawn_registry();
    let saw_z = Arc::new(AtomicBool::new(true));
    let handle = manager.clone();
    let flag = saw_z.clone();

    manager.queue_registration(Registration::new("c").depends_on(["z"]).initializer(move || {
        let manager = handle.clone();
        let flag = flag.clone();
        async move {
            let z = manager.get_value("z", Duration::from_millis(10)).await;
            flag.store(z.is_some(), Ordering::SeqCst);
            Ok(None)
        }
    }));

    manager.commit_all().await.unwrap();
    assert_eq!(manager.resolve_order().await.unwrap().order, vec!["c"]);

    let report = manager.initialize_all().await.unwrap().unwrap();
    assert_eq!(report.initialized, vec!["c"]);
    assert!(!saw_z.load(Ordering::SeqCst));
    assert!(manager.is_ready("c").await);
    assert!(manager.get_value("c", Duration::ZERO).await.is_none());
}

#[tokio::test]
async fn test_unregistered_lookup_returns_immediately() {
    let manager = spawn_registry();
    let started = Instant::now();
    assert!(manager.get_value("nobody", Duration::from_secs(5)).await.is_none());
    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(!manager.is_ready("nobody").await);
}

/// A consumer asking before the driver committed anything waits for the result.
#[tokio::test]
async fn test_lookup_of_queued_resource_waits_for_initialization() {
    let manager = spawn_registry();
    let a = MockInitializer::new();
    a.expect_call().after(Duration::from_millis(20)).return_value(1_u32);
    manager.queue_registration(Registration::new("a").initializer_from(a.clone()));

    let early = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.get::<u32>("a", Duration::from_secs(2)).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!early.is_finished());
    assert!(!manager.is_ready("a").await);

    let report = manager.initialize_all().await.unwrap().unwrap();
    assert_eq!(report.initialized, vec!["a"]);
    assert_eq!(early.await.unwrap().as_deref(), Some(&1));
    a.verify();
}

#[tokio::test]
async fn test_concurrent_waiters_receive_later_set() {
    let manager = spawn_registry();
    manager.queue_registration(Registration::new("late"));

    let waiters: Vec<_> = (0..2)
        .map(|_| {
            let manager = manager.clone();
            tokio::spawn(async move { manager.get::<u32>("late", Duration::from_secs(5)).await })
        })
        .collect();

    tokio::time::sleep(Duration::from_millis(20)).await;
    let started = Instant::now();
    manager.set("late", 5_u32).await.unwrap();

    for waiter in waiters {
        assert_eq!(*waiter.await.unwrap().unwrap(), 5);
    }
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_timeouts_are_independent() {
    let manager = spawn_registry();
    manager.queue_registration(Registration::new("slow"));

    let impatient = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.get::<u32>("slow", Duration::from_millis(10)).await })
    };
    let patient = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.get::<u32>("slow", Duration::from_secs(5)).await })
    };

    assert!(impatient.await.unwrap().is_none());
    manager.set("slow", 9_u32).await.unwrap();
    assert_eq!(*patient.await.unwrap().unwrap(), 9);
}

#[tokio::test]
async fn test_readiness_matches_outcomes() {
    let manager = spawn_registry();
    let good = MockInitializer::new();
    good.expect_call().return_value("ok".to_string());
    let bad = MockInitializer::new();
    bad.expect_call().return_err("connection refused");

    manager.queue_registration(Registration::new("good").initializer_from(good.clone()));
    manager.queue_registration(Registration::new("bad").initializer_from(bad.clone()));

    let report = manager.initialize_all().await.unwrap().unwrap();
    assert_eq!(report.initialized, vec!["good"]);
    assert_eq!(report.failed, vec!["bad"]);
    assert!(manager.is_ready("good").await);
    assert!(!manager.is_ready("bad").await);

    good.verify();
    bad.verify();
}

#[tokio::test]
async fn test_failure_does_not_abort_driver() {
    let manager = spawn_registry();
    let handle = manager.clone();
    let broken = MockInitializer::new();
    broken.expect_call().return_err("boom");

    manager.queue_registration(Registration::new("a").initializer_from(broken));
    manager.queue_registration(Registration::new("b").depends_on(["a"]).initializer(move || {
        let manager = handle.clone();
        async move {
            manager.require::<u32>("a", Duration::from_millis(10)).await?;
            Ok(None)
        }
    }));
    manager.queue_registration(Registration::new("c").sync_initializer(|| Ok(Some(resource_value(3_u32)))));

    let report = manager.initialize_all().await.unwrap().unwrap();
    assert_eq!(report.failed, vec!["a", "b"]);
    assert_eq!(report.initialized, vec!["c"]);
    assert!(manager.is_ready("c").await);
}

#[tokio::test]
async fn test_panicking_initializer_is_recorded() {
    let manager = spawn_registry();
    let mock = MockInitializer::new();
    mock.expect_call().panic("initializer blew up");
    manager.queue_registration(Registration::new("fragile").initializer_from(mock.clone()));

    let outcome = {
        manager.commit_all().await.unwrap();
        manager.run_one("fragile").await
    };
    assert!(matches!(outcome, resource_lifecycle::framework::InitOutcome::Failed(InitError::Panicked(_))));
    assert!(!manager.is_ready("fragile").await);
    assert_eq!(mock.calls(), 1);
}

#[tokio::test]
async fn test_set_is_idempotent_and_never_unready() {
    let manager = spawn_registry();
    manager.set("value", 1_u32).await.unwrap();
    assert!(manager.is_ready("value").await);
    manager.set("value", 2_u32).await.unwrap();
    assert!(manager.is_ready("value").await);
    assert_eq!(*manager.get::<u32>("value", Duration::ZERO).await.unwrap(), 2);
}

#[tokio::test]
async fn test_second_initialize_all_is_noop() {
    let manager = spawn_registry();
    let mock = MockInitializer::new();
    mock.expect_call().return_value(1_u32);
    manager.queue_registration(Registration::new("once").initializer_from(mock.clone()));

    let (first, second) = tokio::join!(manager.initialize_all(), manager.initialize_all());
    let runs = [first.unwrap(), second.unwrap()];
    assert_eq!(runs.iter().filter(|report| report.is_some()).count(), 1);
    assert!(manager.initialize_all().await.unwrap().is_none());
    assert_eq!(mock.calls(), 1);
    mock.verify();
}

#[tokio::test]
async fn test_reregistration_replaces_initializer() {
    let manager = spawn_registry();
    let first = MockInitializer::new();
    let second = MockInitializer::new();
    second.expect_call().return_value(2_u32);

    manager.queue_registration(Registration::new("a").initializer_from(first.clone()));
    manager.queue_registration(Registration::new("a").depends_on(["b"]).initializer_from(second.clone()));
    manager.queue_registration(Registration::new("b").sync_initializer(|| Ok(None)));

    let report = manager.initialize_all().await.unwrap().unwrap();
    assert_eq!(report.initialized, vec!["b", "a"]);
    assert_eq!(first.calls(), 0);
    assert_eq!(*manager.get::<u32>("a", Duration::ZERO).await.unwrap(), 2);
}

#[tokio::test]
async fn test_value_only_registration_is_ready_on_commit() {
    let manager = spawn_registry();
    manager.queue_registration(Registration::new("static").value("preset".to_string()));
    manager.queue_registration(Registration::new("marker"));
    manager.queue_registration(Registration::new("user").depends_on(["static"]).sync_initializer(|| Ok(None)));

    // Queued but not committed yet
    assert!(!manager.is_ready("static").await);
    assert_eq!(manager.commit_all().await.unwrap(), 3);
    assert_eq!(manager.commit_all().await.unwrap(), 0);
    assert!(manager.is_ready("static").await);
    assert!(manager.is_ready("marker").await);
    assert!(manager.get_value("marker", Duration::ZERO).await.is_none());

    let resolved = manager.resolve_order().await.unwrap();
    assert_eq!(resolved.order, vec!["user"]);
    let value = manager.get::<String>("static", Duration::ZERO).await.unwrap();
    assert_eq!(value.as_str(), "preset");
}

#[tokio::test]
async fn test_initial_value_is_replaced_by_initializer() {
    let manager = spawn_registry();
    let refresh = MockInitializer::new();
    refresh.expect_call().return_value(2_u32);
    manager.queue_registration(Registration::new("counter").value(1_u32).initializer_from(refresh.clone()));

    manager.commit_all().await.unwrap();
    assert!(manager.is_ready("counter").await);
    assert_eq!(*manager.get::<u32>("counter", Duration::ZERO).await.unwrap(), 1);
    assert_eq!(manager.resolve_order().await.unwrap().order, vec!["counter"]);

    let report = manager.initialize_all().await.unwrap().unwrap();
    assert_eq!(report.initialized, vec!["counter"]);
    assert_eq!(*manager.get::<u32>("counter", Duration::ZERO).await.unwrap(), 2);
    refresh.verify();
}

#[tokio::test]
async fn test_type_mismatch_is_absent() {
    let manager = spawn_registry();
    manager.set("number", 1_u32).await.unwrap();
    assert!(manager.get::<String>("number", Duration::ZERO).await.is_none());
    assert!(manager.get::<u32>("number", Duration::ZERO).await.is_some());
}

#[tokio::test]
async fn test_stop_request_interrupts_driver() {
    let manager = spawn_registry();
    let handle = manager.clone();
    let skipped = MockInitializer::new();

    manager.queue_registration(Registration::new("first").sync_initializer(move || {
        handle.request_stop();
        Ok(None)
    }));
    manager.queue_registration(Registration::new("second").initializer_from(skipped.clone()));

    let report = manager.initialize_all().await.unwrap().unwrap();
    assert!(report.interrupted);
    assert_eq!(report.initialized, vec!["first"]);
    assert_eq!(skipped.calls(), 0);
}

#[tokio::test]
async fn test_shutdown_releases_waiters() {
    let manager = spawn_registry();
    manager.queue_registration(Registration::new("never").initializer(|| async { Ok(None) }));

    let waiter = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.get_value("never", Duration::from_secs(30)).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    manager.shutdown().await.unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), waiter).await.unwrap().unwrap();
    assert!(result.is_none());
    assert!(manager.get_value("never", Duration::ZERO).await.is_none());
}

#[tokio::test]
async fn test_initializers_run_one_at_a_time() {
    let manager = spawn_registry();
    let log = Arc::new(Mutex::new(Vec::new()));

    for name in ["one", "two", "three"] {
        let log = log.clone();
        manager.queue_registration(Registration::new(name).initializer(move || {
            let log = log.clone();
            async move {
                log.lock().unwrap().push(format!("start {name}"));
                tokio::time::sleep(Duration::from_millis(5)).await;
                log.lock().unwrap().push(format!("end {name}"));
                Ok(None)
            }
        }));
    }

    manager.initialize_all().await.unwrap().unwrap();
    let log = log.lock().unwrap().clone();
    assert_eq!(
        log,
        vec!["start one", "end one", "start two", "end two", "start three", "end three"]
    );
}

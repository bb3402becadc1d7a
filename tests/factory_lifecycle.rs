//! Lifecycle integration tests for DbFactory
//!
//! Drives add/connect/get/remove/close through fake connectors whose side
//! effects can be observed.

mod common;

use common::{fake_factory, label, Counted, COUNTING, ECHO, FAILING, SLOW, STUCK};
use dbfactory::factory::FactoryError;
use dbfactory::registry::{BackendType, ConnectorError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_echo_scenario() {
    let (factory, _) = fake_factory();
    factory.add_config("a", ECHO, Box::new(42i64)).await.unwrap();

    assert_eq!(factory.connect_all().await.unwrap(), 1);

    let instance = factory.get_instance("a").await.unwrap();
    assert_eq!(instance.backend_type().as_str(), "echo");
    assert_eq!(instance.downcast_ref::<i64>(), Some(&42));

    let typed = factory
        .get_as::<i64>("a", &BackendType::new(ECHO))
        .await
        .unwrap();
    assert_eq!(*typed, 42);
}

#[tokio::test]
async fn test_missing_type_scenario_keeps_earlier_entries() {
    let (factory, _) = fake_factory();
    factory.add_config("a", ECHO, Box::new(42i64)).await.unwrap();
    factory.connect_all().await.unwrap();

    factory
        .add_config("b", "missing-type", Box::new(7i64))
        .await
        .unwrap();
    let err = factory.connect_all().await.unwrap_err();

    assert!(matches!(err, FactoryError::UnknownBackendType { .. }));
    assert_eq!(err.name(), Some("b"));
    assert!(err.to_string().contains("missing-type"));
    assert!(factory.get_instance("a").await.is_some());
    assert!(factory.get_instance("b").await.is_none());
}

#[tokio::test]
async fn test_close_all_scenario() {
    let (factory, calls) = fake_factory();
    factory.add_config("x", COUNTING, label("x")).await.unwrap();
    factory.add_config("y", COUNTING, label("y")).await.unwrap();
    factory.connect_all().await.unwrap();

    assert_eq!(factory.close_all().await, 2);

    assert!(factory.live_names().await.is_empty());
    assert_eq!(calls.closes(), 2);
    let log = calls.log();
    assert_eq!(log.iter().filter(|e| *e == "close x").count(), 1);
    assert_eq!(log.iter().filter(|e| *e == "close y").count(), 1);
}

#[tokio::test]
async fn test_connect_all_is_idempotent() {
    let (factory, calls) = fake_factory();
    factory.add_config("x", COUNTING, label("x")).await.unwrap();
    factory.add_config("y", COUNTING, label("y")).await.unwrap();

    assert_eq!(factory.connect_all().await.unwrap(), 2);
    assert_eq!(factory.connect_all().await.unwrap(), 0);
    assert_eq!(calls.connects(), 2);
}

#[tokio::test]
async fn test_replace_closes_old_exactly_once() {
    let (factory, calls) = fake_factory();
    factory.add_config("main", COUNTING, label("v1")).await.unwrap();
    factory.connect_all().await.unwrap();

    // Switch to another type entirely
    factory.add_config("Main", ECHO, Box::new(1i64)).await.unwrap();
    assert_eq!(calls.log(), vec!["connect v1", "close v1"]);

    factory.connect_all().await.unwrap();
    let instance = factory.get_instance("main").await.unwrap();
    assert_eq!(instance.backend_type().as_str(), ECHO);
    assert_eq!(calls.closes(), 1);
}

#[tokio::test]
async fn test_replace_survives_close_failure() {
    let (factory, calls) = fake_factory();
    factory.add_config("main", STUCK, label("old")).await.unwrap();
    factory.connect_all().await.unwrap();

    factory.add_config("main", COUNTING, label("new")).await.unwrap();
    factory.connect_all().await.unwrap();

    assert_eq!(calls.log(), vec!["connect old", "close old", "connect new"]);
    let handle = factory.get::<Counted>("main").await.unwrap();
    assert_eq!(handle.label, "new");
}

#[tokio::test]
async fn test_remove_is_total() {
    let (factory, calls) = fake_factory();
    factory.add_config("gone", COUNTING, label("gone")).await.unwrap();
    factory.connect_all().await.unwrap();

    assert!(factory.remove_db("GONE").await);
    assert!(factory.get_instance("gone").await.is_none());

    assert_eq!(factory.connect_all().await.unwrap(), 0);
    assert_eq!(calls.connects(), 1);
    assert_eq!(calls.closes(), 1);
}

#[tokio::test]
async fn test_names_are_case_insensitive() {
    let (factory, _) = fake_factory();
    factory.add_config("Cache1", ECHO, Box::new(5i64)).await.unwrap();
    factory.connect_all().await.unwrap();

    assert!(factory.get_instance("cache1").await.is_some());
    assert!(factory.get_instance("CACHE1").await.is_some());
    assert_eq!(factory.live_names().await, vec!["cache1"]);
}

#[tokio::test]
async fn test_distinct_names_do_not_interfere() {
    let (factory, calls) = fake_factory();
    factory.add_config("one", COUNTING, label("one")).await.unwrap();
    factory.add_config("two", COUNTING, label("two")).await.unwrap();
    factory.connect_all().await.unwrap();

    let two_before = factory.get::<Counted>("two").await.unwrap();
    factory.add_config("one", COUNTING, label("uno")).await.unwrap();
    factory.connect_all().await.unwrap();
    let two_after = factory.get::<Counted>("two").await.unwrap();

    assert!(Arc::ptr_eq(&two_before, &two_after));
    assert!(!calls.log().contains(&"close two".to_string()));
}

#[tokio::test]
async fn test_partial_sweep_abort() {
    let (factory, calls) = fake_factory();
    factory.add_config("first", COUNTING, label("first")).await.unwrap();
    factory.add_config("second", FAILING, label("second")).await.unwrap();
    factory.add_config("third", COUNTING, label("third")).await.unwrap();

    let err = factory.connect_all().await.unwrap_err();
    match &err {
        FactoryError::ConnectFailed { name, source } => {
            assert_eq!(name, "second");
            assert!(matches!(source, ConnectorError::Connect(_)));
        }
        other => panic!("expected ConnectFailed, got {other}"),
    }

    assert!(factory.get_instance("first").await.is_some());
    assert!(factory.get_instance("third").await.is_none());
    assert_eq!(calls.log(), vec!["connect first", "connect second"]);

    // Fix the broken entry; only it and the untouched one are attempted
    factory.add_config("second", COUNTING, label("second")).await.unwrap();
    assert_eq!(factory.connect_all().await.unwrap(), 2);
    assert_eq!(
        calls.log(),
        vec![
            "connect first",
            "connect second",
            "connect third",
            "connect second"
        ]
    );
}

#[tokio::test]
async fn test_close_all_best_effort() {
    let (factory, calls) = fake_factory();
    factory.add_config("a", STUCK, label("a")).await.unwrap();
    factory.add_config("b", COUNTING, label("b")).await.unwrap();
    factory.connect_all().await.unwrap();

    assert_eq!(factory.close_all().await, 2);
    assert_eq!(calls.closes(), 2);
    assert!(factory.live_names().await.is_empty());

    // Configs survive, so a new sweep reconnects both
    assert_eq!(factory.connect_all().await.unwrap(), 2);
}

#[tokio::test]
async fn test_typed_get_checks_backend_type() {
    let (factory, _) = fake_factory();
    factory.add_config("e", ECHO, Box::new(1i64)).await.unwrap();
    factory.connect_all().await.unwrap();

    let err = factory.get::<Counted>("e").await.unwrap_err();
    match err {
        FactoryError::WrongBackendType {
            expected, actual, ..
        } => {
            assert_eq!(expected, "counting or stuck");
            assert_eq!(actual.as_str(), ECHO);
        }
        other => panic!("expected WrongBackendType, got {other}"),
    }
}

#[tokio::test]
async fn test_get_before_connect_is_not_configured() {
    let (factory, _) = fake_factory();
    factory.add_config("later", COUNTING, label("later")).await.unwrap();

    let err = factory.get::<Counted>("later").await.unwrap_err();
    assert!(matches!(err, FactoryError::NotConfigured(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_readers_see_whole_sweeps() {
    const ENTRIES: usize = 5;

    let (factory, calls) = fake_factory();
    let factory = Arc::new(factory);
    for i in 0..ENTRIES {
        factory
            .add_config(&format!("db{}", i), SLOW, label(&i.to_string()))
            .await
            .unwrap();
    }

    let done = Arc::new(AtomicBool::new(false));
    let reader = {
        let factory = Arc::clone(&factory);
        let calls = calls.clone();
        let done = Arc::clone(&done);
        tokio::spawn(async move {
            let mut seen = Vec::new();
            let mut mid_sweep_reads = 0;
            loop {
                let finished = done.load(Ordering::SeqCst);
                if calls.connects() > 0 && !finished {
                    mid_sweep_reads += 1;
                }
                seen.push(factory.live_names().await.len());
                if finished {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            (seen, mid_sweep_reads)
        })
    };

    // Let the reader take a few samples before the sweep starts
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(factory.connect_all().await.unwrap(), ENTRIES);
    done.store(true, Ordering::SeqCst);

    let (seen, mid_sweep_reads) = reader.await.unwrap();
    assert!(mid_sweep_reads > 0, "reader never overlapped the sweep");
    assert!(
        seen.iter().all(|n| *n == 0 || *n == ENTRIES),
        "partial sweep observed: {:?}",
        seen
    );
    assert_eq!(seen.last(), Some(&ENTRIES));
}

//! Edge case tests for intention-worker
//!
//! Tool hand-over, result delivery and shutdown.

use intention_worker::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// SETUP TESTS
// ============================================================================

#[test]
fn test_default_tools_used_without_give_tools() {
    let mut worker: Worker<Vec<i32>, usize, Option<i32>> = Worker::default();
    worker.give_job(|tools, i| tools.get(i).copied()).unwrap();

    worker.work(0).unwrap();
    assert_eq!(smol::block_on(worker.recv()).unwrap(), None);
}

#[test]
fn test_misuse_error_message() {
    let mut worker: Worker<(), (), ()> = Worker::new();
    worker.give_job(|_, _| ()).unwrap();

    let err = worker.give_tools(()).unwrap_err();
    assert_eq!(err.to_string(), "give_tools() must be called before give_job(), not after");
}

#[test]
fn test_worker_ids_unique() {
    let a: Worker<(), (), ()> = Worker::new();
    let b: Worker<(), (), ()> = Worker::new();
    assert_ne!(a.id(), b.id());
}

// ============================================================================
// RESULT DELIVERY TESTS
// ============================================================================

#[test]
fn test_tools_shared_with_job() {
    let mut dictionary = HashMap::new();
    dictionary.insert("one".to_string(), 1);
    dictionary.insert("two".to_string(), 2);

    let mut worker: Worker<HashMap<String, i32>, String, i32> = Worker::new();
    worker
        .give_tools(dictionary)
        .unwrap()
        .give_job(|dict, word| dict.get(&word).copied().unwrap_or(-1))
        .unwrap();

    worker.work("two".into()).unwrap().work("three".into()).unwrap();

    smol::block_on(async {
        assert_eq!(worker.recv().await.unwrap(), 2);
        assert_eq!(worker.recv().await.unwrap(), -1);
    });
}

#[test]
fn test_when_complete_callback() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let (done_tx, done_rx) = smol::channel::unbounded();

    let mut worker: Worker<(), u64, u64> = Worker::new();
    let s = seen.clone();
    worker.when_complete(move |result| {
        s.lock().unwrap().push(result);
        let _ = done_tx.try_send(());
    });
    worker.give_job(|_, n| n * n).unwrap();

    for n in 1..=4 {
        worker.work(n).unwrap();
    }

    smol::block_on(async {
        for _ in 0..4 {
            done_rx.recv().await.unwrap();
        }
    });

    assert_eq!(*seen.lock().unwrap(), vec![1, 4, 9, 16]);
    assert!(worker.try_recv().is_none());
}

#[test]
fn test_callback_replaces_itself() {
    let (tx, rx) = smol::channel::unbounded();

    let mut worker: Worker<(), u64, u64> = Worker::new();
    worker.give_job(|_, n| n + 1).unwrap();
    let worker = Arc::new(worker);

    let handle = Arc::downgrade(&worker);
    worker.when_complete(move |result| {
        let _ = tx.try_send(("first", result));
        if let Some(worker) = handle.upgrade() {
            let tx = tx.clone();
            worker.when_complete(move |result| {
                let _ = tx.try_send(("second", result));
            });
        }
    });

    worker.work(1).unwrap().work(2).unwrap();

    let results = smol::block_on(async { vec![rx.recv().await.unwrap(), rx.recv().await.unwrap()] });
    assert_eq!(results, vec![("first", 2), ("second", 3)]);
}

#[test]
fn test_terminate_drains_posted_messages() {
    let seen = Arc::new(Mutex::new(Vec::new()));

    let mut worker: Worker<(), u32, ()> = Worker::new();
    let s = seen.clone();
    worker
        .give_job(move |_, n| {
            std::thread::sleep(Duration::from_millis(1));
            s.lock().unwrap().push(n);
        })
        .unwrap();

    for n in 0..5 {
        worker.work(n).unwrap();
    }
    worker.terminate();

    assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    assert!(worker.is_terminated());
}

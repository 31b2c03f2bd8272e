//! Concurrency behavior of the store.
//!
//! Same-namespace operations serialize under the namespace lock; distinct
//! namespaces are independent. These tests drive both cases from multiple
//! threads released together by a barrier.

use std::sync::{Arc, Barrier};
use std::thread;

use tempfile::TempDir;
use typeahead_store::{PutRequest, SearchRequest, Store, StoreConfig};

fn memory_store() -> Arc<Store> {
    Arc::new(Store::open(StoreConfig::default()).unwrap())
}

#[test]
fn concurrent_puts_of_one_key_count_every_call() {
    let store = memory_store();
    let threads = 8;
    let puts_per_thread = 50;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..puts_per_thread {
                    store
                        .put(PutRequest {
                            namespace: "ns",
                            key: "contested",
                            ts: Some(i as u64),
                            ..Default::default()
                        })
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let hits = store
        .search(SearchRequest {
            namespace: "ns",
            prefix: Some("contested"),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].count, (threads * puts_per_thread) as i64);
}

#[test]
fn racing_namespace_creation_publishes_one_namespace() {
    let store = memory_store();
    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let key = format!("key-{t}");
                store
                    .put(PutRequest {
                        namespace: "fresh",
                        key: &key,
                        ts: Some(t as u64),
                        ..Default::default()
                    })
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // Had the losers of the creation race kept their own namespace copies,
    // some of these writes would have vanished.
    let hits = store
        .search(SearchRequest {
            namespace: "fresh",
            ..Default::default()
        })
        .unwrap();
    assert_eq!(hits.len(), threads);
}

#[test]
fn puts_to_distinct_namespaces_are_independent() {
    let store = memory_store();
    let threads = 4;
    let keys_per_namespace = 100;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let namespace = format!("ns-{t}");
                barrier.wait();
                for i in 0..keys_per_namespace {
                    let key = format!("key-{i:03}");
                    store
                        .put(PutRequest {
                            namespace: &namespace,
                            key: &key,
                            ts: Some(i as u64),
                            ..Default::default()
                        })
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for t in 0..threads {
        let namespace = format!("ns-{t}");
        let hits = store
            .search(SearchRequest {
                namespace: &namespace,
                limit: Some(1000),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(hits.len(), keys_per_namespace, "namespace {namespace}");
    }
}

#[test]
fn searches_race_puts_without_tearing() {
    let store = memory_store();
    let total = 200;

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for i in 0..total {
                let key = format!("key-{i:03}");
                store
                    .put(PutRequest {
                        namespace: "ns",
                        key: &key,
                        ts: Some(i as u64),
                        ..Default::default()
                    })
                    .unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..3)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..50 {
                    let hits = store
                        .search(SearchRequest {
                            namespace: "ns",
                            limit: Some(1000),
                            ..Default::default()
                        })
                        .unwrap();
                    assert!(hits.len() <= total);
                    for hit in &hits {
                        assert!(hit.count >= 1);
                    }
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    let hits = store
        .search(SearchRequest {
            namespace: "ns",
            limit: Some(1000),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(hits.len(), total);
}

#[test]
fn snapshots_race_puts_without_losing_the_namespace() {
    let dir = TempDir::new().unwrap();
    let config = StoreConfig {
        data_dir: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    let store = Arc::new(Store::open(config.clone()).unwrap());

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for i in 0..300 {
                let key = format!("key-{i:03}");
                store
                    .put(PutRequest {
                        namespace: "ns",
                        key: &key,
                        ts: Some(i as u64),
                        ..Default::default()
                    })
                    .unwrap();
            }
        })
    };
    for _ in 0..20 {
        store.flush_dirty();
    }
    writer.join().unwrap();
    store.flush_all();

    let reopened = Store::open(config).unwrap();
    let hits = reopened
        .search(SearchRequest {
            namespace: "ns",
            limit: Some(1000),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(hits.len(), 300);
}

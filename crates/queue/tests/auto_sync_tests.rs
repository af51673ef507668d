// tests/auto_sync_tests.rs
mod common;
use common::*;
use std::time::Duration;

async fn wait_for<F: Fn() -> bool>(cond: F) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not met in time");
}

#[tokio::test]
async fn test_reconnect_triggers_sync() {
    let h = harness(false);
    h.book.create_order(order("A")).await.unwrap();
    h.book.create_order(order("B")).await.unwrap();

    let task = h.book.spawn_auto_sync();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(h.api.create_calls(), 0);

    h.monitor.set_online(true);
    wait_for(|| h.book.pending().is_empty()).await;

    assert_eq!(h.book.confirmed().len(), 2);
    assert_eq!(h.api.create_calls(), 2);
    task.abort();
}

#[tokio::test]
async fn test_already_online_syncs_at_start() {
    let h = harness(false);
    h.book.create_order(order("A")).await.unwrap();
    h.monitor.set_online(true);

    let task = h.book.spawn_auto_sync();
    wait_for(|| h.book.pending().is_empty()).await;

    assert_eq!(h.api.create_calls(), 1);
    task.abort();
}

#[tokio::test]
async fn test_going_offline_does_not_sync() {
    let h = harness(true);
    let task = h.book.spawn_auto_sync();
    tokio::time::sleep(Duration::from_millis(50)).await;

    h.monitor.set_online(false);
    h.book.create_order(order("A")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(h.api.create_calls(), 0);
    assert_eq!(h.book.pending().len(), 1);
    task.abort();
}

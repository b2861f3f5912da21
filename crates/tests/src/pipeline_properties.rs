//! Batching and delivery properties of the dispatcher.

use std::time::Duration;

use dispatcher::{Dispatcher, DispatcherConfig, SubmitError};

use crate::mock::{event, MockBulkSink};

fn config(batch_size: usize, batch_timeout: Duration) -> DispatcherConfig {
    DispatcherConfig {
        max_worker: 2,
        batch_size,
        batch_timeout,
        queue_capacity: 512,
        probe_interval: Duration::from_secs(10),
        report_interval: Duration::from_secs(60),
    }
}

#[test]
fn test_dispatcher_config_derived_from_loaded_config() {
    let loaded = config_loader::ConfigLoader::load_from_str(
        r#"
max_worker = 4
batch_size = 500
batch_timeout_ms = 200
req_timeout_ms = 3000
queue_capacity = 1000
es_server_addr = "http://localhost:9200"
"#,
        config_loader::ConfigFormat::Toml,
    )
    .unwrap();

    let derived = DispatcherConfig::from(&loaded);
    assert_eq!(derived.max_worker, 4);
    assert_eq!(derived.batch_size, 500);
    assert_eq!(derived.batch_timeout, Duration::from_millis(200));
    assert_eq!(derived.queue_capacity, 1000);
}

#[tokio::test(start_paused = true)]
async fn test_spaced_events_release_singleton_batches() {
    let sink = MockBulkSink::new();
    let dispatcher = Dispatcher::spawn(config(10, Duration::from_millis(300)), sink.clone());
    let handle = dispatcher.handle();

    for guid in ["a", "b", "c"] {
        let outcome = handle
            .submit(event(guid), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(outcome.guid, guid);
        // next submission starts well after the previous batch window
        tokio::time::advance(Duration::from_millis(400)).await;
    }

    assert_eq!(sink.batches(), vec![vec!["a"], vec!["b"], vec!["c"]]);
    dispatcher.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_full_batch_releases_without_waiting_for_timer() {
    let sink = MockBulkSink::new();
    let dispatcher = Dispatcher::spawn(config(4, Duration::from_secs(300)), sink.clone());
    let handle = dispatcher.handle();

    let started = tokio::time::Instant::now();
    let mut joins = Vec::new();
    for guid in ["a", "b", "c", "d"] {
        let handle = handle.clone();
        let event = event(guid);
        joins.push(tokio::spawn(async move {
            handle.submit(event, Duration::from_secs(600)).await
        }));
    }
    for join in joins {
        assert!(join.await.unwrap().is_ok());
    }

    // released on the size threshold, not the (much larger) idle timer
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(sink.batches().len(), 1);
    assert_eq!(sink.batches()[0].len(), 4);
    dispatcher.shutdown().await;
}

#[tokio::test]
async fn test_cancelled_caller_does_not_affect_others() {
    let (sink, gate) = MockBulkSink::gated();
    let dispatcher = Dispatcher::spawn(config(2, Duration::from_millis(50)), sink.clone());
    let handle = dispatcher.handle();

    let reply_a = handle.enqueue(event("a")).await.unwrap();
    let reply_b = handle.enqueue(event("b")).await.unwrap();

    // wait for the batch to reach the (blocked) sink
    while sink.batches().is_empty() {
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    // caller of "a" walks away mid-flight
    reply_a.cancel_token().raise();
    drop(reply_a);

    gate.notify_one();
    let outcome = reply_b.outcome().await.expect("b must still be delivered");
    assert_eq!(outcome.guid, "b");
    assert!(outcome.is_success());

    let snapshot = dispatcher.metrics();
    assert_eq!(snapshot.delivered, 1);
    assert_eq!(snapshot.dropped, 1);
    dispatcher.shutdown().await;
}

#[tokio::test]
async fn test_duplicate_outcomes_are_delivered_at_most_once() {
    let sink = MockBulkSink::duplicating();
    let dispatcher = Dispatcher::spawn(config(101, Duration::from_millis(50)), sink);
    let handle = dispatcher.handle();

    let outcome = handle
        .submit(event("a"), Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(outcome.guid, "a");

    // the redundant outcome had no reply slot left to land in
    assert_eq!(dispatcher.metrics().delivered, 1);
    dispatcher.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_order_preserved_within_batch() {
    let sink = MockBulkSink::new();
    let dispatcher = Dispatcher::spawn(config(3, Duration::from_secs(300)), sink.clone());
    let handle = dispatcher.handle();

    let reply_a = handle.enqueue(event("a")).await.unwrap();
    let reply_b = handle.enqueue(event("b")).await.unwrap();
    let reply_c = handle.enqueue(event("c")).await.unwrap();

    assert!(reply_a.outcome().await.is_some());
    assert!(reply_b.outcome().await.is_some());
    assert!(reply_c.outcome().await.is_some());

    assert_eq!(sink.batches(), vec![vec!["a", "b", "c"]]);
    dispatcher.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_burst_splits_into_full_batches_plus_timed_remainder() {
    let sink = MockBulkSink::new();
    let dispatcher = Dispatcher::spawn(config(100, Duration::from_millis(300)), sink.clone());
    let handle = dispatcher.handle();

    let started = tokio::time::Instant::now();
    let mut replies = Vec::with_capacity(250);
    for i in 0..250 {
        replies.push(handle.enqueue(event(&format!("e{i}"))).await.unwrap());
    }
    for reply in replies {
        assert!(reply.outcome().await.is_some());
    }

    let sizes: Vec<usize> = sink.batches().iter().map(|batch| batch.len()).collect();
    assert_eq!(sizes, vec![100, 100, 50]);
    // the remainder had to wait for the idle timer
    assert!(started.elapsed() >= Duration::from_millis(300));
    dispatcher.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_unreachable_sink_times_out_cleanly() {
    let sink = MockBulkSink::unready();
    let dispatcher = Dispatcher::spawn(config(101, Duration::from_millis(300)), sink.clone());
    let handle = dispatcher.handle();

    let started = tokio::time::Instant::now();
    let result = handle.submit(event("a"), Duration::from_millis(3000)).await;

    assert_eq!(result, Err(SubmitError::Timeout));
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(3000));
    assert!(elapsed < Duration::from_millis(3200));
    assert!(sink.ready_calls() >= 1);
    dispatcher.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_with_queued_events_times_out_their_callers() {
    let sink = MockBulkSink::new();
    let dispatcher = Dispatcher::spawn(config(101, Duration::from_secs(300)), sink.clone());
    let handle = dispatcher.handle();

    let mut joins = Vec::new();
    for i in 0..40 {
        let handle = handle.clone();
        let event = event(&format!("q{i}"));
        joins.push(tokio::spawn(async move {
            handle.submit(event, Duration::from_millis(500)).await
        }));
    }
    // let every submission reach the batcher queue
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }

    dispatcher.shutdown().await;

    for join in joins {
        assert_eq!(join.await.unwrap(), Err(SubmitError::Timeout));
    }
    assert!(sink.batches().is_empty());
}

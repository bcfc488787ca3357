#![cfg(test)]
//! Load Testing Suite for folly
//!
//! Runs the simulator at its default settings under bursts large enough to
//! fill the completion queue:
//! - 200 concurrent requests per round
//! - default 500-800ms work window with a 1 KiB buffer
//!
//! Key expectations:
//! - every request completes; none are dropped under backpressure
//! - the aggregator sees exactly one completion per request

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use folly::aggregator::{completion_queue, Completion, COMPLETION_QUEUE_CAPACITY};
use folly::api::{self, AppState};
use folly::config::{DriverConfig, SimulatorConfig};
use folly::driver::run_load_test;
use folly::work::WorkSimulator;

/// Test: Default workload under a full completion queue
///
/// The test drains completions slowly so senders must wait on the queue.
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
#[ignore] // Ignore by default as this is a slow test
async fn test_default_workload_under_backpressure() {
    let (tx, mut rx) = completion_queue(COMPLETION_QUEUE_CAPACITY);
    let simulator = WorkSimulator::new(Arc::new(SimulatorConfig::default()), tx);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, api::router(AppState::new(simulator)))
            .await
            .unwrap();
    });

    let drained = tokio::spawn(async move {
        let mut count = 0usize;
        while let Some(Completion) = rx.recv().await {
            count += 1;
            if count % 50 == 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            if count == 1000 {
                break;
            }
        }
        count
    });

    let cfg = DriverConfig {
        address: addr.ip().to_string(),
        port: addr.port(),
        concurrency: 200,
        iterations: 5,
    };
    let results = run_load_test(&cfg).await.unwrap();

    let failures: usize = results.iter().map(|r| r.failures).sum();
    assert_eq!(failures, 0, "requests failed under load");
    for result in &results {
        println!(
            "Iteration {} took {:?} with RPS of {:.2}",
            result.index, result.elapsed, result.rps
        );
        assert!(result.elapsed >= Duration::from_millis(500));
    }

    assert_eq!(drained.await.unwrap(), 1000);
}

use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::info;

use crate::memory::MemoryStats;

/// Queue capacity for the long-running server process.
pub const COMPLETION_QUEUE_CAPACITY: usize = 200;
/// Queue capacity for a one-shot invocation.
pub const SINGLE_INVOCATION_QUEUE_CAPACITY: usize = 1;
/// Completions per throughput sample.
pub const SAMPLE_EVERY: u64 = 100;

/// One finished work invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion;

pub type CompletionSender = mpsc::Sender<Completion>;
pub type CompletionReceiver = mpsc::Receiver<Completion>;

/// Bounded completion queue; senders wait when it is full.
pub fn completion_queue(capacity: usize) -> (CompletionSender, CompletionReceiver) {
    mpsc::channel(capacity)
}

/// Requests per second over `elapsed`. A zero window yields infinity.
pub fn requests_per_second(count: u64, elapsed: Duration) -> f64 {
    count as f64 / elapsed.as_secs_f64()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThroughputSample {
    pub total_count: u64,
    pub window: Duration,
    pub rps: f64,
    pub memory: MemoryStats,
}

/// Sequential consumer of completions, sampling every [`SAMPLE_EVERY`].
#[derive(Debug)]
pub struct Aggregator {
    total: u64,
    window_start: Instant,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregator {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self {
            total: 0,
            window_start: start,
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Counts one completion observed at `now`.
    pub fn record(&mut self, now: Instant) -> Option<ThroughputSample> {
        self.total += 1;
        if self.total % SAMPLE_EVERY != 0 {
            return None;
        }

        let window = now.saturating_duration_since(self.window_start);
        self.window_start = now;
        Some(ThroughputSample {
            total_count: self.total,
            window,
            rps: requests_per_second(SAMPLE_EVERY, window),
            memory: MemoryStats::snapshot(),
        })
    }

    /// Drains `rx` until every sender is gone, logging each sample.
    /// Returns the number of completions consumed.
    pub async fn run(mut self, mut rx: CompletionReceiver) -> u64 {
        while let Some(Completion) = rx.recv().await {
            if let Some(sample) = self.record(Instant::now()) {
                info!(
                    total = sample.total_count,
                    window_ms = sample.window.as_millis() as u64,
                    rps = sample.rps,
                    alloc_mb = sample.memory.alloc_mb,
                    total_alloc_mb = sample.memory.total_alloc_mb,
                    sys_mb = sample.memory.sys_mb,
                    frees = sample.memory.frees,
                    "received calls"
                );
            }
        }
        self.total
    }
}

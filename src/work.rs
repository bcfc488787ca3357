//! # Work Simulator
//!
//! Burns CPU over a fixed-size buffer for a randomized duration, then reports
//! one [`Completion`] to the aggregator.
//!
//! Each invocation owns its own buffer, stop token and timer; the completion
//! queue is the only state shared across invocations.

use rand::Rng;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::aggregator::{
    completion_queue, Completion, CompletionSender, SINGLE_INVOCATION_QUEUE_CAPACITY,
};
use crate::config::SimulatorConfig;
use crate::profile::CpuProfile;

/// Outcome of one work invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkReport {
    pub planned: Duration,
    pub elapsed: Duration,
    pub passes: u64,
}

#[derive(Clone)]
pub struct WorkSimulator {
    cfg: Arc<SimulatorConfig>,
    completions: CompletionSender,
    profile: Option<Arc<CpuProfile>>,
}

impl WorkSimulator {
    pub fn new(cfg: Arc<SimulatorConfig>, completions: CompletionSender) -> Self {
        Self {
            cfg,
            completions,
            profile: None,
        }
    }

    pub fn with_profile(mut self, profile: Arc<CpuProfile>) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Runs one unit of work to completion and signals the aggregator.
    ///
    /// The invocation runs on its own task, so dropping the returned future
    /// (e.g. a disconnected client) neither stops the churn nor loses the
    /// completion.
    pub async fn perform_work(&self) -> WorkReport {
        let invocation = tokio::spawn({
            let sim = self.clone();
            async move { sim.run_invocation().await }
        });
        match invocation.await {
            Ok(report) => report,
            Err(e) => std::panic::resume_unwind(e.into_panic()),
        }
    }

    async fn run_invocation(&self) -> WorkReport {
        let planned = pick_duration(
            self.cfg.min_duration(),
            self.cfg.max_duration(),
            &mut rand::thread_rng(),
        );
        let stop = CancellationToken::new();
        let started = Instant::now();

        tokio::spawn({
            let stop = stop.clone();
            async move {
                tokio::time::sleep(planned).await;
                stop.cancel();
            }
        });

        let memory = self.cfg.memory_bytes;
        let passes = match tokio::task::spawn_blocking(move || {
            let mut buffer = vec![0u8; memory];
            churn(&mut buffer, &stop)
        })
        .await
        {
            Ok(passes) => passes,
            Err(e) => std::panic::resume_unwind(e.into_panic()),
        };

        let report = WorkReport {
            planned,
            elapsed: started.elapsed(),
            passes,
        };

        if self.completions.send(Completion).await.is_err() {
            error!("completion queue closed; aggregator is gone");
        }
        if let Some(profile) = &self.profile {
            profile.record(&report);
        }

        debug!(
            planned_ms = planned.as_millis() as u64,
            elapsed_ms = report.elapsed.as_millis() as u64,
            passes,
            "work complete"
        );
        report
    }
}

/// Uniform in `[min, max)`; a zero-width window is the fixed duration `min`.
pub fn pick_duration<R: Rng + ?Sized>(min: Duration, max: Duration, rng: &mut R) -> Duration {
    let (min_ms, max_ms) = (min.as_millis() as u64, max.as_millis() as u64);
    if max_ms <= min_ms {
        return min;
    }
    Duration::from_millis(rng.gen_range(min_ms..max_ms))
}

/// Rewrites `buffer` with `(index + 1) mod 256` until `stop` fires.
/// Always completes at least one pass; returns the pass count.
pub fn churn(buffer: &mut [u8], stop: &CancellationToken) -> u64 {
    let mut passes = 0;
    loop {
        for (i, byte) in buffer.iter_mut().enumerate() {
            *byte = (i + 1) as u8;
        }
        passes += 1;
        if stop.is_cancelled() {
            return passes;
        }
    }
}

/// One-shot entry point: a single invocation wired to a capacity-1 queue.
pub async fn invoke_once(cfg: SimulatorConfig) -> &'static str {
    let (tx, _rx) = completion_queue(SINGLE_INVOCATION_QUEUE_CAPACITY);
    WorkSimulator::new(Arc::new(cfg), tx).perform_work().await;
    "Success"
}

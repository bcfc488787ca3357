//! # Load Driver
//!
//! Issues rounds of concurrent `GET /work` requests. A round ends only when
//! every request in it has returned or failed; rounds never overlap.

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::aggregator::requests_per_second;
use crate::config::DriverConfig;
use crate::error::{FollyError, Result};

/// Timing of one round.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationResult {
    pub index: usize,
    pub elapsed: Duration,
    pub rps: f64,
    pub failures: usize,
}

pub struct LoadDriver {
    client: reqwest::Client,
    url: String,
    concurrency: usize,
    iterations: usize,
}

impl LoadDriver {
    pub fn new(cfg: &DriverConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("folly-runner/0.2"));
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;
        Ok(Self {
            client,
            url: cfg.work_url(),
            concurrency: cfg.concurrency,
            iterations: cfg.iterations,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Runs every round in sequence and returns their results.
    pub async fn run(&self) -> Vec<IterationResult> {
        let mut results = Vec::with_capacity(self.iterations);
        for index in 0..self.iterations {
            let result = self.run_round(index).await;
            info!(
                iteration = result.index,
                elapsed_ms = result.elapsed.as_millis() as u64,
                rps = result.rps,
                failures = result.failures,
                "iteration complete"
            );
            results.push(result);
        }
        results
    }

    async fn run_round(&self, index: usize) -> IterationResult {
        let start = Instant::now();
        let mut requests = JoinSet::new();
        for _ in 0..self.concurrency {
            let client = self.client.clone();
            let url = self.url.clone();
            requests.spawn(async move { fetch(&client, &url).await });
        }

        let mut failures = 0;
        while let Some(joined) = requests.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    failures += 1;
                    warn!(iteration = index, error = %e, "error in GET");
                }
                Err(e) => {
                    failures += 1;
                    warn!(iteration = index, error = %e, "request task aborted");
                }
            }
        }

        let elapsed = start.elapsed();
        IterationResult {
            index,
            elapsed,
            rps: requests_per_second(self.concurrency as u64, elapsed),
            failures,
        }
    }
}

async fn fetch(client: &reqwest::Client, url: &str) -> Result<()> {
    let resp = client.get(url).send().await?;
    let status = resp.status();
    resp.bytes().await?;
    if !status.is_success() {
        return Err(FollyError::Status {
            status,
            url: url.to_string(),
        });
    }
    Ok(())
}

/// Builds a driver for `cfg` and runs the whole load test.
pub async fn run_load_test(cfg: &DriverConfig) -> Result<Vec<IterationResult>> {
    let driver = LoadDriver::new(cfg)?;
    info!(
        url = driver.url(),
        concurrency = cfg.concurrency,
        iterations = cfg.iterations,
        "running load"
    );
    let results = driver.run().await;
    info!("done");
    Ok(results)
}

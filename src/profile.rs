use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::error::Result;
use crate::work::WorkReport;

pub const PROFILE_PATH: &str = "folly.prof";

/// Per-invocation samples kept in the written profile.
const MAX_SAMPLES: usize = 10_000;

/// Busy-loop profile for the lifetime of the simulator process.
#[derive(Debug)]
pub struct CpuProfile {
    started_at: DateTime<Utc>,
    state: Mutex<ProfileState>,
}

#[derive(Debug, Default)]
struct ProfileState {
    invocations: u64,
    busy: Duration,
    passes: u64,
    samples: Vec<WorkReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub invocations: u64,
    pub busy_ms: u64,
    pub passes: u64,
    pub samples: Vec<WorkReport>,
}

impl Default for CpuProfile {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuProfile {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            state: Mutex::new(ProfileState::default()),
        }
    }

    pub fn record(&self, report: &WorkReport) {
        let mut state = self.state.lock();
        state.invocations += 1;
        state.busy += report.elapsed;
        state.passes += report.passes;
        if state.samples.len() < MAX_SAMPLES {
            state.samples.push(*report);
        }
    }

    pub fn summary(&self) -> ProfileSummary {
        let state = self.state.lock();
        ProfileSummary {
            started_at: self.started_at,
            finished_at: Utc::now(),
            invocations: state.invocations,
            busy_ms: state.busy.as_millis() as u64,
            passes: state.passes,
            samples: state.samples.clone(),
        }
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let summary = self.summary();
        let json = serde_json::to_vec_pretty(&summary)?;
        std::fs::write(path.as_ref(), json)?;
        info!(
            path = %path.as_ref().display(),
            invocations = summary.invocations,
            "cpu profile written"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(ms: u64, passes: u64) -> WorkReport {
        WorkReport {
            planned: Duration::from_millis(ms),
            elapsed: Duration::from_millis(ms + 1),
            passes,
        }
    }

    #[test]
    fn test_record_accumulates() {
        let profile = CpuProfile::new();
        profile.record(&report(100, 10));
        profile.record(&report(200, 5));

        let summary = profile.summary();
        assert_eq!(summary.invocations, 2);
        assert_eq!(summary.busy_ms, 302);
        assert_eq!(summary.passes, 15);
        assert_eq!(summary.samples.len(), 2);
        assert!(summary.finished_at >= summary.started_at);
    }

    #[test]
    fn test_samples_are_capped() {
        let profile = CpuProfile::new();
        for _ in 0..MAX_SAMPLES + 5 {
            profile.record(&report(1, 1));
        }
        let summary = profile.summary();
        assert_eq!(summary.invocations, (MAX_SAMPLES + 5) as u64);
        assert_eq!(summary.samples.len(), MAX_SAMPLES);
    }

    #[test]
    fn test_write_to_emits_json() {
        let profile = CpuProfile::new();
        profile.record(&report(50, 3));
        let path = std::env::temp_dir().join(format!("folly-{}.prof", std::process::id()));

        profile.write_to(&path).expect("profile written");

        let raw = std::fs::read_to_string(&path).expect("profile readable");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
        assert_eq!(value["invocations"], 1);
        assert_eq!(value["passes"], 3);
        std::fs::remove_file(&path).ok();
    }
}

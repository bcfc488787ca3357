use figment::{
    providers::{Env, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;
use validator::{Validate, ValidationError};

use crate::error::Result;

const SIMULATOR_PREFIX: &str = "FOLLY_";
const SIMULATOR_KEYS: &[&str] = &["port", "duration_max", "duration_min", "memory", "cpu_profile"];

const DRIVER_PREFIX: &str = "RUNNER_";
const DRIVER_KEYS: &[&str] = &["address", "port", "concurrency", "iterations"];

/// Work simulator settings. `duration_*` are milliseconds, `memory` is bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_duration_window"))]
pub struct SimulatorConfig {
    pub port: u16,
    #[serde(rename = "duration_max")]
    pub duration_max_ms: u64,
    #[serde(rename = "duration_min")]
    pub duration_min_ms: u64,
    #[serde(rename = "memory")]
    pub memory_bytes: usize,
    pub cpu_profile: bool,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            duration_max_ms: 800,
            duration_min_ms: 500,
            memory_bytes: 1024,
            cpu_profile: false,
        }
    }
}

fn validate_duration_window(cfg: &SimulatorConfig) -> std::result::Result<(), ValidationError> {
    if cfg.duration_max_ms < cfg.duration_min_ms {
        let mut err = ValidationError::new("duration_window");
        err.message = Some("DURATION_MAX must not be below DURATION_MIN".into());
        return Err(err);
    }
    Ok(())
}

impl SimulatorConfig {
    /// Defaults, then bare env vars, then `FOLLY_`-prefixed env vars.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Env::raw().only(SIMULATOR_KEYS))
            .merge(Env::prefixed(SIMULATOR_PREFIX).only(SIMULATOR_KEYS))
    }

    pub fn load() -> Result<Self> {
        Self::from_figment(Self::figment())
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let cfg: Self = figment.extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn min_duration(&self) -> Duration {
        Duration::from_millis(self.duration_min_ms)
    }

    pub fn max_duration(&self) -> Duration {
        Duration::from_millis(self.duration_max_ms)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

/// Load runner settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct DriverConfig {
    #[validate(length(min = 1))]
    pub address: String,
    pub port: u16,
    #[validate(range(min = 1, message = "CONCURRENCY must be at least 1"))]
    pub concurrency: usize,
    pub iterations: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            address: "localhost".to_string(),
            port: 8080,
            concurrency: 100,
            iterations: 10,
        }
    }
}

impl DriverConfig {
    /// Defaults, then bare env vars, then `RUNNER_`-prefixed env vars.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Env::raw().only(DRIVER_KEYS))
            .merge(Env::prefixed(DRIVER_PREFIX).only(DRIVER_KEYS))
    }

    pub fn load() -> Result<Self> {
        Self::from_figment(Self::figment())
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let cfg: Self = figment.extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn work_url(&self) -> String {
        format!("http://{}:{}/work", self.address, self.port)
    }
}

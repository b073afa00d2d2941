//! Up/down state for the storage backend and the aggregation worker.
//!
//! A component starts out `unknown` until its first probe or start, so a
//! freshly booted process is never reported ready before ClickHouse answered.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, AtomicU8, Ordering};

/// Overall service status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Unhealthy => "unhealthy",
        }
    }
}

/// Last observed state of one component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentState {
    Unknown,
    Up,
    Down,
}

impl ComponentState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Up,
            2 => Self::Down,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug)]
pub struct ComponentHealth {
    name: &'static str,
    state: AtomicU8,
    changed_at_ms: AtomicI64,
    reason: parking_lot::RwLock<Option<String>>,
}

impl ComponentHealth {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            state: AtomicU8::new(0),
            changed_at_ms: AtomicI64::new(0),
            reason: parking_lot::RwLock::new(None),
        }
    }

    pub fn set_healthy(&self) {
        let mut reason = self.reason.write();
        *reason = None;
        self.transition(ComponentState::Up);
    }

    /// Mark the component down, keeping `reason` for the health report.
    pub fn set_unhealthy(&self, reason: impl Into<String>) {
        let mut slot = self.reason.write();
        *slot = Some(reason.into());
        self.transition(ComponentState::Down);
    }

    // Only records a timestamp when the state actually flips, so repeated
    // probes with the same outcome keep the original `since`.
    fn transition(&self, to: ComponentState) {
        let previous = self.state.swap(to as u8, Ordering::AcqRel);
        if previous != to as u8 {
            self.changed_at_ms
                .store(Utc::now().timestamp_millis(), Ordering::Release);
        }
    }

    pub fn state(&self) -> ComponentState {
        ComponentState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_healthy(&self) -> bool {
        self.state() == ComponentState::Up
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn reason(&self) -> Option<String> {
        self.reason.read().clone()
    }

    /// When the state last changed, `None` while still unknown.
    pub fn since(&self) -> Option<DateTime<Utc>> {
        match self.changed_at_ms.load(Ordering::Acquire) {
            0 => None,
            ms => Utc.timestamp_millis_opt(ms).single(),
        }
    }

    fn snapshot(&self) -> ComponentSnapshot {
        let reason = self.reason();
        ComponentSnapshot {
            name: self.name,
            state: self.state(),
            since: self.since(),
            reason,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentSnapshot {
    pub name: &'static str,
    pub state: ComponentState,
    pub since: Option<DateTime<Utc>>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub components: [ComponentSnapshot; 2],
}

pub struct HealthRegistry {
    pub clickhouse: ComponentHealth,
    pub aggregator: ComponentHealth,
}

impl HealthRegistry {
    pub const fn new() -> Self {
        Self {
            clickhouse: ComponentHealth::new("clickhouse"),
            aggregator: ComponentHealth::new("aggregator"),
        }
    }

    /// Healthy when both are up. A stopped aggregator means clicks are no
    /// longer accepted, so it is unhealthy regardless of storage.
    pub fn report(&self) -> HealthReport {
        let clickhouse = self.clickhouse.snapshot();
        let aggregator = self.aggregator.snapshot();

        let status = match (clickhouse.state, aggregator.state) {
            (ComponentState::Up, ComponentState::Up) => HealthStatus::Healthy,
            (_, ComponentState::Down) => HealthStatus::Unhealthy,
            (ComponentState::Down, ComponentState::Unknown) => HealthStatus::Unhealthy,
            _ => HealthStatus::Degraded,
        };

        HealthReport {
            status,
            components: [clickhouse, aggregator],
        }
    }

    pub fn is_ready(&self) -> bool {
        self.clickhouse.is_healthy() && self.aggregator.is_healthy()
    }

    pub fn is_alive(&self) -> bool {
        true
    }
}

impl Default for HealthRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static HEALTH: HealthRegistry = HealthRegistry::new();

pub fn health() -> &'static HealthRegistry {
    &HEALTH
}

//! Worker liveness probing and the hub-facing bounded-retry health check.
//!
//! A single [`WorkerProxy::probe`] is a simple unit: one GET, one
//! classification, no retry. The hub's eviction loop wraps it in a
//! [`HealthPolicy`], which absorbs
//! transient network blips by probing a fixed small number of times with a
//! short delay before declaring the worker unresponsive.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::proxy::WorkerProxy;

/// Sentinel status reported when the heartbeat request could not be made
/// at all (connection refused, timeout, DNS failure).
pub const UNRESPONSIVE_STATUS: u16 = 503;

/// Outcome of a liveness probe.
///
/// A status, not an error: the caller owns eviction policy, so an
/// unresponsive worker is an ordinary value to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    /// The heartbeat endpoint answered with a success status.
    Healthy { status: u16 },
    /// The worker could not be reached, or answered with a non-success
    /// status (carried here verbatim; [`UNRESPONSIVE_STATUS`] when the
    /// request itself failed).
    Unresponsive { status: u16 },
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy { .. })
    }

    /// The HTTP status this outcome reports.
    pub fn status(&self) -> u16 {
        match self {
            HealthStatus::Healthy { status } | HealthStatus::Unresponsive { status } => *status,
        }
    }
}

impl WorkerProxy {
    /// Probes the worker's heartbeat endpoint once.
    ///
    /// Transport failures and non-success statuses both classify the
    /// worker as unresponsive and log a warning. No retry happens here;
    /// bounded retry lives in [`HealthPolicy`], at the caller boundary.
    pub async fn probe(&self) -> HealthStatus {
        debug!(
            target = "grid.health",
            host = self.host(),
            port = self.port(),
            "polling worker"
        );

        match self.transport().get(&self.heartbeat_url()).await {
            Ok(response) if response.is_success() => HealthStatus::Healthy {
                status: response.status,
            },
            Ok(response) => {
                warn!(
                    target = "grid.health",
                    proxy = %self,
                    status = response.status,
                    "worker did not respond correctly"
                );
                HealthStatus::Unresponsive {
                    status: response.status,
                }
            }
            Err(err) => {
                warn!(
                    target = "grid.health",
                    proxy = %self,
                    error = %err,
                    "worker is unresponsive"
                );
                HealthStatus::Unresponsive {
                    status: UNRESPONSIVE_STATUS,
                }
            }
        }
    }
}

/// Bounded-retry health check the hub runs before evicting a worker.
#[derive(Debug, Clone)]
pub struct HealthPolicy {
    attempts: u32,
    delay: Duration,
}

impl Default for HealthPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_millis(500),
        }
    }
}

impl HealthPolicy {
    /// Creates a policy probing up to `attempts` times (at least one) with
    /// `delay` between attempts.
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Probes until the first healthy outcome, up to the attempt budget.
    ///
    /// Returns the first [`HealthStatus::Healthy`], or the last
    /// [`HealthStatus::Unresponsive`] once the budget is exhausted.
    pub async fn check(&self, proxy: &WorkerProxy) -> HealthStatus {
        let mut last = HealthStatus::Unresponsive {
            status: UNRESPONSIVE_STATUS,
        };

        for attempt in 1..=self.attempts {
            let status = proxy.probe().await;
            if status.is_healthy() {
                return status;
            }
            debug!(
                target = "grid.health",
                proxy = %proxy,
                attempt,
                attempts = self.attempts,
                status = status.status(),
                "probe attempt failed"
            );
            last = status;

            if attempt < self.attempts {
                sleep(self.delay).await;
            }
        }

        last
    }

    /// Like [`check`](Self::check), but abandons the remaining attempts
    /// when `shutdown` flips to true. Returns [`None`] if cancelled.
    pub async fn check_with_shutdown(
        &self,
        proxy: &WorkerProxy,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Option<HealthStatus> {
        let mut last = HealthStatus::Unresponsive {
            status: UNRESPONSIVE_STATUS,
        };

        for attempt in 1..=self.attempts {
            if *shutdown.borrow() {
                return None;
            }

            let status = proxy.probe().await;
            if status.is_healthy() {
                return Some(status);
            }
            last = status;

            if attempt < self.attempts {
                tokio::select! {
                    _ = shutdown.changed() => {
                        if *shutdown.borrow() {
                            return None;
                        }
                    }
                    _ = sleep(self.delay) => {}
                }
            }
        }

        Some(last)
    }
}

//! Hub-side proxy for one remote worker.
//!
//! A [`WorkerProxy`] stands in for a single browser-automation agent
//! somewhere in the grid. It owns three concerns that together make the
//! worker schedulable:
//! - Identity and address: the immutable (host, port, environment) triple
//!   and the endpoint URLs derived from it
//! - The session lease: an exclusive, capacity-one assignment of a test
//!   run to this worker
//! - Command forwarding: carrying driver commands to the worker, but only
//!   while a lease is held
//!
//! # Identity vs. lease state
//!
//! Equality and hashing cover only (host, port, environment): two proxies
//! with equal triples are interchangeable registry members regardless of
//! lease state. One physical agent may register several environments, one
//! proxy per tag. The mutable lease flag lives in its own cell precisely so
//! the identity contract never silently skips fields that change.
//!
//! # Locking
//!
//! The lease cell sits behind a `parking_lot::Mutex` held only for a few
//! loads and stores. Network calls (`forward`, `terminate_session`, the
//! probe in [`crate::health`]) always run with the lock released, so a slow
//! or dead worker can never stall a scheduler thread mid-transition.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, warn};

use grid_protocol::{
    CMD_FIELD, CMD_TEST_COMPLETE, CommandParameters, SESSION_ID_FIELD, WorkerResponse,
};

use crate::error::{Error, Result};
use crate::transport::Transport;

/// Fixed path prefix every worker endpoint lives under.
const SERVER_PATH_PREFIX: &str = "selenium-server";

/// Mutable lease cell: the busy flag plus the lease start time.
///
/// `started_at` is meaningful only while `active` is true.
#[derive(Debug, Default)]
struct LeaseState {
    active: bool,
    started_at: Option<Instant>,
}

/// Local interface to a real worker running somewhere in the grid.
pub struct WorkerProxy {
    host: String,
    port: u16,
    environment: String,
    lease: Mutex<LeaseState>,
    /// Cached display name from DNS resolution; cleared by
    /// [`invalidate_resolved_host`](Self::invalidate_resolved_host).
    resolved: Mutex<Option<String>>,
    transport: Arc<dyn Transport>,
}

impl WorkerProxy {
    /// Creates a proxy for the worker at `host:port` advertising
    /// `environment`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `host` or `environment` is
    /// empty; an invalid proxy is never constructed.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        environment: impl Into<String>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        let host = host.into();
        let environment = environment.into();

        if host.is_empty() {
            return Err(Error::Configuration("host cannot be empty".to_string()));
        }
        if environment.is_empty() {
            return Err(Error::Configuration(
                "environment cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            host,
            port,
            environment,
            lease: Mutex::new(LeaseState::default()),
            resolved: Mutex::new(None),
            transport,
        })
    }

    /// Raw host as configured at registration.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Capability tag this proxy instance advertises.
    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// Resolves `host` for display, falling back to the raw host string.
    ///
    /// Successful resolutions are cached so repeated display reads never
    /// block on DNS again; failures are not cached, so a transient outage
    /// does not stick.
    pub async fn resolved_host(&self) -> String {
        if let Some(cached) = self.resolved.lock().clone() {
            return cached;
        }

        let resolved = match tokio::net::lookup_host((self.host.as_str(), self.port)).await {
            Ok(mut addrs) => addrs.next().map(|addr| addr.ip().to_string()),
            Err(_) => None,
        };

        match resolved {
            Some(address) => {
                *self.resolved.lock() = Some(address.clone());
                address
            }
            None => self.host.clone(),
        }
    }

    /// Drops the cached resolution so the next display read re-resolves.
    pub fn invalidate_resolved_host(&self) {
        *self.resolved.lock() = None;
    }

    /// Full URL for `path` under the worker's fixed server prefix.
    pub fn endpoint_url(&self, path: &str) -> String {
        format!(
            "http://{}:{}/{}/{}",
            self.host, self.port, SERVER_PATH_PREFIX, path
        )
    }

    /// Liveness-check endpoint.
    pub fn heartbeat_url(&self) -> String {
        self.endpoint_url("heartbeat")
    }

    /// Command endpoint.
    pub fn driver_url(&self) -> String {
        self.endpoint_url("driver/")
    }

    /// True iff no session lease is active.
    pub fn can_accept_lease(&self) -> bool {
        !self.lease.lock().active
    }

    /// Acquires the exclusive session lease, recording the start time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LeaseHeld`] if a lease is already active, meaning
    /// the hub assigned two sessions to one worker. Fatal to the calling
    /// operation; callers must not retry.
    pub fn acquire_lease(&self) -> Result<()> {
        let mut lease = self.lease.lock();
        if lease.active {
            // Display reads the lease cell; release the guard first.
            drop(lease);
            return Err(Error::LeaseHeld {
                proxy: self.to_string(),
            });
        }
        lease.active = true;
        lease.started_at = Some(Instant::now());
        Ok(())
    }

    /// Releases the session lease.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotLeased`] if no lease is active: a double
    /// release or a stale reference. Fatal, same as a double acquire.
    pub fn release_lease(&self) -> Result<()> {
        let mut lease = self.lease.lock();
        if !lease.active {
            drop(lease);
            return Err(Error::NotLeased {
                proxy: self.to_string(),
            });
        }
        lease.active = false;
        lease.started_at = None;
        Ok(())
    }

    /// Time since the lease was acquired; [`None`] while idle.
    pub fn elapsed_lease_time(&self) -> Option<Duration> {
        let lease = self.lease.lock();
        if lease.active {
            lease.started_at.map(|started| started.elapsed())
        } else {
            None
        }
    }

    /// Forwards a driver command to the worker.
    ///
    /// With no active lease the call returns the synthetic
    /// [`WorkerResponse::timeout_failure`] immediately, without touching
    /// the network; a stray command must never reach a worker that has no
    /// assigned session. With a lease held, `params` is POSTed to the
    /// driver endpoint and the worker's response is returned verbatim.
    ///
    /// Never mutates lease state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the POST cannot complete.
    pub async fn forward(&self, params: &CommandParameters) -> Result<WorkerResponse> {
        // One locked read, atomic with lease transitions; the POST below
        // runs with the lock released.
        let lease_active = self.lease.lock().active;
        if !lease_active {
            debug!(
                target = "grid.proxy",
                proxy = %self,
                "command arrived with no active lease; returning timeout failure"
            );
            return Ok(WorkerResponse::timeout_failure());
        }

        let response = self.transport.post(&self.driver_url(), params).await?;
        Ok(response)
    }

    /// Best-effort: tells the worker to end `session_id`.
    ///
    /// Routed through [`forward`](Self::forward), so the no-lease guard
    /// applies here too. Any failure is logged and swallowed; hub-side
    /// cleanup must never block on an unreachable worker.
    pub async fn terminate_session(&self, session_id: &str) {
        let mut params = CommandParameters::new();
        params.set(CMD_FIELD, CMD_TEST_COMPLETE);
        params.set(SESSION_ID_FIELD, session_id);

        if let Err(err) = self.forward(&params).await {
            warn!(
                target = "grid.proxy",
                proxy = %self,
                session_id,
                error = %err,
                "failed telling worker to end its session"
            );
        }
    }
}

impl fmt::Display for WorkerProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let active = self.lease.lock().active;
        write!(
            f,
            "[WorkerProxy {}:{}#{}/{}]",
            self.host, self.port, self.environment, active
        )
    }
}

impl fmt::Debug for WorkerProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerProxy")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("environment", &self.environment)
            .field("lease_active", &self.lease.lock().active)
            .finish_non_exhaustive()
    }
}

impl PartialEq for WorkerProxy {
    fn eq(&self, other: &Self) -> bool {
        self.host == other.host
            && self.port == other.port
            && self.environment == other.environment
    }
}

impl Eq for WorkerProxy {}

impl Hash for WorkerProxy {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.host.hash(state);
        self.port.hash(state);
        self.environment.hash(state);
    }
}

/// Renders an elapsed lease duration as "seconds,hundredths sec".
///
/// Presentation only; the contract is the [`Duration`] itself.
pub fn format_elapsed(elapsed: Duration) -> String {
    format!("{},{:02} sec", elapsed.as_secs(), elapsed.subsec_millis() / 10)
}

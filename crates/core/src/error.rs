//! Error types for the grid core.

use thiserror::Error;

use crate::transport::TransportError;

/// Result type alias for proxy operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur operating a worker proxy.
///
/// Lease violations are scheduler bugs and are never absorbed; transport
/// failures are ordinary I/O outcomes for the session layer to handle.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid host or environment at construction; the proxy is never built.
    #[error("invalid worker proxy configuration: {0}")]
    Configuration(String),

    /// Lease acquired while one is already active. The hub assigned two
    /// sessions to one worker: a scheduling bug, never retried silently.
    #[error("exceeded concurrent session max for {proxy}")]
    LeaseHeld { proxy: String },

    /// Lease released while idle: a double release or a stale reference.
    #[error("releasing lease on an idle worker proxy: {proxy}")]
    NotLeased { proxy: String },

    /// Transport-level failure while forwarding a command to the worker.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl Error {
    /// True for the lease-state violations (double acquire / idle release).
    pub fn is_state_violation(&self) -> bool {
        matches!(self, Error::LeaseHeld { .. } | Error::NotLeased { .. })
    }
}

//! Hub-side core for a browser-automation test grid.
//!
//! The hub represents every remote worker it knows about as a
//! [`WorkerProxy`]: an immutable (host, port, environment) identity, an
//! exclusive capacity-one session lease, a command forwarder gated on that
//! lease, and a liveness prober with a bounded-retry policy at the caller
//! boundary.
//!
//! Scheduling (which proxy serves which session) belongs to the hub's
//! registry and stays outside this crate, as does the content of the
//! commands being forwarded.

pub mod error;
pub mod health;
pub mod proxy;
pub mod testing;
pub mod transport;

pub use error::{Error, Result};
pub use health::{HealthPolicy, HealthStatus, UNRESPONSIVE_STATUS};
pub use proxy::{WorkerProxy, format_elapsed};
pub use transport::{DEFAULT_REQUEST_TIMEOUT, HttpTransport, Transport, TransportError};

//! HTTP transport to a remote worker.
//!
//! The hub talks to a worker through exactly two verbs: a GET against the
//! heartbeat endpoint and a form-encoded POST against the driver endpoint.
//! Both sit behind the [`Transport`] trait so the proxy can be exercised
//! without a network; the scriptable test double lives in
//! [`crate::testing`].

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use grid_protocol::{CommandParameters, WorkerResponse};

/// Default per-request timeout for the production transport.
///
/// The worker endpoints carry no inherent timeout, so the client imposes
/// one; a hung worker must not pin a hub task indefinitely.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport errors
#[derive(Debug, Error)]
pub enum TransportError {
    /// Request-level failure from the HTTP client (connect, DNS, timeout,
    /// body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Connection could not be established. Used by non-HTTP transports
    /// and scripted test failures.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
}

impl TransportError {
    /// True if the underlying request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Http(err) if err.is_timeout())
    }
}

/// Blocking-from-the-caller's-perspective HTTP access to one worker.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issues a GET and returns the status/body pair verbatim.
    async fn get(&self, url: &str) -> Result<WorkerResponse, TransportError>;

    /// POSTs `params` form-encoded and returns the status/body pair verbatim.
    async fn post(
        &self,
        url: &str,
        params: &CommandParameters,
    ) -> Result<WorkerResponse, TransportError>;
}

/// Production transport on a shared reqwest client.
///
/// Every request carries an explicit timeout; connection pooling and TLS
/// stay inside reqwest.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport with [`DEFAULT_REQUEST_TIMEOUT`].
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeout(DEFAULT_REQUEST_TIMEOUT)
    }

    /// Creates a transport with an explicit per-request `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<WorkerResponse, TransportError> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(WorkerResponse::new(status, body))
    }

    async fn post(
        &self,
        url: &str,
        params: &CommandParameters,
    ) -> Result<WorkerResponse, TransportError> {
        let response = self
            .client
            .post(url)
            .form(&params.form_pairs())
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(WorkerResponse::new(status, body))
    }
}

//! Testing infrastructure for the grid core.
//!
//! Provides a scriptable [`Transport`] double so proxy behavior can be
//! exercised without touching the network. Queue outcomes with
//! [`MockTransport::respond_with`] / [`MockTransport::fail_with`], run the
//! code under test, then assert on the recorded requests.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use grid::testing::MockTransport;
//! use grid::WorkerProxy;
//!
//! #[tokio::test]
//! async fn test_forwarding() {
//!     let transport = Arc::new(MockTransport::new());
//!     let proxy = WorkerProxy::new("rc1", 5555, "firefox", transport.clone()).unwrap();
//!     // ... drive the proxy, then assert on transport.requests()
//! }
//! ```

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use grid_protocol::{CommandParameters, WorkerResponse};

use crate::transport::{Transport, TransportError};

/// Request recorded by [`MockTransport`] for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedRequest {
    /// A GET was issued (heartbeat probes).
    Get { url: String },
    /// A POST was issued (forwarded commands, termination).
    Post {
        url: String,
        params: CommandParameters,
    },
}

/// Scripted outcome for one transport call.
#[derive(Debug, Clone)]
enum ScriptedOutcome {
    Respond(WorkerResponse),
    Fail(String),
}

/// Scriptable transport double.
///
/// Outcomes are consumed in queue order, one per request; with the queue
/// empty every request answers `200 OK`. All issued requests are recorded
/// for later assertion.
#[derive(Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<ScriptedOutcome>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `response` as the outcome of the next request.
    pub fn respond_with(&self, response: WorkerResponse) {
        self.script
            .lock()
            .unwrap()
            .push_back(ScriptedOutcome::Respond(response));
    }

    /// Queues a transport failure as the outcome of the next request.
    pub fn fail_with(&self, message: &str) {
        self.script
            .lock()
            .unwrap()
            .push_back(ScriptedOutcome::Fail(message.to_string()));
    }

    /// All requests issued so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests issued so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn next_outcome(&self) -> Result<WorkerResponse, TransportError> {
        match self.script.lock().unwrap().pop_front() {
            Some(ScriptedOutcome::Respond(response)) => Ok(response),
            Some(ScriptedOutcome::Fail(message)) => {
                Err(TransportError::ConnectionFailed(message))
            }
            None => Ok(WorkerResponse::new(200, "OK")),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &str) -> Result<WorkerResponse, TransportError> {
        self.requests.lock().unwrap().push(RecordedRequest::Get {
            url: url.to_string(),
        });
        self.next_outcome()
    }

    async fn post(
        &self,
        url: &str,
        params: &CommandParameters,
    ) -> Result<WorkerResponse, TransportError> {
        self.requests.lock().unwrap().push(RecordedRequest::Post {
            url: url.to_string(),
            params: params.clone(),
        });
        self.next_outcome()
    }
}
